//! Publish command - turns an HTML document into a blog post

use anyhow::{Context, Result};
use autopost_adapters::{
    images::FsImageStore,
    publishing::{StubPublishingClient, WordPressClient},
};
use autopost_domain::{
    CommentStatus, ImageBounds, PublishingClient,
    usecases::{AutoPost, AutoPostConfig, AutoPostError},
};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::args::PublishArgs;
use crate::config::AppConfig;

pub async fn execute(args: PublishArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let target = match config.target(&args.target) {
        Ok(target) => target,
        Err(e) => {
            eprintln!("{}", config.redacted_toml()?);
            return Err(e.into());
        }
    };

    let html = read_input(&args.file)?;

    tracing::info!(
        target_name = %args.target,
        url = %target.url,
        dry_run = args.dry_run,
        input = %args.file.display(),
        "Publishing document"
    );

    let stub = args
        .dry_run
        .then(|| Arc::new(StubPublishingClient::new(&target.url)));
    let client: Arc<dyn PublishingClient> = if let Some(ref stub) = stub {
        stub.clone()
    } else {
        let password = target.password(&args.target)?;
        Arc::new(
            WordPressClient::new(&target.url, target.user.as_str(), password)
                .context("Failed to initialize publishing client")?,
        )
    };
    let store = Arc::new(FsImageStore::new(&args.base_dir));

    let autopost = AutoPost::new(
        client,
        store,
        AutoPostConfig {
            base_url: target.url.clone(),
            image_bounds: ImageBounds {
                max_width: target.max_width,
                max_height: target.max_height,
            },
            comment_status: CommentStatus::Open,
        },
    );

    let draft = match autopost.prepare(&html).await {
        Ok(draft) => draft,
        Err(e) => report_failure(&e),
    };
    let post = match autopost.publish(&draft).await {
        Ok(post) => post,
        Err(e) => report_failure(&e),
    };

    if args.json {
        let mut output = serde_json::json!({
            "post_id": post.id,
            "edit_url": post.edit_url,
            "dry_run": args.dry_run,
            "draft": draft,
        });
        if let Some(stub) = stub {
            output["recorded"] = recorded_calls(&stub);
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", post.edit_url);
    }

    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))
    }
}

/// Summarize what a dry run would have sent to the blog
fn recorded_calls(stub: &StubPublishingClient) -> serde_json::Value {
    let uploads: Vec<_> = stub
        .uploads()
        .iter()
        .map(|file| {
            serde_json::json!({
                "name": file.name,
                "mime_type": file.mime_type,
                "size": file.bits.len(),
            })
        })
        .collect();
    let edits: Vec<_> = stub
        .edits()
        .iter()
        .map(|(id, fields)| serde_json::json!({ "id": id, "title": fields.title }))
        .collect();

    serde_json::json!({
        "uploads": uploads,
        "edits": edits,
        "posts": stub.posts().len(),
    })
}

/// Print the failing stage and the error, then exit
fn report_failure(err: &AutoPostError) -> ! {
    tracing::error!(stage = %err.stage(), code = err.code(), "Publishing failed");
    eprintln!("Position: {}", err.stage());
    eprintln!("An error occurred - {}: {}", err.code(), err.message());
    std::process::exit(1);
}
