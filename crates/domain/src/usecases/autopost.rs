//! AutoPost use case - orchestrates extraction, image rewriting and publishing

use std::sync::Arc;
use thiserror::Error;

use crate::{
    LOCAL_ERROR_CODE,
    model::{CommentStatus, ImageBounds, PostDraft},
    ports::{ImageStore, PublishingClient, RemoteCallError},
    usecases::{
        code_blocks::normalize_code_blocks,
        extract::{MetadataExtractor, ValidationError},
        images::{ImageError, ImageRewriter},
        publish::{PostPublisher, PublishedPost},
    },
};

/// Configuration for one publishing target
#[derive(Debug, Clone)]
pub struct AutoPostConfig {
    /// Blog root URL, used for the edit link
    pub base_url: String,
    /// Maximum display size for embedded images
    pub image_bounds: ImageBounds,
    /// Comment acceptance for new posts
    pub comment_status: CommentStatus,
}

/// Error type for the whole run, carrying the stage that failed
#[derive(Debug, Error)]
pub enum AutoPostError {
    #[error("extracting metadata: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error("creating post: {0}")]
    CreatePost(#[source] RemoteCallError),
}

impl AutoPostError {
    /// Label for the stage that failed
    pub fn stage(&self) -> String {
        match self {
            AutoPostError::Validation(_) => "extracting metadata".to_string(),
            AutoPostError::Image(e) => e.stage(),
            AutoPostError::CreatePost(_) => "creating post".to_string(),
        }
    }

    /// Remote fault code, or [`LOCAL_ERROR_CODE`] for local failures
    pub fn code(&self) -> i64 {
        match self {
            AutoPostError::Validation(_) => LOCAL_ERROR_CODE,
            AutoPostError::Image(ImageError::File { .. }) => LOCAL_ERROR_CODE,
            AutoPostError::Image(ImageError::Upload { source, .. })
            | AutoPostError::Image(ImageError::Edit { source, .. })
            | AutoPostError::CreatePost(source) => source.code(),
        }
    }

    /// Error message without the stage label
    pub fn message(&self) -> String {
        match self {
            AutoPostError::Validation(e) => e.to_string(),
            AutoPostError::Image(ImageError::File { source, .. }) => source.to_string(),
            AutoPostError::Image(ImageError::Upload { source, .. })
            | AutoPostError::Image(ImageError::Edit { source, .. })
            | AutoPostError::CreatePost(source) => source.to_string(),
        }
    }
}

/// Turns an HTML document into a published post
pub struct AutoPost<P: ?Sized, S: ?Sized> {
    extractor: MetadataExtractor,
    rewriter: ImageRewriter<P, S>,
    publisher: PostPublisher<P>,
    comment_status: CommentStatus,
}

impl<P, S> AutoPost<P, S>
where
    P: PublishingClient + ?Sized,
    S: ImageStore + ?Sized,
{
    pub fn new(client: Arc<P>, store: Arc<S>, config: AutoPostConfig) -> Self {
        Self {
            extractor: MetadataExtractor::new(),
            rewriter: ImageRewriter::new(client.clone(), store, config.image_bounds),
            publisher: PostPublisher::new(client, config.base_url),
            comment_status: config.comment_status,
        }
    }

    /// Build the draft: extract metadata, upload images, normalize code blocks.
    ///
    /// Metadata is validated before any remote call is made.
    pub async fn prepare(&self, html: &str) -> Result<PostDraft, AutoPostError> {
        let mut draft = self.extractor.extract(html)?;
        draft.comment_status = self.comment_status;

        draft.content = self.rewriter.rewrite(&draft.content).await?;
        draft.content = normalize_code_blocks(&draft.content);

        Ok(draft)
    }

    /// Create the post from a prepared draft
    pub async fn publish(&self, draft: &PostDraft) -> Result<PublishedPost, AutoPostError> {
        self.publisher
            .publish(draft)
            .await
            .map_err(AutoPostError::CreatePost)
    }

    /// Prepare and publish in one go
    pub async fn run(&self, html: &str) -> Result<PublishedPost, AutoPostError> {
        let draft = self.prepare(html).await?;
        self.publish(&draft).await
    }
}
