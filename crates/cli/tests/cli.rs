use assert_cmd::cargo::cargo_bin_cmd;
use image::RgbImage;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "[blog]\n\
         user = \"editor\"\n\
         pass = \"s3cret\"\n\
         url = \"https://blog.example\"\n\
         max_width = 800\n\
         max_height = 600\n",
    )
    .expect("write config");
    path
}

fn write_document(dir: &TempDir, body: &str) -> PathBuf {
    let content = format!(
        "<h1>Sunset walk</h1>\n\
         <p>@slug: sunset-walk\n\
         @excerpt: An evening by the water\n\
         @tags: photos, evening\n\
         @categories: Life</p>\n\
         {}\n",
        body
    );
    let path = dir.path().join("post.html");
    fs::write(&path, content).expect("write document");
    path
}

fn write_png(dir: &TempDir, name: &str, width: u32, height: u32) {
    RgbImage::new(width, height)
        .save(dir.path().join(name))
        .expect("write image");
}

#[test]
fn config_init_writes_example_file() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");

    let mut cmd = cargo_bin_cmd!("autopost");
    cmd.args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .success();

    let content = fs::read_to_string(&config_path).expect("read config");
    assert!(content.contains("[blog]"));
    assert!(content.contains("max_width"));
}

#[test]
fn config_show_redacts_password() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir);

    let mut cmd = cargo_bin_cmd!("autopost");
    cmd.arg("--config")
        .arg(&config_path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[blog]"))
        .stdout(predicate::str::contains("s3cret").not());
}

#[test]
fn publish_unknown_target_dumps_config() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir);
    let document = write_document(&dir, "<p>Body</p>");

    let mut cmd = cargo_bin_cmd!("autopost");
    cmd.arg("--config")
        .arg(&config_path)
        .arg("publish")
        .arg(&document)
        .args(["--target", "missing", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find identifier 'missing'"))
        .stderr(predicate::str::contains("[blog]"))
        .stderr(predicate::str::contains("s3cret").not());
}

#[test]
fn publish_dry_run_prints_edit_url() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir);
    write_png(&dir, "sunset.png", 1600, 800);
    let document = write_document(
        &dir,
        r#"<p><img src="sunset.png" alt="Sun over the lake" /></p>"#,
    );

    let mut cmd = cargo_bin_cmd!("autopost");
    cmd.arg("--config")
        .arg(&config_path)
        .arg("publish")
        .arg(&document)
        .args(["--target", "blog", "--dry-run", "--base-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://blog.example/wp-admin/post.php?post=stub-2&action=edit",
        ));
}

#[test]
fn publish_dry_run_json_contains_draft() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir);
    write_png(&dir, "sunset.png", 1600, 800);
    let document = write_document(
        &dir,
        "<p><img src=\"sunset.png\" alt=\"Sun over the lake\" /></p>\n<pre><code>walk()</code></pre>",
    );

    let mut cmd = cargo_bin_cmd!("autopost");
    let output = cmd
        .arg("--config")
        .arg(&config_path)
        .arg("publish")
        .arg(&document)
        .args(["--target", "blog", "--dry-run", "--json", "--base-dir"])
        .arg(dir.path())
        .output()
        .expect("run publish");

    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let draft = &value["draft"];
    assert_eq!(draft["title"], "Sunset walk");
    assert_eq!(draft["slug"], "sunset-walk");
    assert_eq!(draft["excerpt"], "An evening by the water");
    assert_eq!(draft["terms"]["post_tag"], serde_json::json!(["photos", "evening"]));
    assert_eq!(draft["terms"]["category"], serde_json::json!(["Life"]));

    let content = draft["content"].as_str().expect("content");
    assert!(content.contains("src='https://blog.example/wp-content/uploads/sunset-800x400.png'"));
    assert!(content.contains("width='800' height='400'"));
    assert!(content.contains("<pre>walk()</pre>"));
    assert!(!content.contains("@slug"));

    let recorded = &value["recorded"];
    assert_eq!(recorded["uploads"][0]["name"], "sunset.png");
    assert_eq!(recorded["uploads"][0]["mime_type"], "image/png");
    assert_eq!(recorded["edits"][0]["id"], "stub-1");
    assert_eq!(recorded["edits"][0]["title"], "Sun over the lake");
    assert_eq!(recorded["posts"], 1);
}

#[test]
fn publish_missing_metadata_reports_position() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir);
    let document = dir.path().join("post.html");
    fs::write(&document, "<h1>Untitled</h1>\n<p>@slug: untitled</p>\n").expect("write");

    let mut cmd = cargo_bin_cmd!("autopost");
    cmd.arg("--config")
        .arg(&config_path)
        .arg("publish")
        .arg(&document)
        .args(["--target", "blog", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Position: extracting metadata"))
        .stderr(predicate::str::contains("666: excerpt missing"));
}

#[test]
fn publish_missing_image_reports_position() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir);
    let document = write_document(&dir, r#"<p><img src="gone.png" alt="Gone" /></p>"#);

    let mut cmd = cargo_bin_cmd!("autopost");
    cmd.arg("--config")
        .arg(&config_path)
        .arg("publish")
        .arg(&document)
        .args(["--target", "blog", "--dry-run", "--base-dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Position: checking file gone.png"))
        .stderr(predicate::str::contains("does not exist!"));
}

#[test]
fn json_log_format_writes_json_lines() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(&dir);
    let document = write_document(&dir, "<p>Body</p>");

    let mut cmd = cargo_bin_cmd!("autopost");
    cmd.env_remove("RUST_LOG")
        .arg("--config")
        .arg(&config_path)
        .args(["--log-format", "json", "--log-level", "info"])
        .arg("publish")
        .arg(&document)
        .args(["--target", "blog", "--dry-run"])
        .assert()
        .success()
        .stderr(predicate::str::contains(r#""message":"Publishing document""#));
}
