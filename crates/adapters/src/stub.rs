//! Stub publishing client for dry runs and testing

use async_trait::async_trait;
use autopost_domain::{
    FileUpload, PostDraft, PostFields, PublishingClient, RemoteCallError, UploadedFile,
};
use std::sync::Mutex;

/// Publishing client that records calls instead of sending them
pub struct StubPublishingClient {
    base_url: String,
    state: Mutex<StubState>,
}

#[derive(Default)]
struct StubState {
    next_id: u64,
    posts: Vec<PostDraft>,
    uploads: Vec<FileUpload>,
    edits: Vec<(String, PostFields)>,
}

impl StubPublishingClient {
    /// Upload URLs are built under `{base_url}/wp-content/uploads/`
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            state: Mutex::new(StubState::default()),
        }
    }

    /// Drafts passed to create-post
    pub fn posts(&self) -> Vec<PostDraft> {
        self.state.lock().unwrap().posts.clone()
    }

    /// Files passed to upload-file
    pub fn uploads(&self) -> Vec<FileUpload> {
        self.state.lock().unwrap().uploads.clone()
    }

    /// `(id, fields)` pairs passed to edit-post
    pub fn edits(&self) -> Vec<(String, PostFields)> {
        self.state.lock().unwrap().edits.clone()
    }
}

impl StubState {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("stub-{}", self.next_id)
    }
}

#[async_trait]
impl PublishingClient for StubPublishingClient {
    async fn create_post(&self, draft: &PostDraft) -> Result<String, RemoteCallError> {
        let mut state = self.state.lock().unwrap();
        state.posts.push(draft.clone());
        let id = state.next_id();
        tracing::info!(id = %id, title = %draft.title, "Dry run: post not created");
        Ok(id)
    }

    async fn upload_file(&self, file: &FileUpload) -> Result<UploadedFile, RemoteCallError> {
        let mut state = self.state.lock().unwrap();
        state.uploads.push(file.clone());
        let id = state.next_id();
        tracing::info!(id = %id, name = %file.name, bytes = file.bits.len(), "Dry run: file not uploaded");
        Ok(UploadedFile {
            id,
            url: format!("{}/wp-content/uploads/{}", self.base_url, file.name),
        })
    }

    async fn edit_post(&self, id: &str, fields: &PostFields) -> Result<bool, RemoteCallError> {
        self.state
            .lock()
            .unwrap()
            .edits
            .push((id.to_string(), fields.clone()));
        Ok(true)
    }
}
