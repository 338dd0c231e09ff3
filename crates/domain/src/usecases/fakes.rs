//! Fake port implementations shared by the use case tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::model::{FileUpload, LocalImage, PostDraft, PostFields, UploadedFile};
use crate::ports::{FileError, ImageStore, PublishingClient, RemoteCallError};

/// Publishing client that records calls and hands out sequential IDs
pub struct FakeClient {
    next_id: Mutex<u32>,
    upload_url: Option<String>,
    upload_fault: Option<(i64, String)>,
    upload_fault_at: Option<usize>,
    upload_attempts: Mutex<usize>,
    create_fault: Option<(i64, String)>,
    reject_edits: bool,
    uploads: Mutex<Vec<FileUpload>>,
    edits: Mutex<Vec<(String, PostFields)>>,
    posts: Mutex<Vec<PostDraft>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self {
            next_id: Mutex::new(1),
            upload_url: None,
            upload_fault: None,
            upload_fault_at: None,
            upload_attempts: Mutex::new(0),
            create_fault: None,
            reject_edits: false,
            uploads: Mutex::new(vec![]),
            edits: Mutex::new(vec![]),
            posts: Mutex::new(vec![]),
        }
    }

    pub fn with_upload_url(mut self, url: &str) -> Self {
        self.upload_url = Some(url.to_string());
        self
    }

    pub fn failing_upload(mut self, code: i64, message: &str) -> Self {
        self.upload_fault = Some((code, message.to_string()));
        self
    }

    /// Fail only the `attempt`-th upload (1-based), earlier ones succeed
    pub fn failing_upload_at(mut self, attempt: usize, code: i64, message: &str) -> Self {
        self.upload_fault = Some((code, message.to_string()));
        self.upload_fault_at = Some(attempt);
        self
    }

    pub fn upload_attempts(&self) -> usize {
        *self.upload_attempts.lock().unwrap()
    }

    pub fn failing_create(mut self, code: i64, message: &str) -> Self {
        self.create_fault = Some((code, message.to_string()));
        self
    }

    pub fn rejecting_edits(mut self) -> Self {
        self.reject_edits = true;
        self
    }

    pub fn uploads(&self) -> Vec<FileUpload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn edits(&self) -> Vec<(String, PostFields)> {
        self.edits.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<PostDraft> {
        self.posts.lock().unwrap().clone()
    }

    fn next_id(&self) -> String {
        let mut next = self.next_id.lock().unwrap();
        let id = *next;
        *next += 1;
        id.to_string()
    }
}

fn fault((code, message): &(i64, String)) -> RemoteCallError {
    RemoteCallError::Fault {
        code: *code,
        message: message.clone(),
    }
}

#[async_trait]
impl PublishingClient for FakeClient {
    async fn create_post(&self, draft: &PostDraft) -> Result<String, RemoteCallError> {
        if let Some(ref f) = self.create_fault {
            return Err(fault(f));
        }
        self.posts.lock().unwrap().push(draft.clone());
        Ok(self.next_id())
    }

    async fn upload_file(&self, file: &FileUpload) -> Result<UploadedFile, RemoteCallError> {
        let attempt = {
            let mut attempts = self.upload_attempts.lock().unwrap();
            *attempts += 1;
            *attempts
        };
        if let Some(ref f) = self.upload_fault {
            if self.upload_fault_at.is_none_or(|at| at == attempt) {
                return Err(fault(f));
            }
        }
        self.uploads.lock().unwrap().push(file.clone());
        let url = self.upload_url.clone().unwrap_or_else(|| {
            format!("https://blog.example/wp-content/uploads/{}", file.name)
        });
        Ok(UploadedFile {
            id: self.next_id(),
            url,
        })
    }

    async fn edit_post(&self, id: &str, fields: &PostFields) -> Result<bool, RemoteCallError> {
        self.edits
            .lock()
            .unwrap()
            .push((id.to_string(), fields.clone()));
        Ok(!self.reject_edits)
    }
}

/// Image store backed by a map of in-memory images
pub struct FakeImageStore {
    images: HashMap<String, LocalImage>,
}

impl FakeImageStore {
    pub fn new() -> Self {
        Self {
            images: HashMap::new(),
        }
    }

    pub fn with_image(mut self, path: &str, width: u32, height: u32, mime_type: &str) -> Self {
        self.images.insert(
            path.to_string(),
            LocalImage {
                bytes: path.as_bytes().to_vec(),
                width,
                height,
                mime_type: mime_type.to_string(),
            },
        );
        self
    }
}

#[async_trait]
impl ImageStore for FakeImageStore {
    async fn load(&self, path: &str) -> Result<LocalImage, FileError> {
        self.images
            .get(path)
            .cloned()
            .ok_or_else(|| FileError::NotFound(PathBuf::from(path)))
    }
}
