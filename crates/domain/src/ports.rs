//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::model::{FileUpload, LocalImage, PostDraft, PostFields, UploadedFile};

/// Error type for remote publishing calls
#[derive(Debug, Error)]
pub enum RemoteCallError {
    #[error("{message}")]
    Fault { code: i64, message: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Remote rejected the {0} request")]
    Rejected(&'static str),
}

impl RemoteCallError {
    /// Fault code reported by the remote, or the XML-RPC server error codes
    /// for failures on our side of the wire
    pub fn code(&self) -> i64 {
        match self {
            RemoteCallError::Fault { code, .. } => *code,
            RemoteCallError::Transport(_) => -32300,
            RemoteCallError::InvalidResponse(_) => -32700,
            RemoteCallError::Rejected(_) => -32500,
        }
    }
}

/// Port for the remote content-management API
#[async_trait]
pub trait PublishingClient: Send + Sync {
    /// Create a post from the draft, returns the new post ID
    async fn create_post(&self, draft: &PostDraft) -> Result<String, RemoteCallError>;

    /// Upload a file to the media library
    async fn upload_file(&self, file: &FileUpload) -> Result<UploadedFile, RemoteCallError>;

    /// Edit fields of an existing post or attachment, returns remote success
    async fn edit_post(&self, id: &str, fields: &PostFields) -> Result<bool, RemoteCallError>;
}

/// Error type for local image access
#[derive(Debug, Error)]
pub enum FileError {
    #[error("File {} does not exist!", .0.display())]
    NotFound(PathBuf),
    #[error("Could not get contents of {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not read image data from {}: {message}", path.display())]
    UnrecognizedImage { path: PathBuf, message: String },
}

/// Port for loading images referenced by the post body
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Read an image and probe its dimensions and MIME type
    async fn load(&self, path: &str) -> Result<LocalImage, FileError>;
}
