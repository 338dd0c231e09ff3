//! Domain models and value objects

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Taxonomy name used for post tags
pub const TAG_TAXONOMY: &str = "post_tag";

/// Taxonomy name used for post categories
pub const CATEGORY_TAXONOMY: &str = "category";

/// Placeholder value for a field the author intends to fill in later
pub const PLACEHOLDER: &str = "TODO";

/// Whether readers may comment on a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CommentStatus {
    #[default]
    Open,
    Closed,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Open => "open",
            CommentStatus::Closed => "closed",
        }
    }
}

/// The post being assembled before publication
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostDraft {
    /// Post title (from the top-level heading)
    pub title: String,
    /// URL slug
    pub slug: String,
    /// Short summary
    pub excerpt: String,
    /// HTML body with markers removed
    pub content: String,
    /// Comment acceptance
    #[serde(default)]
    pub comment_status: CommentStatus,
    /// Taxonomy terms by taxonomy name (`post_tag`, `category`, ...)
    #[serde(default)]
    pub terms: BTreeMap<String, Vec<String>>,
}

impl PostDraft {
    /// Attach terms for a taxonomy, replacing any previous ones
    pub fn set_terms(&mut self, taxonomy: impl Into<String>, terms: Vec<String>) {
        self.terms.insert(taxonomy.into(), terms);
    }

    /// Tags attached to the draft
    pub fn tags(&self) -> &[String] {
        self.terms
            .get(TAG_TAXONOMY)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Categories attached to the draft
    pub fn categories(&self) -> &[String] {
        self.terms
            .get(CATEGORY_TAXONOMY)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// A local image reference found in the post body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Path to the image on the local filesystem
    pub local_path: String,
    /// Alternative text, reused as the image title and caption
    pub alt_text: String,
}

/// A local image loaded into memory
#[derive(Debug, Clone)]
pub struct LocalImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub mime_type: String,
}

/// A file to upload to the remote media library
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub name: String,
    pub mime_type: String,
    pub bits: Vec<u8>,
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Remote attachment ID
    pub id: String,
    /// Public URL of the stored file (the remote may rename it)
    pub url: String,
}

/// Fields to change on an existing remote post or attachment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFields {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
}

/// Maximum display size for embedded images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBounds {
    pub max_width: u32,
    pub max_height: u32,
}

/// Display size chosen for an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySize {
    pub width: u32,
    pub height: u32,
    /// Whether the size differs from the original
    pub resized: bool,
}

impl DisplaySize {
    /// Suffix the remote applies to the file name of a resized variant
    pub fn suffix(&self) -> String {
        if self.resized {
            format!("-{}x{}", self.width, self.height)
        } else {
            String::new()
        }
    }
}

/// A path or URL split into directory, stem and extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNameParts {
    /// Everything up to and including the last `/`
    pub basepath: String,
    /// File name without extension
    pub basename: String,
    /// Extension including the leading dot, or empty
    pub extension: String,
}

impl FileNameParts {
    pub fn parse(path: &str) -> Self {
        let (basepath, filename) = match path.rfind('/') {
            Some(idx) => path.split_at(idx + 1),
            None => ("", path),
        };
        let (basename, extension) = match filename.rfind('.') {
            Some(idx) => filename.split_at(idx),
            None => (filename, ""),
        };

        Self {
            basepath: basepath.to_string(),
            basename: basename.to_string(),
            extension: extension.to_string(),
        }
    }

    /// File name with extension
    pub fn file_name(&self) -> String {
        format!("{}{}", self.basename, self.extension)
    }
}
