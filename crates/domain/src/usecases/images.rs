//! Image rewriting use case - uploads local images and embeds captioned markup

use regex::Regex;
use std::ops::Range;
use std::sync::Arc;
use thiserror::Error;

use crate::escape_html;
use crate::model::{
    DisplaySize, FileNameParts, FileUpload, ImageBounds, ImageReference, LocalImage, PostFields,
    UploadedFile,
};
use crate::ports::{FileError, ImageStore, PublishingClient, RemoteCallError};

/// Error type for image rewriting, labelled with the failing step
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("checking file {path}: {source}")]
    File {
        path: String,
        #[source]
        source: FileError,
    },
    #[error("uploading photo {path}: {source}")]
    Upload {
        path: String,
        #[source]
        source: RemoteCallError,
    },
    #[error("editing photo {path}: {source}")]
    Edit {
        path: String,
        #[source]
        source: RemoteCallError,
    },
}

impl ImageError {
    /// Step at which the image failed, e.g. `uploading photo img/a.png`
    pub fn stage(&self) -> String {
        match self {
            ImageError::File { path, .. } => format!("checking file {}", path),
            ImageError::Upload { path, .. } => format!("uploading photo {}", path),
            ImageError::Edit { path, .. } => format!("editing photo {}", path),
        }
    }
}

/// Choose the display size for an image within the bounds.
///
/// Landscape and square images are only ever scaled by width, portrait images
/// only by height. The other dimension is scaled proportionally and rounded
/// down.
pub fn fit_within(width: u32, height: u32, bounds: ImageBounds) -> DisplaySize {
    if width > bounds.max_width && width >= height {
        DisplaySize {
            width: bounds.max_width,
            height: scale(height, bounds.max_width, width),
            resized: true,
        }
    } else if height > bounds.max_height && width < height {
        DisplaySize {
            width: scale(width, bounds.max_height, height),
            height: bounds.max_height,
            resized: true,
        }
    } else {
        DisplaySize {
            width,
            height,
            resized: false,
        }
    }
}

/// `value * numerator / denominator`, rounded down
fn scale(value: u32, numerator: u32, denominator: u32) -> u32 {
    (u64::from(value) * u64::from(numerator) / u64::from(denominator)) as u32
}

/// Caption markup for an uploaded image, matching what the blog's own media
/// inserter produces
pub fn caption_markup(uploaded: &UploadedFile, size: DisplaySize, alt_text: &str) -> String {
    let remote = FileNameParts::parse(&uploaded.url);
    let src = format!(
        "{}{}{}{}",
        remote.basepath,
        remote.basename,
        size.suffix(),
        remote.extension
    );
    let escaped = escape_html(alt_text);

    format!(
        "[caption id='attachment_{id}' align='aligncenter' width='{width}' caption='{escaped}']\
         <a href='{url}'>\
         <img class='wp-image-{id}' title='{escaped}' src='{src}' alt='{escaped}' width='{width}' height='{height}' />\
         </a> {alt_text}[/caption]",
        id = uploaded.id,
        url = uploaded.url,
        width = size.width,
        height = size.height,
    )
}

/// Rewrites local `<img>` tags into uploaded, captioned images
pub struct ImageRewriter<P: ?Sized, S: ?Sized> {
    client: Arc<P>,
    store: Arc<S>,
    bounds: ImageBounds,
    pattern: Regex,
}

impl<P, S> ImageRewriter<P, S>
where
    P: PublishingClient + ?Sized,
    S: ImageStore + ?Sized,
{
    pub fn new(client: Arc<P>, store: Arc<S>, bounds: ImageBounds) -> Self {
        Self {
            client,
            store,
            bounds,
            pattern: Regex::new(r#"<img src="([^"]+)" alt="([^"]+)" />"#).expect("Valid regex"),
        }
    }

    /// Find local image tags in order of appearance
    pub fn find_images(&self, content: &str) -> Vec<(Range<usize>, ImageReference)> {
        self.pattern
            .captures_iter(content)
            .filter_map(|caps| {
                let span = caps.get(0)?.range();
                let reference = ImageReference {
                    local_path: caps[1].to_string(),
                    alt_text: caps[2].to_string(),
                };
                Some((span, reference))
            })
            .collect()
    }

    /// Replace every local image tag in the content.
    ///
    /// Images are processed one at a time. The first failure aborts the
    /// rewrite: the partially rewritten content is dropped, while images
    /// uploaded before the failure stay in the remote media library.
    pub async fn rewrite(&self, content: &str) -> Result<String, ImageError> {
        let images = self.find_images(content);
        tracing::info!(count = images.len(), "Rewriting image markup");

        let mut output = String::with_capacity(content.len());
        let mut last = 0;

        for (index, (span, reference)) in images.iter().enumerate() {
            output.push_str(&content[last..span.start]);
            match self.embed(reference).await {
                Ok(markup) => output.push_str(&markup),
                Err(e) => {
                    if index > 0 {
                        tracing::warn!(
                            uploaded = index,
                            "Aborting image rewrite; earlier uploads remain on the remote"
                        );
                    }
                    return Err(e);
                }
            }
            last = span.end;
        }
        output.push_str(&content[last..]);

        Ok(output)
    }

    /// Upload one image, set its metadata and return the replacement markup
    pub async fn embed(&self, reference: &ImageReference) -> Result<String, ImageError> {
        let path = &reference.local_path;

        let LocalImage {
            bytes,
            width,
            height,
            mime_type,
        } = self
            .store
            .load(path)
            .await
            .map_err(|source| ImageError::File {
                path: path.clone(),
                source,
            })?;

        let size = fit_within(width, height, self.bounds);
        let upload = FileUpload {
            name: FileNameParts::parse(path).file_name(),
            mime_type,
            bits: bytes,
        };

        tracing::info!(
            path = %path,
            name = %upload.name,
            mime_type = %upload.mime_type,
            width,
            height,
            display_width = size.width,
            display_height = size.height,
            "Uploading image"
        );

        let uploaded = self
            .client
            .upload_file(&upload)
            .await
            .map_err(|source| ImageError::Upload {
                path: path.clone(),
                source,
            })?;

        let fields = PostFields {
            title: Some(reference.alt_text.clone()),
            excerpt: Some(reference.alt_text.clone()),
            content: Some(reference.alt_text.clone()),
        };
        let edited = self
            .client
            .edit_post(&uploaded.id, &fields)
            .await
            .map_err(|source| ImageError::Edit {
                path: path.clone(),
                source,
            })?;
        if !edited {
            return Err(ImageError::Edit {
                path: path.clone(),
                source: RemoteCallError::Rejected("edit-post"),
            });
        }

        tracing::debug!(id = %uploaded.id, url = %uploaded.url, "Image uploaded");

        Ok(caption_markup(&uploaded, size, &reference.alt_text))
    }
}
