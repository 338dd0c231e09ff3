//! Application use cases / business logic

pub mod autopost;
pub mod code_blocks;
pub mod extract;
pub mod images;
pub mod publish;

#[cfg(test)]
mod fakes;

pub use autopost::{AutoPost, AutoPostConfig, AutoPostError};
pub use code_blocks::normalize_code_blocks;
pub use extract::{MetadataExtractor, MetadataField, ValidationError};
pub use images::{ImageError, ImageRewriter, caption_markup, fit_within};
pub use publish::{PostPublisher, PublishedPost, edit_url};
