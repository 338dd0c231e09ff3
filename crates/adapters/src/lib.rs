//! autopost adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `wordpress`: WordPress XML-RPC publishing client
//! - `xmlrpc`: XML-RPC value model and wire codec
//! - `stub`: Recording publishing client for dry runs
//! - `images`: Filesystem image store

mod images_fs;
mod stub;

pub mod wordpress;
pub mod xmlrpc;

/// Re-exports for image adapters
pub mod images {
    pub use crate::images_fs::FsImageStore;
}

/// Re-exports for publishing adapters
pub mod publishing {
    pub use crate::stub::StubPublishingClient;
    pub use crate::wordpress::WordPressClient;
}
