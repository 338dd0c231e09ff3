//! Post publishing use case - creates the post and builds its edit link

use std::sync::Arc;

use crate::model::PostDraft;
use crate::ports::{PublishingClient, RemoteCallError};

/// A post created on the remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    pub id: String,
    /// Admin page for editing the post
    pub edit_url: String,
}

/// Admin edit page for a post on a blog rooted at `base_url`
pub fn edit_url(base_url: &str, post_id: &str) -> String {
    format!(
        "{}/wp-admin/post.php?post={}&action=edit",
        base_url.trim_end_matches('/'),
        post_id
    )
}

pub struct PostPublisher<P: ?Sized> {
    client: Arc<P>,
    base_url: String,
}

impl<P: PublishingClient + ?Sized> PostPublisher<P> {
    pub fn new(client: Arc<P>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub async fn publish(&self, draft: &PostDraft) -> Result<PublishedPost, RemoteCallError> {
        tracing::info!(title = %draft.title, slug = %draft.slug, "Creating post");

        let id = self.client.create_post(draft).await?;
        let edit_url = edit_url(&self.base_url, &id);

        tracing::info!(post_id = %id, edit_url = %edit_url, "Post created");

        Ok(PublishedPost { id, edit_url })
    }
}
