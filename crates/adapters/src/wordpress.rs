//! WordPress XML-RPC publishing client

use async_trait::async_trait;
use autopost_domain::{
    FileUpload, PostDraft, PostFields, PublishingClient, RemoteCallError, UploadedFile,
};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::xmlrpc::{self, Value};

/// Blog ID sent with every call; single-site installs ignore it
const BLOG_ID: i64 = 1;

/// Publishing client speaking the `wp.*` XML-RPC API
pub struct WordPressClient {
    client: Client,
    endpoint: String,
    username: String,
    password: SecretString,
}

impl WordPressClient {
    /// Create a client for the blog at `base_url` (the endpoint is
    /// `{base_url}/xmlrpc.php`)
    pub fn new(
        base_url: &str,
        username: impl Into<String>,
        password: SecretString,
    ) -> Result<Self, RemoteCallError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RemoteCallError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/xmlrpc.php", base_url.trim_end_matches('/')),
            username: username.into(),
            password,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Call a `wp.*` method; blog ID and credentials are prepended to `params`
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RemoteCallError> {
        let mut all = vec![
            Value::Int(BLOG_ID),
            Value::from(self.username.as_str()),
            Value::from(self.password.expose_secret()),
        ];
        all.extend(params);

        let body = xmlrpc::encode_call(method, &all)
            .map_err(|e| RemoteCallError::InvalidResponse(e.to_string()))?;

        tracing::debug!(method, endpoint = %self.endpoint, "XML-RPC call");

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(|e| RemoteCallError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    tracing::debug!(error = %e, status = %status, "Failed to read error body");
                    String::new()
                }
            };
            let message = if text.trim().is_empty() {
                status.canonical_reason().unwrap_or("HTTP error").to_string()
            } else {
                text
            };
            return Err(RemoteCallError::Fault {
                code: i64::from(status.as_u16()),
                message,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| RemoteCallError::Transport(e.to_string()))?;

        match xmlrpc::parse_response(&text) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(fault)) => {
                tracing::warn!(method, code = fault.code, message = %fault.message, "XML-RPC fault");
                Err(RemoteCallError::Fault {
                    code: fault.code,
                    message: fault.message,
                })
            }
            Err(e) => Err(RemoteCallError::InvalidResponse(e.to_string())),
        }
    }
}

/// Post IDs are integers on the wire but strings in responses
fn post_id_value(id: &str) -> Value {
    id.parse::<i64>()
        .map(Value::Int)
        .unwrap_or_else(|_| Value::from(id))
}

fn draft_content(draft: &PostDraft) -> Value {
    let terms = Value::structure(
        draft
            .terms
            .iter()
            .map(|(taxonomy, names)| (taxonomy.as_str(), Value::from(names.clone()))),
    );

    Value::structure([
        ("post_title", Value::from(draft.title.as_str())),
        ("post_name", Value::from(draft.slug.as_str())),
        ("post_excerpt", Value::from(draft.excerpt.as_str())),
        ("post_content", Value::from(draft.content.as_str())),
        ("comment_status", Value::from(draft.comment_status.as_str())),
        ("terms_names", terms),
    ])
}

fn fields_content(fields: &PostFields) -> Value {
    Value::structure(
        [
            ("post_title", &fields.title),
            ("post_excerpt", &fields.excerpt),
            ("post_content", &fields.content),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, Value::from(v)))),
    )
}

#[async_trait]
impl PublishingClient for WordPressClient {
    async fn create_post(&self, draft: &PostDraft) -> Result<String, RemoteCallError> {
        let value = self.call("wp.newPost", vec![draft_content(draft)]).await?;

        value.as_id().ok_or_else(|| {
            RemoteCallError::InvalidResponse(format!("wp.newPost returned {:?}", value))
        })
    }

    async fn upload_file(&self, file: &FileUpload) -> Result<UploadedFile, RemoteCallError> {
        let data = Value::structure([
            ("name", Value::from(file.name.as_str())),
            ("type", Value::from(file.mime_type.as_str())),
            ("bits", Value::Base64(file.bits.clone())),
        ]);
        let value = self.call("wp.uploadFile", vec![data]).await?;

        let id = value.member("id").and_then(Value::as_id);
        let url = value.member("url").and_then(Value::as_str);
        match (id, url) {
            (Some(id), Some(url)) => Ok(UploadedFile {
                id,
                url: url.to_string(),
            }),
            _ => Err(RemoteCallError::InvalidResponse(
                "wp.uploadFile response lacks id or url".to_string(),
            )),
        }
    }

    async fn edit_post(&self, id: &str, fields: &PostFields) -> Result<bool, RemoteCallError> {
        let value = self
            .call("wp.editPost", vec![post_id_value(id), fields_content(fields)])
            .await?;

        value.as_bool().ok_or_else(|| {
            RemoteCallError::InvalidResponse(format!("wp.editPost returned {:?}", value))
        })
    }
}
