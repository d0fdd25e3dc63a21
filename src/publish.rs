//! Map publishing
//!
//! The document is written to a scratch file first and uploaded from there.
//! Every run overwrites both the scratch file and the stored object.

use std::path::Path;

use tracing::{info, instrument};

use crate::error::PublishError;
use crate::map::MapDocument;
use crate::storage::ObjectStore;

pub const CONTENT_TYPE: &str = "text/html";

/// What was stored by a successful publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub bucket: String,
    pub key: String,
    pub bytes: u64,
}

/// Write the document to `scratch_path` and upload it to `bucket/key`
#[instrument(skip(document, store))]
pub async fn publish<S: ObjectStore>(
    document: &MapDocument,
    store: &S,
    scratch_path: &Path,
    bucket: Option<&str>,
    key: &str,
) -> Result<PublishReceipt, PublishError> {
    let html = document
        .to_html()
        .map_err(|e| PublishError::upload(format!("Failed to serialize map: {e}")))?;
    tokio::fs::write(scratch_path, html.as_bytes())
        .await
        .map_err(|e| {
            PublishError::upload(format!(
                "Failed to write {}: {e}",
                scratch_path.display()
            ))
        })?;

    let bytes = store
        .upload(bucket, key, scratch_path, CONTENT_TYPE)
        .await?;

    let bucket = bucket.unwrap_or_default().to_string();
    info!("HTML file uploaded to Google Cloud Storage: gs://{}/{}", bucket, key);
    Ok(PublishReceipt {
        bucket,
        key: key.to_string(),
        bytes,
    })
}
