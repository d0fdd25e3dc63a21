//! Google Cloud Storage backend
//!
//! Credentials come from the usual application default sources: the file
//! named by `GOOGLE_APPLICATION_CREDENTIALS`, or the metadata server when
//! running on Google Cloud. The hub is only built on the first upload.

use std::io::ErrorKind;
use std::path::Path;

use google_storage1::Storage;
use google_storage1::api::{Object, Scope};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{client::legacy::Client, rt::TokioExecutor};
use tokio::sync::OnceCell;
use tracing::{info, instrument};
use yup_oauth2::{
    ApplicationDefaultCredentialsAuthenticator, ApplicationDefaultCredentialsFlowOpts,
    authenticator::ApplicationDefaultCredentialsTypes,
};

use super::ObjectStore;
use crate::config::BUCKET_VAR;
use crate::error::PublishError;

pub type StorageHubType =
    Storage<HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>>;

#[derive(Default)]
pub struct GcsStore {
    hub: OnceCell<StorageHubType>,
}

impl GcsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn hub(&self) -> Result<&StorageHubType, PublishError> {
        self.hub.get_or_try_init(connect).await
    }
}

async fn connect() -> Result<StorageHubType, PublishError> {
    let connector = HttpsConnectorBuilder::new()
        .with_native_roots()
        .map_err(|e| PublishError::upload(format!("Failed to build HTTPS connector: {e}")))?
        .https_only()
        .enable_http1()
        .build();

    let hyper_client = Client::builder(TokioExecutor::new()).build(connector);

    let opts = ApplicationDefaultCredentialsFlowOpts::default();
    let auth = match ApplicationDefaultCredentialsAuthenticator::builder(opts).await {
        ApplicationDefaultCredentialsTypes::InstanceMetadata(builder) => builder.build().await,
        ApplicationDefaultCredentialsTypes::ServiceAccount(builder) => builder.build().await,
    }
    .map_err(|e| PublishError::upload(format!("Failed to obtain storage credentials: {e}")))?;

    Ok(Storage::new(hyper_client, auth))
}

impl ObjectStore for GcsStore {
    #[instrument(skip(self, path))]
    async fn upload(
        &self,
        bucket: Option<&str>,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> Result<u64, PublishError> {
        let file = std::fs::File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => PublishError::file_missing(key),
            _ => PublishError::upload(format!("Failed to open {}: {e}", path.display())),
        })?;
        let size = file
            .metadata()
            .map_err(|e| PublishError::upload(e.to_string()))?
            .len();

        let bucket = bucket
            .ok_or_else(|| PublishError::upload(format!("{BUCKET_VAR} is not set")))?;
        let mime = content_type
            .parse::<mime::Mime>()
            .map_err(|e| PublishError::upload(format!("Invalid content type: {e}")))?;

        let object = Object {
            name: Some(key.to_string()),
            content_type: Some(content_type.to_string()),
            ..Object::default()
        };

        self.hub()
            .await?
            .objects()
            .insert(object, bucket)
            .name(key)
            .add_scope(Scope::DevstorageReadWrite)
            .upload(file, mime)
            .await
            .map_err(|e| PublishError::upload(e.to_string()))?;

        info!("Uploaded {} bytes to gs://{}/{}", size, bucket, key);
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_reported_before_connecting() {
        let dir = TempDir::new().unwrap();
        let store = GcsStore::new();
        let err = store
            .upload(
                Some("maps"),
                "index.html",
                &dir.path().join("absent.html"),
                "text/html",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::FileMissing { .. }));
        assert_eq!(err.to_string(), "The file index.html was not found.");
    }

    #[tokio::test]
    async fn test_missing_bucket_is_upload_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.html");
        std::fs::write(&path, "<html></html>").unwrap();

        let err = GcsStore::new()
            .upload(None, "index.html", &path, "text/html")
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Upload { .. }));
        assert!(err.to_string().contains(BUCKET_VAR));
    }
}
