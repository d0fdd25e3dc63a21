use std::future::Future;
use std::path::Path;

use crate::error::PublishError;

pub mod gcs;

pub use gcs::GcsStore;

/// Destination for published map documents
pub trait ObjectStore {
    /// Upload the file at `path` to `bucket/key`, replacing any existing object.
    ///
    /// Implementations report a missing local file as
    /// [`PublishError::FileMissing`].
    fn upload(
        &self,
        bucket: Option<&str>,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> impl Future<Output = Result<u64, PublishError>> + Send;
}
