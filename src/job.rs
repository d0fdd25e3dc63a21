//! The fetch → render → publish pipeline behind the trigger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::JobConfig;
use crate::map::{ColorTable, render};
use crate::points::PointsApiClient;
use crate::publish::{PublishReceipt, publish};
use crate::storage::ObjectStore;
use crate::JobError;

pub const SUCCESS_BODY: &str = "HTML file uploaded to Google Cloud Storage successfully.";

/// Result handed back to whoever triggered the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOutcome {
    pub status_code: u16,
    pub body: String,
}

impl JobOutcome {
    #[must_use]
    pub fn success() -> Self {
        Self {
            status_code: 200,
            body: SUCCESS_BODY.to_string(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

impl From<&JobError> for JobOutcome {
    fn from(err: &JobError) -> Self {
        Self {
            status_code: err.status_code(),
            body: err.response_body(),
        }
    }
}

/// Run the whole pipeline once
///
/// Any failure aborts the run; nothing fetched so far is kept.
#[instrument(skip_all, fields(url = %config.api.base_url))]
pub async fn run<S: ObjectStore>(
    config: &JobConfig,
    store: &S,
    now: DateTime<Utc>,
) -> Result<PublishReceipt, JobError> {
    let client = PointsApiClient::new(&config.api)?;
    let points = client.fetch_all_qualifying_points().await?;

    let document = render(
        &points,
        ColorTable::air_index(),
        &now.with_timezone(&config.timezone),
    );

    let receipt = publish(
        &document,
        store,
        &config.storage.scratch_path,
        config.storage.bucket.as_deref(),
        &config.storage.object_key,
    )
    .await?;

    info!(
        "Published {} markers ({} bytes)",
        document.markers.len(),
        receipt.bytes
    );
    Ok(receipt)
}

/// Entry point of a trigger: load the configuration, run, report
pub async fn handle_trigger<F, S>(lookup: F, store: &S) -> JobOutcome
where
    F: Fn(&str) -> Option<String>,
    S: ObjectStore,
{
    let result = match JobConfig::from_lookup(lookup) {
        Ok(config) => run(&config, store, Utc::now()).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(_) => JobOutcome::success(),
        Err(err) => {
            error!("Run failed: {}", err);
            JobOutcome::from(&err)
        }
    }
}
