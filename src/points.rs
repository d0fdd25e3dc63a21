//! Points API client
//!
//! Walks the paginated `/v1/points` listing one page at a time. The first
//! failed request aborts the walk, nothing is retried.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::JobError;
use crate::config::ApiConfig;
use crate::error::FetchStage;
use crate::models::{PageCount, Point, PointsPage};

/// Client for the points API
pub struct PointsApiClient {
    client: Client,
    base_url: String,
    token: String,
}

impl PointsApiClient {
    /// Create a new client
    pub fn new(config: &ApiConfig) -> Result<Self, JobError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("AirMap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| JobError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }

    fn request(&self) -> RequestBuilder {
        self.client.get(&self.base_url).bearer_auth(&self.token)
    }

    /// Number of pages the listing currently has
    #[instrument(skip(self))]
    pub async fn fetch_page_count(&self) -> Result<u32, JobError> {
        let stage = FetchStage::PageCount;
        let response = send(self.request(), stage).await?;
        let count: PageCount = decode(response, stage).await?;
        info!("Points listing has {} pages", count.total_pages);
        Ok(count.total_pages)
    }

    /// Classified points of one page, in page order
    #[instrument(skip(self))]
    pub async fn fetch_page(&self, page: u32) -> Result<Vec<Point>, JobError> {
        let stage = FetchStage::Page(page);
        let response = send(self.request().query(&[("page", page)]), stage).await?;
        let body: PointsPage = decode(response, stage).await?;

        let total = body.items.len();
        let points = body
            .into_classified()
            .map_err(|message| JobError::Decode { stage, message })?;
        debug!("Page {} kept {} of {} items", page, points.len(), total);
        Ok(points)
    }

    /// Fetch every page and collect the points that carry a classification
    #[instrument(skip(self))]
    pub async fn fetch_all_qualifying_points(&self) -> Result<Vec<Point>, JobError> {
        let total_pages = self.fetch_page_count().await?;

        let mut points = Vec::new();
        for page in 1..=total_pages {
            points.extend(self.fetch_page(page).await?);
        }

        info!(
            "Collected {} classified points from {} pages",
            points.len(),
            total_pages
        );
        Ok(points)
    }
}

async fn send(request: RequestBuilder, stage: FetchStage) -> Result<Response, JobError> {
    let response = request.send().await.map_err(|e| JobError::Transport {
        stage,
        message: e.to_string(),
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    warn!("Points API returned {} for {}", status, stage);
    let body = error_body(response.text().await, stage);
    Err(JobError::UpstreamFetch {
        stage,
        status: status.as_u16(),
        body,
    })
}

fn error_body(body: reqwest::Result<String>, stage: FetchStage) -> String {
    match body {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to read error body for {}: {}", stage, e);
            String::new()
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response, stage: FetchStage) -> Result<T, JobError> {
    response.json().await.map_err(|e| JobError::Decode {
        stage,
        message: e.to_string(),
    })
}
