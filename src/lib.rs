//! `AirMap` - parcel locker air quality map publisher
//!
//! Fetches every point of the points API, keeps the ones reporting an air
//! quality index, renders them onto a Leaflet map and uploads the page to
//! Google Cloud Storage.

pub mod config;
pub mod error;
pub mod job;
pub mod map;
pub mod models;
pub mod points;
pub mod publish;
pub mod storage;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use config::JobConfig;
pub use error::{FetchStage, JobError, PublishError};
pub use job::{JobOutcome, handle_trigger};
pub use map::{ColorTable, MapDocument, render};
pub use models::{AirIndexLevel, Coordinates, Point};
pub use points::PointsApiClient;
pub use publish::{PublishReceipt, publish};
pub use storage::{GcsStore, ObjectStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
