//! Error types and handling for the `AirMap` job
//!
//! Every failure of a run ends up as one of these variants. The trigger
//! turns them into a status code and a response body, nothing is retried.

use std::fmt;

use thiserror::Error;

/// Which request of the pagination loop failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    /// The initial request that reports `total_pages`
    PageCount,
    /// A numbered page request
    Page(u32),
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStage::PageCount => write!(f, "page count"),
            FetchStage::Page(page) => write!(f, "page {page}"),
        }
    }
}

/// Failures of the publish stage
#[derive(Error, Debug)]
pub enum PublishError {
    /// The scratch file was gone when the upload started
    #[error("The file {key} was not found.")]
    FileMissing { key: String },

    /// Anything else that went wrong while talking to storage
    #[error("An error occurred: {message}")]
    Upload { message: String },
}

impl PublishError {
    pub fn file_missing<S: Into<String>>(key: S) -> Self {
        Self::FileMissing { key: key.into() }
    }

    pub fn upload<S: Into<String>>(message: S) -> Self {
        Self::Upload {
            message: message.into(),
        }
    }
}

/// Main error type for a job run
#[derive(Error, Debug)]
pub enum JobError {
    /// Configuration-related errors, raised before any network call
    #[error("Error: {message}")]
    Config { message: String },

    /// The points API answered with a non-success status
    #[error("Error fetching {stage}: status {status}")]
    UpstreamFetch {
        stage: FetchStage,
        status: u16,
        body: String,
    },

    /// The request never produced a response
    #[error("Request for {stage} failed: {message}")]
    Transport { stage: FetchStage, message: String },

    /// The response body could not be decoded
    #[error("Invalid response for {stage}: {message}")]
    Decode { stage: FetchStage, message: String },

    /// Rendering succeeded but the map could not be published
    #[error(transparent)]
    Publish(#[from] PublishError),
}

impl JobError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Status code reported to the trigger
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            JobError::UpstreamFetch { status, .. } => *status,
            JobError::Config { .. }
            | JobError::Transport { .. }
            | JobError::Decode { .. }
            | JobError::Publish(_) => 500,
        }
    }

    /// Body reported to the trigger
    #[must_use]
    pub fn response_body(&self) -> String {
        match self {
            JobError::UpstreamFetch {
                stage: FetchStage::PageCount,
                body,
                ..
            } => format!("Error fetching page count: {body}"),
            JobError::UpstreamFetch {
                stage: FetchStage::Page(_),
                body,
                ..
            } => format!("Error fetching points: {body}"),
            other => other.to_string(),
        }
    }
}
