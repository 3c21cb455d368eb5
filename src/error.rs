// src/error.rs
//! Error kinds raised at the adapter seams. Each adapter maps its own
//! transport failures into one of these so the pipeline can decide, per kind,
//! whether a failure is fatal to the pass or isolated to one location/slot.

use thiserror::Error;

/// Failure talking to the scheduling service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Transport(String),
    #[error("upstream request timed out")]
    Timeout,
    #[error("upstream returned HTTP {0}")]
    Status(u16),
    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            UpstreamError::Timeout
        } else if let Some(status) = e.status() {
            UpstreamError::Status(status.as_u16())
        } else if e.is_decode() {
            UpstreamError::Malformed(e.to_string())
        } else {
            UpstreamError::Transport(e.to_string())
        }
    }
}

/// Failure of the dedup store.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection failed: {0}")]
    Connect(String),
    #[error("cache read failed: {0}")]
    Read(String),
    #[error("cache write failed: {0}")]
    Write(String),
    #[error("cache operation timed out")]
    Timeout,
}

/// Failure handing a message to the outbound provider.
#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("notifier request failed: {0}")]
    Transport(String),
    #[error("notifier returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed notifier response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for NotifierError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            NotifierError::Malformed(e.to_string())
        } else {
            NotifierError::Transport(e.to_string())
        }
    }
}

/// Pass-fatal failures. Everything narrower than "could not discover
/// candidates" is folded into the pass summary instead.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("location discovery failed: {0}")]
    Discovery(#[source] UpstreamError),
}
