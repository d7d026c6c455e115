//! Error taxonomy for the collectors.
//!
//! Collectors return [`FundError`] so callers can tell validation failures
//! from network and page-shape failures. Application layers wrap it in
//! `anyhow::Error` with context.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FundError {
    #[error("unsupported fund category '{0}', expected one of: all, gp, hh, zq, zs, bb, qdii, lof")]
    UnsupportedCategory(String),

    #[error("invalid period format '{0}', expected <number><h|d|m|y>")]
    InvalidPeriodFormat(String),

    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("failed to fetch page for fund {code}: {reason}")]
    Fetch { code: String, reason: String },

    #[error("unexpected page shape at {url}: {reason}")]
    UnexpectedPageShape { url: String, reason: String },
}

impl FundError {
    pub(crate) fn page_shape(url: &str, reason: impl Into<String>) -> Self {
        FundError::UnexpectedPageShape {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}
