//! Error types for fetching and querying lesson plans.
//!
//! Extraction itself never fails (malformed markup degrades to an empty
//! result); errors only come from HTTP transport, unexpected status codes,
//! bad plan URLs, and out-of-range day filters.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure while fetching the plan document.
    #[error("request for {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    /// The server answered with a non-success status code.
    #[error("unexpected HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    /// The plan URL could not be parsed.
    #[error("invalid plan URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Day filter outside the Monday..Friday range.
    #[error("day must be between 0 and 4, got {0}")]
    InvalidDay(i32),
}
