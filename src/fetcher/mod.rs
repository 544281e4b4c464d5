pub mod base;
pub mod prismic;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("content API answered {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("content API at {0} advertises no master ref")]
    MissingMasterRef(String),
    #[error("invalid content API url {url}: {reason}")]
    Url { url: String, reason: String },
    #[error("content API did not answer in time")]
    OutOfTime,
}
