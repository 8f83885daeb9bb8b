use std::time::Duration;

use thiserror::Error;

/// Failures on the client side of the zone. Widgets never surface these to the
/// screen; they are logged and turned into a degraded value at the widget edge.
#[derive(Error, Debug)]
pub enum FolioError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("request cancelled")]
    Cancelled,

    #[error("unexpected status {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FolioError>;
