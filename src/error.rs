use thiserror::Error;

/// Failures a path request can end in. All are recoverable at the call site.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("could not find destination {query:?}: {reason}")]
    DestinationNotFound { query: String, reason: String },

    #[error("no path from {from} to {to}")]
    PathNotFound { from: String, to: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("request superseded by a newer one")]
    Cancelled,
}

pub type PathResult<T> = Result<T, PathError>;

/// Transport-level failures of a geocoding lookup.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("geocoder answered with status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed coordinate {0:?} in geocoder response")]
    MalformedCoordinate(String),

    #[error("lookup timed out after {0:?}")]
    Timeout(std::time::Duration),
}
