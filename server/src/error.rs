use thiserror::Error;

/// Failure to obtain the region dataset at startup. Always fatal.
#[derive(Debug, Error)]
pub enum DataSourceError {
    /// Connection failure, timeout, or other transport error
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Response body could not be read
    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Body is not valid GeoJSON
    #[error("invalid GeoJSON payload: {0}")]
    Parse(#[from] geojson::Error),

    /// Valid GeoJSON, but not a FeatureCollection
    #[error("expected a GeoJSON FeatureCollection, got {found}")]
    NotFeatureCollection { found: &'static str },
}
