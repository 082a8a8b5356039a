use thiserror::Error;

/// Errors raised while paging execution results or deriving chart options
#[derive(Debug, Error)]
pub enum ChartError {
    /// Result or URI with a dimension count other than 1 or 2
    #[error("Invalid dimensionality: expected 1 or 2 dimensions, got {0}")]
    InvalidDimensionality(usize),

    /// Measure group header present but not last in its dimension
    #[error("Malformed dimension {dimension}: measure group header must be the last header")]
    MalformedDimension { dimension: usize },

    /// Chart type outside the supported set
    #[error("Unsupported chart type: {0}")]
    UnsupportedChartType(String),

    /// Arithmetic or derived measure references an unknown local identifier
    #[error("Measure '{measure}' references unknown measure '{reference}'")]
    MissingMeasureDependency { measure: String, reference: String },

    /// Measure participates in a reference cycle
    #[error("Cyclic measure dependency involving '{0}'")]
    CyclicMeasureDependency(String),

    /// Page fetch answered with a 4xx/5xx status
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// Transport level failure reported by the page fetcher
    #[error("Transport error: {0}")]
    Transport(String),

    /// Result URI that cannot be paged
    #[error("Invalid result URI: {0}")]
    InvalidUri(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Type alias for Results using ChartError
pub type Result<T> = std::result::Result<T, ChartError>;
