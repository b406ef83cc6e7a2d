use thiserror::Error;

/// Errors raised by the detection and intelligence layers.
#[derive(Debug, Error)]
pub enum IntelError {
    /// An unexpected fault while detecting one package. Batch analysis logs and
    /// drops these; direct `detect` callers see them.
    #[error("License detection failed for {package}: {source}")]
    DetectionFailed {
        package: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported document format: {0} (expected text, html, markdown or json)")]
    UnsupportedFormat(String),

    #[error("Compatibility engine error: {0}")]
    Compatibility(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntelError {
    pub fn detection_failed<S: Into<String>>(package: S, source: std::io::Error) -> Self {
        Self::DetectionFailed {
            package: package.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, IntelError>;
