//! Error types for segmentation demo operations

use thiserror::Error;

/// Result type alias for segmentation demo operations
pub type Result<T> = std::result::Result<T, SegDemoError>;

/// Phase of a benchmark run in which a segmentation call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchmarkPhase {
    /// Discarded warm-up calls
    Warmup,
    /// Timed sample calls
    Sampling,
}

impl std::fmt::Display for BenchmarkPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warmup => write!(f, "warm-up"),
            Self::Sampling => write!(f, "sampling"),
        }
    }
}

/// Error types for orientation, compositing, segmentation and benchmarking
#[derive(Error, Debug)]
pub enum SegDemoError {
    /// An image or mask buffer cannot be interpreted as pixels
    #[error("Decode error: {0}")]
    Decode(String),

    /// A mask cannot be resampled to the original's resolution
    #[error("Resample error: {0}")]
    Resample(String),

    /// The external segmenter failed; the message is the collaborator's own
    #[error("Model error: {0}")]
    Model(String),

    /// A benchmark run failed mid-way; no partial result is produced
    #[error("Benchmark run aborted during {phase} call {index}: {source}")]
    AbortedRun {
        phase: BenchmarkPhase,
        /// 1-based index of the failing call within its phase
        index: usize,
        #[source]
        source: Box<SegDemoError>,
    },

    /// Another operation is already in flight on the same session
    #[error("Operation already running: {0}")]
    Busy(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image codec errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// A benchmark result was requested without any timed samples
    #[error("Benchmark produced no samples")]
    NoSamples,

    /// JSON report serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SegDemoError {
    /// Create a new decode error
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new resample error
    pub fn resample<S: Into<String>>(msg: S) -> Self {
        Self::Resample(msg.into())
    }

    /// Create a new model error
    pub fn model<S: Into<String>>(msg: S) -> Self {
        Self::Model(msg.into())
    }

    /// Create a new busy error naming the operation that was refused
    pub fn busy<S: Into<String>>(operation: S) -> Self {
        Self::Busy(operation.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Wrap a segmentation failure as an aborted benchmark run
    #[must_use]
    pub fn aborted_run(phase: BenchmarkPhase, index: usize, source: SegDemoError) -> Self {
        Self::AbortedRun {
            phase,
            index,
            source: Box::new(source),
        }
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
        recommended: Option<T>,
    ) -> Self {
        let recommendation = match recommended {
            Some(rec) => format!(" Recommended: {}", rec),
            None => String::new(),
        };

        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {}).{}",
            parameter, value, valid_range, recommendation
        ))
    }

    /// Whether this error ended a benchmark run
    #[must_use]
    pub fn is_aborted_run(&self) -> bool {
        matches!(self, Self::AbortedRun { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_error_creation() {
        let err = SegDemoError::decode("mask buffer too short");
        assert!(matches!(err, SegDemoError::Decode(_)));

        let err = SegDemoError::resample("empty mask");
        assert!(matches!(err, SegDemoError::Resample(_)));

        let err = SegDemoError::busy("benchmark");
        assert!(matches!(err, SegDemoError::Busy(_)));
    }

    #[test]
    fn test_error_display() {
        let err = SegDemoError::model("person detector unavailable");
        assert_eq!(err.to_string(), "Model error: person detector unavailable");
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SegDemoError::from(json_error);
        assert!(matches!(err, SegDemoError::Serialization(_)));
        assert!(err.to_string().starts_with("Serialization error:"));

        assert_eq!(SegDemoError::NoSamples.to_string(), "Benchmark produced no samples");
    }

    #[test]
    fn test_aborted_run_keeps_model_message() {
        let err = SegDemoError::aborted_run(
            BenchmarkPhase::Sampling,
            5,
            SegDemoError::model("request failed"),
        );
        assert!(err.is_aborted_run());

        let message = err.to_string();
        assert!(message.contains("sampling"));
        assert!(message.contains("call 5"));
        assert!(message.contains("request failed"));

        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("Model error: request failed"));
    }

    #[test]
    fn test_enhanced_error_context() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = SegDemoError::file_io_error("write cutout", Path::new("/out/cutout.png"), &io_error);
        let error_string = err.to_string();
        assert!(error_string.contains("write cutout"));
        assert!(error_string.contains("/out/cutout.png"));

        let err = SegDemoError::config_value_error("sample count", 0, "1-1000", Some(10));
        let error_string = err.to_string();
        assert!(error_string.contains("sample count"));
        assert!(error_string.contains("1-1000"));
        assert!(error_string.contains("Recommended: 10"));
    }
}
