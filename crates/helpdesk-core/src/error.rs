//! Error types for the helpdesk dashboard

use std::{error::Error as StdError, fmt};

/// Main error type for the helpdesk dashboard
#[derive(Debug)]
pub enum Error {
    /// I/O error, typically a missing or unreadable export file
    Io(std::io::Error),

    /// Malformed JSON, or a record with a missing or mistyped field
    Serialization(serde_json::Error),

    /// Timestamp string that none of the accepted formats could parse
    Timestamp {
        /// The offending input
        value: String,
    },

    /// Aggregation that is undefined over an empty ticket set
    EmptyDataset {
        /// Name of the metric that could not be computed
        metric: &'static str,
    },

    /// Configuration error
    Configuration {
        /// Error message
        message: String,
    },

    /// Template rendering error
    Template(String),

    /// Other error
    Other(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Serialization(err) => write!(f, "Serialization error: {err}"),
            Self::Timestamp { value } => write!(f, "Unrecognized timestamp: {value:?}"),
            Self::EmptyDataset { metric } => {
                write!(f, "Cannot compute {metric} over an empty ticket set")
            }
            Self::Configuration { message } => write!(f, "Configuration error: {message}"),
            Self::Template(msg) => write!(f, "Template error: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}

#[cfg(test)]
#[allow(
    clippy::missing_panics_doc,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io;

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "No such file or directory");
        let app_error = Error::from(io_error);

        assert!(matches!(app_error, Error::Io(_)));
        assert!(format!("{}", app_error).starts_with("I/O error"));
        assert!(app_error.source().is_some());
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("[{").unwrap_err();
        let app_error = Error::from(json_error);

        assert!(matches!(app_error, Error::Serialization(_)));
        assert!(format!("{}", app_error).contains("Serialization error"));
        assert!(app_error.source().is_some());
    }

    #[test]
    fn test_timestamp_error() {
        let error = Error::Timestamp {
            value: "yesterday".to_string(),
        };

        assert_eq!(format!("{}", error), "Unrecognized timestamp: \"yesterday\"");
        assert!(error.source().is_none());
    }

    #[test]
    fn test_empty_dataset_error() {
        let error = Error::EmptyDataset {
            metric: "average response time",
        };

        assert_eq!(
            format!("{}", error),
            "Cannot compute average response time over an empty ticket set"
        );
    }

    #[test]
    fn test_display_variants() {
        let cases = vec![
            (
                Error::Configuration {
                    message: "bad port".to_string(),
                },
                "Configuration error: bad port",
            ),
            (
                Error::Template("missing field".to_string()),
                "Template error: missing field",
            ),
            (Error::Other("other error".to_string()), "other error"),
        ];

        for (error, expected) in cases {
            assert_eq!(format!("{}", error), expected);
        }
    }
}
