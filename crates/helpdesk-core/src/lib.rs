//! Core types and aggregations for the helpdesk ticket dashboard

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod config;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod types;
pub mod utils;

/// Simple error context handling for binaries and startup code
pub mod context_error {
    use std::{error::Error as StdError, fmt};

    /// A simple error type that can wrap any error with context
    #[derive(Debug)]
    pub struct ContextError {
        source: Option<Box<dyn StdError + Send + Sync>>,
        message: String,
    }

    impl ContextError {
        /// Create a new context error from a message
        pub fn new<S: Into<String>>(message: S) -> Self {
            Self {
                source: None,
                message: message.into(),
            }
        }

        /// Create a new context error from an existing error with context
        pub fn with_context<E, S>(error: E, message: S) -> Self
        where
            E: StdError + Send + Sync + 'static,
            S: Into<String>,
        {
            Self {
                source: Some(Box::new(error)),
                message: message.into(),
            }
        }
    }

    impl fmt::Display for ContextError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.message)
        }
    }

    impl StdError for ContextError {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn StdError + 'static))
        }
    }

    /// Result type alias for context errors
    pub type Result<T> = std::result::Result<T, ContextError>;

    /// Create a context error from a message or format string
    #[macro_export]
    macro_rules! context_error {
        ($msg:literal) => {
            $crate::context_error::ContextError::new($msg)
        };
        ($fmt:expr, $($arg:tt)*) => {
            $crate::context_error::ContextError::new(format!($fmt, $($arg)*))
        };
    }

    /// Extension trait for adding context to results
    pub trait ResultExt<T> {
        /// Add context to an error
        fn with_context<F, S>(self, f: F) -> Result<T>
        where
            F: FnOnce() -> S,
            S: Into<String>;
    }

    impl<T, E> ResultExt<T> for std::result::Result<T, E>
    where
        E: StdError + Send + Sync + 'static,
    {
        fn with_context<F, S>(self, f: F) -> Result<T>
        where
            F: FnOnce() -> S,
            S: Into<String>,
        {
            self.map_err(|e| ContextError::with_context(e, f()))
        }
    }
}

pub use config::Config;
pub use error::{Error, Result};
pub use loader::{TicketCache, TicketTable, load_tickets};
pub use metrics::DashboardSummary;
pub use types::{CodeMap, PRIORITY_MAP, SOURCE_MAP, STATUS_MAP, Ticket};

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Errors
///
/// Returns an error if the level directive is invalid or a global subscriber
/// is already installed.
pub fn init_logging(logging: &config::LoggingConfig) -> context_error::Result<()> {
    use context_error::ResultExt;
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level)
            .with_context(|| format!("Invalid log level '{}'", logging.level))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match logging.format {
        config::LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        config::LogFormat::Text => registry.with(fmt::layer()).try_init(),
    };

    installed.with_context(|| "Failed to install tracing subscriber")
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
mod tests {
    use super::context_error::{ContextError, ResultExt};
    use std::error::Error as _;

    #[test]
    fn test_context_error_macro() {
        let err: ContextError = crate::context_error!("Failed to bind to {}: {}", "127.0.0.1:8501", "in use");

        assert_eq!(err.to_string(), "Failed to bind to 127.0.0.1:8501: in use");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_with_context_keeps_source() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::other("disk gone"));

        let err = result
            .with_context(|| "Failed to install tracing subscriber")
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to install tracing subscriber");
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("disk gone"));
    }
}
