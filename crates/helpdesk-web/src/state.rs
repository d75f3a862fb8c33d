//! Application state management

use helpdesk_core::{Config, DashboardSummary, Error, Result, TicketCache};
use std::sync::Arc;
use tracing::error;

/// Application state shared by every handler
#[derive(Debug)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Process-wide cache of the ticket export
    pub cache: TicketCache,
}

impl AppState {
    /// Create new application state with an empty cache
    #[must_use]
    pub fn new(config: Config) -> Self {
        let cache = TicketCache::new(config.data.path.clone());
        Self { config, cache }
    }

    /// Load (or reuse) the export and run every aggregation
    ///
    /// The file read happens on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns any load or aggregation error.
    pub async fn summary(self: Arc<Self>) -> Result<DashboardSummary> {
        let limit = self.config.data.recent_limit;

        let table = tokio::task::spawn_blocking(move || self.cache.get_or_load())
            .await
            .map_err(|e| {
                error!("Ticket loader task failed: {}", e);
                Error::Other(format!("Ticket loader task failed: {e}"))
            })??;

        DashboardSummary::compute(&table, limit)
    }

    /// Drop the cached export; returns whether one was cached
    ///
    /// The cache lock is held for the length of any in-flight load, so this
    /// also runs on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Other`] if the blocking task fails.
    pub async fn clear_cache(self: Arc<Self>) -> Result<bool> {
        tokio::task::spawn_blocking(move || self.cache.invalidate())
            .await
            .map_err(|e| {
                error!("Cache clear task failed: {}", e);
                Error::Other(format!("Cache clear task failed: {e}"))
            })
    }

    /// Remediation hint shown under the error banner
    #[must_use]
    pub fn data_file_hint(&self) -> String {
        format!(
            "Please make sure the '{}' file is in the same directory as this script.",
            self.config.data_file_name()
        )
    }
}
