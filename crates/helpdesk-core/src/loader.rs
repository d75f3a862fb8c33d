//! Loading the ticket export and caching it for the process lifetime

use crate::{Result, types::Ticket};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// The loaded ticket export
///
/// Immutable once built; shared between requests behind an `Arc`.
#[derive(Debug, Clone)]
pub struct TicketTable {
    tickets: Vec<Ticket>,
    source: PathBuf,
    loaded_at: DateTime<Utc>,
}

impl TicketTable {
    /// Wrap already parsed tickets
    #[must_use]
    pub fn new(tickets: Vec<Ticket>, source: impl Into<PathBuf>) -> Self {
        Self {
            tickets,
            source: source.into(),
            loaded_at: Utc::now(),
        }
    }

    /// All tickets in export order
    #[must_use]
    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    /// Number of tickets
    #[must_use]
    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    /// Whether the export held no tickets
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    /// File the tickets were read from
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// When the file was read
    #[must_use]
    pub const fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

/// Read and parse a JSON array of tickets
///
/// # Errors
///
/// Returns [`crate::Error::Io`] if the file cannot be read and
/// [`crate::Error::Serialization`] if it is not a JSON array of complete
/// ticket records. One bad record fails the whole load.
pub fn load_tickets(path: impl AsRef<Path>) -> Result<TicketTable> {
    let path = path.as_ref();
    let started = Instant::now();

    let raw = std::fs::read_to_string(path).map_err(|err| {
        std::io::Error::new(err.kind(), format!("{}: {err}", path.display()))
    })?;
    let tickets: Vec<Ticket> = serde_json::from_str(&raw)?;

    info!(
        path = %path.display(),
        tickets = tickets.len(),
        elapsed_ms = started.elapsed().as_millis(),
        "Loaded ticket export"
    );

    Ok(TicketTable::new(tickets, path))
}

/// Process-wide memo of the loaded export
///
/// The first successful [`TicketCache::get_or_load`] reads the file; later
/// calls return the same table until [`TicketCache::invalidate`]. Failed
/// loads are not cached, so a fixed file is picked up on the next request.
#[derive(Debug)]
pub struct TicketCache {
    path: PathBuf,
    table: Mutex<Option<Arc<TicketTable>>>,
}

impl TicketCache {
    /// Create an empty cache for the export at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: Mutex::new(None),
        }
    }

    /// Path of the export this cache reads
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the cached table, loading it first if needed
    ///
    /// The file is read while holding the lock, so concurrent first callers
    /// trigger a single read. This blocks; call it off the async executor.
    ///
    /// # Errors
    ///
    /// Propagates any [`load_tickets`] error.
    pub fn get_or_load(&self) -> Result<Arc<TicketTable>> {
        let mut slot = self.table.lock();

        if let Some(table) = slot.as_ref() {
            debug!(path = %self.path.display(), "Serving ticket export from cache");
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(load_tickets(&self.path).inspect_err(|err| {
            warn!(path = %self.path.display(), error = %err, "Failed to load ticket export");
        })?);
        *slot = Some(Arc::clone(&table));

        Ok(table)
    }

    /// Drop the cached table; returns whether one was cached
    pub fn invalidate(&self) -> bool {
        let cleared = self.table.lock().take().is_some();
        if cleared {
            info!(path = %self.path.display(), "Ticket cache cleared");
        }
        cleared
    }

    /// Whether a table is currently cached
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.table.lock().is_some()
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Error;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use std::sync::Barrier;
    use tempfile::{NamedTempFile, TempDir};

    const THREE_TICKETS: &str = r#"[
        {"subject": "A", "status": 2, "priority": 1, "source": 1, "is_escalated": true,
         "created_at": "2024-01-01T09:00:00Z", "updated_at": "2024-01-02T09:00:00Z", "due_by": "2024-01-03T09:00:00Z"},
        {"subject": "B", "status": 2, "priority": 2, "source": 2, "is_escalated": false,
         "created_at": "2024-01-01T15:00:00Z", "updated_at": "2024-01-01T21:00:00Z", "due_by": "2024-01-03T09:00:00Z"},
        {"subject": "C", "status": 4, "priority": 3, "source": 3, "is_escalated": false,
         "created_at": "2024-01-03T09:00:00Z", "updated_at": "2024-01-05T09:00:00Z", "due_by": "2024-01-06T09:00:00Z"}
    ]"#;

    fn write_export(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_tickets() {
        let file = write_export(THREE_TICKETS);

        let table = load_tickets(file.path()).unwrap();

        assert_eq!(table.len(), 3);
        assert!(!table.is_empty());
        assert_eq!(table.source(), file.path());
        let subjects: Vec<_> = table.tickets().iter().map(|t| t.subject.as_str()).collect();
        assert_eq!(subjects, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_load_empty_array() {
        let file = write_export("[]");

        let table = load_tickets(file.path()).unwrap();

        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("freshdesk_tickets6.json");

        let error = load_tickets(&path).unwrap_err();

        assert!(matches!(error, Error::Io(_)));
        assert!(error.to_string().contains("freshdesk_tickets6.json"));
    }

    #[test]
    fn test_load_malformed_json() {
        let file = write_export("[{\"subject\": ");

        let error = load_tickets(file.path()).unwrap_err();
        assert!(matches!(error, Error::Serialization(_)));
    }

    #[test]
    fn test_load_not_an_array() {
        let file = write_export(r#"{"tickets": []}"#);

        assert!(matches!(
            load_tickets(file.path()).unwrap_err(),
            Error::Serialization(_)
        ));
    }

    #[test]
    fn test_one_incomplete_record_fails_whole_load() {
        let file = write_export(
            r#"[
            {"subject": "ok", "status": 2, "priority": 1, "source": 1, "is_escalated": false,
             "created_at": "2024-01-01T09:00:00Z", "updated_at": "2024-01-01T10:00:00Z", "due_by": "2024-01-02T09:00:00Z"},
            {"subject": "no dates", "status": 2, "priority": 1, "source": 1, "is_escalated": false}
        ]"#,
        );

        assert!(load_tickets(file.path()).is_err());
    }

    #[test]
    fn test_cache_reuses_loaded_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tickets.json");
        std::fs::write(&path, THREE_TICKETS).unwrap();

        let cache = TicketCache::new(&path);
        assert!(!cache.is_loaded());

        let first = cache.get_or_load().unwrap();
        assert!(cache.is_loaded());

        // The cached table survives the file disappearing
        std::fs::remove_file(&path).unwrap();
        let second = cache.get_or_load().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 3);
    }

    #[test]
    fn test_cache_invalidate_forces_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tickets.json");
        std::fs::write(&path, THREE_TICKETS).unwrap();

        let cache = TicketCache::new(&path);
        assert_eq!(cache.get_or_load().unwrap().len(), 3);

        std::fs::write(&path, "[]").unwrap();
        assert_eq!(cache.get_or_load().unwrap().len(), 3);

        assert!(cache.invalidate());
        assert!(!cache.invalidate());
        assert!(cache.get_or_load().unwrap().is_empty());
    }

    #[test]
    fn test_cache_does_not_keep_failures() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tickets.json");

        let cache = TicketCache::new(&path);
        assert!(cache.get_or_load().is_err());
        assert!(!cache.is_loaded());

        std::fs::write(&path, THREE_TICKETS).unwrap();
        assert_eq!(cache.get_or_load().unwrap().len(), 3);
    }

    #[test]
    fn test_concurrent_first_loads_share_one_table() {
        let file = write_export(THREE_TICKETS);
        let cache = TicketCache::new(file.path());
        let start = Barrier::new(8);

        let tables: Vec<Arc<TicketTable>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        start.wait();
                        cache.get_or_load().unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let first = tables.first().unwrap();
        assert_eq!(tables.len(), 8);
        assert!(tables.iter().all(|table| Arc::ptr_eq(table, first)));
    }

    #[test]
    fn test_cache_path() {
        let cache = TicketCache::new("freshdesk_tickets6.json");
        assert_eq!(cache.path(), Path::new("freshdesk_tickets6.json"));
    }
}
