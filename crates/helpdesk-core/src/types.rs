//! Core data types for the helpdesk dashboard

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Integer code used by the export for status, priority and source
pub type Code = i64;

/// Status code of an open ticket
pub const OPEN_STATUS: Code = 2;

/// Fixed lookup from an integer code to a human readable label
///
/// Codes missing from the table are labelled `"{fallback} {code}"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeMap {
    fallback: &'static str,
    entries: &'static [(Code, &'static str)],
}

impl CodeMap {
    /// Create a code map with a fallback prefix for unknown codes
    #[must_use]
    pub const fn new(fallback: &'static str, entries: &'static [(Code, &'static str)]) -> Self {
        Self { fallback, entries }
    }

    /// Label for a known code
    #[must_use]
    pub fn get(&self, code: Code) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(known, _)| *known == code)
            .map(|(_, label)| *label)
    }

    /// Label for any code, falling back to `"{fallback} {code}"`
    #[must_use]
    pub fn label(&self, code: Code) -> String {
        self.get(code)
            .map_or_else(|| format!("{} {code}", self.fallback), str::to_string)
    }
}

/// Ticket status labels
pub const STATUS_MAP: CodeMap = CodeMap::new(
    "Status",
    &[(2, "Open"), (3, "Pending"), (4, "Resolved"), (5, "Closed")],
);

/// Ticket priority labels
pub const PRIORITY_MAP: CodeMap = CodeMap::new(
    "Priority",
    &[(1, "Low"), (2, "Medium"), (3, "High"), (4, "Urgent")],
);

/// Ticket source (channel) labels
pub const SOURCE_MAP: CodeMap = CodeMap::new(
    "Source",
    &[
        (1, "Email"),
        (2, "Portal"),
        (3, "Phone"),
        (7, "Chat"),
        (9, "Feedback Widget"),
    ],
);

/// One helpdesk ticket from the export
///
/// Only the fields the dashboard reads are modelled; any other key in the
/// record is ignored. All of them are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket subject line
    pub subject: String,

    /// Status code, see [`STATUS_MAP`]
    pub status: Code,

    /// Priority code, see [`PRIORITY_MAP`]
    pub priority: Code,

    /// Source code, see [`SOURCE_MAP`]
    pub source: Code,

    /// Whether the ticket was escalated
    pub is_escalated: bool,

    /// Creation time
    #[serde(deserialize_with = "crate::utils::deserialize_timestamp")]
    pub created_at: DateTime<Utc>,

    /// Last update time
    #[serde(deserialize_with = "crate::utils::deserialize_timestamp")]
    pub updated_at: DateTime<Utc>,

    /// Due date
    #[serde(deserialize_with = "crate::utils::deserialize_timestamp")]
    pub due_by: DateTime<Utc>,
}

impl Ticket {
    /// Whether the ticket is in the open state
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.status == OPEN_STATUS
    }

    /// Time between creation and last update
    #[must_use]
    pub fn response_time(&self) -> chrono::TimeDelta {
        self.updated_at - self.created_at
    }

    /// Human readable status
    #[must_use]
    pub fn status_label(&self) -> String {
        STATUS_MAP.label(self.status)
    }

    /// Human readable priority
    #[must_use]
    pub fn priority_label(&self) -> String {
        PRIORITY_MAP.label(self.priority)
    }

    /// Human readable source
    #[must_use]
    pub fn source_label(&self) -> String {
        SOURCE_MAP.label(self.source)
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(2, "Open")]
    #[case(3, "Pending")]
    #[case(4, "Resolved")]
    #[case(5, "Closed")]
    #[case(99, "Status 99")]
    #[case(0, "Status 0")]
    fn test_status_labels(#[case] code: Code, #[case] expected: &str) {
        assert_eq!(STATUS_MAP.label(code), expected);
    }

    #[rstest]
    #[case(1, "Low")]
    #[case(2, "Medium")]
    #[case(3, "High")]
    #[case(4, "Urgent")]
    #[case(5, "Priority 5")]
    fn test_priority_labels(#[case] code: Code, #[case] expected: &str) {
        assert_eq!(PRIORITY_MAP.label(code), expected);
    }

    #[rstest]
    #[case(1, "Email")]
    #[case(2, "Portal")]
    #[case(3, "Phone")]
    #[case(7, "Chat")]
    #[case(9, "Feedback Widget")]
    #[case(4, "Source 4")]
    #[case(-1, "Source -1")]
    fn test_source_labels(#[case] code: Code, #[case] expected: &str) {
        assert_eq!(SOURCE_MAP.label(code), expected);
    }

    #[test]
    fn test_code_map_get() {
        assert_eq!(STATUS_MAP.get(2), Some("Open"));
        assert_eq!(STATUS_MAP.get(1), None);
    }

    #[test]
    fn test_ticket_deserialization_ignores_extra_fields() {
        let json = r#"{
            "id": 17,
            "subject": "Printer on fire",
            "status": 2,
            "priority": 4,
            "source": 3,
            "is_escalated": true,
            "requester_id": 1001,
            "created_at": "2024-03-01T08:00:00Z",
            "updated_at": "2024-03-02T20:00:00Z",
            "due_by": "2024-03-04T08:00:00Z",
            "tags": ["hardware"]
        }"#;

        let ticket: Ticket = serde_json::from_str(json).unwrap();

        assert_eq!(ticket.subject, "Printer on fire");
        assert!(ticket.is_open());
        assert!(ticket.is_escalated);
        assert_eq!(ticket.status_label(), "Open");
        assert_eq!(ticket.priority_label(), "Urgent");
        assert_eq!(ticket.source_label(), "Phone");
        assert_eq!(
            ticket.created_at,
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
        );
        assert_eq!(ticket.response_time(), chrono::TimeDelta::hours(36));
    }

    #[test]
    fn test_ticket_missing_field_rejected() {
        let json = r#"{
            "subject": "No escalation flag",
            "status": 2,
            "priority": 1,
            "source": 1,
            "created_at": "2024-03-01T08:00:00Z",
            "updated_at": "2024-03-01T09:00:00Z",
            "due_by": "2024-03-02T08:00:00Z"
        }"#;

        let error = serde_json::from_str::<Ticket>(json).unwrap_err();
        assert!(error.to_string().contains("is_escalated"));
    }

    #[test]
    fn test_ticket_mistyped_field_rejected() {
        let json = r#"{
            "subject": "Status as text",
            "status": "open",
            "priority": 1,
            "source": 1,
            "is_escalated": false,
            "created_at": "2024-03-01T08:00:00Z",
            "updated_at": "2024-03-01T09:00:00Z",
            "due_by": "2024-03-02T08:00:00Z"
        }"#;

        assert!(serde_json::from_str::<Ticket>(json).is_err());
    }

    #[test]
    fn test_ticket_bad_timestamp_rejected() {
        let json = r#"{
            "subject": "Bad date",
            "status": 2,
            "priority": 1,
            "source": 1,
            "is_escalated": false,
            "created_at": "last tuesday",
            "updated_at": "2024-03-01T09:00:00Z",
            "due_by": "2024-03-02T08:00:00Z"
        }"#;

        let error = serde_json::from_str::<Ticket>(json).unwrap_err();
        assert!(error.to_string().contains("last tuesday"));
    }
}
