//! Aggregations over the loaded ticket table
//!
//! Everything here is a pure function of the ticket slice. The dashboard
//! recomputes all of it on each page render; only loading is cached.

use crate::{
    Result,
    loader::TicketTable,
    types::{Code, CodeMap, PRIORITY_MAP, SOURCE_MAP, STATUS_MAP, Ticket},
    utils::{delta_to_days, round_to},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Rows in the detail table when nothing else is configured
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Number of tickets carrying one code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// Raw code
    pub code: Code,
    /// Label from the code map
    pub label: String,
    /// Number of tickets
    pub count: usize,
}

/// Number of tickets created on one calendar day (UTC)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    /// Calendar day
    pub day: NaiveDate,
    /// Tickets created that day
    pub count: usize,
}

/// Projection of a ticket for the detail table; codes are not labelled
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketRow {
    /// Ticket subject
    pub subject: String,
    /// Raw status code
    pub status: Code,
    /// Raw priority code
    pub priority: Code,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Escalation flag
    pub is_escalated: bool,
}

impl From<&Ticket> for TicketRow {
    fn from(ticket: &Ticket) -> Self {
        Self {
            subject: ticket.subject.clone(),
            status: ticket.status,
            priority: ticket.priority,
            created_at: ticket.created_at,
            is_escalated: ticket.is_escalated,
        }
    }
}

/// Column of the detail table to sort by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    /// Subject, lexicographic
    Subject,
    /// Raw status code
    Status,
    /// Raw priority code
    Priority,
    /// Creation time
    #[default]
    CreatedAt,
    /// Escalation flag
    IsEscalated,
}

impl SortColumn {
    /// All columns in table order
    pub const ALL: [Self; 5] = [
        Self::Subject,
        Self::Status,
        Self::Priority,
        Self::CreatedAt,
        Self::IsEscalated,
    ];

    /// Query string value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Status => "status",
            Self::Priority => "priority",
            Self::CreatedAt => "created_at",
            Self::IsEscalated => "is_escalated",
        }
    }

    fn compare(self, a: &TicketRow, b: &TicketRow) -> Ordering {
        match self {
            Self::Subject => a.subject.cmp(&b.subject),
            Self::Status => a.status.cmp(&b.status),
            Self::Priority => a.priority.cmp(&b.priority),
            Self::CreatedAt => a.created_at.cmp(&b.created_at),
            Self::IsEscalated => a.is_escalated.cmp(&b.is_escalated),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first
    Asc,
    /// Largest first
    #[default]
    Desc,
}

impl SortOrder {
    /// Query string value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// The other direction
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Row count
#[must_use]
pub const fn total_count(tickets: &[Ticket]) -> usize {
    tickets.len()
}

/// Tickets with status code 2
#[must_use]
pub fn open_count(tickets: &[Ticket]) -> usize {
    tickets.iter().filter(|t| t.is_open()).count()
}

/// Escalated tickets
#[must_use]
pub fn escalated_count(tickets: &[Ticket]) -> usize {
    tickets.iter().filter(|t| t.is_escalated).count()
}

/// Mean of `updated_at - created_at` in days, rounded to 2 decimals
///
/// # Errors
///
/// Returns [`crate::Error::EmptyDataset`] for an empty slice; the mean is
/// undefined there and is never reported as zero.
#[allow(clippy::cast_precision_loss)]
pub fn mean_response_days(tickets: &[Ticket]) -> Result<f64> {
    if tickets.is_empty() {
        return Err(crate::Error::EmptyDataset {
            metric: "average response time",
        });
    }

    let total: f64 = tickets.iter().map(|t| delta_to_days(t.response_time())).sum();
    Ok(round_to(total / tickets.len() as f64, 2))
}

/// Count tickets per code of one field and label them
///
/// Ordered by count descending, ties by code ascending.
#[must_use]
pub fn distribution(
    tickets: &[Ticket],
    map: CodeMap,
    field: impl Fn(&Ticket) -> Code,
) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<Code, usize> = BTreeMap::new();
    for ticket in tickets {
        *counts.entry(field(ticket)).or_default() += 1;
    }

    let mut categories: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(code, count)| CategoryCount {
            code,
            label: map.label(code),
            count,
        })
        .collect();
    // Stable sort keeps ascending code order among equal counts
    categories.sort_by(|a, b| b.count.cmp(&a.count));
    categories
}

/// Tickets per status
#[must_use]
pub fn status_distribution(tickets: &[Ticket]) -> Vec<CategoryCount> {
    distribution(tickets, STATUS_MAP, |t| t.status)
}

/// Tickets per priority
#[must_use]
pub fn priority_distribution(tickets: &[Ticket]) -> Vec<CategoryCount> {
    distribution(tickets, PRIORITY_MAP, |t| t.priority)
}

/// Tickets per source
#[must_use]
pub fn source_distribution(tickets: &[Ticket]) -> Vec<CategoryCount> {
    distribution(tickets, SOURCE_MAP, |t| t.source)
}

/// Tickets created per UTC calendar day, ascending
///
/// Days without tickets are absent, not zero. Timestamps are bucketed after
/// conversion to UTC, not by the offset they were written with:
/// `2024-01-15T23:30:00-05:00` counts on January 16.
#[must_use]
pub fn daily_timeline(tickets: &[Ticket]) -> Vec<DailyCount> {
    let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for ticket in tickets {
        *days.entry(ticket.created_at.date_naive()).or_default() += 1;
    }

    days.into_iter()
        .map(|(day, count)| DailyCount { day, count })
        .collect()
}

/// The `limit` most recently created tickets, newest first
#[must_use]
pub fn recent_tickets(tickets: &[Ticket], limit: usize) -> Vec<TicketRow> {
    let mut rows: Vec<TicketRow> = tickets.iter().map(TicketRow::from).collect();
    sort_rows(&mut rows, SortColumn::CreatedAt, SortOrder::Desc);
    rows.truncate(limit);
    rows
}

/// Stable sort of detail rows
pub fn sort_rows(rows: &mut [TicketRow], column: SortColumn, order: SortOrder) {
    rows.sort_by(|a, b| {
        let ordering = column.compare(a, b);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

/// Every number and view the dashboard shows
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    /// Total tickets
    pub total_tickets: usize,
    /// Tickets with status Open
    pub open_tickets: usize,
    /// Escalated tickets
    pub escalated_tickets: usize,
    /// Average response time in days
    pub avg_response_days: f64,
    /// Tickets per status
    pub status: Vec<CategoryCount>,
    /// Tickets per priority
    pub priority: Vec<CategoryCount>,
    /// Tickets per source
    pub source: Vec<CategoryCount>,
    /// Tickets created per day
    pub timeline: Vec<DailyCount>,
    /// Most recent tickets, newest first
    pub recent: Vec<TicketRow>,
    /// File the export was read from
    pub export: PathBuf,
    /// When the export was read
    pub loaded_at: DateTime<Utc>,
}

impl DashboardSummary {
    /// Run every aggregation over the table
    ///
    /// # Errors
    ///
    /// Fails if any aggregation fails; with the current set that is only the
    /// average response time over an empty table.
    pub fn compute(table: &TicketTable, recent_limit: usize) -> Result<Self> {
        let tickets = table.tickets();

        Ok(Self {
            total_tickets: total_count(tickets),
            open_tickets: open_count(tickets),
            escalated_tickets: escalated_count(tickets),
            avg_response_days: mean_response_days(tickets)?,
            status: status_distribution(tickets),
            priority: priority_distribution(tickets),
            source: source_distribution(tickets),
            timeline: daily_timeline(tickets),
            recent: recent_tickets(tickets, recent_limit),
            export: table.source().to_path_buf(),
            loaded_at: table.loaded_at(),
        })
    }
}

#[cfg(test)]
#[allow(
    clippy::missing_panics_doc,
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    fn ticket(subject: &str, status: Code, escalated: bool, created: DateTime<Utc>) -> Ticket {
        Ticket {
            subject: subject.to_string(),
            status,
            priority: 1,
            source: 1,
            is_escalated: escalated,
            created_at: created,
            updated_at: created + TimeDelta::days(1),
            due_by: created + TimeDelta::days(3),
        }
    }

    fn scenario() -> Vec<Ticket> {
        vec![
            ticket("first", 2, true, at(1, 9)),
            ticket("second", 2, false, at(1, 15)),
            ticket("third", 4, false, at(3, 9)),
        ]
    }

    #[test]
    fn test_scalar_metrics_scenario() {
        let tickets = scenario();

        assert_eq!(total_count(&tickets), 3);
        assert_eq!(open_count(&tickets), 2);
        assert_eq!(escalated_count(&tickets), 1);
        assert_eq!(mean_response_days(&tickets).unwrap(), 1.0);
    }

    #[test]
    fn test_mean_response_days_rounds_to_two_decimals() {
        let mut tickets = scenario();
        tickets[0].updated_at = tickets[0].created_at + TimeDelta::hours(1);
        tickets[1].updated_at = tickets[1].created_at + TimeDelta::hours(2);
        tickets[2].updated_at = tickets[2].created_at + TimeDelta::hours(4);

        // 7 hours / 3 tickets = 0.0972.. days
        assert_eq!(mean_response_days(&tickets).unwrap(), 0.1);
    }

    #[test]
    fn test_mean_response_days_empty_is_error() {
        let error = mean_response_days(&[]).unwrap_err();
        assert!(matches!(error, crate::Error::EmptyDataset { .. }));
    }

    #[test]
    fn test_status_distribution_orders_by_count() {
        let tickets = scenario();

        let status = status_distribution(&tickets);

        assert_eq!(
            status,
            vec![
                CategoryCount {
                    code: 2,
                    label: "Open".to_string(),
                    count: 2
                },
                CategoryCount {
                    code: 4,
                    label: "Resolved".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_unknown_status_gets_own_slice() {
        let mut tickets = scenario();
        tickets.push(ticket("odd", 99, false, at(4, 9)));

        let status = status_distribution(&tickets);

        let unknown = status.iter().find(|c| c.code == 99).unwrap();
        assert_eq!(unknown.label, "Status 99");
        assert_eq!(unknown.count, 1);
    }

    #[test]
    fn test_distribution_ties_ordered_by_code() {
        let mut tickets = scenario();
        tickets[0].source = 9;
        tickets[1].source = 3;
        tickets[2].source = 7;

        let labels: Vec<_> = source_distribution(&tickets)
            .into_iter()
            .map(|c| c.label)
            .collect();

        assert_eq!(labels, vec!["Phone", "Chat", "Feedback Widget"]);
    }

    #[test]
    fn test_priority_distribution_labels() {
        let mut tickets = scenario();
        tickets[2].priority = 4;

        let priority = priority_distribution(&tickets);

        assert_eq!(priority[0].label, "Low");
        assert_eq!(priority[0].count, 2);
        assert_eq!(priority[1].label, "Urgent");
    }

    #[test]
    fn test_daily_timeline_skips_empty_days() {
        let timeline = daily_timeline(&scenario());

        assert_eq!(
            timeline,
            vec![
                DailyCount {
                    day: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    count: 2
                },
                DailyCount {
                    day: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_daily_timeline_sorted_regardless_of_input_order() {
        let mut tickets = scenario();
        tickets.reverse();

        let days: Vec<_> = daily_timeline(&tickets).into_iter().map(|d| d.day).collect();
        let mut sorted = days.clone();
        sorted.sort();

        assert_eq!(days, sorted);
    }

    #[test]
    fn test_daily_timeline_buckets_offsets_by_utc_day() {
        let late_evening = crate::utils::parse_timestamp("2024-01-15T23:30:00-05:00").unwrap();
        let tickets = vec![ticket("Late", 2, false, late_evening)];

        let days: Vec<_> = daily_timeline(&tickets).into_iter().map(|d| d.day).collect();

        assert_eq!(days, vec![NaiveDate::from_ymd_opt(2024, 1, 16).unwrap()]);
    }

    #[test]
    fn test_recent_tickets_newest_first_and_truncated() {
        let tickets: Vec<Ticket> = (1..=15)
            .map(|day| ticket(&format!("t{day}"), 2, false, at(day, 12)))
            .collect();

        let recent = recent_tickets(&tickets, DEFAULT_RECENT_LIMIT);

        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].subject, "t15");
        assert_eq!(recent[9].subject, "t6");
        assert!(recent.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn test_recent_tickets_keeps_raw_codes() {
        let mut tickets = scenario();
        tickets[2].status = 99;

        let recent = recent_tickets(&tickets, 10);

        assert_eq!(recent[0].subject, "third");
        assert_eq!(recent[0].status, 99);
        assert_eq!(recent[0].priority, 1);
    }

    #[test]
    fn test_sort_rows_by_subject_ascending() {
        let mut rows = recent_tickets(&scenario(), 10);

        sort_rows(&mut rows, SortColumn::Subject, SortOrder::Asc);

        let subjects: Vec<_> = rows.iter().map(|r| r.subject.as_str()).collect();
        assert_eq!(subjects, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_sort_rows_by_escalation_descending() {
        let mut rows = recent_tickets(&scenario(), 10);

        sort_rows(&mut rows, SortColumn::IsEscalated, SortOrder::Desc);

        assert!(rows[0].is_escalated);
        assert_eq!(rows[0].subject, "first");
    }

    #[test]
    fn test_sort_enums_round_trip_query_values() {
        for column in SortColumn::ALL {
            let parsed: SortColumn =
                serde_json::from_value(serde_json::json!(column.as_str())).unwrap();
            assert_eq!(parsed, column);
        }
        assert_eq!(SortOrder::Asc.reversed(), SortOrder::Desc);
        assert_eq!(SortOrder::default().as_str(), "desc");
    }

    #[test]
    fn test_summary_compute() {
        let table = TicketTable::new(scenario(), "tickets.json");

        let summary = DashboardSummary::compute(&table, 10).unwrap();

        assert_eq!(summary.total_tickets, 3);
        assert_eq!(summary.open_tickets, 2);
        assert_eq!(summary.escalated_tickets, 1);
        assert_eq!(summary.avg_response_days, 1.0);
        assert_eq!(summary.status.len(), 2);
        assert_eq!(summary.timeline.len(), 2);
        assert_eq!(summary.recent.len(), 3);
        assert_eq!(summary.export, PathBuf::from("tickets.json"));
    }

    #[test]
    fn test_summary_compute_empty_table_fails() {
        let table = TicketTable::new(Vec::new(), "tickets.json");
        assert!(DashboardSummary::compute(&table, 10).is_err());
    }

    fn arbitrary_ticket() -> impl Strategy<Value = Ticket> {
        (
            0_i64..8,
            0_i64..6,
            0_i64..10,
            any::<bool>(),
            0_i64..(60 * 86_400),
            0_i64..(10 * 86_400),
        )
            .prop_map(|(status, priority, source, escalated, offset, response)| {
                let created = at(1, 0) + TimeDelta::seconds(offset);
                Ticket {
                    subject: format!("ticket {offset}"),
                    status,
                    priority,
                    source,
                    is_escalated: escalated,
                    created_at: created,
                    updated_at: created + TimeDelta::seconds(response),
                    due_by: created + TimeDelta::days(2),
                }
            })
    }

    proptest! {
        #[test]
        fn prop_distributions_partition_table(tickets in prop::collection::vec(arbitrary_ticket(), 0..80)) {
            let total = total_count(&tickets);

            for counts in [
                status_distribution(&tickets),
                priority_distribution(&tickets),
                source_distribution(&tickets),
            ] {
                prop_assert_eq!(counts.iter().map(|c| c.count).sum::<usize>(), total);
                let codes: HashSet<_> = counts.iter().map(|c| c.code).collect();
                prop_assert_eq!(codes.len(), counts.len());
            }

            prop_assert!(open_count(&tickets) <= total);
            prop_assert!(escalated_count(&tickets) <= total);
        }

        #[test]
        fn prop_timeline_sums_to_total(tickets in prop::collection::vec(arbitrary_ticket(), 0..80)) {
            let timeline = daily_timeline(&tickets);

            prop_assert_eq!(timeline.iter().map(|d| d.count).sum::<usize>(), tickets.len());
            prop_assert!(timeline.windows(2).all(|w| w[0].day < w[1].day));
            prop_assert!(timeline.iter().all(|d| d.count > 0));
        }

        #[test]
        fn prop_recent_is_bounded_and_ordered(tickets in prop::collection::vec(arbitrary_ticket(), 0..80)) {
            let recent = recent_tickets(&tickets, DEFAULT_RECENT_LIMIT);

            prop_assert_eq!(recent.len(), tickets.len().min(DEFAULT_RECENT_LIMIT));
            prop_assert!(recent.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        }
    }
}
