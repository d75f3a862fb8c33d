//! Dashboard page: metric cards, charts and the detail table

use crate::{charts::ChartSet, state::AppState};
use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use helpdesk_core::{
    DashboardSummary, Error,
    metrics::{SortColumn, SortOrder, TicketRow, sort_rows},
    utils::format_timestamp,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error};

/// Page heading and document title
pub const PAGE_TITLE: &str = "Freshdesk Tickets Dashboard";

/// Sorting of the detail table, from the query string
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TableQuery {
    /// Column to sort by; newest first when absent
    pub sort: Option<SortColumn>,
    /// Sort direction
    pub order: Option<SortOrder>,
}

impl TableQuery {
    fn column(self) -> SortColumn {
        self.sort.unwrap_or_default()
    }

    fn order(self) -> SortOrder {
        self.order.unwrap_or_default()
    }
}

/// One single-value metric card
#[derive(Debug, Clone)]
pub struct MetricCard {
    /// Card caption
    pub label: &'static str,
    /// Formatted value
    pub value: String,
}

/// Detail table header with its sort link
#[derive(Debug, Clone)]
pub struct ColumnHeader {
    /// Column name
    pub name: &'static str,
    /// Link that sorts by this column
    pub href: String,
    /// Arrow shown on the active column
    pub indicator: &'static str,
}

/// Detail table row, formatted for display
#[derive(Debug, Clone)]
pub struct RowView {
    /// Subject
    pub subject: String,
    /// Raw status code
    pub status: String,
    /// Raw priority code
    pub priority: String,
    /// Creation time
    pub created_at: String,
    /// Escalation flag
    pub is_escalated: String,
}

impl From<&TicketRow> for RowView {
    fn from(row: &TicketRow) -> Self {
        Self {
            subject: row.subject.clone(),
            status: row.status.to_string(),
            priority: row.priority.to_string(),
            created_at: format_timestamp(&row.created_at),
            is_escalated: row.is_escalated.to_string(),
        }
    }
}

/// The full dashboard
#[derive(Debug, Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    /// Page title
    pub title: &'static str,
    /// Metric cards in display order
    pub cards: Vec<MetricCard>,
    /// Rendered charts
    pub charts: ChartSet,
    /// Detail table headers
    pub columns: Vec<ColumnHeader>,
    /// Detail table rows
    pub rows: Vec<RowView>,
}

impl DashboardTemplate {
    /// Lay out a computed summary
    ///
    /// # Errors
    ///
    /// Returns an error if a chart cannot be drawn.
    pub fn new(summary: &DashboardSummary, query: TableQuery) -> helpdesk_core::Result<Self> {
        let cards = vec![
            MetricCard {
                label: "Total Tickets",
                value: summary.total_tickets.to_string(),
            },
            MetricCard {
                label: "Open Tickets",
                value: summary.open_tickets.to_string(),
            },
            MetricCard {
                label: "Escalated Tickets",
                value: summary.escalated_tickets.to_string(),
            },
            MetricCard {
                label: "Average Response Time (days)",
                value: format!("{:.2}", summary.avg_response_days),
            },
        ];

        let mut recent = summary.recent.clone();
        sort_rows(&mut recent, query.column(), query.order());

        Ok(Self {
            title: PAGE_TITLE,
            cards,
            charts: ChartSet::from_summary(summary)?,
            columns: column_headers(query),
            rows: recent.iter().map(RowView::from).collect(),
        })
    }
}

fn column_headers(query: TableQuery) -> Vec<ColumnHeader> {
    let active = query.column();
    let order = query.order();

    SortColumn::ALL
        .iter()
        .map(|&column| {
            let (next, indicator) = if column == active {
                let arrow = match order {
                    SortOrder::Asc => " ▲",
                    SortOrder::Desc => " ▼",
                };
                (order.reversed(), arrow)
            } else {
                (SortOrder::Asc, "")
            };
            ColumnHeader {
                name: column.as_str(),
                href: format!("?sort={}&order={}", column.as_str(), next.as_str()),
                indicator,
            }
        })
        .collect()
}

/// Error banner replacing the whole dashboard
#[derive(Debug, Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    /// Page title
    pub title: &'static str,
    /// Error description
    pub message: String,
    /// Remediation hint
    pub hint: String,
}

/// Dashboard page
///
/// Any load or aggregation error replaces the entire page with the error
/// banner; nothing is partially rendered.
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TableQuery>,
) -> Response {
    let hint = state.data_file_hint();

    let rendered = state.summary().await.and_then(|summary| {
        debug!(tickets = summary.total_tickets, "Rendering dashboard");
        DashboardTemplate::new(&summary, query)?
            .render()
            .map_err(|e| Error::Template(e.to_string()))
    });

    match rendered {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            error!(error = %err, "Dashboard failed to render");
            error_page(&err, hint)
        }
    }
}

fn error_page(err: &Error, hint: String) -> Response {
    let page = ErrorTemplate {
        title: PAGE_TITLE,
        message: err.to_string(),
        hint,
    };

    match page.render() {
        Ok(html) => (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response(),
        Err(render_err) => {
            error!(error = %render_err, "Error page failed to render");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("An error occurred while loading the dashboard: {err}"),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};
    use helpdesk_core::{Ticket, TicketTable};
    use pretty_assertions::assert_eq;

    fn summary() -> DashboardSummary {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let tickets = ["Login broken", "<b>VPN down", "Refund request"]
            .iter()
            .enumerate()
            .map(|(i, subject)| {
                let created = base + TimeDelta::hours(i64::try_from(i).unwrap() * 30);
                Ticket {
                    subject: (*subject).to_string(),
                    status: 2 + i64::try_from(i).unwrap(),
                    priority: 3 - i64::try_from(i).unwrap(),
                    source: 1,
                    is_escalated: i == 1,
                    created_at: created,
                    updated_at: created + TimeDelta::hours(6),
                    due_by: created + TimeDelta::days(2),
                }
            })
            .collect();
        DashboardSummary::compute(&TicketTable::new(tickets, "t.json"), 10).unwrap()
    }

    #[test]
    fn test_cards() {
        let page = DashboardTemplate::new(&summary(), TableQuery::default()).unwrap();

        let values: Vec<_> = page.cards.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["3", "1", "1", "0.25"]);
    }

    #[test]
    fn test_default_rows_newest_first() {
        let page = DashboardTemplate::new(&summary(), TableQuery::default()).unwrap();

        let subjects: Vec<_> = page.rows.iter().map(|r| r.subject.as_str()).collect();
        assert_eq!(subjects, vec!["Refund request", "<b>VPN down", "Login broken"]);
        assert_eq!(page.rows[0].created_at, "2024-06-03 20:00:00");
    }

    #[test]
    fn test_rows_sorted_by_query() {
        let query = TableQuery {
            sort: Some(SortColumn::Priority),
            order: Some(SortOrder::Asc),
        };
        let page = DashboardTemplate::new(&summary(), query).unwrap();

        let priorities: Vec<_> = page.rows.iter().map(|r| r.priority.as_str()).collect();
        assert_eq!(priorities, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_column_headers_toggle_active_column() {
        let headers = column_headers(TableQuery::default());

        let created = headers.iter().find(|h| h.name == "created_at").unwrap();
        assert_eq!(created.href, "?sort=created_at&order=asc");
        assert_eq!(created.indicator, " ▼");

        let subject = headers.iter().find(|h| h.name == "subject").unwrap();
        assert_eq!(subject.href, "?sort=subject&order=asc");
        assert_eq!(subject.indicator, "");
    }

    #[test]
    fn test_render_escapes_subjects() {
        let html = DashboardTemplate::new(&summary(), TableQuery::default())
            .unwrap()
            .render()
            .unwrap();

        assert!(html.contains("&lt;b&gt;VPN down"));
        assert!(!html.contains("<b>VPN"));
        assert_eq!(html.matches("<svg").count(), 4);
    }

    #[test]
    fn test_error_template() {
        let html = ErrorTemplate {
            title: PAGE_TITLE,
            message: "Resource missing".to_string(),
            hint: "Please check the file.".to_string(),
        }
        .render()
        .unwrap();

        assert!(html.contains("An error occurred while loading the dashboard: Resource missing"));
        assert!(html.contains("Please check the file."));
        assert!(!html.contains("<svg"));
    }
}
