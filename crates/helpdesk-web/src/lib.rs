//! Helpdesk ticket dashboard
//!
//! Serves a single read-only page summarizing a Freshdesk ticket export:
//! metric cards, status/priority/source charts, a daily creation timeline
//! and the most recent tickets.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod charts;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{build_app, build_app_with_state};
pub use state::AppState;
