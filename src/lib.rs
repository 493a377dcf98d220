//! Terminal client for a work todo list kept in a Baserow table.
//!
//! The remote table is the only store: every change is a REST call, and the
//! local list is just the last answer the service gave.

pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
pub mod stats;
pub mod tui;
