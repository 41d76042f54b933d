//! pytest-dash -- a local browser dashboard for pytest.
//!
//! The crate wraps the `pytest` command-line tool: it discovers test files,
//! shells out to run them with the JSON-report plugin, parses the produced
//! report into flat [`models::TestResult`] records, and serves a small web
//! dashboard that renders them.

pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod runner;
pub mod server;
