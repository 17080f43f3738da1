//! alert-dashboard Library
//!
//! Live security-alert dashboard client for the detection backend.
//!
//! ## Architecture
//!
//! The codebase is organized into modules:
//! - `alerts`: Alert model, risk filter and alert-card rendering
//! - `metrics`: Stats and model-health snapshots and their display panels
//! - `ui`: Widget model, toasts, unread badge and the terminal presenter
//! - `gateway`: HTTP snapshot fetches and the Socket.IO push channel
//! - `dashboard`: Controller owning the alert list and the event loop
//! - `config`: Backend URL, toast timings and file paths
//! - `logging`: Structured logging with tracing
//!
//! ## Main Entry Point
//!
//! `DashboardController::start()` followed by `DashboardController::run()`.

pub mod alerts;
pub mod config;
pub mod dashboard;
pub mod gateway;
pub mod logging;
pub mod metrics;
pub mod ui;

pub use dashboard::{DashboardController, UserAction};
pub use gateway::{BackendGateway, GatewayError, HttpGateway};
pub use logging::init_tracing;
