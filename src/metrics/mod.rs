//! Snapshot metrics from the backend
//!
//! Summary statistics and model health are fetched once per load and never
//! mutated locally.

use serde::{Deserialize, Serialize};

pub mod display;

/// Summary statistics (`GET /api/stats`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Counts arrive as JSON numbers and may be fractional or negative
    pub messages_analyzed: f64,
    pub sellers_detected: f64,
    pub accounts_blocked: f64,
    /// Percentage, e.g. 97.5
    pub real_time_accuracy: f64,
}

/// Detection model health (`GET /api/model_health`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelHealth {
    /// Fraction in [0, 1]
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub last_retrain: String,
    pub version: String,
    pub status: String,
}
