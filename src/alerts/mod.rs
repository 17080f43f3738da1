//! Alert model
//!
//! Alerts are received verbatim from the backend (snapshot or push) and are
//! never reformatted. Every field defaults when absent so a partial record
//! still renders instead of failing the whole snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod render;

/// One flagged messaging event from a monitored platform
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Alert {
    pub id: String,
    pub platform: String,
    pub username: String,
    /// Pre-formatted display time, never parsed
    pub timestamp: String,
    pub risk: String,
    pub details: Vec<String>,
}

impl Alert {
    /// Lower-cased risk, used both for styling and filter matching
    pub fn risk_key(&self) -> String {
        self.risk.to_lowercase()
    }
}

/// Risk filter selected in the filter control
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RiskFilter {
    #[default]
    All,
    /// Lower-cased risk keyword
    Level(String),
}

impl RiskFilter {
    /// Parse a filter control value. `all` (any case) or an empty value selects everything.
    pub fn parse(value: &str) -> Self {
        let value = value.trim().to_lowercase();
        if value.is_empty() || value == "all" {
            RiskFilter::All
        } else {
            RiskFilter::Level(value)
        }
    }

    pub fn matches(&self, alert: &Alert) -> bool {
        match self {
            RiskFilter::All => true,
            RiskFilter::Level(level) => alert.risk_key() == *level,
        }
    }
}

impl fmt::Display for RiskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskFilter::All => write!(f, "all"),
            RiskFilter::Level(level) => write!(f, "{}", level),
        }
    }
}
