//! UI components
//!
//! `DashboardView` is the widget model of the whole page. The controller
//! writes into it; `terminal` turns it into a text frame.

pub mod badge;
pub mod terminal;
pub mod toast;

use chrono::{DateTime, Utc};

use crate::alerts::render::AlertPanel;
use crate::alerts::RiskFilter;
use crate::metrics::display::{HealthPanel, StatsPanel};
use badge::BadgeCounter;

/// Manual refresh control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshButton {
    #[default]
    Idle,
    /// Spinner shown while a refresh is in flight
    Busy,
}

impl RefreshButton {
    pub fn label(&self) -> &'static str {
        match self {
            RefreshButton::Idle => "Refresh",
            RefreshButton::Busy => "Refreshing",
        }
    }
}

/// Everything currently on screen except toasts
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    pub risk_filter: RiskFilter,
    pub alerts: AlertPanel,
    pub stats: StatsPanel,
    pub health: HealthPanel,
    pub badge: BadgeCounter,
    pub refresh: RefreshButton,
    /// Time of the last successful snapshot load
    pub last_loaded: Option<DateTime<Utc>>,
}
