//! Alert list rendering
//!
//! Read-only projection of the alert list into widgets for a given filter.

use super::{Alert, RiskFilter};

/// Placeholder text shown when no alert matches the filter
pub const EMPTY_STATE_MESSAGE: &str = "No alerts to display. System is clear.";

/// Risk badge on an alert card
#[derive(Debug, Clone, PartialEq)]
pub struct RiskBadge {
    pub text: String,
    /// `risk-{lower-cased risk}`
    pub class: String,
}

/// One rendered alert card
#[derive(Debug, Clone, PartialEq)]
pub struct AlertWidget {
    pub id: String,
    pub platform: String,
    /// Icon lookup key, the lower-cased platform name
    pub icon_key: String,
    pub timestamp: String,
    pub username: String,
    pub details: Vec<String>,
    /// Card style keyword, the lower-cased risk
    pub style: String,
    pub badge: RiskBadge,
}

impl From<&Alert> for AlertWidget {
    fn from(alert: &Alert) -> Self {
        let risk_key = alert.risk_key();
        Self {
            id: alert.id.clone(),
            platform: alert.platform.clone(),
            icon_key: alert.platform.to_lowercase(),
            timestamp: alert.timestamp.clone(),
            username: alert.username.clone(),
            details: alert.details.clone(),
            badge: RiskBadge {
                text: alert.risk.clone(),
                class: format!("risk-{}", risk_key),
            },
            style: risk_key,
        }
    }
}

/// Content of the alerts container
#[derive(Debug, Clone, PartialEq)]
pub enum AlertPanel {
    Alerts(Vec<AlertWidget>),
    Empty { message: String },
}

impl AlertPanel {
    pub fn empty() -> Self {
        AlertPanel::Empty {
            message: EMPTY_STATE_MESSAGE.to_string(),
        }
    }

    pub fn widgets(&self) -> &[AlertWidget] {
        match self {
            AlertPanel::Alerts(widgets) => widgets,
            AlertPanel::Empty { .. } => &[],
        }
    }

    pub fn is_empty_state(&self) -> bool {
        matches!(self, AlertPanel::Empty { .. })
    }
}

impl Default for AlertPanel {
    fn default() -> Self {
        Self::empty()
    }
}

/// Render `alerts` (most recent first) through `filter`.
///
/// Order is preserved. Zero matches always yields the empty-state placeholder,
/// never an empty widget list.
pub fn render(alerts: &[Alert], filter: &RiskFilter) -> AlertPanel {
    let widgets: Vec<AlertWidget> = alerts
        .iter()
        .filter(|alert| filter.matches(alert))
        .map(AlertWidget::from)
        .collect();

    if widgets.is_empty() {
        AlertPanel::empty()
    } else {
        AlertPanel::Alerts(widgets)
    }
}
