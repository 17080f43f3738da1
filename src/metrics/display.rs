//! Stats cards and model-health panel
//!
//! Each data field is mapped to a named display target, so the panels do not
//! depend on the order widgets are laid out in.

use std::collections::BTreeMap;

use super::{ModelHealth, Stats};

/// Stat card targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatTarget {
    MessagesAnalyzed,
    SellersDetected,
    AccountsBlocked,
    RealTimeAccuracy,
}

impl StatTarget {
    pub const ALL: [StatTarget; 4] = [
        StatTarget::MessagesAnalyzed,
        StatTarget::SellersDetected,
        StatTarget::AccountsBlocked,
        StatTarget::RealTimeAccuracy,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StatTarget::MessagesAnalyzed => "Messages Analyzed",
            StatTarget::SellersDetected => "Sellers Detected",
            StatTarget::AccountsBlocked => "Accounts Blocked",
            StatTarget::RealTimeAccuracy => "Real-time Accuracy",
        }
    }
}

/// Model metric targets (value text + proportional bar)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthMetric {
    Precision,
    Recall,
    F1Score,
}

impl HealthMetric {
    pub const ALL: [HealthMetric; 3] = [HealthMetric::Precision, HealthMetric::Recall, HealthMetric::F1Score];

    pub fn label(&self) -> &'static str {
        match self {
            HealthMetric::Precision => "Precision",
            HealthMetric::Recall => "Recall",
            HealthMetric::F1Score => "F1 Score",
        }
    }
}

/// Rendered metric: value text and bar width
#[derive(Debug, Clone, PartialEq)]
pub struct MetricBar {
    pub value: String,
    /// Bar width in percent, clamped to [0, 100]
    pub width_percent: f64,
}

impl MetricBar {
    pub fn width_css(&self) -> String {
        format!("{}%", self.width_percent)
    }
}

/// Stat cards keyed by target; empty until the first successful load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsPanel {
    values: BTreeMap<StatTarget, String>,
}

impl StatsPanel {
    pub fn update(&mut self, stats: &Stats) {
        self.values.insert(StatTarget::MessagesAnalyzed, format_count(stats.messages_analyzed));
        self.values.insert(StatTarget::SellersDetected, format_count(stats.sellers_detected));
        self.values.insert(StatTarget::AccountsBlocked, format_count(stats.accounts_blocked));
        self.values.insert(StatTarget::RealTimeAccuracy, format!("{}%", stats.real_time_accuracy));
    }

    pub fn get(&self, target: StatTarget) -> Option<&str> {
        self.values.get(&target).map(String::as_str)
    }
}

/// Model-health panel; empty until the first successful load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthPanel {
    metrics: BTreeMap<HealthMetric, MetricBar>,
    pub last_retrain: Option<String>,
    pub version: Option<String>,
    pub status_text: Option<String>,
    /// Lower-cased status, used as style keyword
    pub status_class: Option<String>,
}

impl HealthPanel {
    pub fn update(&mut self, health: &ModelHealth) {
        self.metrics.insert(HealthMetric::Precision, metric_bar(health.precision));
        self.metrics.insert(HealthMetric::Recall, metric_bar(health.recall));
        self.metrics.insert(HealthMetric::F1Score, metric_bar(health.f1_score));
        self.last_retrain = Some(health.last_retrain.clone());
        self.version = Some(health.version.clone());
        self.status_text = Some(health.status.clone());
        self.status_class = Some(health.status.to_lowercase());
    }

    pub fn metric(&self, metric: HealthMetric) -> Option<&MetricBar> {
        self.metrics.get(&metric)
    }
}

fn metric_bar(fraction: f64) -> MetricBar {
    // Two decimals absorbs float noise such as 0.85 * 100 = 85.00000000000001
    let width = ((fraction * 100.0) * 100.0).round() / 100.0;
    MetricBar {
        value: fraction.to_string(),
        width_percent: width.clamp(0.0, 100.0),
    }
}

/// Format a count the way the browser's `toLocaleString` does for en-US:
/// `,` thousands separators and at most three fraction digits
/// (1234567 -> "1,234,567", 1234.5 -> "1,234.5").
pub fn format_count(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = (value * 1000.0).round() / 1000.0;
    let sign = if rounded < 0.0 { "-" } else { "" };
    let text = format!("{:.3}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{}{}", sign, group_digits(whole))
    } else {
        format!("{}{}.{}", sign, group_digits(whole), fraction)
    }
}

fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
