//! Terminal presenter
//!
//! Builds a plain-text frame of the dashboard. No cursor control; the binary
//! prints one frame per change.

use std::fmt::Write;

use super::toast::{Toast, ToastState};
use super::DashboardView;
use crate::alerts::render::AlertPanel;
use crate::metrics::display::{HealthMetric, StatTarget};

const RULE: &str = "────────────────────────────────────────────────────────────";
const DETAIL_MAX: usize = 72;
const BAR_CELLS: usize = 20;

/// Ellipse a string for display: first half + "..." + last half.
/// If `s` has ≤ `max_len` chars, returns `s` unchanged.
pub fn ellipse(s: &str, max_len: usize) -> String {
    const SEP: &str = "...";
    let chars: Vec<char> = s.chars().collect();
    let n = chars.len();
    if n <= max_len || max_len <= SEP.len() {
        return s.to_string();
    }
    let first_count = (max_len - SEP.len()) / 2;
    let last_count = (max_len - SEP.len()) - first_count;
    let first: String = chars[..first_count].iter().collect();
    let last: String = chars[n - last_count..].iter().collect();
    format!("{}{}{}", first, SEP, last)
}

fn bar(width_percent: f64) -> String {
    let filled = ((width_percent / 100.0) * BAR_CELLS as f64).round() as usize;
    let filled = filled.min(BAR_CELLS);
    format!("[{}{}]", "#".repeat(filled), " ".repeat(BAR_CELLS - filled))
}

/// Build the text frame for `view` and the visible `toasts`
pub fn build_frame(view: &DashboardView, toasts: &[Toast]) -> String {
    let mut out = String::new();

    let badge = if view.badge.is_visible() {
        format!("  [{} new]", view.badge.text())
    } else {
        String::new()
    };
    let _ = writeln!(out, "Security Alerts Dashboard{}", badge);
    let _ = writeln!(out, "{}", RULE);

    for target in StatTarget::ALL {
        let _ = writeln!(out, "{:<20} {}", target.label(), view.stats.get(target).unwrap_or("-"));
    }
    let _ = writeln!(out, "{}", RULE);

    let _ = writeln!(out, "Model Health: {}", view.health.status_text.as_deref().unwrap_or("-"));
    for metric in HealthMetric::ALL {
        match view.health.metric(metric) {
            Some(m) => {
                let _ = writeln!(out, "{:<10} {:<6} {}", metric.label(), m.value, bar(m.width_percent));
            }
            None => {
                let _ = writeln!(out, "{:<10} -", metric.label());
            }
        }
    }
    let _ = writeln!(
        out,
        "Last retrain: {}   Version: {}",
        view.health.last_retrain.as_deref().unwrap_or("-"),
        view.health.version.as_deref().unwrap_or("-")
    );
    let _ = writeln!(out, "{}", RULE);

    let loaded = view
        .last_loaded
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    let _ = writeln!(
        out,
        "Alerts (filter: {})   [{}]   loaded: {}",
        view.risk_filter,
        view.refresh.label(),
        loaded
    );

    match &view.alerts {
        AlertPanel::Empty { message } => {
            let _ = writeln!(out, "  ✓ {}", message);
        }
        AlertPanel::Alerts(widgets) => {
            for w in widgets {
                let _ = writeln!(out, "  {} [{}] {}  {}", w.id, w.badge.text, w.platform, w.timestamp);
                let _ = writeln!(out, "    {}", w.username);
                for detail in &w.details {
                    let _ = writeln!(out, "    • {}", ellipse(detail, DETAIL_MAX));
                }
            }
        }
    }

    let visible: Vec<&Toast> = toasts.iter().filter(|t| t.state == ToastState::Shown).collect();
    if !visible.is_empty() {
        let _ = writeln!(out, "{}", RULE);
        for toast in visible {
            let _ = writeln!(out, "({}) {}", toast.kind.as_str(), toast.message);
        }
    }

    out
}
