//! Toast notifications
//!
//! Each toast owns its own timer task: enter, dwell, exit, remove. Toasts are
//! never queued, merged or cancelled.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// Toast severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastKind {
    #[default]
    Info,
    Error,
}

impl ToastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastKind::Info => "info",
            ToastKind::Error => "error",
        }
    }
}

/// Visual state of a toast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastState {
    /// Inserted, entrance animation not started yet
    Entering,
    Shown,
    /// Exit animation running, removed shortly after
    Hidden,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
    pub state: ToastState,
    pub created_at: DateTime<Utc>,
}

/// Toast lifecycle timings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToastTimings {
    /// Delay before the toast switches to `Shown`
    pub enter_delay: Duration,
    /// Time from insertion until the toast switches to `Hidden`
    pub dwell: Duration,
    /// Time from `Hidden` until removal
    pub exit_delay: Duration,
}

impl Default for ToastTimings {
    fn default() -> Self {
        Self {
            enter_delay: Duration::from_millis(10),
            dwell: Duration::from_millis(4000),
            exit_delay: Duration::from_millis(300),
        }
    }
}

/// Shows short-lived toasts. Cheap to clone; clones share the toast list.
#[derive(Debug, Clone)]
pub struct NotificationPresenter {
    toasts: Arc<Mutex<Vec<Toast>>>,
    next_id: Arc<AtomicU64>,
    timings: ToastTimings,
}

impl NotificationPresenter {
    pub fn new(timings: ToastTimings) -> Self {
        Self {
            toasts: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            timings,
        }
    }

    /// Show an info toast
    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.show(message, ToastKind::Info)
    }

    /// Show an error toast
    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.show(message, ToastKind::Error)
    }

    /// Insert a toast and schedule its lifecycle. Must be called inside a tokio runtime.
    pub fn show(&self, message: impl Into<String>, kind: ToastKind) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let toast = Toast {
            id,
            message: message.into(),
            kind,
            state: ToastState::Entering,
            created_at: Utc::now(),
        };
        debug!("Toast {}: [{}] {}", id, kind.as_str(), toast.message);

        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.push(toast);
        }

        let toasts = Arc::clone(&self.toasts);
        let timings = self.timings;
        tokio::spawn(async move {
            tokio::time::sleep(timings.enter_delay).await;
            set_state(&toasts, id, ToastState::Shown);

            tokio::time::sleep(timings.dwell.saturating_sub(timings.enter_delay)).await;
            set_state(&toasts, id, ToastState::Hidden);

            tokio::time::sleep(timings.exit_delay).await;
            if let Ok(mut toasts) = toasts.lock() {
                toasts.retain(|t| t.id != id);
            }
        });

        id
    }

    /// Toasts currently on screen, oldest first
    pub fn snapshot(&self) -> Vec<Toast> {
        self.toasts.lock().map(|t| t.clone()).unwrap_or_default()
    }

    pub fn timings(&self) -> ToastTimings {
        self.timings
    }
}

impl Default for NotificationPresenter {
    fn default() -> Self {
        Self::new(ToastTimings::default())
    }
}

fn set_state(toasts: &Mutex<Vec<Toast>>, id: u64, state: ToastState) {
    if let Ok(mut toasts) = toasts.lock() {
        if let Some(toast) = toasts.iter_mut().find(|t| t.id == id) {
            toast.state = state;
        }
    }
}
