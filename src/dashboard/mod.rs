//! Dashboard controller
//!
//! Owns the alert list and the widget model. Snapshot loads replace the list,
//! push events prepend to it; every change re-renders through the current
//! risk filter. All mutation goes through the operations below.

pub mod actions;

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::alerts::render::render;
use crate::alerts::{Alert, RiskFilter};
use crate::gateway::{BackendGateway, GatewayError, Result, Subscription};
use crate::ui::toast::{NotificationPresenter, Toast};
use crate::ui::{DashboardView, RefreshButton};
pub use actions::UserAction;

/// Shown when the snapshot load or the push channel fails
pub const LOAD_ERROR_MESSAGE: &str = "Error: Could not connect to the backend.";

/// Shown after every manual refresh, whatever its outcome
pub const REFRESHED_MESSAGE: &str = "Dashboard data refreshed.";

/// Shown when a successful load resets a narrower risk filter
pub const FILTER_RESET_MESSAGE: &str = "Risk filter reset to all.";

/// How often `run` checks for toast state changes
const REDRAW_INTERVAL: Duration = Duration::from_millis(100);

/// Push channel handshake running on its own task
struct PendingConnect {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

pub struct DashboardController {
    gateway: Arc<dyn BackendGateway>,
    alerts: Vec<Alert>,
    view: DashboardView,
    notifier: NotificationPresenter,
    events_tx: mpsc::UnboundedSender<Alert>,
    events_rx: mpsc::UnboundedReceiver<Alert>,
    subscription: Option<Subscription>,
    connecting: Option<PendingConnect>,
    connect_tx: mpsc::UnboundedSender<Result<Subscription>>,
    connect_rx: mpsc::UnboundedReceiver<Result<Subscription>>,
    last_load_ok: Option<bool>,
}

impl DashboardController {
    pub fn new(gateway: Arc<dyn BackendGateway>, notifier: NotificationPresenter) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (connect_tx, connect_rx) = mpsc::unbounded_channel();
        Self {
            gateway,
            alerts: Vec::new(),
            view: DashboardView::default(),
            notifier,
            events_tx,
            events_rx,
            subscription: None,
            connecting: None,
            connect_tx,
            connect_rx,
            last_load_ok: None,
        }
    }

    /// Current alert list, most recent first
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    pub fn notifier(&self) -> &NotificationPresenter {
        &self.notifier
    }

    /// True while a subscription is held and its reader is still running
    pub fn is_subscribed(&self) -> bool {
        self.subscription.as_ref().is_some_and(|s| !s.is_closed())
    }

    /// Start the push channel handshake on its own task.
    ///
    /// No-op while subscribed or while a handshake is already in flight. The
    /// outcome is applied by `run`, `connect` or `process_pending_events`.
    pub fn begin_connect(&mut self) {
        if self.is_subscribed() || self.connecting.is_some() {
            return;
        }
        if self.subscription.take().is_some() {
            info!("Dashboard: push channel lost, reconnecting");
        }

        let cancel = CancellationToken::new();
        let gateway = Arc::clone(&self.gateway);
        let events = self.events_tx.clone();
        let results = self.connect_tx.clone();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            let result = gateway.subscribe(events, token).await;
            let _ = results.send(result);
        });
        self.connecting = Some(PendingConnect { cancel, task });
    }

    /// Subscribe to the push channel and wait for the handshake to finish.
    /// The handle is kept until `shutdown`.
    pub async fn connect(&mut self) -> Result<()> {
        self.begin_connect();
        let Some(pending) = self.connecting.as_mut() else {
            return Ok(());
        };

        let joined = (&mut pending.task).await;
        if let Err(e) = joined {
            let failed = Err(GatewayError::Handshake(format!("connect task failed: {}", e)));
            return self.finish_connect(failed);
        }
        match self.connect_rx.try_recv() {
            Ok(result) => self.finish_connect(result),
            Err(_) => self.finish_connect(Err(GatewayError::Handshake("connect task gave no result".to_string()))),
        }
    }

    /// Apply the outcome of a handshake.
    ///
    /// A failure is toasted unless the latest snapshot load failed, whose
    /// toast already covers it.
    fn finish_connect(&mut self, result: Result<Subscription>) -> Result<()> {
        self.connecting = None;
        match result {
            Ok(subscription) => {
                info!("Dashboard: subscribed to push alerts");
                self.subscription = Some(subscription);
                Ok(())
            }
            Err(e) => {
                warn!("Dashboard: push channel unavailable: {}", e);
                if self.last_load_ok != Some(false) {
                    self.notifier.error(LOAD_ERROR_MESSAGE);
                }
                Err(e)
            }
        }
    }

    /// Start the push channel handshake and load the snapshots meanwhile.
    /// At most one error toast is shown even if both fail.
    pub async fn start(&mut self) {
        self.begin_connect();
        self.initialize().await;
    }

    /// Fetch alerts, stats and model health concurrently.
    ///
    /// All three must succeed; otherwise nothing on screen changes and one
    /// error toast is shown. Returns whether the load succeeded.
    pub async fn initialize(&mut self) -> bool {
        debug!("Dashboard: fetching initial data");
        let gateway = Arc::clone(&self.gateway);
        let result = tokio::try_join!(
            gateway.fetch_alerts(),
            gateway.fetch_stats(),
            gateway.fetch_model_health()
        );

        match result {
            Ok((alerts, stats, health)) => {
                info!("Dashboard: loaded {} alerts", alerts.len());
                self.alerts = alerts;
                if self.view.risk_filter != RiskFilter::All {
                    self.view.risk_filter = RiskFilter::All;
                    self.notifier.info(FILTER_RESET_MESSAGE);
                }
                self.render();
                self.view.stats.update(&stats);
                self.view.health.update(&health);
                self.view.last_loaded = Some(Utc::now());
                self.last_load_ok = Some(true);
                true
            }
            Err(e) => {
                error!("Dashboard: failed to fetch initial data: {}", e);
                self.notifier.error(LOAD_ERROR_MESSAGE);
                self.last_load_ok = Some(false);
                false
            }
        }
    }

    /// Manual refresh: reload with a busy indicator, then always acknowledge.
    /// Also reconnects the push channel if it is down.
    pub async fn refresh(&mut self) {
        self.view.refresh = RefreshButton::Busy;
        self.begin_connect();
        self.initialize().await;
        self.view.refresh = RefreshButton::Idle;
        self.notifier.info(REFRESHED_MESSAGE);
    }

    /// New alert from the push channel. Never validated or deduplicated.
    pub fn on_push_alert(&mut self, alert: Alert) {
        debug!("Dashboard: push alert {} ({})", alert.id, alert.risk);
        let message = format!("New {} risk alert from {}", alert.risk, alert.username);
        self.alerts.insert(0, alert);
        self.render();
        self.notifier.info(message);
        self.view.badge.increment(1);
    }

    /// Filter control changed; re-render without refetching
    pub fn on_filter_changed(&mut self, value: &str) {
        self.view.risk_filter = RiskFilter::parse(value);
        debug!("Dashboard: filter set to {}", self.view.risk_filter);
        self.render();
    }

    /// Apply finished handshakes and the push events already queued by the
    /// channel. Returns how many push events were applied.
    pub fn process_pending_events(&mut self) -> usize {
        while let Ok(result) = self.connect_rx.try_recv() {
            let _ = self.finish_connect(result);
        }
        let mut applied = 0;
        while let Ok(alert) = self.events_rx.try_recv() {
            self.on_push_alert(alert);
            applied += 1;
        }
        applied
    }

    /// Event loop: push events, user actions and toast redraws.
    ///
    /// `on_update` is called once up front and after every change. Returns on
    /// `Quit` or when the action sender is dropped.
    pub async fn run<F>(&mut self, mut actions: mpsc::UnboundedReceiver<UserAction>, mut on_update: F)
    where
        F: FnMut(&DashboardView, &[Toast]),
    {
        let mut redraw = tokio::time::interval(REDRAW_INTERVAL);
        redraw.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut last_toasts = self.notifier.snapshot();
        on_update(&self.view, &last_toasts);

        loop {
            let changed = tokio::select! {
                Some(result) = self.connect_rx.recv() => {
                    let _ = self.finish_connect(result);
                    true
                }
                Some(alert) = self.events_rx.recv() => {
                    self.on_push_alert(alert);
                    true
                }
                action = actions.recv() => match action {
                    Some(UserAction::SetFilter(value)) => {
                        self.on_filter_changed(&value);
                        true
                    }
                    Some(UserAction::Refresh) => {
                        // Show the busy control before the load suspends the loop
                        self.view.refresh = RefreshButton::Busy;
                        on_update(&self.view, &self.notifier.snapshot());
                        self.refresh().await;
                        true
                    }
                    Some(UserAction::Quit) | None => break,
                },
                _ = redraw.tick() => false,
            };

            let toasts = self.notifier.snapshot();
            if changed || toasts != last_toasts {
                on_update(&self.view, &toasts);
            }
            last_toasts = toasts;
        }
        debug!("Dashboard: event loop finished with {} toasts on screen", last_toasts.len());
    }

    /// Abort a pending handshake and tear down the push subscription
    pub async fn shutdown(&mut self) {
        if let Some(pending) = self.connecting.take() {
            pending.cancel.cancel();
            pending.task.abort();
            debug!("Dashboard: pending push handshake cancelled");
        }
        while let Ok(result) = self.connect_rx.try_recv() {
            if let Ok(subscription) = result {
                subscription.close().await;
            }
        }
        if let Some(subscription) = self.subscription.take() {
            subscription.close().await;
            info!("Dashboard: push subscription closed");
        }
    }

    fn render(&mut self) {
        self.view.alerts = render(&self.alerts, &self.view.risk_filter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayError;
    use crate::metrics::display::{HealthMetric, StatTarget};
    use crate::metrics::{ModelHealth, Stats};
    use crate::ui::toast::ToastKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeGateway {
        alerts: Vec<Alert>,
        fail_stats: AtomicBool,
        /// Number of upcoming subscribe calls that fail
        subscribe_failures: AtomicUsize,
        /// Number of upcoming subscriptions whose reader exits at once
        exiting_readers: AtomicUsize,
        stall_subscribe: bool,
        fetches: AtomicUsize,
        subscribes: AtomicUsize,
        push: Mutex<Option<mpsc::UnboundedSender<Alert>>>,
    }

    impl FakeGateway {
        fn new(alerts: Vec<Alert>) -> Self {
            Self {
                alerts,
                fail_stats: AtomicBool::new(false),
                subscribe_failures: AtomicUsize::new(0),
                exiting_readers: AtomicUsize::new(0),
                stall_subscribe: false,
                fetches: AtomicUsize::new(0),
                subscribes: AtomicUsize::new(0),
                push: Mutex::new(None),
            }
        }

        fn push(&self, alert: Alert) {
            let guard = self.push.lock().unwrap();
            guard.as_ref().expect("not subscribed").send(alert).unwrap();
        }

        fn take_one(counter: &AtomicUsize) -> bool {
            counter
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        }
    }

    #[async_trait]
    impl BackendGateway for FakeGateway {
        async fn fetch_alerts(&self) -> Result<Vec<Alert>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.alerts.clone())
        }

        async fn fetch_stats(&self) -> Result<Stats> {
            if self.fail_stats.load(Ordering::SeqCst) {
                return Err(GatewayError::Status {
                    endpoint: "/api/stats".to_string(),
                    status: 500,
                });
            }
            Ok(Stats {
                messages_analyzed: 100.0,
                sellers_detected: 5.0,
                accounts_blocked: 2.0,
                real_time_accuracy: 97.5,
            })
        }

        async fn fetch_model_health(&self) -> Result<ModelHealth> {
            Ok(ModelHealth {
                precision: 0.9,
                recall: 0.8,
                f1_score: 0.85,
                last_retrain: "2024-01-01".to_string(),
                version: "v1".to_string(),
                status: "OK".to_string(),
            })
        }

        async fn subscribe(&self, events: mpsc::UnboundedSender<Alert>, cancel: CancellationToken) -> Result<Subscription> {
            self.subscribes.fetch_add(1, Ordering::SeqCst);
            if self.stall_subscribe {
                cancel.cancelled().await;
                return Err(GatewayError::Handshake("cancelled".to_string()));
            }
            if Self::take_one(&self.subscribe_failures) {
                return Err(GatewayError::Handshake("refused".to_string()));
            }
            *self.push.lock().unwrap() = Some(events);
            if Self::take_one(&self.exiting_readers) {
                return Ok(Subscription::new(cancel, Some(tokio::spawn(async {}))));
            }
            Ok(Subscription::detached(cancel))
        }
    }

    fn alert(id: &str, risk: &str, username: &str) -> Alert {
        Alert {
            id: id.to_string(),
            platform: "twitter".to_string(),
            username: username.to_string(),
            timestamp: "t1".to_string(),
            risk: risk.to_string(),
            details: vec!["d1".to_string()],
        }
    }

    fn controller(gateway: Arc<FakeGateway>) -> DashboardController {
        DashboardController::new(gateway, NotificationPresenter::default())
    }

    fn visible_ids(controller: &DashboardController) -> Vec<String> {
        controller.view().alerts.widgets().iter().map(|w| w.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_initial_load_scenario() {
        let gateway = Arc::new(FakeGateway::new(vec![alert("A1", "High", "u1")]));
        let mut dashboard = controller(gateway);

        assert!(dashboard.initialize().await);
        assert_eq!(visible_ids(&dashboard), vec!["A1"]);

        let view = dashboard.view();
        assert_eq!(view.stats.get(StatTarget::MessagesAnalyzed), Some("100"));
        assert_eq!(view.stats.get(StatTarget::SellersDetected), Some("5"));
        assert_eq!(view.stats.get(StatTarget::AccountsBlocked), Some("2"));
        assert_eq!(view.stats.get(StatTarget::RealTimeAccuracy), Some("97.5%"));
        let widths: Vec<String> = HealthMetric::ALL
            .iter()
            .map(|m| view.health.metric(*m).unwrap().width_css())
            .collect();
        assert_eq!(widths, vec!["90%", "80%", "85%"]);
        assert!(view.last_loaded.is_some());
        assert!(dashboard.notifier().snapshot().is_empty());

        dashboard.on_filter_changed("low");
        assert!(dashboard.view().alerts.is_empty_state());
        assert_eq!(dashboard.alerts().len(), 1);
    }

    #[tokio::test]
    async fn test_push_while_filtered() {
        let gateway = Arc::new(FakeGateway::new(vec![alert("A1", "High", "u1")]));
        let mut dashboard = controller(gateway.clone());
        dashboard.start().await;
        dashboard.connect().await.unwrap();
        dashboard.on_filter_changed("high");

        gateway.push(alert("A2", "Low", "u2"));
        assert_eq!(dashboard.process_pending_events(), 1);

        let ids: Vec<&str> = dashboard.alerts().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["A2", "A1"]);
        assert_eq!(visible_ids(&dashboard), vec!["A1"]);
        assert_eq!(dashboard.view().badge.count(), 1);
        assert!(dashboard.view().badge.is_visible());

        let toasts = dashboard.notifier().snapshot();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, ToastKind::Info);
        assert_eq!(toasts[0].message, "New Low risk alert from u2");
    }

    #[tokio::test]
    async fn test_pushes_are_most_recent_first_without_dedup() {
        let mut dashboard = controller(Arc::new(FakeGateway::new(vec![])));
        for i in 1..=5 {
            dashboard.on_push_alert(alert(&format!("P{}", i), "medium", "u"));
        }
        dashboard.on_push_alert(alert("P5", "medium", "u"));

        let ids: Vec<&str> = dashboard.alerts().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["P5", "P5", "P4", "P3", "P2", "P1"]);
        assert_eq!(dashboard.view().badge.count(), 6);
    }

    #[tokio::test]
    async fn test_failed_load_changes_nothing() {
        let gateway = Arc::new(FakeGateway::new(vec![alert("A1", "High", "u1")]));
        let mut dashboard = controller(gateway.clone());
        assert!(dashboard.initialize().await);

        gateway.fail_stats.store(true, Ordering::SeqCst);
        dashboard.on_push_alert(alert("A2", "Low", "u2"));
        let before = visible_ids(&dashboard);

        assert!(!dashboard.initialize().await);
        assert_eq!(visible_ids(&dashboard), before);
        assert_eq!(dashboard.alerts().len(), 2);

        let errors: Vec<Toast> = dashboard
            .notifier()
            .snapshot()
            .into_iter()
            .filter(|t| t.kind == ToastKind::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, LOAD_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_first_load_failure_leaves_empty_view() {
        let gateway = Arc::new(FakeGateway::new(vec![alert("A1", "High", "u1")]));
        gateway.fail_stats.store(true, Ordering::SeqCst);
        let mut dashboard = controller(gateway);

        assert!(!dashboard.initialize().await);
        assert!(dashboard.alerts().is_empty());
        assert!(dashboard.view().alerts.is_empty_state());
        assert_eq!(dashboard.view().stats.get(StatTarget::MessagesAnalyzed), None);
        assert!(dashboard.view().last_loaded.is_none());
    }

    #[tokio::test]
    async fn test_refresh_always_acknowledges() {
        let gateway = Arc::new(FakeGateway::new(vec![alert("A1", "High", "u1")]));
        gateway.fail_stats.store(true, Ordering::SeqCst);
        let mut dashboard = controller(gateway.clone());

        dashboard.refresh().await;
        assert_eq!(dashboard.view().refresh, RefreshButton::Idle);
        let messages: Vec<String> = dashboard.notifier().snapshot().into_iter().map(|t| t.message).collect();
        assert_eq!(messages, vec![LOAD_ERROR_MESSAGE, REFRESHED_MESSAGE]);

        gateway.fail_stats.store(false, Ordering::SeqCst);
        dashboard.on_filter_changed("low");
        dashboard.refresh().await;
        assert_eq!(dashboard.view().risk_filter, RiskFilter::All);
        assert_eq!(visible_ids(&dashboard), vec!["A1"]);
    }

    #[tokio::test]
    async fn test_load_announces_filter_reset() {
        let gateway = Arc::new(FakeGateway::new(vec![alert("A1", "High", "u1")]));
        let mut dashboard = controller(gateway.clone());
        dashboard.initialize().await;
        dashboard.on_filter_changed("low");

        // A failed load keeps the filter
        gateway.fail_stats.store(true, Ordering::SeqCst);
        dashboard.initialize().await;
        assert_eq!(dashboard.view().risk_filter, RiskFilter::parse("low"));

        gateway.fail_stats.store(false, Ordering::SeqCst);
        dashboard.initialize().await;
        assert_eq!(dashboard.view().risk_filter, RiskFilter::All);
        let messages: Vec<String> = dashboard.notifier().snapshot().into_iter().map(|t| t.message).collect();
        assert_eq!(messages, vec![LOAD_ERROR_MESSAGE, FILTER_RESET_MESSAGE]);

        // Already on `all`: nothing to announce
        dashboard.initialize().await;
        assert_eq!(dashboard.notifier().snapshot().len(), 2);
    }

    #[tokio::test]
    async fn test_filter_change_does_not_refetch() {
        let gateway = Arc::new(FakeGateway::new(vec![alert("A1", "High", "u1"), alert("A0", "low", "u0")]));
        let mut dashboard = controller(gateway.clone());
        dashboard.initialize().await;

        dashboard.on_filter_changed("LOW");
        assert_eq!(visible_ids(&dashboard), vec!["A0"]);
        dashboard.on_filter_changed("all");
        assert_eq!(visible_ids(&dashboard), vec!["A1", "A0"]);
        assert_eq!(gateway.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_channel_failure_shows_single_error() {
        let gateway = FakeGateway::new(vec![alert("A1", "High", "u1")]);
        gateway.subscribe_failures.store(usize::MAX, Ordering::SeqCst);
        let mut dashboard = controller(Arc::new(gateway));

        dashboard.start().await;
        assert!(dashboard.connect().await.is_err());
        assert!(!dashboard.is_subscribed());
        assert_eq!(visible_ids(&dashboard), vec!["A1"]);
        let toasts = dashboard.notifier().snapshot();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].message, LOAD_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_channel_and_load_failure_show_one_error() {
        let gateway = FakeGateway::new(vec![]);
        gateway.subscribe_failures.store(usize::MAX, Ordering::SeqCst);
        gateway.fail_stats.store(true, Ordering::SeqCst);
        let mut dashboard = controller(Arc::new(gateway));

        dashboard.start().await;
        assert!(dashboard.connect().await.is_err());
        let toasts = dashboard.notifier().snapshot();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, ToastKind::Error);
    }

    #[tokio::test]
    async fn test_stalled_channel_does_not_block_load() {
        let mut gateway = FakeGateway::new(vec![alert("A1", "High", "u1")]);
        gateway.stall_subscribe = true;
        let gateway = Arc::new(gateway);
        let mut dashboard = controller(gateway.clone());

        tokio::time::timeout(Duration::from_secs(1), dashboard.start())
            .await
            .expect("snapshot load waited for the handshake");
        assert_eq!(visible_ids(&dashboard), vec!["A1"]);
        assert!(dashboard.view().last_loaded.is_some());
        assert!(dashboard.notifier().snapshot().is_empty());
        assert!(!dashboard.is_subscribed());

        // A refresh while the handshake is pending does not start a second one
        dashboard.refresh().await;
        assert_eq!(gateway.subscribes.load(Ordering::SeqCst), 1);

        tokio::time::timeout(Duration::from_secs(1), dashboard.shutdown())
            .await
            .expect("shutdown waited for the handshake");
    }

    #[tokio::test]
    async fn test_refresh_reconnects_after_failed_subscribe() {
        let gateway = Arc::new(FakeGateway::new(vec![alert("A1", "High", "u1")]));
        gateway.subscribe_failures.store(1, Ordering::SeqCst);
        let mut dashboard = controller(gateway.clone());

        dashboard.start().await;
        assert!(dashboard.connect().await.is_err());
        assert!(!dashboard.is_subscribed());

        dashboard.refresh().await;
        dashboard.connect().await.unwrap();
        assert!(dashboard.is_subscribed());
        assert_eq!(gateway.subscribes.load(Ordering::SeqCst), 2);

        gateway.push(alert("A2", "Low", "u2"));
        assert_eq!(dashboard.process_pending_events(), 1);
        assert_eq!(dashboard.alerts()[0].id, "A2");
    }

    #[tokio::test]
    async fn test_refresh_reconnects_after_reader_exit() {
        let gateway = Arc::new(FakeGateway::new(vec![]));
        gateway.exiting_readers.store(1, Ordering::SeqCst);
        let mut dashboard = controller(gateway.clone());

        dashboard.connect().await.unwrap();
        for _ in 0..100 {
            if !dashboard.is_subscribed() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(!dashboard.is_subscribed());

        dashboard.refresh().await;
        dashboard.connect().await.unwrap();
        assert!(dashboard.is_subscribed());
        assert_eq!(gateway.subscribes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_run_applies_finished_handshake() {
        let gateway = Arc::new(FakeGateway::new(vec![alert("A1", "High", "u1")]));
        let mut dashboard = controller(gateway.clone());
        dashboard.start().await;

        let (tx, rx) = mpsc::unbounded_channel();
        let quit = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = tx.send(UserAction::Quit);
        });
        dashboard.run(rx, |_, _| {}).await;
        quit.await.unwrap();

        assert!(dashboard.is_subscribed());
        assert_eq!(gateway.subscribes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_connect_and_shutdown() {
        let mut dashboard = controller(Arc::new(FakeGateway::new(vec![])));
        dashboard.connect().await.unwrap();
        assert!(dashboard.is_subscribed());
        dashboard.shutdown().await;
        assert!(!dashboard.is_subscribed());
    }

    #[tokio::test]
    async fn test_run_applies_actions_until_quit() {
        let gateway = Arc::new(FakeGateway::new(vec![alert("A1", "High", "u1")]));
        let mut dashboard = controller(gateway);
        dashboard.initialize().await;

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(UserAction::SetFilter("low".to_string())).unwrap();
        tx.send(UserAction::Quit).unwrap();

        let mut updates = 0;
        dashboard.run(rx, |_, _| updates += 1).await;

        assert!(updates >= 2);
        assert_eq!(dashboard.view().risk_filter, RiskFilter::parse("low"));
        assert!(dashboard.view().alerts.is_empty_state());
    }
}
