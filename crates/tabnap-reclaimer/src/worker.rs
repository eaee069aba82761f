//! Background worker: sweep scheduling and the master switch
//!
//! One tokio task owns the idle table, the timer and the metrics. Everything
//! else talks to it through messages: lifecycle signals and switch commands
//! arrive from [`ReclaimerHandle`]s, host results come back from the tasks the
//! worker spawns for enumeration and discard calls. The worker never waits on
//! a sweep's host call, so a slow host cannot delay the next firing.

use crate::{ActivityEvent, EvictionPolicy, IdleEntry, IdleTable, ReclaimerError, ReclaimerMetrics};
use serde::Serialize;
use std::future;
use std::pin::Pin;
use std::sync::Arc;
use tabnap_domain::traits::{Indicator, SettingsProvider, TabHost};
use tabnap_domain::{
    HostError, IndicatorState, SettingKey, SettingValue, SettingValues, Settings, TabId, TabInfo,
    TabQuery,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Sleep};

/// Point-in-time view of the engine
#[derive(Debug, Clone, Serialize)]
pub struct ReclaimerStatus {
    /// Master switch position
    pub enabled: bool,

    /// Tracked tabs, ordered by id
    pub entries: Vec<IdleEntry>,

    /// Counters since start (or last reset)
    pub metrics: ReclaimerMetrics,
}

enum Command {
    Activity(ActivityEvent),
    SetEnabled {
        enabled: bool,
        reply: oneshot::Sender<()>,
    },
    Toggle {
        reply: oneshot::Sender<bool>,
    },
    Status {
        reply: oneshot::Sender<ReclaimerStatus>,
    },
    ResetMetrics,
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

enum Completion {
    Swept {
        generation: u64,
        settings: Settings,
        result: Result<Vec<TabInfo>, HostError>,
    },
    Discarded {
        id: TabId,
        result: Result<Option<TabInfo>, HostError>,
    },
}

enum Event {
    Command(Command),
    Completion(Completion),
    Tick,
}

/// Cheap, cloneable handle to a running worker
///
/// Lifecycle signals are fire-and-forget; switch and status calls wait for
/// the worker to process them. The worker stops once every handle is
/// dropped or [`shutdown`](Self::shutdown) is called.
#[derive(Clone)]
pub struct ReclaimerHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl ReclaimerHandle {
    /// Signal that the host opened a tab
    pub fn tab_created(&self, id: TabId) -> Result<(), ReclaimerError> {
        self.send(Command::Activity(ActivityEvent::Created(id)))
    }

    /// Signal that the host closed a tab
    pub fn tab_removed(&self, id: TabId) -> Result<(), ReclaimerError> {
        self.send(Command::Activity(ActivityEvent::Removed(id)))
    }

    /// Signal that a tab became the focused one
    pub fn tab_activated(&self, id: TabId) -> Result<(), ReclaimerError> {
        self.send(Command::Activity(ActivityEvent::Activated(id)))
    }

    /// Switch the engine on or off, persisting the choice
    ///
    /// Enabling an engine that is already on restarts tracking: every idle
    /// time goes back to zero and the sweep timer starts a new cycle.
    pub async fn set_enabled(&self, enabled: bool) -> Result<(), ReclaimerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::SetEnabled { enabled, reply })?;
        rx.await.map_err(|_| ReclaimerError::Stopped)
    }

    /// Flip the persisted switch position; returns the new position
    ///
    /// The flip goes through [`set_enabled`](Self::set_enabled).
    pub async fn toggle(&self) -> Result<bool, ReclaimerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Toggle { reply })?;
        rx.await.map_err(|_| ReclaimerError::Stopped)
    }

    /// Current switch position, idle table and metrics
    pub async fn status(&self) -> Result<ReclaimerStatus, ReclaimerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Status { reply })?;
        rx.await.map_err(|_| ReclaimerError::Stopped)
    }

    /// Reset the worker's metrics counters
    pub fn reset_metrics(&self) -> Result<(), ReclaimerError> {
        self.send(Command::ResetMetrics)
    }

    /// Stop the worker
    ///
    /// Cancels the timer and drops the idle table without touching the
    /// persisted switch position or the indicator.
    pub async fn shutdown(&self) -> Result<(), ReclaimerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Shutdown { reply })?;
        rx.await.map_err(|_| ReclaimerError::Stopped)
    }

    /// Whether the worker is still accepting messages
    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }

    fn send(&self, command: Command) -> Result<(), ReclaimerError> {
        self.tx.send(command).map_err(|_| ReclaimerError::Stopped)
    }
}

/// The engine task
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use tabnap_domain::traits::{Indicator, TabHost};
/// use tabnap_domain::{HostError, IndicatorState, TabId, TabInfo, TabQuery};
/// use tabnap_reclaimer::ReclaimerWorker;
/// use tabnap_store::MemorySettingsStore;
///
/// struct NoTabs;
///
/// #[async_trait]
/// impl TabHost for NoTabs {
///     async fn query(&self, _query: &TabQuery) -> Result<Vec<TabInfo>, HostError> {
///         Ok(Vec::new())
///     }
///
///     async fn discard(&self, id: TabId) -> Result<Option<TabInfo>, HostError> {
///         Err(HostError::UnknownTab(id))
///     }
/// }
///
/// struct Quiet;
///
/// impl Indicator for Quiet {
///     fn show(&self, _state: IndicatorState) {}
/// }
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let (handle, join) = ReclaimerWorker::spawn(
///         Arc::new(MemorySettingsStore::new()),
///         Arc::new(NoTabs),
///         Arc::new(Quiet),
///     );
///
///     handle.tab_created(TabId::new(1))?;
///     let enabled = handle.toggle().await?;
///     println!("enabled: {}", enabled);
///
///     handle.shutdown().await?;
///     join.await?;
///     Ok(())
/// }
/// ```
pub struct ReclaimerWorker {
    settings: Arc<dyn SettingsProvider>,
    host: Arc<dyn TabHost>,
    indicator: Arc<dyn Indicator>,
    table: IdleTable,
    metrics: ReclaimerMetrics,
    enabled: bool,
    /// Bumped on every switch transition; host results from older
    /// generations are dropped.
    generation: u64,
    timer: Option<Pin<Box<Sleep>>>,
    commands: mpsc::UnboundedReceiver<Command>,
    completions: mpsc::UnboundedReceiver<Completion>,
    completions_tx: mpsc::UnboundedSender<Completion>,
}

impl ReclaimerWorker {
    /// Start the engine on the current tokio runtime
    ///
    /// The worker waits for the settings store, reads the persisted switch
    /// position and replays that transition before handling any message.
    pub fn spawn(
        settings: Arc<dyn SettingsProvider>,
        host: Arc<dyn TabHost>,
        indicator: Arc<dyn Indicator>,
    ) -> (ReclaimerHandle, JoinHandle<()>) {
        let (tx, commands) = mpsc::unbounded_channel();
        let (completions_tx, completions) = mpsc::unbounded_channel();

        let worker = Self {
            settings,
            host,
            indicator,
            table: IdleTable::new(),
            metrics: ReclaimerMetrics::new(),
            enabled: false,
            generation: 0,
            timer: None,
            commands,
            completions,
            completions_tx,
        };

        let join = tokio::spawn(worker.run());
        (ReclaimerHandle { tx }, join)
    }

    async fn run(mut self) {
        self.start().await;

        loop {
            let event = tokio::select! {
                command = self.commands.recv() => command.map(Event::Command),
                Some(done) = self.completions.recv() => Some(Event::Completion(done)),
                () = next_firing(&mut self.timer) => Some(Event::Tick),
            };

            // Every handle dropped
            let Some(event) = event else { break };

            match event {
                Event::Command(Command::Shutdown { reply }) => {
                    self.timer = None;
                    let _ = reply.send(());
                    break;
                }
                Event::Command(command) => self.handle_command(command).await,
                Event::Completion(done) => self.handle_completion(done),
                Event::Tick => self.fire().await,
            }
        }

        tracing::info!("Reclaimer stopped. Final metrics:\n{}", self.metrics.summary());
    }

    async fn start(&mut self) {
        if let Err(e) = self.settings.ready().await {
            tracing::warn!("Settings storage not ready, continuing with defaults: {}", e);
        }

        let settings = self.snapshot().await;
        tracing::info!(
            "Reclaimer started (active: {}, timeout: {}s, tick: {}s, skip pinned: {})",
            settings.active,
            settings.timeout_secs,
            settings.tick_secs,
            settings.skip_pinned
        );
        self.set_enabled(settings.active).await;
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Activity(event) => {
                if !self.enabled {
                    tracing::debug!("Ignoring {:?} while disabled", event);
                    return;
                }
                tracing::debug!("{:?}", event);
                event.apply(&mut self.table);
            }
            Command::SetEnabled { enabled, reply } => {
                self.set_enabled(enabled).await;
                let _ = reply.send(());
            }
            Command::Toggle { reply } => {
                let enabled = !self.snapshot().await.active;
                self.set_enabled(enabled).await;
                let _ = reply.send(enabled);
            }
            Command::Status { reply } => {
                let _ = reply.send(ReclaimerStatus {
                    enabled: self.enabled,
                    entries: self.table.snapshot(),
                    metrics: self.metrics.clone(),
                });
            }
            Command::ResetMetrics => self.metrics.reset(),
            Command::Shutdown { .. } => unreachable!("shutdown is handled by the run loop"),
        }
    }

    fn handle_completion(&mut self, done: Completion) {
        match done {
            Completion::Swept {
                generation,
                settings,
                result,
            } => self.finish_sweep(generation, settings, result),
            Completion::Discarded { id, result } => match result {
                Err(e) => {
                    tracing::warn!("Tab discard error for {}: {}", id, e);
                    self.metrics.record_discard_failure();
                }
                Ok(None) => {
                    tracing::info!("Tab was not discarded: {}", id);
                    self.metrics.record_not_discarded();
                }
                Ok(Some(_)) => {
                    tracing::info!("Tab discarded: {}", id);
                    self.metrics.record_reclaimed();
                }
            },
        }
    }

    /// Master switch transition
    ///
    /// Always tears the previous cycle down first, so re-enabling an enabled
    /// engine is a fresh bootstrap rather than a second timer.
    async fn set_enabled(&mut self, enabled: bool) {
        let mut values = SettingValues::new();
        values.insert(SettingKey::Active, SettingValue::Flag(enabled));
        if let Err(e) = self.settings.set(values).await {
            tracing::warn!("Failed to persist active={}: {}", enabled, e);
        }

        self.timer = None;
        self.generation += 1;
        self.table.clear();
        self.enabled = false;

        if enabled {
            self.bootstrap().await;
        }

        self.enabled = enabled;
        self.indicator.show(IndicatorState::from_enabled(enabled));
        tracing::info!(
            "Reclaimer {} ({} tab(s) tracked)",
            if enabled { "enabled" } else { "disabled" },
            self.table.len()
        );
    }

    async fn bootstrap(&mut self) {
        match self.host.query(&TabQuery::reclaimable()).await {
            Ok(tabs) => self.table.extend(tabs.into_iter().map(|tab| tab.id)),
            Err(e) => {
                tracing::warn!("Tab enumeration failed during enable: {}", e);
                self.metrics.record_query_failure();
            }
        }

        let settings = self.snapshot().await;
        self.arm(&settings);
    }

    /// One timer firing: snapshot, re-arm, then query the host off-task
    async fn fire(&mut self) {
        let settings = self.snapshot().await;
        self.arm(&settings);
        tracing::debug!("Sweep tick (generation {})", self.generation);

        let generation = self.generation;
        let host = Arc::clone(&self.host);
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = host.query(&TabQuery::reclaimable()).await;
            let _ = tx.send(Completion::Swept {
                generation,
                settings,
                result,
            });
        });
    }

    fn finish_sweep(
        &mut self,
        generation: u64,
        settings: Settings,
        result: Result<Vec<TabInfo>, HostError>,
    ) {
        if generation != self.generation || !self.enabled {
            tracing::debug!("Dropping sweep result from generation {}", generation);
            self.metrics.record_stale_result();
            return;
        }

        let tabs = match result {
            Ok(tabs) => tabs,
            Err(e) => {
                tracing::warn!("Tab enumeration failed, skipping sweep: {}", e);
                self.metrics.record_query_failure();
                return;
            }
        };

        let outcome = EvictionPolicy::from_settings(&settings).sweep(&mut self.table, &tabs);
        self.metrics.record_sweep(&outcome);
        tracing::debug!(
            "Sweep completed: {} reset, {} aged, {} skipped, {} to reclaim",
            outcome.reset,
            outcome.aged,
            outcome.skipped,
            outcome.reclaim.len()
        );

        for id in outcome.reclaim {
            self.reclaim(id);
        }
    }

    /// Issue the discard for a tab already removed from the table
    fn reclaim(&self, id: TabId) {
        tracing::debug!("Discarding idle tab {}", id);
        let host = Arc::clone(&self.host);
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = host.discard(id).await;
            let _ = tx.send(Completion::Discarded { id, result });
        });
    }

    fn arm(&mut self, settings: &Settings) {
        self.timer = Some(Box::pin(sleep(settings.tick())));
    }

    /// Fresh settings snapshot; storage failures fall back to defaults
    async fn snapshot(&self) -> Settings {
        let read = self
            .settings
            .get(&SettingKey::ALL)
            .await
            .and_then(|values| Settings::from_values(&values, &Settings::default()));

        read.unwrap_or_else(|e| {
            tracing::warn!("Settings read failed, using defaults: {}", e);
            Settings::default()
        })
    }
}

async fn next_firing(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tabnap_store::MemorySettingsStore;

    #[derive(Clone, Copy)]
    enum DiscardMode {
        Discard,
        Refuse,
        Fail,
    }

    // Mock host for testing
    struct MockHost {
        tabs: Mutex<Vec<TabInfo>>,
        discards: Mutex<Vec<TabId>>,
        mode: Mutex<DiscardMode>,
        query_delay: Mutex<Option<Duration>>,
        queries: AtomicUsize,
    }

    impl MockHost {
        fn new(tabs: Vec<TabInfo>) -> Self {
            Self {
                tabs: Mutex::new(tabs),
                discards: Mutex::new(Vec::new()),
                mode: Mutex::new(DiscardMode::Discard),
                query_delay: Mutex::new(None),
                queries: AtomicUsize::new(0),
            }
        }

        fn discards(&self) -> Vec<TabId> {
            self.discards.lock().unwrap().clone()
        }

        fn queries(&self) -> usize {
            self.queries.load(Ordering::SeqCst)
        }

        fn set_mode(&self, mode: DiscardMode) {
            *self.mode.lock().unwrap() = mode;
        }

        fn set_query_delay(&self, delay: Duration) {
            *self.query_delay.lock().unwrap() = Some(delay);
        }

        fn set_tabs(&self, tabs: Vec<TabInfo>) {
            *self.tabs.lock().unwrap() = tabs;
        }
    }

    #[async_trait]
    impl TabHost for MockHost {
        async fn query(&self, query: &TabQuery) -> Result<Vec<TabInfo>, HostError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            // Answer reflects the moment of the call, not of the reply
            let tabs: Vec<TabInfo> = self
                .tabs
                .lock()
                .unwrap()
                .iter()
                .filter(|t| query.matches(t))
                .cloned()
                .collect();
            let delay = *self.query_delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Ok(tabs)
        }

        async fn discard(&self, id: TabId) -> Result<Option<TabInfo>, HostError> {
            self.discards.lock().unwrap().push(id);
            let mode = *self.mode.lock().unwrap();
            match mode {
                DiscardMode::Fail => Err(HostError::Call("discard refused".to_string())),
                DiscardMode::Refuse => Ok(None),
                DiscardMode::Discard => {
                    let mut tabs = self.tabs.lock().unwrap();
                    let tab = tabs
                        .iter_mut()
                        .find(|t| t.id == id)
                        .ok_or(HostError::UnknownTab(id))?;
                    tab.discarded = true;
                    Ok(Some(tab.clone()))
                }
            }
        }
    }

    #[derive(Default)]
    struct RecordingIndicator {
        states: Mutex<Vec<IndicatorState>>,
    }

    impl RecordingIndicator {
        fn states(&self) -> Vec<IndicatorState> {
            self.states.lock().unwrap().clone()
        }
    }

    impl Indicator for RecordingIndicator {
        fn show(&self, state: IndicatorState) {
            self.states.lock().unwrap().push(state);
        }
    }

    fn id(n: u64) -> TabId {
        TabId::new(n)
    }

    fn settings(timeout_secs: u64, tick_secs: u64) -> Settings {
        Settings {
            active: true,
            timeout_secs,
            tick_secs,
            skip_pinned: true,
        }
    }

    struct Harness {
        handle: ReclaimerHandle,
        join: JoinHandle<()>,
        host: Arc<MockHost>,
        store: Arc<MemorySettingsStore>,
        indicator: Arc<RecordingIndicator>,
    }

    fn start(settings: Settings, tabs: Vec<TabInfo>) -> Harness {
        let host = Arc::new(MockHost::new(tabs));
        let store = Arc::new(MemorySettingsStore::with_settings(settings));
        let indicator = Arc::new(RecordingIndicator::default());
        let (handle, join) = ReclaimerWorker::spawn(store.clone(), host.clone(), indicator.clone());
        Harness {
            handle,
            join,
            host,
            store,
            indicator,
        }
    }

    fn idle_of(status: &ReclaimerStatus, n: u64) -> Option<u64> {
        status.entries.iter().find(|e| e.id == id(n)).map(|e| e.idle_secs)
    }

    async fn advance(secs: u64) {
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_seeds_table() {
        let h = start(settings(900, 60), vec![TabInfo::new(id(1)), TabInfo::new(id(2))]);

        let status = h.handle.status().await.unwrap();
        assert!(status.enabled);
        assert_eq!(status.entries, vec![IdleEntry::new(id(1)), IdleEntry::new(id(2))]);
        assert_eq!(h.indicator.states(), vec![IndicatorState::Active]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_skips_already_discarded_tabs() {
        let mut gone = TabInfo::new(id(2));
        gone.discarded = true;
        let h = start(settings(900, 60), vec![TabInfo::new(id(1)), gone]);

        let status = h.handle.status().await.unwrap();
        assert_eq!(status.entries, vec![IdleEntry::new(id(1))]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scenario_timeout_two_ticks() {
        let h = start(
            settings(120, 60),
            vec![
                TabInfo::new(id(1)),
                TabInfo::new(id(2)).with_pinned(true),
                TabInfo::new(id(3)).with_active(true),
            ],
        );
        h.handle.status().await.unwrap();

        advance(61).await;
        let status = h.handle.status().await.unwrap();
        assert_eq!(idle_of(&status, 1), Some(60));
        assert_eq!(idle_of(&status, 2), Some(0));
        assert_eq!(idle_of(&status, 3), Some(0));
        assert!(h.host.discards().is_empty());

        // Focus moves away from tab 3 before the second sweep
        h.host.set_tabs(vec![
            TabInfo::new(id(1)),
            TabInfo::new(id(2)).with_pinned(true),
            TabInfo::new(id(3)),
        ]);

        advance(60).await;
        let status = h.handle.status().await.unwrap();
        assert_eq!(idle_of(&status, 1), None);
        assert_eq!(idle_of(&status, 2), Some(0));
        assert_eq!(idle_of(&status, 3), Some(60));
        assert_eq!(h.host.discards(), vec![id(1)]);
        assert_eq!(status.metrics.reclaimed, 1);
        assert_eq!(status.metrics.sweep_count, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disable_cancels_pending_sweep() {
        let h = start(settings(60, 60), vec![TabInfo::new(id(1))]);
        h.handle.status().await.unwrap();
        assert_eq!(h.host.queries(), 1);

        advance(30).await;
        h.handle.set_enabled(false).await.unwrap();

        advance(600).await;
        let status = h.handle.status().await.unwrap();
        assert!(!status.enabled);
        assert!(status.entries.is_empty());
        assert_eq!(h.host.queries(), 1);
        assert!(h.host.discards().is_empty());
        assert_eq!(
            h.indicator.states(),
            vec![IndicatorState::Active, IndicatorState::Inactive]
        );
        assert!(!h.store.snapshot().unwrap().active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reenable_is_fresh_bootstrap() {
        let h = start(settings(900, 60), vec![TabInfo::new(id(1)), TabInfo::new(id(2))]);
        advance(121).await;
        let status = h.handle.status().await.unwrap();
        assert_eq!(idle_of(&status, 1), Some(120));

        h.handle.set_enabled(false).await.unwrap();
        h.host.set_tabs(vec![TabInfo::new(id(2)), TabInfo::new(id(3))]);
        h.handle.set_enabled(true).await.unwrap();

        let status = h.handle.status().await.unwrap();
        assert!(status.enabled);
        assert_eq!(status.entries, vec![IdleEntry::new(id(2)), IdleEntry::new(id(3))]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enable_while_enabled_restarts_tracking() {
        let h = start(settings(180, 60), vec![TabInfo::new(id(1))]);
        advance(121).await;
        let status = h.handle.status().await.unwrap();
        assert_eq!(idle_of(&status, 1), Some(120));

        h.handle.set_enabled(true).await.unwrap();
        let status = h.handle.status().await.unwrap();
        assert!(status.enabled);
        assert_eq!(idle_of(&status, 1), Some(0));

        // The old cycle would have fired at 180s and reclaimed the tab
        advance(59).await;
        let status = h.handle.status().await.unwrap();
        assert_eq!(idle_of(&status, 1), Some(0));
        assert!(h.host.discards().is_empty());

        advance(2).await;
        let status = h.handle.status().await.unwrap();
        assert_eq!(idle_of(&status, 1), Some(60));
        assert_eq!(
            h.indicator.states(),
            vec![IndicatorState::Active, IndicatorState::Active]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_discard_failure_is_not_retried() {
        let h = start(settings(60, 60), vec![TabInfo::new(id(1))]);
        h.host.set_mode(DiscardMode::Fail);
        h.handle.status().await.unwrap();

        advance(61).await;
        let status = h.handle.status().await.unwrap();
        assert!(status.entries.is_empty());
        assert_eq!(status.metrics.discard_failed, 1);

        advance(300).await;
        assert_eq!(h.host.discards(), vec![id(1)]);
        assert!(h.handle.status().await.unwrap().entries.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refused_discard_is_not_retried() {
        let h = start(settings(60, 60), vec![TabInfo::new(id(1))]);
        h.host.set_mode(DiscardMode::Refuse);
        h.handle.status().await.unwrap();

        advance(200).await;
        let status = h.handle.status().await.unwrap();
        assert_eq!(h.host.discards(), vec![id(1)]);
        assert_eq!(status.metrics.not_discarded, 1);
        assert!(status.entries.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_signals() {
        let h = start(settings(900, 60), vec![TabInfo::new(id(1)), TabInfo::new(id(2))]);
        advance(61).await;

        h.handle.tab_activated(id(1)).unwrap();
        h.handle.tab_removed(id(2)).unwrap();
        h.handle.tab_created(id(3)).unwrap();

        let status = h.handle.status().await.unwrap();
        assert_eq!(status.entries, vec![IdleEntry::new(id(1)), IdleEntry::new(id(3))]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_removed_tab_never_discarded() {
        let h = start(settings(60, 60), vec![TabInfo::new(id(1))]);
        h.handle.tab_removed(id(1)).unwrap();

        // The host still lists it, but nothing tracks it any more
        advance(300).await;
        assert!(h.host.discards().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_ignored_while_disabled() {
        let h = start(
            Settings {
                active: false,
                ..settings(60, 60)
            },
            vec![TabInfo::new(id(1))],
        );

        h.handle.tab_created(id(5)).unwrap();
        h.handle.tab_activated(id(1)).unwrap();

        let status = h.handle.status().await.unwrap();
        assert!(!status.enabled);
        assert!(status.entries.is_empty());
        assert_eq!(h.indicator.states(), vec![IndicatorState::Inactive]);

        advance(300).await;
        assert_eq!(h.host.queries(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_flips_persisted_flag() {
        let h = start(settings(900, 60), vec![TabInfo::new(id(1))]);

        assert!(!h.handle.toggle().await.unwrap());
        assert!(!h.store.snapshot().unwrap().active);
        assert!(h.handle.status().await.unwrap().entries.is_empty());

        assert!(h.handle.toggle().await.unwrap());
        assert!(h.store.snapshot().unwrap().active);
        let status = h.handle.status().await.unwrap();
        assert_eq!(status.entries, vec![IdleEntry::new(id(1))]);
        assert_eq!(
            h.indicator.states(),
            vec![IndicatorState::Active, IndicatorState::Inactive, IndicatorState::Active]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_change_applies_from_next_firing() {
        let h = start(settings(900, 60), vec![TabInfo::new(id(1))]);
        h.handle.status().await.unwrap();

        advance(30).await;
        let mut values = SettingValues::new();
        values.insert(SettingKey::Tick, SettingValue::Seconds(10));
        h.store.set(values).await.unwrap();

        // The pending firing still happens at 60s
        advance(25).await;
        assert_eq!(h.host.queries(), 1);

        advance(10).await;
        assert_eq!(h.host.queries(), 2);
        let status = h.handle.status().await.unwrap();
        assert_eq!(idle_of(&status, 1), Some(10));

        // Re-armed with the new interval
        advance(10).await;
        assert_eq!(h.host.queries(), 3);
        let status = h.handle.status().await.unwrap();
        assert_eq!(idle_of(&status, 1), Some(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unavailable_settings_fall_back_to_defaults() {
        let host = Arc::new(MockHost::new(vec![TabInfo::new(id(1))]));
        let store = Arc::new(MemorySettingsStore::new());
        store.set_unavailable(true);
        let indicator = Arc::new(RecordingIndicator::default());
        let (handle, _join) = ReclaimerWorker::spawn(store, host.clone(), indicator);

        let status = handle.status().await.unwrap();
        assert!(status.enabled);
        assert_eq!(status.entries.len(), 1);

        // Default tick is 60s
        advance(61).await;
        assert_eq!(host.queries(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_sweep_result_dropped_after_disable() {
        let h = start(settings(60, 60), vec![TabInfo::new(id(1))]);
        h.handle.status().await.unwrap();
        h.host.set_query_delay(Duration::from_secs(100));

        // Sweep fires at 60s, its enumeration resolves at 160s
        advance(90).await;
        h.handle.set_enabled(false).await.unwrap();

        advance(200).await;
        let status = h.handle.status().await.unwrap();
        assert_eq!(status.metrics.stale_results, 1);
        assert_eq!(status.metrics.sweep_count, 0);
        assert!(h.host.discards().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_sweeps_reclaim_once() {
        let h = start(settings(60, 60), vec![TabInfo::new(id(1))]);
        h.handle.status().await.unwrap();
        h.host.set_query_delay(Duration::from_secs(150));

        // Firings at 60, 120, 180, ... each resolve 150s later; the second
        // one still lists tab 1 as loaded.
        advance(400).await;
        assert_eq!(h.host.discards(), vec![id(1)]);
        let status = h.handle.status().await.unwrap();
        assert_eq!(status.metrics.reclaimed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_worker() {
        let h = start(settings(900, 60), vec![]);
        h.handle.shutdown().await.unwrap();
        h.join.await.unwrap();

        assert!(!h.handle.is_running());
        assert!(matches!(h.handle.tab_created(id(1)), Err(ReclaimerError::Stopped)));
        assert!(matches!(h.handle.status().await, Err(ReclaimerError::Stopped)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_every_handle_stops_worker() {
        let h = start(settings(900, 60), vec![]);
        h.handle.status().await.unwrap();
        drop(h.handle);
        h.join.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_metrics() {
        let h = start(settings(60, 60), vec![TabInfo::new(id(1))]);
        advance(61).await;
        assert_eq!(h.handle.status().await.unwrap().metrics.sweep_count, 1);

        h.handle.reset_metrics().unwrap();
        assert_eq!(h.handle.status().await.unwrap().metrics, ReclaimerMetrics::default());
    }
}
