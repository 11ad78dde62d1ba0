//! Bounded-concurrency lyric search dispatcher.
//!
//! The dispatcher owns a FIFO queue of pending requests and at most
//! [`MAX_CONCURRENT`] active [`SearchTask`]s keyed by request id. It is a
//! single-owner object: `submit`, `cancel_all` and `next_outcome` all take
//! `&mut self`, and tasks only ever talk back to it through a report channel
//! that the owner drains.
//!
//! Admission runs eagerly after every submission and every terminal report.
//! A periodic sweep ([`SWEEP_INTERVAL`]) also runs admission while requests
//! are waiting; it reclaims slots held by tasks that ended without a terminal
//! report, which is how a silently failed search gives its slot back.
//!
//! # Usage
//!
//! ```ignore
//! let mut dispatcher = Dispatcher::new(providers);
//! let id = dispatcher.submit("The Beatles", "Abbey Road (Remastered)", "Something");
//!
//! while let Some(outcome) = dispatcher.next_outcome().await {
//!     match outcome {
//!         SearchOutcome::ResultsFound { id, results } => { /* ... */ }
//!         SearchOutcome::LyricsReady { id, lyrics } => { /* ... */ }
//!     }
//! }
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, trace};

use super::domain::{SearchOutcome, SearchRequest};
use super::normalize::NoiseRules;
use super::task::{ProviderSet, SearchTask, TaskReport};
use super::traits::LyricsProvider;

/// Maximum number of searches in flight at once.
pub const MAX_CONCURRENT: usize = 5;

/// Cadence of the safety-net admission sweep.
pub const SWEEP_INTERVAL: Duration = Duration::from_millis(500);

/// Optional dispatcher behavior.
#[derive(Debug, Clone, Default)]
pub struct DispatcherConfig {
    /// Cancel searches that have been active longer than this, freeing their
    /// slot without reporting. Off by default. When set, the sweep also stays
    /// armed while any search is active.
    pub task_timeout: Option<Duration>,
}

/// Queues lyric searches and runs at most [`MAX_CONCURRENT`] of them at once.
///
/// Must be used from within a tokio runtime.
pub struct Dispatcher {
    providers: ProviderSet,
    rules: NoiseRules,
    config: DispatcherConfig,
    next_id: u64,
    pending: VecDeque<SearchRequest>,
    active: HashMap<u64, SearchTask>,
    reports_tx: mpsc::UnboundedSender<TaskReport>,
    reports_rx: mpsc::UnboundedReceiver<TaskReport>,
    ready: VecDeque<SearchOutcome>,
    sweep: Option<Interval>,
}

impl Dispatcher {
    /// Create a dispatcher over the given providers with default settings.
    pub fn new(providers: Vec<Arc<dyn LyricsProvider>>) -> Self {
        Self::with_config(providers, DispatcherConfig::default())
    }

    pub fn with_config(providers: Vec<Arc<dyn LyricsProvider>>, config: DispatcherConfig) -> Self {
        let (reports_tx, reports_rx) = mpsc::unbounded_channel();
        Self {
            providers: Arc::from(providers),
            rules: NoiseRules::default(),
            config,
            next_id: 0,
            pending: VecDeque::new(),
            active: HashMap::new(),
            reports_tx,
            reports_rx,
            ready: VecDeque::new(),
            sweep: None,
        }
    }

    /// Replace the noise-token table used to normalize album and title.
    pub fn with_rules(mut self, rules: NoiseRules) -> Self {
        self.rules = rules;
        self
    }

    /// Queue a search and return its id.
    ///
    /// Album and title are normalized; the artist is kept verbatim. Empty
    /// fields are accepted and passed through to the providers.
    pub fn submit(&mut self, artist: &str, album: &str, title: &str) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        let request = SearchRequest {
            id,
            artist: artist.to_string(),
            album: self.rules.normalize(album),
            title: self.rules.normalize(title),
        };
        debug!(id, artist = %request.artist, album = %request.album, title = %request.title, "search queued");

        self.pending.push_back(request);
        self.arm_sweep();
        self.admit();
        id
    }

    /// Drop every queued request and cancel every active search.
    ///
    /// Nothing is reported for any id issued before this call, including
    /// outcomes already received but not yet handed out.
    pub fn cancel_all(&mut self) {
        let queued = self.pending.len();
        let running = self.active.len();
        self.pending.clear();
        for (_, mut task) in self.active.drain() {
            task.cancel();
        }
        self.ready.clear();
        while self.reports_rx.try_recv().is_ok() {}
        self.sweep = None;
        if queued + running > 0 {
            info!(queued, running, "cancelled all lyric searches");
        }
    }

    /// Wait for the next outcome.
    ///
    /// Returns `None` once nothing is queued or active. A search whose
    /// providers all fail never produces an outcome, so callers that need a
    /// bound should wrap this in their own timeout.
    pub async fn next_outcome(&mut self) -> Option<SearchOutcome> {
        loop {
            if let Some(outcome) = self.ready.pop_front() {
                return Some(outcome);
            }
            if self.is_idle() {
                return None;
            }
            tokio::select! {
                report = self.reports_rx.recv() => match report {
                    Some(report) => self.handle_report(report),
                    None => return None,
                },
                _ = tick(&mut self.sweep) => self.sweep_once(),
            }
        }
    }

    /// Process a report from a search task.
    ///
    /// Reports for ids that are not active (cancelled, already finished, or
    /// unknown) and repeated milestones are dropped without any effect.
    pub fn handle_report(&mut self, report: TaskReport) {
        let id = report.id();
        let Some(task) = self.active.get_mut(&id) else {
            trace!(id, "dropping report for inactive search");
            return;
        };
        if !task.record(&report.outcome) {
            trace!(id, "dropping repeated report");
            return;
        }

        if report.terminal {
            self.active.remove(&id);
            debug!(id, "search finished");
            self.admit();
        }
        self.ready.push_back(report.outcome);
    }

    /// Run one safety-net pass: take in any queued reports, reclaim slots of
    /// searches that ended or timed out, then admit. A no-op when idle.
    pub fn sweep_once(&mut self) {
        // Snapshot before draining: a finished handle has already made every
        // send it will make, so its reports are in the channel by now.
        let finished: Vec<u64> = self
            .active
            .values()
            .filter(|task| task.is_finished())
            .map(SearchTask::id)
            .collect();

        while let Ok(report) = self.reports_rx.try_recv() {
            self.handle_report(report);
        }

        for id in finished {
            if let Some(mut task) = self.active.remove(&id) {
                trace!(?task, "reclaiming slot of search that ended without finishing");
                task.cancel();
            }
        }

        if let Some(limit) = self.config.task_timeout {
            let now = Instant::now();
            let expired: Vec<u64> = self
                .active
                .values()
                .filter(|task| {
                    task.started_at()
                        .is_some_and(|started| now.duration_since(started) >= limit)
                })
                .map(SearchTask::id)
                .collect();

            for id in expired {
                if let Some(mut task) = self.active.remove(&id) {
                    debug!(id, state = ?task.state(), "search timed out");
                    task.cancel();
                }
            }
        }

        self.admit();
    }

    /// Number of queued, not yet started requests.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Number of searches in flight.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Ids waiting in the queue, head first.
    pub fn pending_ids(&self) -> Vec<u64> {
        self.pending.iter().map(|r| r.id).collect()
    }

    /// Ids in flight, ascending.
    pub fn active_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.active.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn is_active(&self, id: u64) -> bool {
        self.active.contains_key(&id)
    }

    /// The queued request with this id, if it has not started yet.
    pub fn pending_request(&self, id: u64) -> Option<&SearchRequest> {
        self.pending.iter().find(|r| r.id == id)
    }

    /// The request behind an active search.
    pub fn active_request(&self, id: u64) -> Option<&SearchRequest> {
        self.active.get(&id).map(SearchTask::request)
    }

    /// Whether the periodic sweep is currently armed.
    pub fn is_sweep_armed(&self) -> bool {
        self.sweep.is_some()
    }

    /// Nothing queued, nothing running and no outcome waiting.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.active.is_empty() && self.ready.is_empty()
    }

    /// Move requests from the queue into the active set while capacity allows.
    fn admit(&mut self) {
        let mut started = 0;
        while self.active.len() < MAX_CONCURRENT {
            let Some(request) = self.pending.pop_front() else {
                break;
            };
            let id = request.id;
            let mut task = SearchTask::new(request);
            task.start(Arc::clone(&self.providers), self.reports_tx.clone());
            self.active.insert(id, task);
            started += 1;
        }
        if started > 0 {
            debug!(
                started,
                active = self.active.len(),
                pending = self.pending.len(),
                "admitted lyric searches"
            );
        }

        let keep_armed = !self.pending.is_empty()
            || (self.config.task_timeout.is_some() && !self.active.is_empty());
        if !keep_armed {
            self.sweep = None;
        }
    }

    fn arm_sweep(&mut self) {
        if self.sweep.is_none() {
            let mut sweep = tokio::time::interval_at(Instant::now() + SWEEP_INTERVAL, SWEEP_INTERVAL);
            sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.sweep = Some(sweep);
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        for (_, mut task) in self.active.drain() {
            task.cancel();
        }
    }
}

/// Resolves on the next sweep tick, or never when the sweep is disarmed.
async fn tick(sweep: &mut Option<Interval>) {
    match sweep {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
