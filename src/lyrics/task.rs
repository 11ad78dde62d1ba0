//! A single in-flight lyric search.
//!
//! A [`SearchTask`] is created and owned by the dispatcher. Once started it
//! runs on the tokio runtime, queries every provider concurrently, and sends
//! at most one `ResultsFound` and at most one `LyricsReady` back over the
//! dispatcher's report channel. Provider failures are logged and swallowed: a
//! task whose providers all fail ends without reporting anything.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::join_all;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::domain::{LyricsCandidate, SearchOutcome, SearchRequest};
use super::traits::LyricsProvider;

/// Providers shared by every task of a dispatcher, in preference order.
pub type ProviderSet = Arc<[Arc<dyn LyricsProvider>]>;

/// Lifecycle of a search task. Cancellation is tracked separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Created,
    Started,
    Finished,
}

/// A report sent from a running task back to its dispatcher.
#[derive(Debug, Clone)]
pub struct TaskReport {
    pub outcome: SearchOutcome,
    /// No further reports will follow from this task
    pub terminal: bool,
}

impl TaskReport {
    pub fn id(&self) -> u64 {
        self.outcome.id()
    }
}

/// Handle to one search, owned by the dispatcher.
pub struct SearchTask {
    request: SearchRequest,
    state: TaskState,
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    started_at: Option<Instant>,
    results_reported: bool,
    lyrics_reported: bool,
}

impl SearchTask {
    pub fn new(request: SearchRequest) -> Self {
        Self {
            request,
            state: TaskState::Created,
            cancelled: Arc::new(AtomicBool::new(false)),
            handle: None,
            started_at: None,
            results_reported: false,
            lyrics_reported: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.request.id
    }

    pub fn request(&self) -> &SearchRequest {
        &self.request
    }

    /// Current lifecycle state. A started task whose future has ended is
    /// reported as finished.
    pub fn state(&self) -> TaskState {
        match self.state {
            TaskState::Started if self.is_finished() => TaskState::Finished,
            state => state,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Whether the task's future has ended (normally, by failure, or aborted).
    pub fn is_finished(&self) -> bool {
        match self.handle {
            Some(ref handle) => handle.is_finished(),
            None => self.state == TaskState::Finished,
        }
    }

    /// When the task was started.
    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// Spawn the search on the current tokio runtime.
    ///
    /// Starting a task twice, or starting a cancelled task, does nothing.
    pub fn start(&mut self, providers: ProviderSet, reports: mpsc::UnboundedSender<TaskReport>) {
        if self.state != TaskState::Created || self.is_cancelled() {
            return;
        }
        let reporter = Reporter {
            id: self.request.id,
            cancelled: Arc::clone(&self.cancelled),
            reports,
        };
        let request = self.request.clone();
        self.handle = Some(tokio::spawn(run_search(request, providers, reporter)));
        self.started_at = Some(Instant::now());
        self.state = TaskState::Started;
    }

    /// Stop the task. No report is sent after this returns.
    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(ref handle) = self.handle {
            handle.abort();
        }
        self.state = TaskState::Finished;
    }

    /// Record a report received for this task.
    ///
    /// Returns `false` if the same milestone was already reported, in which
    /// case the report must be dropped.
    pub fn record(&mut self, outcome: &SearchOutcome) -> bool {
        let seen = match outcome {
            SearchOutcome::ResultsFound { .. } => &mut self.results_reported,
            SearchOutcome::LyricsReady { .. } => &mut self.lyrics_reported,
        };
        if *seen {
            return false;
        }
        *seen = true;
        true
    }
}

impl Drop for SearchTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for SearchTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchTask")
            .field("id", &self.request.id)
            .field("state", &self.state())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Sending half held by the running future.
struct Reporter {
    id: u64,
    cancelled: Arc<AtomicBool>,
    reports: mpsc::UnboundedSender<TaskReport>,
}

impl Reporter {
    /// Returns `false` when the task has been cancelled or the dispatcher is gone.
    fn send(&self, outcome: SearchOutcome, terminal: bool) -> bool {
        if self.cancelled.load(Ordering::Acquire) {
            return false;
        }
        self.reports.send(TaskReport { outcome, terminal }).is_ok()
    }
}

/// Candidate tagged with the index of the provider that returned it.
struct Ranked {
    provider: usize,
    candidate: LyricsCandidate,
}

async fn run_search(request: SearchRequest, providers: ProviderSet, reporter: Reporter) {
    let id = request.id;
    let query = request.query();

    let searches = providers.iter().map(|provider| provider.search(&query));
    let responses = join_all(searches).await;

    let mut answered = false;
    let mut merged = Vec::new();
    for (index, response) in responses.into_iter().enumerate() {
        let kind = providers[index].kind();
        match response {
            Ok(candidates) => {
                answered = true;
                debug!(id, provider = %kind, count = candidates.len(), "provider answered");
                merged.extend(candidates.into_iter().map(|candidate| Ranked {
                    provider: index,
                    candidate,
                }));
            }
            Err(e) => {
                warn!(id, provider = %kind, "lyrics search failed: {}", e);
            }
        }
    }

    if !answered {
        debug!(id, "no provider answered, search ends without a report");
        return;
    }

    let ranked = rank(merged);
    let inline = ranked
        .iter()
        .find_map(|r| r.candidate.lyrics.as_deref().filter(|t| !t.trim().is_empty()))
        .map(str::to_string);
    let best = ranked.first().map(|r| (r.provider, r.candidate.clone()));
    let results = ranked.into_iter().map(|r| r.candidate).collect();

    if !reporter.send(SearchOutcome::ResultsFound { id, results }, best.is_none()) {
        return;
    }

    // Inline text from any ranked candidate beats a fetch for the top one
    if let Some(lyrics) = inline {
        reporter.send(SearchOutcome::LyricsReady { id, lyrics }, true);
        return;
    }

    let Some((index, best)) = best else {
        return;
    };

    let lyrics = match providers[index].fetch_lyrics(&best).await {
        Ok(text) => text.filter(|t| !t.trim().is_empty()),
        Err(e) => {
            warn!(id, provider = %best.provider, "lyrics fetch failed: {}", e);
            None
        }
    };

    match lyrics {
        Some(lyrics) => {
            reporter.send(SearchOutcome::LyricsReady { id, lyrics }, true);
        }
        None => debug!(id, "no candidate has lyrics text"),
    }
}

/// Order candidates by score, best first. Ties keep provider order, then the
/// provider's own order.
fn rank(mut merged: Vec<Ranked>) -> Vec<Ranked> {
    // sort_by is stable, and `merged` is already in (provider, position) order
    merged.sort_by(|a, b| b.candidate.score.total_cmp(&a.candidate.score));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::domain::{ProviderError, ProviderKind};
    use crate::lyrics::traits::mocks::MockProvider;
    use crate::test_utils::{mock_candidate, mock_request};
    use std::time::Duration;
    use tokio::sync::Semaphore;

    fn providers(list: Vec<Arc<dyn LyricsProvider>>) -> ProviderSet {
        Arc::from(list)
    }

    async fn collect(rx: &mut mpsc::UnboundedReceiver<TaskReport>) -> Vec<TaskReport> {
        let mut reports = Vec::new();
        while let Some(report) = rx.recv().await {
            reports.push(report);
        }
        reports
    }

    #[tokio::test]
    async fn test_reports_results_then_lyrics() {
        let mut candidate = mock_candidate(ProviderKind::Lrclib, "Something", 0.9);
        candidate.lyrics = Some("Something in the way she moves".to_string());
        let mock = Arc::new(MockProvider::with_candidates(vec![candidate]));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut task = SearchTask::new(mock_request(1));
        assert_eq!(task.state(), TaskState::Created);
        task.start(providers(vec![mock.clone()]), tx);
        assert!(task.started_at().is_some());

        let reports = collect(&mut rx).await;
        assert_eq!(reports.len(), 2);
        assert!(matches!(
            reports[0].outcome,
            SearchOutcome::ResultsFound { id: 1, ref results } if results.len() == 1
        ));
        assert!(!reports[0].terminal);
        assert!(matches!(
            reports[1].outcome,
            SearchOutcome::LyricsReady { id: 1, ref lyrics } if lyrics.starts_with("Something")
        ));
        assert!(reports[1].terminal);
    }

    #[tokio::test]
    async fn test_empty_results_are_terminal() {
        let mock = Arc::new(MockProvider::no_matches());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut task = SearchTask::new(mock_request(3));
        task.start(providers(vec![mock]), tx);

        let reports = collect(&mut rx).await;
        assert_eq!(reports.len(), 1);
        assert!(reports[0].terminal);
        assert!(matches!(
            reports[0].outcome,
            SearchOutcome::ResultsFound { id: 3, ref results } if results.is_empty()
        ));
    }

    #[tokio::test]
    async fn test_fetches_lyrics_when_not_inline() {
        let mock = Arc::new(
            MockProvider::with_candidates(vec![mock_candidate(ProviderKind::Lrclib, "Song", 0.5)])
                .with_fetched_lyrics("fetched text"),
        );
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut task = SearchTask::new(mock_request(4));
        task.start(providers(vec![mock.clone()]), tx);

        let reports = collect(&mut rx).await;
        assert_eq!(reports.len(), 2);
        assert_eq!(mock.fetch_calls(), 1);
        assert!(matches!(
            reports[1].outcome,
            SearchOutcome::LyricsReady { ref lyrics, .. } if lyrics == "fetched text"
        ));
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_results_non_terminal() {
        let mock = Arc::new(
            MockProvider::with_candidates(vec![mock_candidate(ProviderKind::Lrclib, "Song", 0.5)])
                .with_fetch_error(ProviderError::Timeout),
        );
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut task = SearchTask::new(mock_request(5));
        task.start(providers(vec![mock]), tx);

        let reports = collect(&mut rx).await;
        assert_eq!(reports.len(), 1);
        assert!(!reports[0].terminal);
    }

    #[tokio::test]
    async fn test_all_providers_failing_reports_nothing() {
        let failing = Arc::new(MockProvider::with_error(ProviderError::Network(
            "unreachable".to_string(),
        )));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut task = SearchTask::new(mock_request(6));
        task.start(providers(vec![failing]), tx);

        assert!(collect(&mut rx).await.is_empty());
        assert!(task.is_finished());
        assert_eq!(task.state(), TaskState::Finished);
    }

    #[tokio::test]
    async fn test_one_failing_provider_does_not_hide_others() {
        let failing: Arc<dyn LyricsProvider> =
            Arc::new(MockProvider::with_error(ProviderError::RateLimited));
        let working: Arc<dyn LyricsProvider> = Arc::new(
            MockProvider::with_candidates(vec![mock_candidate(ProviderKind::LyricsOvh, "A", 0.4)])
                .kind_of(ProviderKind::LyricsOvh),
        );
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut task = SearchTask::new(mock_request(7));
        task.start(providers(vec![failing, working]), tx);

        let reports = collect(&mut rx).await;
        assert!(matches!(
            reports[0].outcome,
            SearchOutcome::ResultsFound { ref results, .. }
                if results.len() == 1 && results[0].provider == ProviderKind::LyricsOvh
        ));
    }

    #[tokio::test]
    async fn test_merged_ranking_breaks_ties_by_provider_order() {
        let first: Arc<dyn LyricsProvider> = Arc::new(MockProvider::with_candidates(vec![
            mock_candidate(ProviderKind::Lrclib, "first-low", 0.2),
            mock_candidate(ProviderKind::Lrclib, "first-tie", 0.8),
        ]));
        let second: Arc<dyn LyricsProvider> = Arc::new(
            MockProvider::with_candidates(vec![
                mock_candidate(ProviderKind::LyricsOvh, "second-top", 0.95),
                mock_candidate(ProviderKind::LyricsOvh, "second-tie", 0.8),
            ])
            .kind_of(ProviderKind::LyricsOvh),
        );
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut task = SearchTask::new(mock_request(8));
        task.start(providers(vec![first, second]), tx);

        let reports = collect(&mut rx).await;
        let SearchOutcome::ResultsFound { ref results, .. } = reports[0].outcome else {
            panic!("expected results first");
        };
        let titles: Vec<_> = results.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["second-top", "first-tie", "second-tie", "first-low"]);
    }

    #[tokio::test]
    async fn test_inline_lyrics_of_lower_candidate_skip_fetch() {
        // Top match carries no text (instrumental record), a weaker one does
        let top: Arc<MockProvider> = Arc::new(MockProvider::with_candidates(vec![
            mock_candidate(ProviderKind::Lrclib, "Song", 0.9),
        ]));
        let mut lower = mock_candidate(ProviderKind::LyricsOvh, "Song", 0.6);
        lower.lyrics = Some("words from lyrics.ovh".to_string());
        let other: Arc<dyn LyricsProvider> = Arc::new(
            MockProvider::with_candidates(vec![lower]).kind_of(ProviderKind::LyricsOvh),
        );

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut task = SearchTask::new(mock_request(13));
        let top_dyn: Arc<dyn LyricsProvider> = top.clone();
        task.start(providers(vec![top_dyn, other]), tx);

        let reports = collect(&mut rx).await;
        assert_eq!(reports.len(), 2);
        assert!(!reports[0].terminal);
        assert!(matches!(
            reports[1].outcome,
            SearchOutcome::LyricsReady { id: 13, ref lyrics } if lyrics == "words from lyrics.ovh"
        ));
        assert!(reports[1].terminal);
        assert_eq!(top.fetch_calls(), 0);
    }

    #[test]
    fn test_rank_tolerates_nan_scores() {
        let merged = [f32::NAN, 0.5, 0.9]
            .into_iter()
            .map(|score| Ranked {
                provider: 0,
                candidate: mock_candidate(ProviderKind::Lrclib, "Song", score),
            })
            .collect();

        let ranked = rank(merged);
        let scores: Vec<f32> = ranked
            .iter()
            .map(|r| r.candidate.score)
            .filter(|s| !s.is_nan())
            .collect();
        assert_eq!(ranked.len(), 3);
        assert_eq!(scores, vec![0.9, 0.5]);
    }

    #[tokio::test]
    async fn test_queries_every_provider_with_request_fields() {
        let a = Arc::new(MockProvider::no_matches());
        let b = Arc::new(MockProvider::no_matches().kind_of(ProviderKind::LyricsOvh));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut task = SearchTask::new(mock_request(9));
        task.start(providers(vec![a.clone(), b.clone()]), tx);
        collect(&mut rx).await;

        assert_eq!(a.search_calls(), 1);
        assert_eq!(b.search_calls(), 1);
        assert_eq!(a.queries()[0], mock_request(9).query());
    }

    #[tokio::test]
    async fn test_cancel_suppresses_reports() {
        let gate = Arc::new(Semaphore::new(0));
        let mock = Arc::new(MockProvider::gated(gate.clone()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut task = SearchTask::new(mock_request(10));
        task.start(providers(vec![mock]), tx);

        task.cancel();
        gate.add_permits(1);
        assert!(task.is_cancelled());
        assert_eq!(task.state(), TaskState::Finished);
        assert!(collect(&mut rx).await.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_task_does_not_start() {
        let mock = Arc::new(MockProvider::no_matches());
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut task = SearchTask::new(mock_request(11));
        task.cancel();
        task.start(providers(vec![mock.clone()]), tx);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(mock.search_calls(), 0);
    }

    #[test]
    fn test_record_rejects_duplicates() {
        let mut task = SearchTask::new(mock_request(12));
        let found = SearchOutcome::ResultsFound {
            id: 12,
            results: vec![],
        };
        let ready = SearchOutcome::LyricsReady {
            id: 12,
            lyrics: "x".to_string(),
        };
        assert!(task.record(&found));
        assert!(!task.record(&found));
        assert!(task.record(&ready));
        assert!(!task.record(&ready));
    }
}
