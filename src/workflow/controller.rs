use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    analysis::Analyzer,
    intake::{self, FileCandidate, MediaReference},
    result::AnalysisVerdict,
    settings::AnalyzerSettings,
};

use super::{WorkflowError, WorkflowNotice, WorkflowPhase, WorkflowSnapshot, WorkflowState};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

struct WorkflowInner {
    state: WorkflowState,
    notice: Option<WorkflowNotice>,
    revision: u64,
    shut_down: bool,
}

impl WorkflowInner {
    fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot::new(&self.state, self.notice.as_ref(), self.revision)
    }
}

struct AnalysisTask {
    media_id: Uuid,
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

/// Owns the workflow state and drives the analyzer.
///
/// Cloning yields another handle to the same workflow.
#[derive(Clone)]
pub struct WorkflowController {
    inner: Arc<Mutex<WorkflowInner>>,
    analyzer: Arc<dyn Analyzer>,
    analysis_timeout: Option<Duration>,
    task: Arc<Mutex<Option<AnalysisTask>>>,
    updates: Arc<watch::Sender<WorkflowSnapshot>>,
}

impl WorkflowController {
    /// A zero `analysis_timeout_ms` leaves analysis calls unbounded.
    pub fn new(analyzer: Arc<dyn Analyzer>, settings: &AnalyzerSettings) -> Self {
        let inner = WorkflowInner {
            state: WorkflowState::default(),
            notice: None,
            revision: 0,
            shut_down: false,
        };
        let (updates, _) = watch::channel(inner.snapshot());
        let timeout = settings.analysis_timeout();

        Self {
            inner: Arc::new(Mutex::new(inner)),
            analyzer,
            analysis_timeout: (!timeout.is_zero()).then_some(timeout),
            task: Arc::new(Mutex::new(None)),
            updates: Arc::new(updates),
        }
    }

    pub async fn snapshot(&self) -> WorkflowSnapshot {
        self.inner.lock().await.snapshot()
    }

    /// Receives a snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<WorkflowSnapshot> {
        self.updates.subscribe()
    }

    /// Validates and stores a new selection. A rejected file leaves the state
    /// as it was and raises a notice.
    pub async fn select_file(&self, candidate: FileCandidate) -> Result<MediaReference, WorkflowError> {
        let name = candidate.name.clone();
        let mut inner = self.inner.lock().await;
        if inner.shut_down {
            return Err(WorkflowError::ShutDown);
        }

        match intake::select_file(candidate) {
            Ok(media) => {
                if let WorkflowState::Analyzing { media: previous } = &inner.state {
                    log_info!(
                        "{} selected while {} was being analyzed; its result will be dropped",
                        media.name(),
                        previous.name()
                    );
                }
                inner.state.select(media.clone());
                inner.notice = None;
                publish(&mut inner, &self.updates);
                Ok(media)
            }
            Err(reason) => {
                log_warn!("Rejected {}: {}", name, reason);
                inner.notice = Some(WorkflowNotice::FileRejected {
                    name,
                    reason: reason.to_string(),
                });
                publish(&mut inner, &self.updates);
                Err(reason.into())
            }
        }
    }

    /// Starts analyzing the selected file. Only valid in `Ready`.
    pub async fn start(&self) -> Result<MediaReference, WorkflowError> {
        let mut inner = self.inner.lock().await;
        if inner.shut_down {
            return Err(WorkflowError::ShutDown);
        }
        let media = inner.state.begin_analysis()?;
        inner.notice = None;
        publish(&mut inner, &self.updates);

        log_info!(
            "Analyzing {} with the {} analyzer",
            media.name(),
            self.analyzer.name()
        );
        // Spawned before `inner` is released so task order matches start order.
        self.spawn_analysis(media.clone()).await;

        Ok(media)
    }

    /// Back to `Idle`. A result still in flight is dropped when it arrives.
    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state.phase() == WorkflowPhase::Idle && inner.notice.is_none() {
            return;
        }
        inner.state = WorkflowState::Idle;
        inner.notice = None;
        publish(&mut inner, &self.updates);
    }

    /// Cancels any running analysis and refuses further commands. A
    /// workflow caught mid-analysis is left in `Ready` with its media.
    pub async fn shutdown(&self) {
        {
            let mut inner = self.inner.lock().await;
            inner.shut_down = true;
            let analyzing = match &inner.state {
                WorkflowState::Analyzing { media } => Some(media.id()),
                _ => None,
            };
            if let Some(media_id) = analyzing {
                inner.state.fail(media_id);
                publish(&mut inner, &self.updates);
            }
        }

        let task = self.task.lock().await.take();
        if let Some(task) = task {
            task.cancel_token.cancel();
            if let Err(err) = task.handle.await {
                log_error!("analysis task failed to join: {err}");
            }
        }
        log_debug!("workflow shut down");
    }

    /// Resolves once the phase is anything but `Analyzing`.
    pub async fn wait_until_settled(&self) -> WorkflowSnapshot {
        let mut updates = self.subscribe();
        loop {
            let snapshot = updates.borrow_and_update().clone();
            if snapshot.phase != WorkflowPhase::Analyzing {
                return snapshot;
            }
            if updates.changed().await.is_err() {
                return self.snapshot().await;
            }
        }
    }

    /// Waits for the most recently spawned analysis task to finish, whether
    /// or not its result still applies.
    pub async fn join_analysis(&self) {
        let task = self.task.lock().await.take();
        if let Some(task) = task {
            if let Err(err) = task.handle.await {
                log_error!("analysis task failed to join: {err}");
            }
        }
    }

    async fn spawn_analysis(&self, media: MediaReference) {
        let mut task_guard = self.task.lock().await;
        if let Some(previous) = task_guard.take() {
            // Superseded: its outcome could never apply, so stop the call.
            if !previous.handle.is_finished() {
                log_debug!("cancelling superseded analysis {}", previous.media_id);
                previous.cancel_token.cancel();
            }
        }

        let cancel_token = CancellationToken::new();
        let media_id = media.id();
        let inner = self.inner.clone();
        let updates = self.updates.clone();
        let analyzer = self.analyzer.clone();
        let timeout = self.analysis_timeout;
        let token = cancel_token.clone();

        let handle = tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = token.cancelled() => {
                    log_debug!("analysis of {} cancelled", media.name());
                    return;
                }
                outcome = run_analyzer(analyzer.as_ref(), &media, timeout) => outcome,
            };

            apply_outcome(&inner, &updates, &media, outcome).await;
        });

        *task_guard = Some(AnalysisTask {
            media_id,
            handle,
            cancel_token,
        });
    }
}

async fn run_analyzer(
    analyzer: &dyn Analyzer,
    media: &MediaReference,
    timeout: Option<Duration>,
) -> Result<AnalysisVerdict, String> {
    let call = analyzer.analyze(media);
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => return Err(format!("timed out after {}ms", limit.as_millis())),
        },
        None => call.await,
    };

    result.map_err(|err| format!("{err:#}"))
}

async fn apply_outcome(
    inner: &Mutex<WorkflowInner>,
    updates: &watch::Sender<WorkflowSnapshot>,
    media: &MediaReference,
    outcome: Result<AnalysisVerdict, String>,
) {
    let mut guard = inner.lock().await;
    if guard.shut_down || !guard.state.is_analyzing(media.id()) {
        log_debug!(
            "discarding stale analysis result for {} ({})",
            media.name(),
            media.id()
        );
        return;
    }

    match outcome {
        Ok(verdict) => {
            log_info!(
                "Analysis of {} finished: manipulated={} confidence={:.2}",
                media.name(),
                verdict.is_manipulated(),
                verdict.confidence()
            );
            guard.state.complete(media.id(), verdict);
        }
        Err(message) => {
            log_warn!("Analysis of {} failed: {}", media.name(), message);
            guard.state.fail(media.id());
            guard.notice = Some(WorkflowNotice::AnalysisFailed {
                media_name: media.name().to_string(),
                message,
            });
        }
    }

    publish(&mut guard, updates);
}

fn publish(inner: &mut WorkflowInner, updates: &watch::Sender<WorkflowSnapshot>) {
    inner.revision = inner.revision.wrapping_add(1);
    updates.send_replace(inner.snapshot());
}
