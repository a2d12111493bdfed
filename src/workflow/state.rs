use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::{intake::MediaReference, result::AnalysisVerdict};

use super::WorkflowError;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum WorkflowPhase {
    Idle,
    Ready,
    Analyzing,
    Done,
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WorkflowPhase::Idle => "idle",
            WorkflowPhase::Ready => "ready",
            WorkflowPhase::Analyzing => "analyzing",
            WorkflowPhase::Done => "done",
        };
        f.write_str(label)
    }
}

/// Where the upload → analyze → present flow currently is. A verdict only
/// exists together with the media it was computed for.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum WorkflowState {
    #[default]
    Idle,
    Ready {
        media: MediaReference,
    },
    Analyzing {
        media: MediaReference,
    },
    Done {
        media: MediaReference,
        verdict: AnalysisVerdict,
    },
}

impl WorkflowState {
    pub fn phase(&self) -> WorkflowPhase {
        match self {
            WorkflowState::Idle => WorkflowPhase::Idle,
            WorkflowState::Ready { .. } => WorkflowPhase::Ready,
            WorkflowState::Analyzing { .. } => WorkflowPhase::Analyzing,
            WorkflowState::Done { .. } => WorkflowPhase::Done,
        }
    }

    pub fn media(&self) -> Option<&MediaReference> {
        match self {
            WorkflowState::Idle => None,
            WorkflowState::Ready { media }
            | WorkflowState::Analyzing { media }
            | WorkflowState::Done { media, .. } => Some(media),
        }
    }

    pub fn verdict(&self) -> Option<&AnalysisVerdict> {
        match self {
            WorkflowState::Done { verdict, .. } => Some(verdict),
            _ => None,
        }
    }

    pub fn can_start(&self) -> bool {
        matches!(self, WorkflowState::Ready { .. })
    }

    /// Replaces whatever was held, including a previous verdict.
    pub fn select(&mut self, media: MediaReference) {
        *self = WorkflowState::Ready { media };
    }

    pub fn begin_analysis(&mut self) -> Result<MediaReference, WorkflowError> {
        match self {
            WorkflowState::Ready { media } => {
                let media = media.clone();
                *self = WorkflowState::Analyzing {
                    media: media.clone(),
                };
                Ok(media)
            }
            WorkflowState::Analyzing { .. } => Err(WorkflowError::AnalysisInFlight),
            other => Err(WorkflowError::NotReady {
                phase: other.phase(),
            }),
        }
    }

    pub fn is_analyzing(&self, media_id: Uuid) -> bool {
        matches!(self, WorkflowState::Analyzing { media } if media.id() == media_id)
    }

    /// Moves to `Done` if the analysis for `media_id` is still the current
    /// one. Returns `false` and leaves the state alone otherwise.
    pub fn complete(&mut self, media_id: Uuid, verdict: AnalysisVerdict) -> bool {
        match std::mem::take(self) {
            WorkflowState::Analyzing { media } if media.id() == media_id => {
                *self = WorkflowState::Done { media, verdict };
                true
            }
            other => {
                *self = other;
                false
            }
        }
    }

    /// Back to `Ready` with the same media after a failed analysis, under the
    /// same identity rule as [`complete`](Self::complete).
    pub fn fail(&mut self, media_id: Uuid) -> bool {
        match std::mem::take(self) {
            WorkflowState::Analyzing { media } if media.id() == media_id => {
                *self = WorkflowState::Ready { media };
                true
            }
            other => {
                *self = other;
                false
            }
        }
    }
}

/// User-visible problems that do not change the phase.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum WorkflowNotice {
    #[serde(rename_all = "camelCase")]
    FileRejected { name: String, reason: String },
    #[serde(rename_all = "camelCase")]
    AnalysisFailed { media_name: String, message: String },
}

impl fmt::Display for WorkflowNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowNotice::FileRejected { name, reason } => {
                write!(f, "{name} was not accepted: {reason}")
            }
            WorkflowNotice::AnalysisFailed {
                media_name,
                message,
            } => write!(f, "Analysis of {media_name} failed: {message}"),
        }
    }
}

/// Read-only view of the workflow handed to the presentation layer.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSnapshot {
    pub phase: WorkflowPhase,
    pub media: Option<MediaReference>,
    pub verdict: Option<AnalysisVerdict>,
    pub notice: Option<WorkflowNotice>,
    pub can_start: bool,
    /// Bumped on every published change.
    pub revision: u64,
}

impl WorkflowSnapshot {
    pub fn new(state: &WorkflowState, notice: Option<&WorkflowNotice>, revision: u64) -> Self {
        Self {
            phase: state.phase(),
            media: state.media().cloned(),
            verdict: state.verdict().cloned(),
            notice: notice.cloned(),
            can_start: state.can_start(),
            revision,
        }
    }
}
