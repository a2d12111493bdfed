use thiserror::Error;

use crate::intake::RejectedReason;

use super::WorkflowPhase;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("file rejected: {0}")]
    Rejected(#[from] RejectedReason),

    #[error("an analysis is already in progress")]
    AnalysisInFlight,

    #[error("cannot start analysis while {phase}")]
    NotReady { phase: WorkflowPhase },

    #[error("workflow has been shut down")]
    ShutDown,
}
