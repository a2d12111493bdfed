pub mod controller;
pub mod error;
pub mod state;

pub use controller::WorkflowController;
pub use error::WorkflowError;
pub use state::{WorkflowNotice, WorkflowPhase, WorkflowSnapshot, WorkflowState};
