pub mod report;
pub mod verdict;

pub use report::{ReportView, VerdictTone};
pub use verdict::{AnalysisVerdict, VerdictError, VerdictRecord};
