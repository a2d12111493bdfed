pub mod simulated;

pub use simulated::SimulatedAnalyzer;

use anyhow::Result;
use async_trait::async_trait;

use crate::{intake::MediaReference, result::AnalysisVerdict};

/// A detection backend. Implementations may do network I/O or local
/// inference; the workflow controller only sees the returned verdict or error.
///
/// The controller never issues a second call before the first one settles.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, media: &MediaReference) -> Result<AnalysisVerdict>;

    /// Short label used in logs.
    fn name(&self) -> &str;
}
