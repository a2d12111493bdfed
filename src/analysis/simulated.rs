use std::{sync::Mutex, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{intake::MediaReference, result::AnalysisVerdict};

use super::Analyzer;

const ENABLE_LOGS: bool = true;

use crate::log_debug;

pub const DEFAULT_DELAY: Duration = Duration::from_secs(3);

const ABNORMALITIES: [&str; 3] = [
    "Inconsistent facial expressions",
    "Unnatural eye movements",
    "Audio-visual synchronization issues",
];

const TECHNIQUES: [&str; 3] = [
    "Generative Adversarial Networks (GANs)",
    "Face swapping algorithms",
    "Deep learning manipulation",
];

/// Placeholder backend: sleeps for a fixed delay, then flips a coin for the
/// classification and draws a uniform confidence. The findings are the same
/// constant lists for every input. Replace it with a real detector.
pub struct SimulatedAnalyzer {
    delay: Duration,
    rng: Mutex<StdRng>,
}

impl SimulatedAnalyzer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Same draws for the same seed.
    pub fn with_seed(delay: Duration, seed: u64) -> Self {
        Self {
            delay,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn draw(&self) -> (bool, f64) {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        (rng.gen_bool(0.5), rng.gen_range(0.0..100.0))
    }
}

impl Default for SimulatedAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

#[async_trait]
impl Analyzer for SimulatedAnalyzer {
    async fn analyze(&self, media: &MediaReference) -> Result<AnalysisVerdict> {
        log_debug!(
            "simulating analysis of {} ({}ms)",
            media.name(),
            self.delay.as_millis()
        );
        tokio::time::sleep(self.delay).await;

        let (is_manipulated, confidence) = self.draw();
        let verdict = AnalysisVerdict::new(
            is_manipulated,
            confidence,
            ABNORMALITIES.iter().map(|s| s.to_string()).collect(),
            TECHNIQUES.iter().map(|s| s.to_string()).collect(),
        )?;

        Ok(verdict)
    }

    fn name(&self) -> &str {
        "simulated"
    }
}
