use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_CONFIDENCE: f64 = 0.0;
pub const MAX_CONFIDENCE: f64 = 100.0;

#[derive(Debug, Error)]
pub enum VerdictError {
    #[error("confidence {0} is outside [0, 100]")]
    ConfidenceOutOfRange(f64),
    #[error("malformed verdict record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Outcome of one detection pass. Built once, never mutated; a new run
/// yields a new verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisVerdict {
    is_manipulated: bool,
    /// Percentage in `[0, 100]`.
    confidence: f64,
    abnormalities: Vec<String>,
    techniques: Vec<String>,
    analyzed_at: DateTime<Utc>,
}

impl AnalysisVerdict {
    pub fn new(
        is_manipulated: bool,
        confidence: f64,
        abnormalities: Vec<String>,
        techniques: Vec<String>,
    ) -> Result<Self, VerdictError> {
        // NaN fails the range check as well
        if !(MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&confidence) {
            return Err(VerdictError::ConfidenceOutOfRange(confidence));
        }

        Ok(Self {
            is_manipulated,
            confidence,
            abnormalities,
            techniques,
            analyzed_at: Utc::now(),
        })
    }

    /// Parses a backend response shaped like [`VerdictRecord`].
    pub fn from_json(payload: &str) -> Result<Self, VerdictError> {
        let record: VerdictRecord = serde_json::from_str(payload)?;
        Self::try_from(record)
    }

    pub fn is_manipulated(&self) -> bool {
        self.is_manipulated
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn abnormalities(&self) -> &[String] {
        &self.abnormalities
    }

    pub fn techniques(&self) -> &[String] {
        &self.techniques
    }

    pub fn analyzed_at(&self) -> DateTime<Utc> {
        self.analyzed_at
    }
}

/// Wire shape a detection backend returns. The `isFake` / `techniquesUsed`
/// spellings are accepted as aliases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictRecord {
    #[serde(alias = "isFake")]
    pub is_manipulated: bool,
    pub confidence: f64,
    #[serde(default)]
    pub abnormalities: Vec<String>,
    #[serde(default, alias = "techniquesUsed")]
    pub techniques: Vec<String>,
}

impl TryFrom<VerdictRecord> for AnalysisVerdict {
    type Error = VerdictError;

    fn try_from(record: VerdictRecord) -> Result<Self, Self::Error> {
        AnalysisVerdict::new(
            record.is_manipulated,
            record.confidence,
            record.abnormalities,
            record.techniques,
        )
    }
}
