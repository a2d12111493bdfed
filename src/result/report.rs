use std::fmt::Write as _;

use serde::Serialize;

use crate::intake::MediaReference;

use super::verdict::{AnalysisVerdict, MAX_CONFIDENCE, MIN_CONFIDENCE};

const BAR_CELLS: usize = 40;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum VerdictTone {
    /// Manipulation detected.
    Alert,
    Authentic,
}

/// Presentation-ready fields for the report card.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub file_name: String,
    pub headline: &'static str,
    pub tone: VerdictTone,
    /// Confidence with two decimals and a percent sign, e.g. `"73.41%"`.
    pub confidence_label: String,
    /// Width of the confidence bar in percent of the full bar.
    pub confidence_bar: f64,
    pub abnormalities: Vec<String>,
    pub techniques: Vec<String>,
    pub analyzed_at: String,
}

impl ReportView {
    pub fn new(media: &MediaReference, verdict: &AnalysisVerdict) -> Self {
        let (headline, tone) = if verdict.is_manipulated() {
            ("Deep Fake Detected", VerdictTone::Alert)
        } else {
            ("Likely Authentic", VerdictTone::Authentic)
        };

        Self {
            file_name: media.name().to_string(),
            headline,
            tone,
            confidence_label: format!("{:.2}%", verdict.confidence()),
            confidence_bar: verdict.confidence().clamp(MIN_CONFIDENCE, MAX_CONFIDENCE),
            abnormalities: verdict.abnormalities().to_vec(),
            techniques: verdict.techniques().to_vec(),
            analyzed_at: verdict.analyzed_at().to_rfc3339(),
        }
    }

    pub fn render_text(&self) -> String {
        let filled = ((self.confidence_bar / MAX_CONFIDENCE) * BAR_CELLS as f64).round() as usize;
        let filled = filled.min(BAR_CELLS);
        let marker = match self.tone {
            VerdictTone::Alert => '!',
            VerdictTone::Authentic => '+',
        };

        let mut out = String::new();
        let _ = writeln!(out, "Analysis Results: {}", self.file_name);
        let _ = writeln!(out, "[{marker}] {}", self.headline);
        let _ = writeln!(out, "Confidence Score {}", self.confidence_label);
        let _ = writeln!(
            out,
            "[{}{}]",
            "#".repeat(filled),
            "-".repeat(BAR_CELLS - filled)
        );

        let _ = writeln!(out, "\nDetected Abnormalities");
        for item in &self.abnormalities {
            let _ = writeln!(out, "  • {item}");
        }

        let _ = writeln!(out, "\nSuspected Techniques");
        for technique in &self.techniques {
            let _ = writeln!(out, "  • {technique}");
        }

        out
    }
}
