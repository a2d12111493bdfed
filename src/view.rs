//! Plain-text rendering of workflow snapshots.

use crate::{
    result::ReportView,
    workflow::{WorkflowPhase, WorkflowSnapshot},
};

pub fn render_snapshot(snapshot: &WorkflowSnapshot) -> String {
    let mut out = String::new();

    if let Some(notice) = &snapshot.notice {
        out.push_str(&format!("! {notice}\n"));
    }

    match (
        snapshot.phase,
        snapshot.media.as_ref(),
        snapshot.verdict.as_ref(),
    ) {
        (WorkflowPhase::Idle, _, _) => {
            out.push_str("Upload a video for analysis.\n");
        }
        (WorkflowPhase::Ready, Some(media), _) => {
            out.push_str(&format!(
                "Selected {}. Ready to start analysis.\n",
                media.name()
            ));
        }
        (WorkflowPhase::Analyzing, Some(media), _) => {
            out.push_str(&format!(
                "Analyzing {} for potential manipulations...\n",
                media.name()
            ));
        }
        (WorkflowPhase::Done, Some(media), Some(verdict)) => {
            out.push_str(&ReportView::new(media, verdict).render_text());
        }
        // Phases other than Idle always carry media; Done always carries a verdict.
        _ => {}
    }

    out
}
