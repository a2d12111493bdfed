use std::{sync::Arc, time::Duration};

use anyhow::anyhow;
use async_trait::async_trait;
use deepfake_detective_lib::{
    analysis::{Analyzer, SimulatedAnalyzer},
    intake::{FileCandidate, MediaReference},
    result::AnalysisVerdict,
    settings::AnalyzerSettings,
    workflow::{WorkflowController, WorkflowError, WorkflowPhase},
};
use tokio::sync::{mpsc, oneshot};

type Reply = oneshot::Sender<anyhow::Result<AnalysisVerdict>>;

/// Holds every call open until the test answers it.
struct GatedAnalyzer {
    calls: mpsc::UnboundedSender<(MediaReference, Reply)>,
}

#[async_trait]
impl Analyzer for GatedAnalyzer {
    async fn analyze(&self, media: &MediaReference) -> anyhow::Result<AnalysisVerdict> {
        let (reply, answer) = oneshot::channel();
        self.calls
            .send((media.clone(), reply))
            .map_err(|_| anyhow!("test harness dropped"))?;
        answer.await.map_err(|_| anyhow!("call abandoned"))?
    }

    fn name(&self) -> &str {
        "gated"
    }
}

fn gated() -> (
    WorkflowController,
    mpsc::UnboundedReceiver<(MediaReference, Reply)>,
) {
    let (calls, pending) = mpsc::unbounded_channel();
    let controller = WorkflowController::new(
        Arc::new(GatedAnalyzer { calls }),
        &AnalyzerSettings {
            simulated_delay_ms: 0,
            analysis_timeout_ms: 0,
        },
    );
    (controller, pending)
}

fn video(name: &str) -> FileCandidate {
    FileCandidate::from_bytes(name, "video/mp4", vec![0; 8])
}

fn verdict(confidence: f64) -> AnalysisVerdict {
    AnalysisVerdict::new(
        true,
        confidence,
        vec!["Unnatural eye movements".into()],
        vec!["Face swapping algorithms".into()],
    )
    .unwrap()
}

#[tokio::test]
async fn clip_goes_from_ready_to_done() {
    let controller = WorkflowController::new(
        Arc::new(SimulatedAnalyzer::new(Duration::from_millis(20))),
        &AnalyzerSettings::default(),
    );

    let media = controller.select_file(video("clip.mp4")).await.unwrap();
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, WorkflowPhase::Ready);
    assert_eq!(snapshot.media.as_ref().map(|m| m.name()), Some("clip.mp4"));
    assert!(snapshot.can_start);

    controller.start().await.unwrap();
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, WorkflowPhase::Analyzing);
    assert!(!snapshot.can_start);

    let done = controller.wait_until_settled().await;
    assert_eq!(done.phase, WorkflowPhase::Done);
    assert_eq!(done.media, Some(media));
    let verdict = done.verdict.expect("done carries a verdict");
    assert!((0.0..=100.0).contains(&verdict.confidence()));
    assert!(!verdict.abnormalities().is_empty());
    assert!(!verdict.techniques().is_empty());
}

#[tokio::test]
async fn image_is_rejected_and_start_not_offered() {
    let (controller, _pending) = gated();

    let err = controller
        .select_file(FileCandidate::from_bytes("photo.jpg", "image/jpeg", vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Rejected(_)));

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, WorkflowPhase::Idle);
    assert!(snapshot.media.is_none());
    assert!(!snapshot.can_start);
    assert!(snapshot.notice.is_some());
}

#[tokio::test]
async fn rejected_file_keeps_existing_selection() {
    let (controller, _pending) = gated();
    let media = controller.select_file(video("clip.mp4")).await.unwrap();

    let _ = controller
        .select_file(FileCandidate::from_bytes("notes.pdf", "application/pdf", vec![]))
        .await;

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, WorkflowPhase::Ready);
    assert_eq!(snapshot.media, Some(media));
}

#[tokio::test]
async fn superseded_result_is_dropped() {
    let (controller, mut pending) = gated();

    controller.select_file(video("a.mp4")).await.unwrap();
    controller.start().await.unwrap();
    let (analyzed, reply) = pending.recv().await.unwrap();
    assert_eq!(analyzed.name(), "a.mp4");

    let b = controller.select_file(video("b.mp4")).await.unwrap();
    reply.send(Ok(verdict(90.0))).unwrap();
    controller.join_analysis().await;

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, WorkflowPhase::Ready);
    assert_eq!(snapshot.media, Some(b));
    assert!(snapshot.verdict.is_none());
}

#[tokio::test]
async fn late_result_does_not_overwrite_newer_analysis() {
    let (controller, mut pending) = gated();

    controller.select_file(video("a.mp4")).await.unwrap();
    controller.start().await.unwrap();
    let (_, reply_a) = pending.recv().await.unwrap();

    let b = controller.select_file(video("b.mp4")).await.unwrap();
    controller.start().await.unwrap();
    let (analyzed, reply_b) = pending.recv().await.unwrap();
    assert!(analyzed.is_same_selection(&b));

    // a's call was cancelled when b started; answering it is harmless
    let _ = reply_a.send(Ok(verdict(11.0)));
    reply_b.send(Ok(verdict(77.0))).unwrap();

    let done = controller.wait_until_settled().await;
    assert_eq!(done.phase, WorkflowPhase::Done);
    assert_eq!(done.media, Some(b));
    assert_eq!(done.verdict.map(|v| v.confidence()), Some(77.0));
}

#[tokio::test]
async fn new_selection_clears_previous_verdict() {
    let (controller, mut pending) = gated();

    controller.select_file(video("a.mp4")).await.unwrap();
    controller.start().await.unwrap();
    let (_, reply) = pending.recv().await.unwrap();
    reply.send(Ok(verdict(55.0))).unwrap();
    assert_eq!(
        controller.wait_until_settled().await.phase,
        WorkflowPhase::Done
    );

    let mut updates = controller.subscribe();
    updates.borrow_and_update();
    controller.select_file(video("b.mp4")).await.unwrap();

    let next = updates.borrow_and_update().clone();
    assert_eq!(next.phase, WorkflowPhase::Ready);
    assert_eq!(next.media.as_ref().map(|m| m.name()), Some("b.mp4"));
    assert!(next.verdict.is_none());
}

#[tokio::test]
async fn reset_drops_in_flight_result() {
    let (controller, mut pending) = gated();

    controller.select_file(video("a.mp4")).await.unwrap();
    controller.start().await.unwrap();
    let (_, reply) = pending.recv().await.unwrap();

    controller.reset().await;
    reply.send(Ok(verdict(40.0))).unwrap();
    controller.join_analysis().await;

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, WorkflowPhase::Idle);
    assert!(snapshot.verdict.is_none());
}

#[tokio::test]
async fn failed_analysis_can_be_retried() {
    let (controller, mut pending) = gated();

    let media = controller.select_file(video("a.mp4")).await.unwrap();
    controller.start().await.unwrap();
    let (_, reply) = pending.recv().await.unwrap();
    reply.send(Err(anyhow!("connection reset"))).unwrap();

    let failed = controller.wait_until_settled().await;
    assert_eq!(failed.phase, WorkflowPhase::Ready);
    assert_eq!(failed.media, Some(media.clone()));
    assert!(failed.notice.is_some());

    controller.start().await.unwrap();
    let (_, reply) = pending.recv().await.unwrap();
    reply.send(Ok(verdict(33.0))).unwrap();

    let done = controller.wait_until_settled().await;
    assert_eq!(done.phase, WorkflowPhase::Done);
    assert_eq!(done.media, Some(media));
    assert!(done.notice.is_none());
}

#[tokio::test]
async fn rejected_file_while_done_keeps_report() {
    let (controller, mut pending) = gated();

    let media = controller.select_file(video("a.mp4")).await.unwrap();
    controller.start().await.unwrap();
    let (_, reply) = pending.recv().await.unwrap();
    reply.send(Ok(verdict(61.0))).unwrap();
    let done = controller.wait_until_settled().await;
    assert_eq!(done.phase, WorkflowPhase::Done);

    let err = controller
        .select_file(FileCandidate::from_bytes("cover.png", "image/png", vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Rejected(_)));

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, WorkflowPhase::Done);
    assert_eq!(snapshot.media, Some(media));
    assert_eq!(snapshot.verdict, done.verdict);
    assert!(snapshot.notice.is_some());
}

#[tokio::test]
async fn rejected_file_while_analyzing_keeps_result() {
    let (controller, mut pending) = gated();

    let media = controller.select_file(video("a.mp4")).await.unwrap();
    controller.start().await.unwrap();
    let (_, reply) = pending.recv().await.unwrap();

    let _ = controller
        .select_file(FileCandidate::from_bytes("track.mp3", "audio/mpeg", vec![]))
        .await
        .unwrap_err();
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, WorkflowPhase::Analyzing);
    assert_eq!(snapshot.media.as_ref(), Some(&media));

    reply.send(Ok(verdict(48.0))).unwrap();
    let done = controller.wait_until_settled().await;
    assert_eq!(done.phase, WorkflowPhase::Done);
    assert_eq!(done.media, Some(media));
    assert_eq!(done.verdict.map(|v| v.confidence()), Some(48.0));
}
