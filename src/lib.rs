pub mod analysis;
pub mod intake;
pub mod result;
pub mod settings;
pub mod utils;
pub mod view;
pub mod workflow;

use std::{path::PathBuf, sync::Arc};

use analysis::SimulatedAnalyzer;
use anyhow::{bail, Context, Result};
use intake::FileCandidate;
use log::{info, warn};
use settings::SettingsStore;
use workflow::{WorkflowController, WorkflowError};

/// Runs every path given on the command line through
/// select → analyze → report and prints the result of each.
pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if paths.is_empty() {
        bail!("usage: deepfake-detective <video>...");
    }

    info!("DeepFake Detective starting up...");

    let settings = SettingsStore::new(SettingsStore::default_path()?)?;
    match settings.save_if_missing() {
        Ok(true) => info!("Wrote default settings to {}", settings.path().display()),
        Ok(false) => {}
        Err(err) => warn!("Could not write default settings: {err:#}"),
    }
    let analyzer_settings = settings.analyzer().with_env_overrides();
    info!(
        "Using settings from {} (simulated delay {}ms, timeout {}ms)",
        settings.path().display(),
        analyzer_settings.simulated_delay_ms,
        analyzer_settings.analysis_timeout_ms
    );

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(async move {
        let analyzer = Arc::new(SimulatedAnalyzer::new(analyzer_settings.simulated_delay()));
        let workflow = WorkflowController::new(analyzer, &analyzer_settings);

        let result = analyze_all(&workflow, &paths).await;
        workflow.shutdown().await;
        result
    })
}

async fn analyze_all(workflow: &WorkflowController, paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        match workflow.select_file(FileCandidate::from_path(path.clone())).await {
            Ok(_) => {}
            Err(WorkflowError::Rejected(_)) => {
                warn!("Skipping {}", path.display());
                print!("{}", view::render_snapshot(&workflow.snapshot().await));
                continue;
            }
            Err(err) => return Err(err.into()),
        }

        workflow.start().await?;
        print!("{}", view::render_snapshot(&workflow.snapshot().await));

        let settled = workflow.wait_until_settled().await;
        println!("{}", view::render_snapshot(&settled));
    }

    info!("Finished {} file(s)", paths.len());
    Ok(())
}
