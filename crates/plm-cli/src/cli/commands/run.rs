//! `plm run` – wipe the output directory and mirror the manifest.

use anyhow::{bail, Result};
use plm_core::config::PlmConfig;
use plm_core::manifest::Manifest;
use plm_core::mirror;
use std::path::{Path, PathBuf};

pub async fn run_mirror(
    mut cfg: PlmConfig,
    manifest_path: Option<&Path>,
    output_dir: Option<PathBuf>,
    workers: Option<usize>,
    best_effort: bool,
) -> Result<()> {
    if let Some(dir) = output_dir {
        cfg.output_dir = dir;
    }
    if let Some(n) = workers {
        cfg.max_workers = n.max(1);
    }
    let best_effort = best_effort || cfg.best_effort;

    let manifest = match manifest_path {
        Some(path) => {
            tracing::info!(manifest = %path.display(), "using manifest file");
            Manifest::from_path(path)?
        }
        None => Manifest::builtin(),
    };

    let report = mirror::run_mirror(&manifest, &cfg).await?;

    for r in report.reports.iter().filter(|r| !r.outcome.success) {
        let cause = r
            .outcome
            .error
            .as_ref()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        eprintln!(
            "failed: {} ({}) after {} attempt(s): {}",
            r.task.file_name, r.task.url, r.outcome.attempts, cause
        );
    }
    println!(
        "{} downloaded, {} failed ({})",
        report.succeeded(),
        report.failed(),
        cfg.output_dir.display()
    );

    if !report.all_succeeded() && !best_effort {
        bail!("{} of {} downloads failed", report.failed(), report.reports.len());
    }
    Ok(())
}
