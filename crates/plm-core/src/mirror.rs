//! Mirror coordinator: clean-slate output directory, bounded parallel
//! dispatch of manifest tasks, per-task outcome collection.
//!
//! Keeps up to `max_workers` fetches in flight at once; when one finishes,
//! the next queued task is started until the queue is empty. The directory
//! reset completes before the first task starts, so the output root only
//! ever holds artifacts of the current run.

use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use crate::config::PlmConfig;
use crate::fetch::{self, FetchOptions, FetchOutcome};
use crate::manifest::{FetchTask, Manifest};
use crate::retry::RetryPolicy;

/// One task plus its terminal outcome, in completion order.
#[derive(Debug)]
pub struct TaskReport {
    pub task: FetchTask,
    pub outcome: FetchOutcome,
}

/// Aggregate result of a mirror run. The caller decides what a failure
/// means (exit code, alerting); the coordinator only records and logs.
#[derive(Debug, Default)]
pub struct MirrorReport {
    pub reports: Vec<TaskReport>,
}

impl MirrorReport {
    pub fn succeeded(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.success).count()
    }

    pub fn failed(&self) -> usize {
        self.reports.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

/// Wipe and recreate the output root. Idempotent: a missing directory is not
/// an error, and any prior contents (files or subdirectories) are removed.
pub fn reset_output_dir(root: &Path) -> Result<()> {
    match fs::remove_dir_all(root) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e).with_context(|| format!("remove {}", root.display()));
        }
    }
    fs::create_dir_all(root).with_context(|| format!("create {}", root.display()))?;
    tracing::info!(dir = %root.display(), "output directory reset");
    Ok(())
}

/// Run the whole mirror: flatten the manifest, reset the output directory,
/// fetch everything through a pool of `cfg.max_workers` workers, and return
/// the collected outcomes.
///
/// Manifest problems (duplicate or unsafe filenames) fail the run before the
/// output directory is touched; individual download failures do not — they
/// are logged and reported, task by task.
pub async fn run_mirror(manifest: &Manifest, cfg: &PlmConfig) -> Result<MirrorReport> {
    let tasks = manifest
        .flatten(&cfg.output_dir)
        .context("invalid manifest")?;

    reset_output_dir(&cfg.output_dir)?;

    let policy = RetryPolicy {
        max_attempts: cfg.max_attempts.max(1),
    };
    let opts = FetchOptions {
        timeout: cfg.request_timeout(),
        user_agent: cfg.user_agent.clone(),
    };

    tracing::info!(
        files = tasks.len(),
        workers = cfg.max_workers,
        "starting downloads"
    );

    let mut queue: VecDeque<FetchTask> = tasks.into_iter().collect();
    let max_workers = cfg.max_workers.max(1);
    let mut join_set = tokio::task::JoinSet::new();
    let mut report = MirrorReport::default();

    loop {
        while join_set.len() < max_workers {
            let Some(task) = queue.pop_front() else {
                break;
            };
            let policy = policy;
            let opts = opts.clone();
            join_set.spawn(async move {
                // curl's Easy API blocks; keep it off the async workers.
                tokio::task::spawn_blocking(move || {
                    let outcome = fetch::fetch_with_retry(&task, &policy, &opts);
                    TaskReport { task, outcome }
                })
                .await
            });
        }

        if join_set.is_empty() {
            break;
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        let task_report = res
            .map_err(|e| anyhow::anyhow!("fetch task join: {}", e))?
            .map_err(|e| anyhow::anyhow!("fetch worker join: {}", e))?;
        if !task_report.outcome.success {
            tracing::error!(
                file = %task_report.task.file_name,
                url = %task_report.task.url,
                attempts = task_report.outcome.attempts,
                error = %task_report
                    .outcome
                    .error
                    .as_ref()
                    .map(|e| e.to_string())
                    .unwrap_or_default(),
                "download failed"
            );
        }
        report.reports.push(task_report);
    }

    tracing::info!(
        ok = report.succeeded(),
        failed = report.failed(),
        "downloads complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_creates_missing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("playlists");
        assert!(!root.exists());
        reset_output_dir(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(fs::read_dir(&root).unwrap().count(), 0);
    }

    #[test]
    fn reset_empties_populated_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("playlists");
        fs::create_dir_all(root.join("stale/sub")).unwrap();
        fs::write(root.join("stale.m3u"), b"old").unwrap();
        fs::write(root.join("stale/sub/deep.xml.gz"), b"old").unwrap();
        reset_output_dir(&root).unwrap();
        assert!(root.is_dir());
        assert_eq!(fs::read_dir(&root).unwrap().count(), 0);
    }

    #[test]
    fn reset_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("playlists");
        reset_output_dir(&root).unwrap();
        reset_output_dir(&root).unwrap();
        assert!(root.is_dir());
    }

    #[tokio::test]
    async fn duplicate_manifest_fails_before_touching_output() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("playlists");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("keep.m3u"), b"still here").unwrap();

        let mut manifest = Manifest::default();
        manifest.insert("m3u", "dup.m3u", "http://a.example/1");
        manifest.insert("backup", "dup.m3u", "http://b.example/1");

        let cfg = PlmConfig {
            output_dir: root.clone(),
            ..PlmConfig::default()
        };
        assert!(run_mirror(&manifest, &cfg).await.is_err());
        // Bad manifest must not wipe the previous run's artifacts.
        assert!(root.join("keep.m3u").exists());
    }
}
