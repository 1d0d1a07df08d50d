use crate::classifier::Classifier;
use crate::errors::Result;
use crate::processor::{FileOutcome, FileProcessor};
use crate::rules::RuleTable;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// Aggregate counters for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Files accepted by the classifier and handed to the processor.
    pub files_scanned: usize,
    /// Files that were (or, in preview mode, would be) rewritten.
    pub files_modified: usize,
    /// Replacements across all modified files.
    pub total_replacements: usize,
    /// Files whose read or write failed.
    pub files_skipped: usize,
    /// `true` if the run stopped early because the cancel flag was raised.
    pub cancelled: bool,
}

/// The per-file line of a run report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

/// A finished run: the summary plus every outcome other than `Unchanged`, in input order.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub summary: RunSummary,
    pub files: Vec<FileReport>,
    pub preview_only: bool,
}

impl RunSummary {
    fn record(&mut self, outcome: &FileOutcome) {
        self.files_scanned += 1;
        match outcome {
            FileOutcome::Sanitized(count) => {
                self.files_modified += 1;
                self.total_replacements += count;
            }
            FileOutcome::SkippedReadError(_) | FileOutcome::SkippedWriteError(_) => {
                self.files_skipped += 1;
            }
            FileOutcome::Unchanged => {}
        }
    }
}

/// Drives classification and processing over a list of candidate paths.
pub struct RunAggregator<'a> {
    rules: &'a RuleTable,
    classifier: &'a Classifier,
    workers: usize,
    cancel: Arc<AtomicBool>,
}

/// What happened to one input path.
enum Step {
    NotText,
    NotStarted,
    Done(FileOutcome),
}

impl<'a> RunAggregator<'a> {
    pub fn new(rules: &'a RuleTable, classifier: &'a Classifier) -> Self {
        Self {
            rules,
            classifier,
            workers: 1,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Sets the number of worker threads. Values below one are treated as one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// A flag that, once set, stops any file that has not started yet from being processed.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Runs over `paths` and returns the final counters.
    pub fn run<I, P>(&self, paths: I, preview_only: bool) -> Result<RunSummary>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Ok(self.execute(paths, preview_only)?.summary)
    }

    /// Runs over `paths` and returns the counters together with the per-file reports.
    pub fn execute<I, P>(&self, paths: I, preview_only: bool) -> Result<RunReport>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let paths: Vec<PathBuf> = paths
            .into_iter()
            .map(|p| p.as_ref().to_path_buf())
            .collect();

        let steps: Vec<Step> = if self.workers > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.workers)
                .build()?;
            pool.install(|| {
                paths
                    .par_iter()
                    .map(|path| self.step(path, preview_only))
                    .collect()
            })
        } else {
            paths
                .iter()
                .map(|path| self.step(path, preview_only))
                .collect()
        };

        let mut report = RunReport {
            preview_only,
            ..RunReport::default()
        };
        for (path, step) in paths.into_iter().zip(steps) {
            match step {
                Step::NotText => {}
                Step::NotStarted => report.summary.cancelled = true,
                Step::Done(outcome) => {
                    report.summary.record(&outcome);
                    log_outcome(&path, &outcome, preview_only);
                    if outcome != FileOutcome::Unchanged {
                        report.files.push(FileReport { path, outcome });
                    }
                }
            }
        }

        Ok(report)
    }

    fn step(&self, path: &Path, preview_only: bool) -> Step {
        if self.cancel.load(Ordering::Relaxed) {
            return Step::NotStarted;
        }
        if !self.classifier.is_text(path) {
            return Step::NotText;
        }
        Step::Done(FileProcessor::new(self.rules).process(path, preview_only))
    }
}

fn log_outcome(path: &Path, outcome: &FileOutcome, preview_only: bool) {
    match outcome {
        FileOutcome::Sanitized(count) => {
            info!(path = %path.display(), replacements = count, preview_only, "sanitized")
        }
        FileOutcome::SkippedReadError(reason) => {
            warn!(path = %path.display(), %reason, "skipped (read error)")
        }
        FileOutcome::SkippedWriteError(reason) => {
            warn!(path = %path.display(), %reason, "skipped (write error)")
        }
        FileOutcome::Unchanged => {}
    }
}
