//! Per-commit diff → budget → summary loop.

use git2::Repository;
use indicatif::ProgressBar;
use tracing::{debug, warn};

use crate::changelog::Summary;
use crate::error::PipelineError;
use crate::git::{CommitInfo, DiffSettings, extract_diff};
use crate::llm::{
    DEFAULT_BUDGET, RetryPolicy, Summarizer, SummaryRequest, summarize_with_retry, truncate_diff,
};

/// Knobs for one changelog run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Maximum diff characters sent per commit.
    pub budget: usize,
    pub diff: DiffSettings,
    pub retry: RetryPolicy,
    /// Record failed summaries in the changelog instead of aborting.
    pub keep_going: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            diff: DiffSettings::default(),
            retry: RetryPolicy::none(),
            keep_going: false,
        }
    }
}

/// Summarize `commits` one at a time, in the order given.
///
/// Commits whose diff is empty (no files, no text) are skipped. Any
/// repository error aborts; a summarization error aborts unless
/// `keep_going` is set.
pub async fn summarize_commits<S: Summarizer + ?Sized>(
    repo: &Repository,
    commits: &[CommitInfo],
    summarizer: &S,
    options: &PipelineOptions,
    progress: &ProgressBar,
) -> Result<Vec<Summary>, PipelineError> {
    let mut summaries = Vec::with_capacity(commits.len());

    for commit in commits {
        progress.set_message(commit.short_hash().to_string());

        let diff = extract_diff(repo, commit, options.diff)?;
        if diff.is_empty() {
            debug!(hash = %commit.short_hash(), "Skipping commit with empty diff");
            progress.inc(1);
            continue;
        }

        let truncation = truncate_diff(&diff.text, options.budget);
        if truncation.truncated {
            debug!(
                hash = %commit.short_hash(),
                original_chars = truncation.original_chars,
                budget = options.budget,
                "Diff exceeded budget"
            );
        }

        let request = SummaryRequest {
            short_hash: commit.short_hash().to_string(),
            author: commit.author_name.clone(),
            date: commit.date(),
            files: diff.files,
            diff: truncation.text,
        };

        let summary = match summarize_with_retry(summarizer, &request, options.retry).await {
            Ok(text) => Summary {
                short_hash: request.short_hash,
                author: request.author,
                date: request.date,
                text,
                failed: false,
            },
            Err(e) if options.keep_going => {
                warn!(hash = %request.short_hash, "Summarization failed, continuing: {e}");
                Summary {
                    text: format!("_Failed to summarize commit {}: {e}_", request.short_hash),
                    short_hash: request.short_hash,
                    author: request.author,
                    date: request.date,
                    failed: true,
                }
            }
            Err(source) => {
                return Err(PipelineError::Summarization {
                    hash: request.short_hash,
                    source,
                });
            }
        };

        summaries.push(summary);
        progress.inc(1);
    }

    Ok(summaries)
}
