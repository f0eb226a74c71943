//! difflog - writes a changelog by summarizing each commit's diff with an LLM.
//!
//! # Overview
//!
//! difflog walks a branch's history, computes each commit's diff against its
//! parent, cuts it to a per-commit character budget, asks an
//! OpenAI-compatible chat-completion API to describe the change, and
//! assembles the answers into a markdown changelog. Commit messages are not
//! used as input.

pub mod changelog;
pub mod config;
pub mod error;
pub mod git;
pub mod llm;
pub mod pipeline;

// Re-export commonly used types
pub use changelog::{Changelog, EntryOrder, Summary};
pub use error::{ChangelogError, PipelineError, RepositoryError, SummarizationError};
pub use git::{CommitFilter, CommitInfo, DiffSettings};
pub use llm::{RetryPolicy, Summarizer, SummaryRequest};
pub use pipeline::{PipelineOptions, summarize_commits};
