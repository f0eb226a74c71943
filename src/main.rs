//! difflog - CLI entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use difflog::changelog::writer::generate_summary;
use difflog::changelog::{Changelog, Destination, EntryOrder, write_changelog};
use difflog::config;
use difflog::git::{
    CommitFilter, DiffSettings, list_commits, open_or_clone, parse_since, parse_until,
    resolve_branch,
};
use difflog::llm::{DEFAULT_BUDGET, OpenAiClient, RetryPolicy};
use difflog::pipeline::{PipelineOptions, summarize_commits};

/// Generate a changelog by summarizing each commit's diff with an LLM.
#[derive(Parser, Debug)]
#[command(name = "difflog")]
#[command(about = "Generate a changelog by summarizing each commit's diff with an LLM")]
#[command(version)]
struct Cli {
    /// Git repository path or URL
    #[arg(long, default_value = ".")]
    repo: String,

    /// Branch or ref to walk (defaults to HEAD)
    #[arg(long)]
    branch: Option<String>,

    /// Only commits on or after this date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    since: Option<String>,

    /// Only commits on or before this date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    until: Option<String>,

    /// Keep only the N newest commits (0 = all)
    #[arg(long, default_value_t = 0)]
    max_commits: usize,

    /// Path to changelog file, or - for stdout
    #[arg(short = 'o', long, default_value = "CHANGELOG.md")]
    output: PathBuf,

    /// Model name (defaults to $CHANGELOG_MODEL or gpt-4o-mini)
    #[arg(long)]
    model: Option<String>,

    /// Max diff characters sent per commit
    #[arg(long, default_value_t = DEFAULT_BUDGET)]
    per_commit_budget: usize,

    /// Include merge commits (skipped by default)
    #[arg(long)]
    include_merges: bool,

    /// Keep whitespace-only changes in diffs
    #[arg(long)]
    no_trim_whitespace: bool,

    /// Do not detect renames
    #[arg(long)]
    no_renames: bool,

    /// Order of entries in the changelog
    #[arg(long, value_enum, default_value_t = EntryOrder::OldestFirst)]
    order: EntryOrder,

    /// Group entries under date headers
    #[arg(long)]
    group_by_date: bool,

    /// Retries for transient API failures (rate limits, 5xx, network)
    #[arg(long, default_value_t = 0)]
    max_retries: u32,

    /// Record failed summaries in the changelog instead of aborting
    #[arg(long)]
    keep_going: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so `--output -` stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    // Step 1: Check prerequisites before touching the repository
    let api_key = config::api_key().context("An API key is required to summarize commits")?;

    let filter = CommitFilter {
        since: cli.since.as_deref().map(parse_since).transpose()?,
        until: cli.until.as_deref().map(parse_until).transpose()?,
        include_merges: cli.include_merges,
        max_commits: (cli.max_commits > 0).then_some(cli.max_commits),
    };

    // Step 2: Open or clone the repository
    let handle = open_or_clone(&cli.repo, cli.branch.as_deref())
        .with_context(|| format!("Failed to access repository '{}'", cli.repo))?;

    // Step 3: List commits
    let tip = resolve_branch(&handle.repo, cli.branch.as_deref())?;
    let commits = list_commits(&handle.repo, tip, &filter).context("Failed to list commits")?;

    if commits.is_empty() {
        eprintln!("No commits matched. Nothing to summarize.");
    } else {
        eprintln!("Found {} commits", commits.len());
    }

    // Step 4: Summarize each commit
    let model = config::resolve_model(cli.model.as_deref());
    let client = OpenAiClient::new(api_key, model, config::base_url(), config::get_timeout())?;
    info!(model = %client.model(), cloned = handle.is_clone(), "Starting summaries");

    let options = PipelineOptions {
        budget: cli.per_commit_budget,
        diff: DiffSettings {
            ignore_whitespace: !cli.no_trim_whitespace,
            detect_renames: !cli.no_renames,
        },
        retry: RetryPolicy::with_retries(cli.max_retries),
        keep_going: cli.keep_going,
    };

    let progress = ProgressBar::new(commits.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:30} {pos}/{len} Summarizing {msg}") {
        progress.set_style(style);
    }

    let result = summarize_commits(&handle.repo, &commits, &client, &options, &progress).await;
    progress.finish_and_clear();
    let summaries = result.context("Failed to generate changelog")?;

    // Step 5: Assemble and write
    let changelog = Changelog::new(summaries, cli.order, cli.group_by_date);
    let destination = Destination::from_arg(&cli.output);
    write_changelog(&changelog, &destination).context("Failed to write changelog")?;

    eprintln!("✓ {}", generate_summary(&changelog, &destination));

    Ok(())
}
