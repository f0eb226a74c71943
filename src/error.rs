//! Error types for difflog modules using thiserror.

use thiserror::Error;

/// Errors from repository access and diff extraction.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Failed to open repository at '{location}': {source}")]
    OpenFailed {
        location: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to clone '{url}': {source}")]
    CloneFailed {
        url: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to create clone directory: {0}")]
    CloneDirFailed(#[source] std::io::Error),

    #[error("Repository location '{0}' is neither an existing directory nor a clonable URL")]
    UnknownLocation(String),

    #[error("Branch or ref '{branch}' not found: {source}")]
    BranchNotFound {
        branch: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to walk commit history: {0}")]
    RevwalkError(#[source] git2::Error),

    #[error("Failed to parse commit: {0}")]
    ParseCommit(#[source] git2::Error),

    #[error("Failed to diff commit {hash}: {source}")]
    DiffFailed {
        hash: String,
        #[source]
        source: git2::Error,
    },

    #[error("Commit {hash} has invalid timestamp (seconds={seconds})")]
    InvalidTimestamp { hash: String, seconds: i64 },

    #[error("Invalid date '{0}': expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate(String),
}

/// Errors from the summarization API.
#[derive(Error, Debug)]
pub enum SummarizationError {
    #[error("OPENAI_API_KEY is not set")]
    ApiKeyMissing,

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Network error calling the completion API: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Completion API returned HTTP {status}: {body}")]
    ApiStatus { status: u16, body: String },

    #[error("Invalid response from completion API: {0}")]
    InvalidResponse(String),

    #[error("Completion API returned an empty summary")]
    EmptyResponse,

    #[error("All {attempts} attempts failed: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<SummarizationError>,
    },
}

impl SummarizationError {
    /// Whether a retry has a chance of succeeding.
    ///
    /// Network failures, rate limiting (429) and server errors (5xx) are
    /// transient; authentication and malformed responses are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::ApiStatus { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}

/// Errors from writing the changelog.
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("Failed to write changelog: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("Failed to move changelog into place: {0}")]
    PersistFailed(#[source] tempfile::PersistError),
}

/// Errors that abort a changelog run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Failed to summarize commit {hash}: {source}")]
    Summarization {
        hash: String,
        #[source]
        source: SummarizationError,
    },
}
