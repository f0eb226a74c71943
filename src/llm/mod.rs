//! Diff budgeting, prompt construction and the completion client.

pub mod budget;
pub mod openai;
pub mod prompt;
pub mod retry;
pub mod summarizer;

pub use budget::{DEFAULT_BUDGET, Truncation, truncate_diff};
pub use openai::OpenAiClient;
pub use prompt::{SummaryRequest, build_user_prompt};
pub use retry::RetryPolicy;
pub use summarizer::{Summarizer, summarize_with_retry};
