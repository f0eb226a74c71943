//! The seam between the pipeline and a completion provider.

use async_trait::async_trait;

use crate::error::SummarizationError;

use super::prompt::SummaryRequest;
use super::retry::{RetryPolicy, retry_with_backoff};

/// Something that can turn a commit's diff into a short description.
///
/// This abstraction allows mocking the completion API in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize one commit. Implementations make a single attempt.
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, SummarizationError>;
}

/// Summarize with bounded retries for transient failures.
pub async fn summarize_with_retry<S: Summarizer + ?Sized>(
    summarizer: &S,
    request: &SummaryRequest,
    policy: RetryPolicy,
) -> Result<String, SummarizationError> {
    retry_with_backoff(
        policy,
        || summarizer.summarize(request),
        SummarizationError::is_transient,
        |e, attempts| SummarizationError::RetriesExhausted {
            attempts,
            source: Box::new(e),
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SummaryRequest {
        SummaryRequest {
            short_hash: "abc1234".to_string(),
            author: "Jane".to_string(),
            date: "2024-01-01".to_string(),
            files: vec![],
            diff: String::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_is_retried() {
        let mut mock = MockSummarizer::new();
        let mut seq = mockall::Sequence::new();

        mock.expect_summarize()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Err(SummarizationError::ApiStatus {
                    status: 429,
                    body: "slow down".to_string(),
                })
            });
        mock.expect_summarize()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("- Added a thing".to_string()));

        let result = summarize_with_retry(&mock, &request(), RetryPolicy::with_retries(1)).await;
        assert_eq!(result.unwrap(), "- Added a thing");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unauthorized_is_not_retried() {
        let mut mock = MockSummarizer::new();
        mock.expect_summarize().times(1).returning(|_| {
            Err(SummarizationError::ApiStatus {
                status: 401,
                body: "invalid key".to_string(),
            })
        });

        let result = summarize_with_retry(&mock, &request(), RetryPolicy::with_retries(3)).await;
        assert!(matches!(
            result,
            Err(SummarizationError::ApiStatus { status: 401, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_wrap_last_error() {
        let mut mock = MockSummarizer::new();
        mock.expect_summarize().times(3).returning(|_| {
            Err(SummarizationError::ApiStatus {
                status: 502,
                body: String::new(),
            })
        });

        let result = summarize_with_retry(&mock, &request(), RetryPolicy::with_retries(2)).await;
        assert!(matches!(
            result,
            Err(SummarizationError::RetriesExhausted { attempts: 3, .. })
        ));
    }
}
