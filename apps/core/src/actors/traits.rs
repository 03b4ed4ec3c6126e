use crate::actors::fixtures::FixtureFeed;
use crate::actors::messages::{AppError, CompletionRequest};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Defines the public interface for a chat completion backend.
///
/// This trait abstracts the provider, allowing the remote API to be swapped for a
/// mock in tests.
#[async_trait]
pub trait CompletionClient: Send + Sync + 'static {
    /// Generates a complete reply for the system prompt, prior turns and user message.
    ///
    /// Fails with `AppError::Config` when no key is configured and with
    /// `AppError::Upstream` / `AppError::Timeout` when the provider fails.
    async fn complete(&self, request: CompletionRequest) -> Result<String, AppError>;
}

/// Defines the public interface for a source of scheduled football matches.
///
/// Never fails past its boundary: problems are reported as `FixtureFeed` variants.
#[async_trait]
pub trait FixtureProvider: Send + Sync + 'static {
    /// Fetches the matches scheduled on a date.
    async fn fetch_fixtures(&self, date: NaiveDate) -> FixtureFeed;
}
