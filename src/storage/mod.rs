pub mod flags;
pub mod state;

use async_trait::async_trait;

use crate::errors::ReaperResult;
use crate::models::RunHistory;

pub use flags::TriggerFlags;
pub use state::{JsonStateStore, MemoryStateStore};

/// Durable home of the run-state document.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the current document. A missing store is an empty history.
    async fn load(&self) -> ReaperResult<RunHistory>;
    /// Replace the stored document with `history`.
    async fn save(&self, history: &RunHistory) -> ReaperResult<()>;
}
