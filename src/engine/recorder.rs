use std::sync::Arc;

use crate::models::{RunHistory, RunState};
use crate::storage::StateStore;

/// Keeps the in-memory run history and writes it through to the store after
/// every change.
pub struct Recorder {
    history: RunHistory,
    store: Arc<dyn StateStore>,
    limit: usize,
}

impl Recorder {
    pub fn new(history: RunHistory, store: Arc<dyn StateStore>, limit: usize) -> Self {
        Self {
            history,
            store,
            limit: limit.max(1),
        }
    }

    /// Start from whatever the store holds. An unreadable store starts empty.
    pub async fn open(store: Arc<dyn StateStore>, limit: usize) -> Self {
        let history = match store.load().await {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!("Could not load run history, starting empty: {}", e);
                RunHistory::default()
            }
        };
        Self::new(history, store, limit)
    }

    /// Record the current state of `run` and persist.
    ///
    /// `deleted_count` is recomputed from the entries first. Persistence
    /// failures are logged and swallowed.
    pub async fn record(&mut self, run: &mut RunState) {
        run.refresh_deleted_count();
        self.history.record(run, self.limit);
        if let Err(e) = self.store.save(&self.history).await {
            tracing::warn!(job_id = %run.job_id, "Failed to persist run state: {}", e);
        }
    }

    pub fn history(&self) -> &RunHistory {
        &self.history
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
