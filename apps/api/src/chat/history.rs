use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::chat::category::{extract_tags, truncate_title, ThreadCategory};
use crate::models::history::NewCareerHistory;
use crate::sanitize::sanitize_for_storage;
use crate::store::Store;

/// One finished chat turn waiting to be logged.
#[derive(Debug, Clone)]
pub struct TurnRecord {
    pub user_id: String,
    pub thread_id: String,
    /// The user's text before attachment enrichment.
    pub user_text: String,
    pub reply: String,
    pub model_id: String,
    pub attachments: Vec<String>,
}

impl TurnRecord {
    fn into_history(self) -> NewCareerHistory {
        let category = ThreadCategory::for_history(&self.thread_id, &self.user_text);
        let metadata = if self.attachments.is_empty() {
            None
        } else {
            Some(json!({ "attachments": self.attachments }).to_string())
        };

        NewCareerHistory {
            title: truncate_title(&self.user_text),
            tags: extract_tags(&self.user_text, category),
            category: category.as_str().to_string(),
            user_id: self.user_id,
            thread_id: self.thread_id,
            content: sanitize_for_storage(&self.user_text),
            ai_response: sanitize_for_storage(&self.reply),
            model_id: self.model_id,
            metadata,
        }
    }
}

/// Sending half of the history queue. Cheap to clone; `record` never blocks.
#[derive(Clone)]
pub struct HistoryRecorder {
    tx: mpsc::UnboundedSender<TurnRecord>,
}

impl HistoryRecorder {
    /// Starts the worker task that drains the queue into `store`.
    /// The worker exits once every recorder has been dropped.
    pub fn spawn(store: Arc<dyn Store>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_worker(store, rx));
        (Self { tx }, handle)
    }

    /// Queues a turn. Entries are lost if the worker has already stopped.
    pub fn record(&self, turn: TurnRecord) {
        if let Err(e) = self.tx.send(turn) {
            warn!(
                "History worker is gone; dropping entry for thread {}",
                e.0.thread_id
            );
        }
    }
}

async fn run_worker(store: Arc<dyn Store>, mut rx: mpsc::UnboundedReceiver<TurnRecord>) {
    info!("History worker started");
    while let Some(turn) = rx.recv().await {
        let entry = turn.into_history();
        debug!(
            "Saving history: thread={}, category={}",
            entry.thread_id, entry.category
        );
        let thread_id = entry.thread_id.clone();
        match store.insert_career_history(entry).await {
            Ok(row) => debug!("History saved: id={}, thread={thread_id}", row.id),
            Err(e) => error!("Failed to save history for thread {thread_id}: {e}"),
        }
    }
    info!("History worker stopped");
}
