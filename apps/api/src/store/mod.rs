//! Persistence seam. Handlers and the chat pipeline only ever talk to
//! `Arc<dyn Store>`; `PgStore` is the production backend.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::document::{DocumentQuery, NewDocument, ProcessingUpdate, UserDocument};
use crate::models::history::{CareerHistory, NewCareerHistory};
use crate::models::message::{Message, NewMessage};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("row {0} not found")]
    Missing(i64),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_message(&self, message: NewMessage) -> Result<Message, PersistenceError>;

    /// Messages of a thread, oldest first. An empty id lists every thread.
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>, PersistenceError>;

    async fn insert_document(&self, document: NewDocument)
        -> Result<UserDocument, PersistenceError>;

    /// Looks a document up within the owner's scope.
    async fn get_document(
        &self,
        user_id: &str,
        id: i64,
    ) -> Result<Option<UserDocument>, PersistenceError>;

    async fn list_documents(
        &self,
        query: &DocumentQuery,
    ) -> Result<Vec<UserDocument>, PersistenceError>;

    /// Unconditional write; concurrent processing runs race and the last
    /// writer wins.
    async fn update_document_processing(
        &self,
        id: i64,
        update: ProcessingUpdate,
    ) -> Result<(), PersistenceError>;

    /// Returns whether a row was removed.
    async fn delete_document(&self, user_id: &str, id: i64) -> Result<bool, PersistenceError>;

    async fn insert_career_history(
        &self,
        entry: NewCareerHistory,
    ) -> Result<CareerHistory, PersistenceError>;
}
