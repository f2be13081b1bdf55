//! In-process `Store` used by unit tests, with switches to make individual
//! writes fail.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::models::document::{DocumentQuery, NewDocument, ProcessingUpdate, UserDocument};
use crate::models::history::{CareerHistory, NewCareerHistory};
use crate::models::message::{Message, MessageRole, NewMessage};
use crate::store::{PersistenceError, Store};

#[derive(Default)]
struct Tables {
    next_id: i64,
    messages: Vec<Message>,
    documents: Vec<UserDocument>,
    history: Vec<CareerHistory>,
    status_log: Vec<(i64, String)>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_role: Mutex<Option<MessageRole>>,
    fail_history: Mutex<bool>,
    fail_completion: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every insert of a message with this role fail.
    pub fn fail_messages_with_role(&self, role: MessageRole) {
        *self.fail_role.lock().unwrap() = Some(role);
    }

    pub fn fail_history_writes(&self) {
        *self.fail_history.lock().unwrap() = true;
    }

    /// Makes every `Completed` processing update fail.
    pub fn fail_completion_writes(&self) {
        *self.fail_completion.lock().unwrap() = true;
    }

    pub fn messages(&self) -> Vec<Message> {
        self.tables.lock().unwrap().messages.clone()
    }

    pub fn history(&self) -> Vec<CareerHistory> {
        self.tables.lock().unwrap().history.clone()
    }

    pub fn documents(&self) -> Vec<UserDocument> {
        self.tables.lock().unwrap().documents.clone()
    }

    /// Every processing status written for the document, in order.
    pub fn status_log(&self, id: i64) -> Vec<String> {
        self.tables
            .lock()
            .unwrap()
            .status_log
            .iter()
            .filter(|(doc, _)| *doc == id)
            .map(|(_, status)| status.clone())
            .collect()
    }

    /// Inserts a fully specified document row, bypassing the upload flow.
    pub fn seed_document(&self, mut document: UserDocument) -> UserDocument {
        let mut tables = self.tables.lock().unwrap();
        document.id = tables.next_id();
        tables.documents.push(document.clone());
        document
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_message(&self, message: NewMessage) -> Result<Message, PersistenceError> {
        if *self.fail_role.lock().unwrap() == Some(message.role) {
            return Err(PersistenceError::Unavailable(format!(
                "{} message insert disabled",
                message.role.as_str()
            )));
        }
        let mut tables = self.tables.lock().unwrap();
        let mut row = message.unsaved();
        row.id = tables.next_id();
        tables.messages.push(row.clone());
        Ok(row)
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>, PersistenceError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .messages
            .iter()
            .filter(|m| thread_id.is_empty() || m.thread_id == thread_id)
            .cloned()
            .collect())
    }

    async fn insert_document(
        &self,
        document: NewDocument,
    ) -> Result<UserDocument, PersistenceError> {
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        let row = UserDocument {
            id: tables.next_id(),
            user_id: document.user_id,
            document_type: document.document_type.as_str().to_string(),
            file_name: document.file_name,
            file_size: document.file_size,
            file_type: document.file_type,
            file_path: document.file_path,
            file_content: document.file_content,
            extracted_info: None,
            upload_source: document.upload_source,
            is_processed: false,
            processing_status: "pending".to_string(),
            processing_error: None,
            created_at: now,
            updated_at: now,
        };
        tables.status_log.push((row.id, row.processing_status.clone()));
        tables.documents.push(row.clone());
        Ok(row)
    }

    async fn get_document(
        &self,
        user_id: &str,
        id: i64,
    ) -> Result<Option<UserDocument>, PersistenceError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .documents
            .iter()
            .find(|d| d.id == id && d.user_id == user_id)
            .cloned())
    }

    async fn list_documents(
        &self,
        query: &DocumentQuery,
    ) -> Result<Vec<UserDocument>, PersistenceError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .documents
            .iter()
            .rev()
            .filter(|d| d.user_id == query.user_id)
            .filter(|d| {
                query
                    .document_type
                    .as_deref()
                    .map_or(true, |t| d.document_type == t)
            })
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn update_document_processing(
        &self,
        id: i64,
        update: ProcessingUpdate,
    ) -> Result<(), PersistenceError> {
        if matches!(update, ProcessingUpdate::Completed { .. })
            && *self.fail_completion.lock().unwrap()
        {
            return Err(PersistenceError::Unavailable(
                "completion update disabled".to_string(),
            ));
        }
        let mut tables = self.tables.lock().unwrap();
        let status = update.status().as_str().to_string();
        let document = tables
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(PersistenceError::Missing(id))?;
        document.processing_status = status.clone();
        document.updated_at = Utc::now();
        match update {
            ProcessingUpdate::Started => {
                document.is_processed = false;
                document.processing_error = None;
            }
            ProcessingUpdate::Completed { extracted_info } => {
                document.is_processed = true;
                document.extracted_info = Some(extracted_info);
                document.processing_error = None;
            }
            ProcessingUpdate::Failed { error } => {
                document.is_processed = false;
                document.extracted_info = None;
                document.processing_error = Some(error);
            }
        }
        tables.status_log.push((id, status));
        Ok(())
    }

    async fn delete_document(&self, user_id: &str, id: i64) -> Result<bool, PersistenceError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.documents.len();
        tables
            .documents
            .retain(|d| !(d.id == id && d.user_id == user_id));
        Ok(tables.documents.len() < before)
    }

    async fn insert_career_history(
        &self,
        entry: NewCareerHistory,
    ) -> Result<CareerHistory, PersistenceError> {
        if *self.fail_history.lock().unwrap() {
            return Err(PersistenceError::Unavailable(
                "history insert disabled".to_string(),
            ));
        }
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        let row = CareerHistory {
            id: tables.next_id(),
            user_id: entry.user_id,
            thread_id: entry.thread_id,
            category: entry.category,
            title: entry.title,
            content: entry.content,
            ai_response: entry.ai_response,
            model_id: entry.model_id,
            tags: entry.tags,
            rating: 0,
            is_bookmarked: false,
            metadata: entry.metadata,
            created_at: now,
            updated_at: now,
        };
        tables.history.push(row.clone());
        Ok(row)
    }
}
