use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::document::{DocumentQuery, NewDocument, ProcessingUpdate, UserDocument};
use crate::models::history::{CareerHistory, NewCareerHistory};
use crate::models::message::{Message, NewMessage};
use crate::store::{PersistenceError, Store};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_message(&self, message: NewMessage) -> Result<Message, PersistenceError> {
        let row = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (user_id, role, content, thread_id, attachments)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&message.user_id)
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(&message.thread_id)
        .bind(&message.attachments)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>, PersistenceError> {
        let rows = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE ($1 = '' OR thread_id = $1) ORDER BY created_at ASC, id ASC",
        )
        .bind(thread_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_document(
        &self,
        document: NewDocument,
    ) -> Result<UserDocument, PersistenceError> {
        let row = sqlx::query_as::<_, UserDocument>(
            r#"
            INSERT INTO user_documents
                (user_id, document_type, file_name, file_size, file_type, file_path,
                 file_content, upload_source, is_processed, processing_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, FALSE, 'pending')
            RETURNING *
            "#,
        )
        .bind(&document.user_id)
        .bind(document.document_type.as_str())
        .bind(&document.file_name)
        .bind(document.file_size)
        .bind(&document.file_type)
        .bind(&document.file_path)
        .bind(&document.file_content)
        .bind(&document.upload_source)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_document(
        &self,
        user_id: &str,
        id: i64,
    ) -> Result<Option<UserDocument>, PersistenceError> {
        let row = sqlx::query_as::<_, UserDocument>(
            "SELECT * FROM user_documents WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_documents(
        &self,
        query: &DocumentQuery,
    ) -> Result<Vec<UserDocument>, PersistenceError> {
        let rows = sqlx::query_as::<_, UserDocument>(
            r#"
            SELECT * FROM user_documents
            WHERE user_id = $1 AND ($2::TEXT IS NULL OR document_type = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&query.user_id)
        .bind(&query.document_type)
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update_document_processing(
        &self,
        id: i64,
        update: ProcessingUpdate,
    ) -> Result<(), PersistenceError> {
        let status = update.status().as_str();
        let result = match update {
            ProcessingUpdate::Started => {
                sqlx::query(
                    r#"
                    UPDATE user_documents
                    SET processing_status = $1, is_processed = FALSE, processing_error = NULL,
                        updated_at = NOW()
                    WHERE id = $2
                    "#,
                )
                .bind(status)
                .bind(id)
                .execute(&self.pool)
                .await?
            }
            ProcessingUpdate::Completed { extracted_info } => {
                sqlx::query(
                    r#"
                    UPDATE user_documents
                    SET processing_status = $1, is_processed = TRUE, extracted_info = $2,
                        processing_error = NULL, updated_at = NOW()
                    WHERE id = $3
                    "#,
                )
                .bind(status)
                .bind(extracted_info)
                .bind(id)
                .execute(&self.pool)
                .await?
            }
            ProcessingUpdate::Failed { error } => {
                sqlx::query(
                    r#"
                    UPDATE user_documents
                    SET processing_status = $1, is_processed = FALSE, extracted_info = NULL,
                        processing_error = $2, updated_at = NOW()
                    WHERE id = $3
                    "#,
                )
                .bind(status)
                .bind(error)
                .bind(id)
                .execute(&self.pool)
                .await?
            }
        };

        if result.rows_affected() == 0 {
            return Err(PersistenceError::Missing(id));
        }
        Ok(())
    }

    async fn delete_document(&self, user_id: &str, id: i64) -> Result<bool, PersistenceError> {
        let result = sqlx::query("DELETE FROM user_documents WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_career_history(
        &self,
        entry: NewCareerHistory,
    ) -> Result<CareerHistory, PersistenceError> {
        let row = sqlx::query_as::<_, CareerHistory>(
            r#"
            INSERT INTO career_histories
                (user_id, thread_id, category, title, content, ai_response, model_id,
                 tags, rating, is_bookmarked, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, FALSE, $9)
            RETURNING *
            "#,
        )
        .bind(&entry.user_id)
        .bind(&entry.thread_id)
        .bind(&entry.category)
        .bind(&entry.title)
        .bind(&entry.content)
        .bind(&entry.ai_response)
        .bind(&entry.model_id)
        .bind(&entry.tags)
        .bind(&entry.metadata)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
