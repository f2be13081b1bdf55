use std::sync::Arc;

use tracing::{error, info, warn};

use crate::documents::extractor::extract_info;
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::document::{ProcessingUpdate, UserDocument};
use crate::store::Store;

/// Runs extraction for one document and records the outcome.
///
/// pending/completed/failed → processing → completed | failed. Extraction
/// failures end in `failed` with the reason stored; only store errors and a
/// missing document are returned as errors. Nothing prevents two runs on the
/// same row; the later write wins.
pub async fn process_document(
    store: &dyn Store,
    llm: &LlmClient,
    user_id: &str,
    document_id: i64,
) -> Result<UserDocument, AppError> {
    let document = load(store, user_id, document_id).await?;

    store
        .update_document_processing(document.id, ProcessingUpdate::Started)
        .await?;

    let update = match extract_info(llm, &document).await {
        Ok(info) => match serde_json::to_string(&info) {
            Ok(extracted_info) => ProcessingUpdate::Completed { extracted_info },
            Err(e) => ProcessingUpdate::Failed {
                error: format!("could not serialize extraction: {e}"),
            },
        },
        Err(e) => {
            warn!("Extraction failed for document {}: {e}", document.id);
            ProcessingUpdate::Failed {
                error: e.to_string(),
            }
        }
    };

    let status = update.status();
    if let Err(e) = store.update_document_processing(document.id, update).await {
        error!("Could not record outcome for document {}: {e}", document.id);
        let fallback = ProcessingUpdate::Failed {
            error: format!("could not record processing outcome: {e}"),
        };
        if let Err(retry) = store.update_document_processing(document.id, fallback).await {
            error!("Document {} left in processing: {retry}", document.id);
        }
        return Err(e.into());
    }
    info!(
        "Document {} processing finished: {}",
        document.id,
        status.as_str()
    );

    load(store, user_id, document_id).await
}

/// Fire-and-forget variant used by background uploads and the reprocess endpoint.
pub fn spawn_processing(
    store: Arc<dyn Store>,
    llm: LlmClient,
    user_id: String,
    document_id: i64,
) {
    tokio::spawn(async move {
        if let Err(e) = process_document(store.as_ref(), &llm, &user_id, document_id).await {
            error!("Background processing of document {document_id} failed: {e}");
        }
    });
}

async fn load(
    store: &dyn Store,
    user_id: &str,
    document_id: i64,
) -> Result<UserDocument, AppError> {
    store
        .get_document(user_id, document_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {document_id} not found")))
}
