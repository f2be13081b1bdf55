use std::path::{Path as FsPath, PathBuf};

use anyhow::Context;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::config::ProcessingMode;
use crate::documents::info::DocumentExtractedInfo;
use crate::documents::pdf::{
    extract_text_from_base64_pdf, extract_text_from_pdf_bytes, PDF_DATA_URL_PREFIX,
};
use crate::documents::processing::{process_document, spawn_processing};
use crate::documents::visualization::generate_visualization_data;
use crate::errors::AppError;
use crate::models::document::{DocumentQuery, DocumentType, NewDocument, UserDocument};
use crate::sanitize::{clean_document_content, sanitize_bytes_for_storage, sanitize_file_name};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListQuery {
    pub document_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Serialize)]
pub struct DocumentListResponse {
    pub documents: Vec<UserDocument>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub document: UserDocument,
    pub auto_analyze: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedInfoResponse {
    pub document: UserDocument,
    pub extracted_info: DocumentExtractedInfo,
    pub visualization_data: Map<String, Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationResponse {
    pub visualization_data: Map<String, Value>,
    pub document_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfExtractRequest {
    pub base64_data: String,
}

#[derive(Debug, Serialize)]
pub struct PdfExtractResponse {
    pub success: bool,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /api/users/:userId/documents
pub async fn handle_list_documents(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<DocumentListQuery>,
) -> Result<Json<DocumentListResponse>, AppError> {
    let limit = params
        .limit
        .filter(|l| *l > 0)
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .min(MAX_PAGE_SIZE);
    let offset = params.offset.unwrap_or(0).max(0);

    let documents = state
        .store
        .list_documents(&DocumentQuery {
            user_id,
            document_type: params.document_type.filter(|t| !t.is_empty()),
            limit,
            offset,
        })
        .await?;

    Ok(Json(DocumentListResponse {
        documents,
        limit,
        offset,
    }))
}

/// POST /api/users/:userId/documents
///
/// Multipart form with a `documentType` field and a `file` part.
pub async fn handle_upload_document(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    if user_id.trim().is_empty() {
        return Err(AppError::Validation("userId is required".to_string()));
    }

    let mut document_type: Option<String> = None;
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("documentType") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("invalid documentType: {e}")))?;
                document_type = Some(value);
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("could not read file: {e}")))?;
                upload = Some((file_name, data.to_vec()));
            }
            _ => {}
        }
    }

    let document_type: DocumentType = document_type
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(AppError::Validation)?;
    let (original_name, data) =
        upload.ok_or_else(|| AppError::Validation("file is required".to_string()))?;

    let extension = FsPath::new(&original_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if !state.config.is_allowed_extension(&extension) {
        return Err(AppError::Validation(format!(
            "file type '.{extension}' is not allowed; supported: {}",
            state.config.upload_allowed_extensions.join(", ")
        )));
    }
    if data.len() > state.config.upload_max_bytes {
        return Err(AppError::Validation(format!(
            "file exceeds the {} byte upload limit",
            state.config.upload_max_bytes
        )));
    }

    let file_name = sanitize_file_name(&original_name);
    let path = store_upload(&state.config.upload_dir, &user_id, &file_name, &data).await?;
    let file_content = read_document_text(&extension, &data);

    // Nothing to analyze without text; the row stays pending.
    let auto_analyze = !file_content.is_empty();
    let document = state
        .store
        .insert_document(NewDocument {
            user_id: user_id.clone(),
            document_type,
            file_name,
            file_size: data.len() as i64,
            file_type: extension,
            file_path: path.to_string_lossy().into_owned(),
            file_content,
            upload_source: "manual".to_string(),
        })
        .await?;
    info!(
        "Stored {document_type} document {} for user {user_id}",
        document.id
    );

    let document = match state.config.document_processing {
        _ if !auto_analyze => document,
        ProcessingMode::Inline => {
            process_document(state.store.as_ref(), &state.llm, &user_id, document.id).await?
        }
        ProcessingMode::Background => {
            spawn_processing(state.store.clone(), state.llm.clone(), user_id, document.id);
            document
        }
    };

    Ok(Json(UploadResponse {
        message: "文档上传成功".to_string(),
        document,
        auto_analyze,
    }))
}

/// GET /api/users/:userId/documents/:documentId
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path((user_id, document_id)): Path<(String, i64)>,
) -> Result<Json<UserDocument>, AppError> {
    Ok(Json(find_document(&state, &user_id, document_id).await?))
}

/// DELETE /api/users/:userId/documents/:documentId
pub async fn handle_delete_document(
    State(state): State<AppState>,
    Path((user_id, document_id)): Path<(String, i64)>,
) -> Result<Json<Value>, AppError> {
    let document = find_document(&state, &user_id, document_id).await?;

    if !state.store.delete_document(&user_id, document_id).await? {
        return Err(AppError::NotFound(format!("Document {document_id} not found")));
    }
    if !document.file_path.is_empty() {
        if let Err(e) = tokio::fs::remove_file(&document.file_path).await {
            warn!("Could not remove {}: {e}", document.file_path);
        }
    }

    Ok(Json(json!({ "message": "文档已删除" })))
}

/// POST /api/users/:userId/documents/:documentId/process
pub async fn handle_process_document(
    State(state): State<AppState>,
    Path((user_id, document_id)): Path<(String, i64)>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let document = find_document(&state, &user_id, document_id).await?;
    spawn_processing(state.store.clone(), state.llm.clone(), user_id, document.id);

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "message": "文档处理已开始",
            "documentId": document.id,
        })),
    ))
}

/// GET /api/users/:userId/documents/:documentId/extracted-info
pub async fn handle_get_extracted_info(
    State(state): State<AppState>,
    Path((user_id, document_id)): Path<(String, i64)>,
) -> Result<Json<ExtractedInfoResponse>, AppError> {
    let document = find_document(&state, &user_id, document_id).await?;
    let extracted_info = processed_info(&document)?;
    let visualization_data = generate_visualization_data(&extracted_info, document.kind());

    Ok(Json(ExtractedInfoResponse {
        document,
        extracted_info,
        visualization_data,
    }))
}

/// GET /api/users/:userId/documents/:documentId/visualization
pub async fn handle_get_visualization(
    State(state): State<AppState>,
    Path((user_id, document_id)): Path<(String, i64)>,
) -> Result<Json<VisualizationResponse>, AppError> {
    let document = find_document(&state, &user_id, document_id).await?;
    let extracted_info = processed_info(&document)?;

    Ok(Json(VisualizationResponse {
        visualization_data: generate_visualization_data(&extracted_info, document.kind()),
        document_type: document.document_type,
    }))
}

/// POST /api/pdf/extract
///
/// Accepts a full `data:application/pdf;base64,` URL or the bare base64 payload.
pub async fn handle_extract_pdf(Json(req): Json<PdfExtractRequest>) -> Json<PdfExtractResponse> {
    let token = if req.base64_data.starts_with("data:") {
        req.base64_data
    } else {
        format!("{PDF_DATA_URL_PREFIX}{}", req.base64_data)
    };

    Json(match extract_text_from_base64_pdf(&token) {
        Ok(text) => PdfExtractResponse {
            success: true,
            text,
            error: None,
        },
        Err(e) => PdfExtractResponse {
            success: false,
            text: String::new(),
            error: Some(e.to_string()),
        },
    })
}

async fn find_document(
    state: &AppState,
    user_id: &str,
    document_id: i64,
) -> Result<UserDocument, AppError> {
    state
        .store
        .get_document(user_id, document_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {document_id} not found")))
}

fn processed_info(document: &UserDocument) -> Result<DocumentExtractedInfo, AppError> {
    let raw = match (&document.extracted_info, document.is_processed) {
        (Some(raw), true) => raw,
        _ => {
            return Err(AppError::Validation(format!(
                "Document {} has not been processed yet (status: {})",
                document.id, document.processing_status
            )))
        }
    };
    serde_json::from_str(raw)
        .with_context(|| format!("stored extraction of document {} is unreadable", document.id))
        .map_err(AppError::Internal)
}

async fn store_upload(
    upload_dir: &FsPath,
    user_id: &str,
    file_name: &str,
    data: &[u8],
) -> Result<PathBuf, AppError> {
    let dir = upload_dir.join(sanitize_file_name(user_id));
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("could not create upload directory {}", dir.display()))?;

    let path = dir.join(format!("{}_{file_name}", Utc::now().timestamp()));
    tokio::fs::write(&path, data)
        .await
        .with_context(|| format!("could not write upload to {}", path.display()))?;
    Ok(path)
}

fn read_document_text(extension: &str, data: &[u8]) -> String {
    if extension == "pdf" {
        return match extract_text_from_pdf_bytes(data) {
            Ok(text) => clean_document_content(&text),
            Err(e) => {
                warn!("No text scraped from uploaded PDF: {e}");
                String::new()
            }
        };
    }
    clean_document_content(&sanitize_bytes_for_storage(data))
}
