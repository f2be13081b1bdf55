use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Resume,
    Contract,
    Offer,
    Employment,
    Other,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Resume => "resume",
            DocumentType::Contract => "contract",
            DocumentType::Offer => "offer",
            DocumentType::Employment => "employment",
            DocumentType::Other => "other",
        }
    }

    /// Lenient mapping for values already stored; unknown types fall back to `Other`.
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or(DocumentType::Other)
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resume" => Ok(DocumentType::Resume),
            "contract" => Ok(DocumentType::Contract),
            "offer" => Ok(DocumentType::Offer),
            "employment" => Ok(DocumentType::Employment),
            "other" => Ok(DocumentType::Other),
            other => Err(format!("unsupported document type '{other}'")),
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    pub id: i64,
    pub user_id: String,
    pub document_type: String,
    pub file_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub file_path: String,
    pub file_content: String,
    /// Serialized `DocumentExtractedInfo`, present once processing completed.
    pub extracted_info: Option<String>,
    pub upload_source: String,
    pub is_processed: bool,
    pub processing_status: String,
    pub processing_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserDocument {
    pub fn kind(&self) -> DocumentType {
        DocumentType::from_stored(&self.document_type)
    }
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub user_id: String,
    pub document_type: DocumentType,
    pub file_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub file_path: String,
    pub file_content: String,
    pub upload_source: String,
}

/// State transitions written by the processing pipeline.
#[derive(Debug, Clone)]
pub enum ProcessingUpdate {
    Started,
    Completed { extracted_info: String },
    Failed { error: String },
}

impl ProcessingUpdate {
    pub fn status(&self) -> ProcessingStatus {
        match self {
            ProcessingUpdate::Started => ProcessingStatus::Processing,
            ProcessingUpdate::Completed { .. } => ProcessingStatus::Completed,
            ProcessingUpdate::Failed { .. } => ProcessingStatus::Failed,
        }
    }
}

/// Filters for listing a user's documents.
#[derive(Debug, Clone)]
pub struct DocumentQuery {
    pub user_id: String,
    pub document_type: Option<String>,
    pub limit: i64,
    pub offset: i64,
}
