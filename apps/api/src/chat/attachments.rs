use tracing::{debug, warn};

use crate::documents::info::DocumentExtractedInfo;
use crate::documents::pdf::{extract_text_from_base64_pdf, is_pdf_data_url, PDF_DATA_URL_PREFIX};
use crate::models::document::UserDocument;
use crate::store::Store;

const DOCUMENT_TOKEN_PREFIX: &str = "document:";
const SUMMARY_MAX_CHARS: usize = 500;

/// A turn's content after attachment tokens have been resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAttachments {
    /// Raw content followed by one block per usable attachment.
    pub enriched_content: String,
    /// JSON array of the original tokens; `None` when no token was sent.
    pub tokens_json: Option<String>,
}

/// Resolves PDF data URLs and `document:<id>` references into text blocks
/// appended to `content`. Tokens that yield nothing are still kept in
/// `tokens_json`. Document lookups are scoped to `user_id`.
pub async fn resolve_attachments(
    store: &dyn Store,
    user_id: &str,
    content: &str,
    tokens: &[String],
) -> ResolvedAttachments {
    let mut blocks = Vec::new();
    for token in tokens {
        if let Some(block) = resolve_token(store, user_id, token).await {
            blocks.push(block);
        }
    }

    let enriched_content = if blocks.is_empty() {
        content.to_string()
    } else {
        format!("{content}\n\n{}", blocks.join("\n\n"))
    };

    let tokens_json = if tokens.is_empty() {
        None
    } else {
        serde_json::to_string(tokens).ok()
    };

    ResolvedAttachments {
        enriched_content,
        tokens_json,
    }
}

async fn resolve_token(store: &dyn Store, user_id: &str, token: &str) -> Option<String> {
    if token.starts_with(PDF_DATA_URL_PREFIX) {
        if !is_pdf_data_url(token) {
            debug!("Attachment carries the PDF prefix but no PDF payload");
            return None;
        }
        return match extract_text_from_base64_pdf(token) {
            Ok(text) => Some(format!("[PDF文档内容]:\n{text}")),
            Err(e) => {
                debug!("PDF attachment skipped: {e}");
                None
            }
        };
    }

    let raw_id = token.strip_prefix(DOCUMENT_TOKEN_PREFIX)?;
    let Ok(id) = raw_id.trim().parse::<i64>() else {
        warn!("Ignoring malformed document reference '{token}'");
        return None;
    };

    match store.get_document(user_id, id).await {
        Ok(Some(document)) => document_block(&document),
        Ok(None) => {
            warn!("Document {id} referenced by {user_id} not found");
            None
        }
        Err(e) => {
            warn!("Could not load document {id}: {e}");
            None
        }
    }
}

fn document_block(document: &UserDocument) -> Option<String> {
    if document.is_processed {
        if let Some(info) = document.extracted_info.as_deref() {
            if serde_json::from_str::<DocumentExtractedInfo>(info).is_ok() {
                return Some(format!("[{}分析结果]:\n{info}", document.document_type));
            }
        }
    }

    if document.file_content.is_empty() {
        return None;
    }
    Some(format!(
        "[{}文档摘要]:\n{}",
        document.document_type,
        summarize(&document.file_content)
    ))
}

fn summarize(content: &str) -> String {
    if content.chars().count() <= SUMMARY_MAX_CHARS {
        return content.to_string();
    }
    let mut summary: String = content.chars().take(SUMMARY_MAX_CHARS).collect();
    summary.push_str("...");
    summary
}
