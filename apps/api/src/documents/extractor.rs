use thiserror::Error;
use tracing::{info, warn};

use crate::documents::info::DocumentExtractedInfo;
use crate::documents::prompts::{
    render, CONTRACT_EXTRACTION_PROMPT, EMPLOYMENT_EXTRACTION_PROMPT, GENERAL_EXTRACTION_PROMPT,
    OFFER_EXTRACTION_PROMPT, RESUME_EXTRACTION_PROMPT,
};
use crate::llm_client::{extract_json_object, LlmClient, LlmError};
use crate::models::document::{DocumentType, UserDocument};

/// Contracts are dense legal text and go to the larger model.
pub const CONTRACT_EXTRACTION_MODEL: &str = "bailian/qwen-plus";
pub const EXTRACTION_MODEL: &str = "bailian/qwen-flash";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("document has no text content")]
    EmptyContent,

    #[error("model returned no choices")]
    ModelEmpty,

    #[error("model call failed: {0}")]
    Model(#[from] LlmError),

    #[error("could not parse {document_type} extraction: {source}")]
    Parse {
        document_type: DocumentType,
        #[source]
        source: serde_json::Error,
    },
}

fn plan_for(document_type: DocumentType) -> (&'static str, &'static str) {
    match document_type {
        DocumentType::Resume => (RESUME_EXTRACTION_PROMPT, EXTRACTION_MODEL),
        DocumentType::Contract => (CONTRACT_EXTRACTION_PROMPT, CONTRACT_EXTRACTION_MODEL),
        DocumentType::Offer => (OFFER_EXTRACTION_PROMPT, EXTRACTION_MODEL),
        DocumentType::Employment => (EMPLOYMENT_EXTRACTION_PROMPT, EXTRACTION_MODEL),
        DocumentType::Other => (GENERAL_EXTRACTION_PROMPT, EXTRACTION_MODEL),
    }
}

/// Asks the model for the structured fields of a stored document.
pub async fn extract_info(
    llm: &LlmClient,
    document: &UserDocument,
) -> Result<DocumentExtractedInfo, ExtractError> {
    if document.file_content.trim().is_empty() {
        return Err(ExtractError::EmptyContent);
    }

    let document_type = document.kind();
    let (template, model) = plan_for(document_type);
    let prompt = render(template, &document.file_content);

    info!(
        "Extracting {document_type} document {} with {model}",
        document.id
    );
    let completion = llm.send_message(model, &prompt, &[]).await?;
    let text = completion.text().ok_or(ExtractError::ModelEmpty)?;

    let json = extract_json_object(text);
    serde_json::from_str(json).map_err(|source| {
        warn!("Unparseable extraction for document {}: {json}", document.id);
        ExtractError::Parse {
            document_type,
            source,
        }
    })
}
