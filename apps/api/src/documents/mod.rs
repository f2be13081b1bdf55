// User documents: upload, storage, model-backed extraction and the derived
// visualization data. All model calls go through llm_client.

pub mod extractor;
pub mod handlers;
pub mod info;
pub mod pdf;
pub mod processing;
pub mod prompts;
pub mod visualization;
