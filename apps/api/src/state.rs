use std::sync::Arc;

use crate::chat::history::HistoryRecorder;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub llm: LlmClient,
    pub config: Config,
    /// Queue feeding the background history worker.
    pub history: HistoryRecorder,
}

#[cfg(test)]
impl AppState {
    /// State backed by the given store with the model API at `model_api_url`.
    /// Spawns a history worker, so it must be called inside a runtime.
    pub fn for_tests(store: Arc<dyn Store>, model_api_url: String) -> Self {
        let config = Config::for_tests(
            model_api_url,
            std::env::temp_dir().join("career-api-tests"),
        );
        let llm = LlmClient::new(
            config.model_api_url.clone(),
            config.model_api_key.clone(),
            config.model_timeout,
        )
        .expect("test client");
        let (history, _worker) = HistoryRecorder::spawn(store.clone());
        AppState {
            store,
            llm,
            config,
            history,
        }
    }
}
