pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::chat::handlers as chat;
use crate::documents::handlers as documents;
use crate::state::AppState;

/// Room for multipart framing and the other form fields on top of the file.
const UPLOAD_BODY_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.upload_max_bytes + UPLOAD_BODY_OVERHEAD;

    Router::new()
        .route("/health", get(health::health_handler))
        // Chat
        .route(
            "/api/messages",
            get(chat::handle_list_messages).post(chat::handle_send_message),
        )
        .route("/api/messages/stream", post(chat::handle_stream_message))
        .route("/api/models", get(chat::handle_list_models))
        // Documents
        .route(
            "/api/users/:user_id/documents",
            get(documents::handle_list_documents).post(documents::handle_upload_document),
        )
        .route(
            "/api/users/:user_id/documents/:document_id",
            get(documents::handle_get_document).delete(documents::handle_delete_document),
        )
        .route(
            "/api/users/:user_id/documents/:document_id/process",
            post(documents::handle_process_document),
        )
        .route(
            "/api/users/:user_id/documents/:document_id/extracted-info",
            get(documents::handle_get_extracted_info),
        )
        .route(
            "/api/users/:user_id/documents/:document_id/visualization",
            get(documents::handle_get_visualization),
        )
        .route("/api/pdf/extract", post(documents::handle_extract_pdf))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProcessingMode;
    use crate::documents::extractor::tests::reply;
    use crate::store::memory::MemoryStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BOUNDARY: &str = "career-api-test-boundary";

    struct Harness {
        _server: MockServer,
        _uploads: TempDir,
        store: Arc<MemoryStore>,
        router: Router,
    }

    async fn harness(response: ResponseTemplate) -> Harness {
        harness_with_mode(response, ProcessingMode::Inline).await
    }

    async fn harness_with_mode(response: ResponseTemplate, mode: ProcessingMode) -> Harness {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(response)
            .mount(&server)
            .await;
        let uploads = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new());
        let mut state = AppState::for_tests(store.clone(), server.uri());
        state.config.upload_dir = uploads.path().to_path_buf();
        state.config.document_processing = mode;

        Harness {
            _server: server,
            _uploads: uploads,
            store,
            router: build_router(state),
        }
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn upload_request(
        user_id: &str,
        document_type: &str,
        file_name: &str,
        content: &str,
    ) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"documentType\"\r\n\r\n\
             {document_type}\r\n\
             --{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: text/markdown\r\n\r\n\
             {content}\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri(format!("/api/users/{user_id}/documents"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn send_json(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = send(router, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn wait_for_history(store: &MemoryStore, count: usize) {
        for _ in 0..100 {
            if store.history().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("history worker did not write {count} rows");
    }

    /// Waits until the document has seen `writes` status writes, the last one terminal.
    async fn wait_for_terminal(store: &MemoryStore, id: i64, writes: usize) -> String {
        for _ in 0..200 {
            let log = store.status_log(id);
            if log.len() >= writes {
                if let Some(last) = log.last().filter(|s| *s == "completed" || *s == "failed") {
                    return last.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("document {id} never reached a terminal status: {:?}", store.status_log(id));
    }

    fn process_request(user_id: &str, id: i64) -> Request<Body> {
        Request::post(format!("/api/users/{user_id}/documents/{id}/process"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness(reply("unused")).await;
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = send_json(&h.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_simulated_chat_turn_end_to_end() {
        let h = harness(reply("unused")).await;
        let request = json_request(
            "/api/messages",
            json!({
                "userId": "u1",
                "threadId": "career-1",
                "content": "我想了解职业转型",
                "modelId": "",
            }),
        );

        let (status, body) = send_json(&h.router, request).await;
        assert_eq!(status, StatusCode::OK);
        let messages = body.as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["threadId"], "career-1");
        let reply_text = messages[1]["content"].as_str().unwrap();
        assert!(reply_text.starts_with("这是一个关于职业转型的重要问题。"));
        assert!(reply_text.contains("[使用模型: ]"));
        assert_eq!(h.store.messages().len(), 2);

        wait_for_history(&h.store, 1).await;
        let history = &h.store.history()[0];
        assert_eq!(history.category, "career");
        assert_eq!(history.tags, r#"["职业规划","转型"]"#);
        assert_eq!(history.user_id, "u1");
    }

    #[tokio::test]
    async fn test_upstream_error_is_returned_as_assistant_row() {
        let h = harness(ResponseTemplate::new(500).set_body_string("boom")).await;
        let request = json_request(
            "/api/messages",
            json!({
                "userId": "u1",
                "threadId": "offer-1",
                "content": "hi",
                "modelId": "bailian/qwen-flash",
            }),
        );

        let (status, body) = send_json(&h.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body[1]["content"]
            .as_str()
            .unwrap()
            .starts_with("抱歉，调用AI模型时出现错误"));
        assert_eq!(h.store.messages()[1].role, "assistant");
    }

    #[tokio::test]
    async fn test_blank_content_is_bad_request() {
        let h = harness(reply("unused")).await;
        let request = json_request("/api/messages", json!({"userId": "u1", "content": "  "}));

        let (status, body) = send_json(&h.router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(h.store.messages().is_empty());
    }

    #[tokio::test]
    async fn test_stream_endpoint_headers_and_body() {
        let h = harness(reply("unused")).await;
        let request = json_request(
            "/api/messages/stream",
            json!({"userId": "u1", "threadId": "offer-2", "content": "hello"}),
        );

        let response = h.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.starts_with("## Offer分析建议"));
        assert!(text.ends_with("[使用模型: ]"));

        wait_for_history(&h.store, 1).await;
        assert_eq!(h.store.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_list_messages_by_thread() {
        let h = harness(reply("unused")).await;
        for thread in ["career-1", "offer-1"] {
            let request = json_request(
                "/api/messages",
                json!({"userId": "u1", "threadId": thread, "content": "hi"}),
            );
            send(&h.router, request).await;
        }

        let request = Request::get("/api/messages?threadId=offer-1")
            .body(Body::empty())
            .unwrap();
        let (_, body) = send_json(&h.router, request).await;
        let messages = body.as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| m["threadId"] == "offer-1"));

        let request = Request::get("/api/messages").body(Body::empty()).unwrap();
        let (_, body) = send_json(&h.router, request).await;
        assert_eq!(body.as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_models_endpoint() {
        let h = harness(reply("unused")).await;
        let request = Request::get("/api/models").body(Body::empty()).unwrap();
        let (_, body) = send_json(&h.router, request).await;
        let models = body["models"].as_array().unwrap();
        assert!(models.iter().any(|m| m == "bailian/qwen-flash"));
    }

    #[tokio::test]
    async fn test_markdown_upload_reaches_terminal_status() {
        let h = harness(reply(
            r#"{"personalInfo": {"name": "李四", "email": "li@example.com"}, "skills": {"technical": ["Rust"]}}"#,
        ))
        .await;

        let request = upload_request("u1", "resume", "resume.md", "# 李四\n\nRust 工程师");
        let (status, body) = send_json(&h.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "文档上传成功");
        assert_eq!(body["autoAnalyze"], true);
        assert_eq!(body["document"]["processingStatus"], "completed");
        assert_eq!(body["document"]["isProcessed"], true);

        let id = body["document"]["id"].as_i64().unwrap();
        let stored = &h.store.documents()[0];
        assert_eq!(stored.file_content, "# 李四\n\nRust 工程师");
        assert!(std::path::Path::new(&stored.file_path).exists());

        let request = Request::get(format!("/api/users/u1/documents/{id}/extracted-info"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send_json(&h.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["extractedInfo"]["personalInfo"]["name"], "李四");

        // The processed document feeds the next chat turn.
        let request = json_request(
            "/api/messages",
            json!({
                "userId": "u1",
                "threadId": "career-9",
                "content": "看看我的简历",
                "attachments": [format!("document:{id}")],
            }),
        );
        let (status, body) = send_json(&h.router, request).await;
        assert_eq!(status, StatusCode::OK);
        let user_content = body[0]["content"].as_str().unwrap();
        assert!(user_content.starts_with("看看我的简历\n\n[resume分析结果]:\n"));
        assert!(user_content.contains("李四"));
    }

    #[tokio::test]
    async fn test_background_upload_returns_pending_then_finishes() {
        let h = harness_with_mode(
            reply(r#"{"offerInfo": {"company": "Acme"}}"#),
            ProcessingMode::Background,
        )
        .await;

        let request = upload_request("u1", "offer", "offer.md", "Acme offer, 40k");
        let (status, body) = send_json(&h.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["autoAnalyze"], true);
        assert_eq!(body["document"]["processingStatus"], "pending");
        assert_eq!(body["document"]["isProcessed"], false);

        let id = body["document"]["id"].as_i64().unwrap();
        assert_eq!(wait_for_terminal(&h.store, id, 3).await, "completed");
        assert_eq!(
            h.store.status_log(id),
            vec!["pending", "processing", "completed"]
        );
    }

    #[tokio::test]
    async fn test_reprocess_is_accepted_and_finishes() {
        let h = harness(reply(r#"{"personalInfo": {"name": "李四"}}"#)).await;
        let request = upload_request("u1", "resume", "resume.md", "# 李四");
        let (_, body) = send_json(&h.router, request).await;
        let id = body["document"]["id"].as_i64().unwrap();

        let (status, body) = send_json(&h.router, process_request("u1", id)).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["documentId"], id);
        assert_eq!(body["message"], "文档处理已开始");

        assert_eq!(wait_for_terminal(&h.store, id, 5).await, "completed");
        assert_eq!(
            h.store.status_log(id),
            vec!["pending", "processing", "completed", "processing", "completed"]
        );
    }

    #[tokio::test]
    async fn test_reprocess_of_foreign_document_is_not_found() {
        let h = harness(reply(r#"{"personalInfo": {"name": "李四"}}"#)).await;
        let request = upload_request("u1", "resume", "resume.md", "# 李四");
        let (_, body) = send_json(&h.router, request).await;
        let id = body["document"]["id"].as_i64().unwrap();

        let (status, body) = send_json(&h.router, process_request("u2", id)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(h.store.status_log(id).len(), 3);
    }

    #[tokio::test]
    async fn test_empty_markdown_upload_is_not_analyzed() {
        let h = harness(reply("{}")).await;

        let request = upload_request("u1", "resume", "empty.md", "");
        let (status, body) = send_json(&h.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["autoAnalyze"], false);
        assert_eq!(body["document"]["processingStatus"], "pending");

        let id = body["document"]["id"].as_i64().unwrap();
        assert_eq!(h.store.status_log(id), vec!["pending"]);
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_extension_and_type() {
        let h = harness(reply("{}")).await;

        let (status, _) = send(&h.router, upload_request("u1", "resume", "cv.exe", "x")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&h.router, upload_request("u1", "poem", "cv.md", "x")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(h.store.documents().is_empty());
    }

    #[tokio::test]
    async fn test_documents_are_scoped_to_their_owner() {
        let h = harness(reply("{}")).await;
        let request = upload_request("u1", "offer", "offer.md", "offer text");
        let (_, body) = send_json(&h.router, request).await;
        let id = body["document"]["id"].as_i64().unwrap();

        let request = Request::get(format!("/api/users/u2/documents/{id}"))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&h.router, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let request = Request::delete(format!("/api/users/u1/documents/{id}"))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&h.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(h.store.documents().is_empty());
    }

    #[tokio::test]
    async fn test_pdf_extract_endpoint_reports_failure_in_body() {
        let h = harness(reply("unused")).await;
        let request = json_request("/api/pdf/extract", json!({"base64Data": "bm90IGEgcGRm"}));

        let (status, body) = send_json(&h.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }
}
