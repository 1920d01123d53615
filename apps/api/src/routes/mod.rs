pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::auth::handlers as auth;
use crate::generation::handlers as generation;
use crate::resume::handlers as resume;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth API
        .route("/api/v1/auth/signup", post(auth::handle_sign_up))
        .route("/api/v1/auth/signin", post(auth::handle_sign_in))
        .route("/api/v1/auth/signout", post(auth::handle_sign_out))
        .route("/api/v1/auth/me", get(auth::handle_me))
        // Resume API
        .route("/api/v1/resumes/current", get(resume::handle_get_current))
        .route(
            "/api/v1/resumes/current/preview",
            get(resume::handle_preview),
        )
        .route(
            "/api/v1/resumes/current/document",
            get(resume::handle_document),
        )
        .route(
            "/api/v1/resumes/current/download",
            get(resume::handle_download),
        )
        .route("/api/v1/resumes/:id", put(resume::handle_save))
        .route(
            "/api/v1/resumes/:id/generate",
            post(generation::handle_generate_for_resume),
        )
        // Stateless generation endpoint
        .route("/api/generate", post(generation::handle_generate))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tokio::sync::Notify;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::auth::stub::StubAuth;
    use crate::generation::generator::{ContentGenerator, GenerationMode};
    use crate::llm_client::{CompletionBackend, LlmError};
    use crate::models::user::AuthUser;
    use crate::resume::store::memory::MemoryResumeStore;

    const TOKEN: &str = "token-ana";
    const OTHER_TOKEN: &str = "token-ben";

    struct TestApp {
        app: Router,
        store: Arc<MemoryResumeStore>,
        user: AuthUser,
    }

    fn test_app(generator: ContentGenerator) -> TestApp {
        let (mut auth, user) = StubAuth::with_user(TOKEN);
        auth.users.insert(
            OTHER_TOKEN.to_string(),
            AuthUser {
                id: Uuid::new_v4(),
                email: None,
            },
        );
        let store = Arc::new(MemoryResumeStore::default());
        let state = AppState::new(store.clone(), Arc::new(auth), generator);
        TestApp {
            app: build_router(state),
            store,
            user,
        }
    }

    fn offline_app() -> TestApp {
        test_app(ContentGenerator::new(GenerationMode::Offline, None))
    }

    fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> Response {
        app.clone().oneshot(req).await.unwrap()
    }

    async fn body_bytes(resp: Response) -> Vec<u8> {
        axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(resp: Response) -> Value {
        serde_json::from_slice(&body_bytes(resp).await).unwrap()
    }

    async fn current_id(app: &Router) -> String {
        let resp = send(app, request(Method::GET, "/api/v1/resumes/current", Some(TOKEN), None)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        body_json(resp).await["id"].as_str().unwrap().to_string()
    }

    async fn save_fields(app: &Router, id: &str, fields: Value) -> Response {
        send(
            app,
            request(
                Method::PUT,
                &format!("/api/v1/resumes/{id}"),
                Some(TOKEN),
                Some(json!({ "fields": fields })),
            ),
        )
        .await
    }

    fn section_items(doc: &Value, kind: &str) -> Vec<Value> {
        doc["sections"]
            .as_array()
            .unwrap()
            .iter()
            .find(|s| s["kind"] == kind)
            .map(|s| s["body"]["content"].as_array().unwrap().clone())
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let t = offline_app();
        let resp = send(&t.app, request(Method::GET, "/health", None, None)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_resume_routes_require_token() {
        let t = offline_app();
        for uri in ["/api/v1/resumes/current", "/api/v1/resumes/current/preview"] {
            let resp = send(&t.app, request(Method::GET, uri, None, None)).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
        let resp = send(
            &t.app,
            request(Method::GET, "/api/v1/resumes/current", Some("unknown"), None),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_first_visit_creates_one_empty_record() {
        let t = offline_app();
        let resp = send(&t.app, request(Method::GET, "/api/v1/resumes/current", Some(TOKEN), None)).await;
        let body = body_json(resp).await;
        assert_eq!(body["title"], "My Resume");
        assert_eq!(body["fields"]["fullName"], "");

        let again = current_id(&t.app).await;
        assert_eq!(body["id"].as_str().unwrap(), again);
        assert_eq!(t.store.count_for(t.user.id).await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_visits_share_one_record() {
        let t = offline_app();
        let (a, b) = tokio::join!(current_id(&t.app), current_id(&t.app));
        assert_eq!(a, b);
        assert_eq!(t.store.count_for(t.user.id).await, 1);
    }

    #[tokio::test]
    async fn test_save_replaces_fields_and_title() {
        let t = offline_app();
        let id = current_id(&t.app).await;
        let resp = send(
            &t.app,
            request(
                Method::PUT,
                &format!("/api/v1/resumes/{id}"),
                Some(TOKEN),
                Some(json!({ "title": "Backend CV", "fields": { "fullName": "Ana Ruiz" } })),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let current = body_json(
            send(&t.app, request(Method::GET, "/api/v1/resumes/current", Some(TOKEN), None)).await,
        )
        .await;
        assert_eq!(current["title"], "Backend CV");
        assert_eq!(current["fields"]["fullName"], "Ana Ruiz");
    }

    #[tokio::test]
    async fn test_save_to_foreign_record_is_not_found() {
        let t = offline_app();
        let id = current_id(&t.app).await;
        let resp = send(
            &t.app,
            request(
                Method::PUT,
                &format!("/api/v1/resumes/{id}"),
                Some(OTHER_TOKEN),
                Some(json!({ "fields": { "fullName": "Mallory" } })),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_preview_without_record_is_not_found() {
        let t = offline_app();
        let resp = send(
            &t.app,
            request(Method::GET, "/api/v1/resumes/current/preview", Some(TOKEN), None),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(resp).await["error"]["message"],
            "No resume found. Go back and create one."
        );
    }

    #[tokio::test]
    async fn test_preview_keeps_all_education_document_caps_it() {
        let t = offline_app();
        let id = current_id(&t.app).await;
        let education = (1..=7).map(|i| format!("School {i}")).collect::<Vec<_>>().join("\n");
        save_fields(&t.app, &id, json!({ "fullName": "Ana", "education": education })).await;

        let preview = body_json(
            send(
                &t.app,
                request(Method::GET, "/api/v1/resumes/current/preview", Some(TOKEN), None),
            )
            .await,
        )
        .await;
        let document = body_json(
            send(
                &t.app,
                request(Method::GET, "/api/v1/resumes/current/document", Some(TOKEN), None),
            )
            .await,
        )
        .await;

        assert_eq!(section_items(&preview, "education").len(), 7);
        assert_eq!(section_items(&document, "education").len(), 6);
        assert_eq!(document["sections"][0]["kind"], "header");
    }

    #[tokio::test]
    async fn test_download_markdown_sets_attachment_headers() {
        let t = offline_app();
        let id = current_id(&t.app).await;
        save_fields(&t.app, &id, json!({ "fullName": "Ana Ruiz" })).await;

        let resp = send(
            &t.app,
            request(
                Method::GET,
                "/api/v1/resumes/current/download?format=md",
                Some(TOKEN),
                None,
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"My_Resume.md\""
        );
        assert!(resp.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/markdown"));
        let text = String::from_utf8(body_bytes(resp).await).unwrap();
        assert!(text.contains("Ana Ruiz"));
    }

    #[tokio::test]
    async fn test_download_defaults_to_pdf() {
        let t = offline_app();
        current_id(&t.app).await;

        let resp = send(
            &t.app,
            request(Method::GET, "/api/v1/resumes/current/download", Some(TOKEN), None),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/pdf");
        assert!(body_bytes(resp).await.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_record_generation_sets_overlay_and_keeps_raw_fields() {
        let t = offline_app();
        let id = current_id(&t.app).await;
        save_fields(
            &t.app,
            &id,
            json!({ "fullName": "Ana", "skills": "Rust, Go", "experience": "Built a cache" }),
        )
        .await;

        let resp = send(
            &t.app,
            request(
                Method::POST,
                &format!("/api/v1/resumes/{id}/generate"),
                Some(TOKEN),
                None,
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["fields"]["fullName"], "Ana");
        assert_eq!(body["fields"]["experience"], "Built a cache");
        assert!(body["fields"]["aiSummary"].as_str().unwrap().contains("Rust"));
        assert_eq!(body["fields"]["aiSkillsClean"], json!(["Rust", "Go"]));
    }

    #[tokio::test]
    async fn test_record_generation_without_name_is_rejected() {
        let t = offline_app();
        let id = current_id(&t.app).await;
        let resp = send(
            &t.app,
            request(
                Method::POST,
                &format!("/api/v1/resumes/{id}/generate"),
                Some(TOKEN),
                None,
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"]["message"], "fullName is required");
    }

    /// Holds the completion open until released.
    #[derive(Default)]
    struct GatedBackend {
        started: Notify,
        release: Notify,
    }

    #[async_trait::async_trait]
    impl CompletionBackend for GatedBackend {
        async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(r#"{"summary":"Gated","experienceBullets":[],"projectBullets":[],"skillsClean":[]}"#
                .to_string())
        }
    }

    #[tokio::test]
    async fn test_duplicate_generation_is_rejected_while_one_runs() {
        let backend = Arc::new(GatedBackend::default());
        let t = test_app(ContentGenerator::new(GenerationMode::Live, Some(backend.clone())));
        let id = current_id(&t.app).await;
        save_fields(&t.app, &id, json!({ "fullName": "Ana" })).await;

        let uri = format!("/api/v1/resumes/{id}/generate");
        let (first, second) = tokio::join!(
            send(&t.app, request(Method::POST, &uri, Some(TOKEN), None)),
            async {
                backend.started.notified().await;
                let resp = send(&t.app, request(Method::POST, &uri, Some(TOKEN), None)).await;
                backend.release.notify_one();
                resp
            }
        );

        assert_eq!(second.status(), StatusCode::CONFLICT);
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(body_json(first).await["fields"]["aiSummary"], "Gated");
    }

    #[tokio::test]
    async fn test_raw_fields_saved_during_generation_are_kept() {
        let backend = Arc::new(GatedBackend::default());
        let t = test_app(ContentGenerator::new(GenerationMode::Live, Some(backend.clone())));
        let id = current_id(&t.app).await;
        save_fields(&t.app, &id, json!({ "fullName": "Ana", "skills": "Go" })).await;

        let uri = format!("/api/v1/resumes/{id}/generate");
        let (generated, saved) = tokio::join!(
            send(&t.app, request(Method::POST, &uri, Some(TOKEN), None)),
            async {
                backend.started.notified().await;
                let resp = save_fields(
                    &t.app,
                    &id,
                    json!({ "fullName": "Ana Lima", "skills": "Go, Rust", "experience": "Shipped payments" }),
                )
                .await;
                backend.release.notify_one();
                resp
            }
        );
        assert_eq!(saved.status(), StatusCode::OK);
        assert_eq!(generated.status(), StatusCode::OK);

        let current = body_json(
            send(&t.app, request(Method::GET, "/api/v1/resumes/current", Some(TOKEN), None)).await,
        )
        .await;
        assert_eq!(current["fields"]["fullName"], "Ana Lima");
        assert_eq!(current["fields"]["skills"], "Go, Rust");
        assert_eq!(current["fields"]["experience"], "Shipped payments");
        assert_eq!(current["fields"]["aiSummary"], "Gated");
    }

    /// Replies with fixed text.
    struct CannedBackend(&'static str);

    #[async_trait::async_trait]
    impl CompletionBackend for CannedBackend {
        async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    fn live_app(reply: &'static str) -> TestApp {
        test_app(ContentGenerator::new(
            GenerationMode::Live,
            Some(Arc::new(CannedBackend(reply))),
        ))
    }

    #[tokio::test]
    async fn test_stateless_generate_malformed_reply_returns_raw() {
        let t = live_app("not json at all");
        let resp = send(
            &t.app,
            request(
                Method::POST,
                "/api/generate",
                None,
                Some(json!({ "input": { "fullName": "Ana" } })),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(resp).await,
            json!({ "error": "AI response invalid", "raw": "not json at all" })
        );
    }

    #[tokio::test]
    async fn test_record_generation_malformed_reply_keeps_overlay() {
        let t = live_app("not json at all");
        let id = current_id(&t.app).await;
        save_fields(
            &t.app,
            &id,
            json!({ "fullName": "Ana", "aiSummary": "Earlier summary" }),
        )
        .await;

        let resp = send(
            &t.app,
            request(
                Method::POST,
                &format!("/api/v1/resumes/{id}/generate"),
                Some(TOKEN),
                None,
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(resp).await;
        assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
        assert_eq!(body["error"]["message"], "AI response invalid");

        let current = body_json(
            send(&t.app, request(Method::GET, "/api/v1/resumes/current", Some(TOKEN), None)).await,
        )
        .await;
        assert_eq!(current["fields"]["aiSummary"], "Earlier summary");
        assert!(current["fields"].get("aiExperienceBullets").is_none());
    }

    #[tokio::test]
    async fn test_stateless_generate_unreadable_body_gets_flat_error() {
        let t = offline_app();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/generate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("not json"))
            .unwrap();
        let resp = send(&t.app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
        assert!(body.get("ok").is_none());
    }

    #[tokio::test]
    async fn test_stateless_generate_requires_full_name() {
        let t = offline_app();
        let resp = send(
            &t.app,
            request(
                Method::POST,
                "/api/generate",
                None,
                Some(json!({ "input": { "fullName": "   " } })),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await, json!({ "error": "fullName is required" }));
    }

    #[tokio::test]
    async fn test_stateless_generate_returns_result() {
        let t = offline_app();
        let resp = send(
            &t.app,
            request(
                Method::POST,
                "/api/generate",
                None,
                Some(json!({ "input": { "fullName": "Ana", "headline": "Backend Engineer" } })),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["ok"], true);
        assert!(body["result"]["summary"]
            .as_str()
            .unwrap()
            .contains("Backend Engineer"));
        assert_eq!(body["result"]["experienceBullets"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_live_generate_without_credential() {
        let t = test_app(ContentGenerator::new(GenerationMode::Live, None));
        let resp = send(
            &t.app,
            request(
                Method::POST,
                "/api/generate",
                None,
                Some(json!({ "input": { "fullName": "Ana" } })),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp).await["error"], "Missing ANTHROPIC_API_KEY");
    }

    #[tokio::test]
    async fn test_sign_in_and_me() {
        let t = offline_app();
        let bad = send(
            &t.app,
            request(
                Method::POST,
                "/api/v1/auth/signin",
                None,
                Some(json!({ "email": "ana@example.com", "password": "wrong" })),
            ),
        )
        .await;
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let good = send(
            &t.app,
            request(
                Method::POST,
                "/api/v1/auth/signin",
                None,
                Some(json!({ "email": "ana@example.com", "password": "correct horse" })),
            ),
        )
        .await;
        assert_eq!(good.status(), StatusCode::OK);
        assert!(!body_json(good).await["access_token"].as_str().unwrap().is_empty());

        let me = send(&t.app, request(Method::GET, "/api/v1/auth/me", Some(TOKEN), None)).await;
        assert_eq!(body_json(me).await["id"], t.user.id.to_string());
    }

    #[tokio::test]
    async fn test_sign_out_returns_no_content() {
        let t = offline_app();
        let resp = send(
            &t.app,
            request(Method::POST, "/api/v1/auth/signout", Some(TOKEN), None),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }
}
