//! HTTP server for the RAG system

pub mod routes;
pub mod state;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::context::RagContext;
use crate::error::{Error, Result};
use state::AppState;

/// RAG HTTP Server
pub struct RagServer {
    state: AppState,
}

impl RagServer {
    /// Create a server over an initialized context
    pub fn new(context: RagContext) -> Self {
        Self {
            state: AppState::new(context),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        let router = Router::new()
            .route("/health", get(health_check))
            .route("/ready", get(readiness))
            .nest("/api", routes::api_routes())
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.state.context().config().server.enable_cors {
            router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
        } else {
            router
        }
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = self.router();

        tracing::info!("Starting RAG server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        let server = &self.state.context().config().server;
        format!("{}:{}", server.host, server.port)
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Readiness check endpoint
///
/// The state only exists once startup checks have passed, so this reports
/// what was loaded.
async fn readiness(State(state): State<AppState>) -> Json<Value> {
    let context = state.context();
    Json(json!({
        "ready": true,
        "chunks": context.metadata().len(),
        "dimension": context.index().dimension(),
        "embedding_model": context.encoder().provider().model(),
        "llm_model": context.llm().model(),
        "available_slots": state.available_permits(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RagConfig;
    use crate::testing::{drifting_context, fixture_context_with, fixture_context_with_config, StubLlm};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    async fn server(llm: StubLlm) -> RagServer {
        RagServer::new(fixture_context_with(Arc::new(llm)).await)
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_ready_reports_corpus() {
        let server = server(StubLlm::answering("ok")).await;
        let (status, body) = send(
            server.router(),
            Request::get("/ready").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["chunks"], 4);
        assert_eq!(body["dimension"], 3);
        assert_eq!(body["available_slots"], 64);
    }

    #[tokio::test]
    async fn test_out_of_bounds_is_generic_over_http() {
        let server = RagServer::new(drifting_context(Arc::new(StubLlm::answering("unused"))).await);
        let (status, body) = send(
            server.router(),
            post("/api/query", json!({ "question": "migren" })),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["type"], "internal_error");
        assert_eq!(body["error"]["message"], "Internal consistency error");
        assert!(!body.to_string().contains("out of metadata bounds"));
    }

    #[tokio::test]
    async fn test_query_waits_for_a_free_slot() {
        let mut config = RagConfig::default();
        config.server.max_concurrent_requests = 1;
        let server = RagServer::new(
            fixture_context_with_config(config, Arc::new(StubLlm::answering("ok"))).await,
        );
        let router = server.router();

        let held = server.state().acquire().await.unwrap();
        let blocked = tokio::time::timeout(
            Duration::from_millis(50),
            send(router.clone(), post("/api/query", json!({ "question": "migren" }))),
        )
        .await;
        assert!(blocked.is_err());

        drop(held);
        let (status, body) = send(router, post("/api/query", json!({ "question": "migren" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "ok");
    }

    #[tokio::test]
    async fn test_query_endpoint() {
        let server = server(StubLlm::answering("Bel fıtığı bir disk sorunudur.")).await;
        let (status, body) = send(
            server.router(),
            post("/api/query", json!({ "question": "bel fıtığı" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "Bel fıtığı bir disk sorunudur.");
        assert_eq!(body["contexts"].as_array().unwrap().len(), 3);
        assert_eq!(body["contexts"][0]["rank"], 1);
    }

    #[tokio::test]
    async fn test_query_completion_failure_is_bad_gateway() {
        let server = server(StubLlm::failing("quota exceeded")).await;
        let (status, body) = send(
            server.router(),
            post("/api/query", json!({ "question": "migren" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["type"], "generation_error");
    }

    #[tokio::test]
    async fn test_retrieve_endpoint_honors_top_k() {
        let server = server(StubLlm::answering("unused")).await;
        let (status, body) = send(
            server.router(),
            post("/api/retrieve", json!({ "query": "migren", "top_k": 2 })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let contexts = body["contexts"].as_array().unwrap();
        assert_eq!(contexts.len(), 2);
        assert_eq!(contexts[0]["title"], "Migren");
        assert_eq!(contexts[1]["title"], "Herni");
    }

    #[tokio::test]
    async fn test_chat_endpoint_extends_history() {
        let server = server(StubLlm::answering("Merhaba.")).await;
        let router = server.router();

        let (_, welcome) = send(
            router.clone(),
            Request::get("/api/chat/welcome").body(Body::empty()).unwrap(),
        )
        .await;
        let history = welcome["history"].clone();
        assert_eq!(history.as_array().unwrap().len(), 1);

        let (status, body) = send(
            router,
            post("/api/chat", json!({ "message": "migren", "history": history })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let history = body["history"].as_array().unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1]["role"], "user");
        assert_eq!(history[2]["content"], "Merhaba.");
    }

    #[tokio::test]
    async fn test_address() {
        let server = server(StubLlm::answering("ok")).await;
        assert_eq!(server.address(), "0.0.0.0:7860");
    }
}
