//! Gateway HTTP server powered by axum.
//!
//! Serves:
//! - `POST /webhook/telegram`: Telegram update webhook
//! - `POST /api/visibility`: direct visibility report
//! - `GET  /health`: health check

use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::astronomy::VisibilityCalculator;
use crate::config::Secret;
use crate::workflow::Workflow;

/// Shared state for the gateway.
#[derive(Clone)]
pub struct AppState {
    pub workflow: Workflow,
    pub calculator: Arc<VisibilityCalculator>,
    /// Expected `X-Telegram-Bot-Api-Secret-Token`, when configured.
    pub webhook_secret: Option<Secret>,
}

/// Build the axum router for the gateway.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook/telegram", post(handlers::telegram_webhook))
        .route("/api/visibility", post(handlers::visibility))
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Gateway server bind parameters.
pub struct GatewayParams {
    pub host: String,
    pub port: u16,
}

/// Start the gateway and serve until Ctrl-C.
pub async fn start_server(state: AppState, params: &GatewayParams) -> anyhow::Result<()> {
    let app = build_router(state);
    let addr: SocketAddr = format!("{}:{}", params.host, params.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid gateway address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Stargazer listening on http://{}", addr);
    tracing::info!("   Webhook:    http://{}/webhook/telegram", addr);
    tracing::info!("   Visibility: http://{}/api/visibility", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::AgentError;
    use crate::telegram::TelegramError;
    use crate::workflow::{Messenger, Responder};
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use tower::ServiceExt;

    struct EchoResponder;

    #[async_trait]
    impl Responder for EchoResponder {
        async fn respond(&self, _thread_id: &str, text: &str) -> Result<String, AgentError> {
            if text == "fail" {
                return Err(AgentError::EmptyResponse);
            }
            Ok(format!("You said: {text}"))
        }
    }

    #[derive(Default)]
    struct Outbox(Mutex<Vec<(i64, String)>>);

    #[async_trait]
    impl Messenger for Outbox {
        async fn deliver(&self, chat_id: i64, text: &str) -> Result<usize, TelegramError> {
            self.0.lock().expect("lock").push((chat_id, text.to_string()));
            Ok(1)
        }
    }

    fn test_state(secret: Option<&str>) -> (AppState, Arc<Outbox>) {
        let outbox = Arc::new(Outbox::default());
        let state = AppState {
            workflow: Workflow::new(Arc::new(EchoResponder), outbox.clone()),
            calculator: Arc::new(VisibilityCalculator::new()),
            webhook_secret: secret.map(Secret::from),
        };
        (state, outbox)
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(body).expect("json")))
            .expect("request")
    }

    fn text_update(chat_id: i64, text: &str) -> Value {
        json!({
            "update_id": 1,
            "message": {
                "message_id": 1,
                "from": { "id": chat_id, "is_bot": false, "first_name": "Asha" },
                "chat": { "id": chat_id, "type": "private" },
                "date": 1706194800,
                "text": text
            }
        })
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = to_bytes(resp.into_body(), 1 << 20).await.expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (state, _) = test_state(None);
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("request");

        let resp = build_router(state).oneshot(req).await.expect("response");
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], crate::VERSION);
    }

    #[tokio::test]
    async fn test_webhook_runs_workflow() {
        let (state, outbox) = test_state(None);
        let resp = build_router(state)
            .oneshot(post_json("/webhook/telegram", &text_update(7, "Mars?")))
            .await
            .expect("response");

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({ "ok": true }));
        assert_eq!(
            *outbox.0.lock().expect("lock"),
            vec![(7, "You said: Mars?".to_string())]
        );
    }

    #[tokio::test]
    async fn test_webhook_ignores_non_text_updates() {
        let (state, outbox) = test_state(None);
        let update = json!({ "update_id": 2, "edited_message": {
            "message_id": 3, "chat": { "id": 7, "type": "private" }, "date": 0, "text": "x"
        }});
        let resp = build_router(state)
            .oneshot(post_json("/webhook/telegram", &update))
            .await
            .expect("response");

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(outbox.0.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn test_webhook_failed_step_is_500() {
        let (state, _) = test_state(None);
        let resp = build_router(state)
            .oneshot(post_json("/webhook/telegram", &text_update(7, "fail")))
            .await
            .expect("response");

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["step"], "agent");
    }

    #[tokio::test]
    async fn test_webhook_secret_is_enforced() {
        let (state, outbox) = test_state(Some("s3cret"));
        let app = build_router(state);

        let resp = app
            .clone()
            .oneshot(post_json("/webhook/telegram", &text_update(7, "hi")))
            .await
            .expect("response");
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let mut req = post_json("/webhook/telegram", &text_update(7, "hi"));
        req.headers_mut().insert(
            "x-telegram-bot-api-secret-token",
            "s3cret".parse().expect("header"),
        );
        let resp = app.oneshot(req).await.expect("response");
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(outbox.0.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn test_webhook_malformed_body() {
        let (state, _) = test_state(None);
        let req = Request::builder()
            .method("POST")
            .uri("/webhook/telegram")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .expect("request");
        let resp = build_router(state).oneshot(req).await.expect("response");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_visibility_endpoint() {
        let (state, _) = test_state(None);
        let resp = build_router(state)
            .oneshot(post_json(
                "/api/visibility",
                &json!({ "latitude": 25.6, "longitude": 85.1, "time": "2024-01-25T15:00:00Z" }),
            ))
            .await
            .expect("response");

        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["bodies"].as_array().map(Vec::len), Some(9));
        assert_eq!(body["bodies"][0]["isVisible"], true);
        assert!(body["summary"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_visibility_rejects_bad_input() {
        let (state, _) = test_state(None);
        let app = build_router(state);

        let resp = app
            .clone()
            .oneshot(post_json("/api/visibility", &json!({ "latitude": 95.0, "longitude": 0.0 })))
            .await
            .expect("response");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(resp).await["error"].as_str().unwrap_or("").contains("latitude"));

        let resp = app
            .oneshot(post_json("/api/visibility", &json!({ "latitude": 10.0 })))
            .await
            .expect("response");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
