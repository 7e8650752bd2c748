//! HTTP adapters - REST API implementations.
//!
//! `app_router` assembles the turn routes with the cross-cutting layers:
//! request ids, tracing, timeout, compression and CORS.

pub mod turn;

pub use turn::{turn_routes, TurnHandlers};

use axum::http::{HeaderName, HeaderValue, Method};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Builds the service router.
pub fn app_router(handlers: TurnHandlers, server: &ServerConfig) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    turn_routes(handlers)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(build_cors_layer(&server.cors_origins_list(), server.is_production()))
}

/// CORS from the configured origins; permissive outside production when none are set.
fn build_cors_layer(origins: &[String], production: bool) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!(origin = %origin, "Invalid CORS origin");
                None
            })
        })
        .collect();

    if parsed.is_empty() {
        if production {
            tracing::warn!("No CORS origins configured; cross-origin requests will be refused");
            return CorsLayer::new();
        }
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockSemanticClassifier;
    use crate::adapters::backend::MockOrderQueryService;
    use crate::adapters::catalog::CatalogStore;
    use crate::adapters::notification::RecordingNotifier;
    use crate::application::handlers::{ProcessTurnHandler, ReloadCatalogHandler};
    use crate::config::AnonymousPolicy;
    use crate::domain::auth::TokenVerifier;
    use crate::domain::catalog::WorkflowCatalog;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    const CATALOG: &str = include_str!("../../../config/workflow.yaml");
    const SECRET: &str = "router-secret";

    fn app() -> Router {
        let catalog = Arc::new(CatalogStore::from_catalog(
            WorkflowCatalog::from_yaml_str(CATALOG).unwrap(),
        ));
        let process = ProcessTurnHandler::new(
            catalog.clone(),
            Arc::new(MockSemanticClassifier::new()),
            Arc::new(MockOrderQueryService::new()),
            Arc::new(RecordingNotifier::new()),
            TokenVerifier::new(SECRET, 3600, 60),
            AnonymousPolicy::PromptLogin,
        );
        let handlers = TurnHandlers::new(
            Arc::new(process),
            Arc::new(ReloadCatalogHandler::new(catalog)),
        );
        app_router(handlers, &ServerConfig::default())
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn token(user: &str) -> String {
        TokenVerifier::new(SECRET, 3600, 60)
            .generate(user, chrono::Utc::now().timestamp())
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "support-flow");
    }

    #[tokio::test]
    async fn process_returns_wire_format() {
        let response = app()
            .oneshot(post(
                "/process",
                json!({
                    "session_id": "s-1",
                    "user_id": "u-1",
                    "platform": "web",
                    "language": "en",
                    "status": 1,
                    "messages": "I need to top up",
                    "token": token("u-1")
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["stage"], "working");
        assert_eq!(body["type"], "S001");
        assert_eq!(body["transfer_human"], 0);
        assert_eq!(body["state"]["stage"], "ask_identifier");
        assert!(body["metadata"]["turn_id"].is_string());
    }

    #[tokio::test]
    async fn forged_token_is_unauthorized() {
        let response = app()
            .oneshot(post(
                "/process",
                json!({
                    "session_id": "s-1",
                    "user_id": "u-1",
                    "messages": "deposit",
                    "token": "u-1.1700000000.deadbeef"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn missing_messages_is_unprocessable() {
        let response = app()
            .oneshot(post("/process", json!({"session_id": "s", "user_id": "u"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn reload_without_source_fails() {
        let response = app()
            .oneshot(post("/reload_config", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
