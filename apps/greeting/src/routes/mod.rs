pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::page::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Page sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/compliment/refresh",
            post(handlers::handle_refresh_compliment),
        )
        .route(
            "/api/v1/sessions/:id/slots/:slot",
            get(handlers::handle_get_slot),
        )
        .route(
            "/api/v1/sessions/:id/regions/:region/visibility",
            post(handlers::handle_report_visibility),
        )
        // Stateless helpers
        .route("/api/v1/poem/layout", post(handlers::handle_layout_poem))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::state::test_state;

    async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let router = build_router(test_state());
        let (status, body) = send(&router, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_session_lifecycle_without_key() {
        let router = build_router(test_state());

        let (status, body) = send(&router, Method::POST, "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["session_id"].as_str().unwrap().to_string();
        assert_eq!(body["page"]["image"]["status"], "error");
        assert_eq!(body["page"]["compliment"]["is_initial"], true);
        assert_eq!(body["page"]["poem"]["poem"]["lines"][0]["kind"], "blank");
        assert_eq!(body["page"]["poem"]["poem"]["lines"][1]["initial"], "S");

        let (status, body) = send(
            &router,
            Method::POST,
            &format!("/api/v1/sessions/{id}/compliment/refresh"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["accepted"], true);
        assert_eq!(body["compliment"]["status"], "error");
        assert_eq!(
            body["compliment"]["text"],
            "The creator forgot to add their magic key!"
        );

        let (status, body) = send(
            &router,
            Method::GET,
            &format!("/api/v1/sessions/{id}/slots/compliment?wait_ms=50"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["policy"], "on_demand");
        assert_eq!(body["error_message"], "not_configured");

        let (status, _) = send(
            &router,
            Method::DELETE,
            &format!("/api/v1/sessions/{id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) =
            send(&router, Method::GET, &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_visibility_report_validation_and_one_shot() {
        let router = build_router(test_state());
        let (_, body) = send(&router, Method::POST, "/api/v1/sessions", None).await;
        let id = body["session_id"].as_str().unwrap().to_string();
        let uri = format!("/api/v1/sessions/{id}/regions/image_card/visibility");

        let (status, body) = send(&router, Method::POST, &uri, Some(json!({ "ratio": 1.5 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = send(&router, Method::POST, &uri, Some(json!({ "ratio": 0.4 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["armed"], true);
        assert_eq!(body["active"], true);
        assert_eq!(body["particles"], 10);

        let (status, _) = send(
            &router,
            Method::POST,
            &format!("/api/v1/sessions/{id}/regions/header/visibility"),
            Some(json!({ "ratio": 0.4 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_slot_is_rejected() {
        let router = build_router(test_state());
        let (_, body) = send(&router, Method::POST, "/api/v1/sessions", None).await;
        let id = body["session_id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &router,
            Method::GET,
            &format!("/api/v1/sessions/{id}/slots/weather"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Unknown slot 'weather'");
    }

    #[tokio::test]
    async fn test_static_slot_has_no_policy() {
        let router = build_router(test_state());
        let (_, body) = send(&router, Method::POST, "/api/v1/sessions", None).await;
        let id = body["session_id"].as_str().unwrap().to_string();

        let (_, body) = send(
            &router,
            Method::GET,
            &format!("/api/v1/sessions/{id}/slots/history"),
            None,
        )
        .await;
        assert_eq!(body["status"], "ready");
        assert_eq!(body["policy"], Value::Null);
        assert!(body["value"].as_str().unwrap().starts_with("On this day"));
    }

    #[tokio::test]
    async fn test_layout_endpoint() {
        let router = build_router(test_state());
        let (status, body) = send(
            &router,
            Method::POST,
            "/api/v1/poem/layout",
            Some(json!({ "text": "Title\nSub\n💖 Love\n  " })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Title");
        assert_eq!(body["subtitle"], "Sub");
        assert_eq!(body["lines"][0]["initial"], "💖");
        assert_eq!(body["lines"][0]["rest"], " Love");
        assert_eq!(body["lines"][1]["kind"], "blank");
    }
}
