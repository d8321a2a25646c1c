use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;

use crate::server::config::Service;

/// Body returned to the client on any generation failure. The cause is only
/// logged.
pub const GENERATION_FAILED: &str = "failed to generate ID";

#[derive(Clone)]
pub struct AppState {
    service: Arc<Service>,
}

impl AppState {
    pub fn new(service: Service) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageIdResponse {
    pub id: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/message-id", get(message_id))
        .route("/health", get(health))
        .with_state(state)
}

async fn message_id(State(state): State<AppState>) -> Response {
    match state.service.get_id_async().await {
        Ok(id) => Json(MessageIdResponse { id }).into_response(),
        Err(err) => {
            tracing::error!(error = %err, retryable = err.is_retryable(), "{GENERATION_FAILED}");
            (StatusCode::INTERNAL_SERVER_ERROR, GENERATION_FAILED).into_response()
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, header},
    };
    use msgid::{GeneratorConfig, IdService, MessageId, SnowflakeId, SystemClock};
    use tower::ServiceExt;

    use super::*;
    use crate::server::config::{Clock, Generator};

    fn app(generator: Generator) -> Router {
        router(AppState::new(IdService::new(generator)))
    }

    fn system_clock() -> Clock {
        Clock::System(SystemClock::new().unwrap())
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_owned());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn message_id_returns_decimal_json() {
        let generator = Generator::new(1, system_clock()).unwrap();
        let (status, content_type, body) = get(app(generator), "/message-id").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        let id: MessageId = json["id"].as_str().unwrap().parse().unwrap();
        assert_eq!(id.node_id(), 1);
        assert_eq!(id.sequence(), 0);
    }

    #[tokio::test]
    async fn consecutive_requests_increase() {
        let app = app(Generator::new(7, system_clock()).unwrap());

        let mut last: Option<MessageId> = None;
        for _ in 0..16 {
            let (status, _, body) = get(app.clone(), "/message-id").await;
            assert_eq!(status, StatusCode::OK);
            let json: serde_json::Value = serde_json::from_str(&body).unwrap();
            let id: MessageId = json["id"].as_str().unwrap().parse().unwrap();
            assert!(Some(id) > last);
            last = Some(id);
        }
    }

    #[tokio::test]
    async fn generator_failure_is_a_plain_500() {
        // Resume from an ID stamped at the end of time: every clock reading
        // is a regression.
        let last = MessageId::from(MessageId::max_timestamp(), 1, 0);
        let generator =
            Generator::from_last_id(last, system_clock(), GeneratorConfig::default());
        let (status, content_type, body) = get(app(generator), "/message-id").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(content_type.unwrap().starts_with("text/plain"));
        assert_eq!(body, GENERATION_FAILED);
        assert!(!body.contains("\"id\""));
    }

    #[tokio::test]
    async fn health_is_ok() {
        let generator = Generator::new(1, system_clock()).unwrap();
        let (status, _, body) = get(app(generator), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let generator = Generator::new(1, system_clock()).unwrap();
        let (status, _, _) = get(app(generator), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
