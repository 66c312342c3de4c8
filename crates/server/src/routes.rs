use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use orderflow_agent::{DraftExtractor, ExtractorError};
use orderflow_core::{advance, begin, DomainError, Field, Order, OrderDraft, Turn};

use crate::middleware::{self, RateLimiter};

#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<DraftExtractor>,
}

/// API routes only; used directly by tests.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/order/start", post(order_start))
        .route("/api/order/reply", post(order_reply))
        .route("/api/order/create", post(order_create))
        .with_state(state)
}

/// Full application: routes behind the path filter / rate limiter and
/// request tracing.
pub fn app(state: AppState, rate_limiter: RateLimiter) -> Router {
    router(state)
        .layer(axum::middleware::from_fn_with_state(
            rate_limiter,
            middleware::filter_and_limit,
        ))
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub text: String,
    #[serde(default)]
    pub template_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub draft: OrderDraft,
    pub field: String,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    checked_at: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "orderflow-server",
        checked_at: Utc::now().to_rfc3339(),
    })
}

/// First turn: extract a draft from the request text, then either ask the
/// first missing field or return the finished order.
async fn order_start(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> Result<Json<Turn>, (StatusCode, Json<ApiError>)> {
    let correlation_id = Uuid::new_v4();
    let mut draft = state
        .extractor
        .extract(&request.text)
        .await
        .map_err(|source| extraction_failure(correlation_id, source))?;
    if draft.template_id.is_none() {
        draft.template_id = request.template_id;
    }

    let (turn, diagnostic) = begin(draft, Utc::now().date_naive());
    log_turn("api.order.start", correlation_id, &turn, diagnostic);
    Ok(Json(turn))
}

/// Later turns: apply exactly one answer to the declared field. An
/// identifier that does not parse means the answer cannot be applied, so
/// the draft is re-examined as-is and the next open question is asked.
async fn order_reply(Json(request): Json<ReplyRequest>) -> Json<Turn> {
    let correlation_id = Uuid::new_v4();
    let today = Utc::now().date_naive();

    let (turn, diagnostic) = match request.field.parse::<Field>() {
        Ok(field) => advance(&request.draft, field, &request.answer, today),
        Err(parse_error) => {
            warn!(
                event_name = "api.order.reply.unknown_field",
                correlation_id = %correlation_id,
                error = %parse_error,
                "answer targets an unknown field, re-examining the draft"
            );
            begin(request.draft, today)
        }
    };

    log_turn("api.order.reply", correlation_id, &turn, diagnostic);
    Json(turn)
}

/// One-shot conversion without the dialogue: extract and immediately apply
/// strict validation with defaults.
async fn order_create(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> Result<Json<Order>, (StatusCode, Json<ApiError>)> {
    let correlation_id = Uuid::new_v4();
    let mut draft = state
        .extractor
        .extract(&request.text)
        .await
        .map_err(|source| extraction_failure(correlation_id, source))?;
    if draft.template_id.is_none() {
        draft.template_id = request.template_id;
    }

    match Order::from_draft(&draft, Utc::now().date_naive()) {
        Ok(order) => {
            info!(
                event_name = "api.order.create",
                correlation_id = %correlation_id,
                grand_total = %order.grand_total(),
                currency = %order.currency,
                "order created"
            );
            Ok(Json(order))
        }
        Err(source) => {
            warn!(
                event_name = "api.order.create.validation_failed",
                correlation_id = %correlation_id,
                error = %source,
                "extracted draft failed strict validation"
            );
            Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiError { error: "order validation failed".to_string() }),
            ))
        }
    }
}

fn extraction_failure(
    correlation_id: Uuid,
    source: ExtractorError,
) -> (StatusCode, Json<ApiError>) {
    error!(
        event_name = "api.order.extraction_failed",
        correlation_id = %correlation_id,
        error = %source,
        "draft extraction failed"
    );
    (StatusCode::BAD_GATEWAY, Json(ApiError { error: "order extraction failed".to_string() }))
}

fn log_turn(event_name: &'static str, correlation_id: Uuid, turn: &Turn, diagnostic: Option<DomainError>) {
    if let Some(source) = diagnostic {
        // Root cause stays on the developer side; the caller only sees a re-ask.
        warn!(
            event_name = event_name,
            correlation_id = %correlation_id,
            error = %source,
            "dialogue-complete draft failed strict validation, re-asking"
        );
    }
    match turn {
        Turn::Ask { field, .. } => info!(
            event_name = event_name,
            correlation_id = %correlation_id,
            outcome = "ask",
            field = %field,
            "next dialogue turn"
        ),
        Turn::Done { .. } => info!(
            event_name = event_name,
            correlation_id = %correlation_id,
            outcome = "done",
            "order promoted"
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use orderflow_agent::{DraftExtractor, LlmClient};

    use super::{router, AppState};

    /// Always returns the same canned model output.
    struct CannedClient(String);

    #[async_trait]
    impl LlmClient for CannedClient {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    fn app_with_model_output(output: &str) -> axum::Router {
        let client = Arc::new(CannedClient(output.to_string()));
        router(AppState { extractor: Arc::new(DraftExtractor::new(client)) })
    }

    fn post_json(path: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn response_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    const COMPLETE_OUTPUT: &str = r#"{
        "seller": {"name": "テスト物産"},
        "buyer": {"name": "ABC Corp"},
        "currency": "JPY",
        "payment_method": "CARD",
        "items": [{"sku": "X1", "name": "Widget", "qty": 3, "unit_price": 100.00}]
    }"#;

    #[tokio::test]
    async fn start_returns_done_for_a_complete_request() {
        let app = app_with_model_output(COMPLETE_OUTPUT);
        let response = app
            .oneshot(post_json("/api/order/start", serde_json::json!({"text": "注文お願いします"})))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["status"], "done");
        assert_eq!(body["order"]["buyer"]["name"], "ABC Corp");
        assert_eq!(body["order"]["payment_method"], "CARD");
    }

    #[tokio::test]
    async fn start_asks_the_first_missing_field_for_a_partial_request() {
        let app = app_with_model_output(r#"{"buyer": {"name": "ABC Corp"}}"#);
        let response = app
            .oneshot(post_json("/api/order/start", serde_json::json!({"text": "ABC Corp宛"})))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["status"], "ask");
        assert_eq!(body["field"], "seller.name");
        assert_eq!(body["draft"]["buyer"]["name"], "ABC Corp");
    }

    #[tokio::test]
    async fn start_fails_the_turn_when_no_json_comes_back() {
        let app = app_with_model_output("すみません、わかりません。");
        let response = app
            .oneshot(post_json("/api/order/start", serde_json::json!({"text": "注文"})))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn reply_applies_the_answer_and_finishes_the_dialogue() {
        let app = app_with_model_output("unused");
        let draft = serde_json::json!({
            "seller": {"name": "テスト物産"},
            "buyer": {"name": "ABC Corp"},
            "currency": "JPY",
            "payment_method": "CARD",
            "items": [{"sku": "X1", "name": "Widget", "qty": 3}]
        });

        let response = app
            .oneshot(post_json(
                "/api/order/reply",
                serde_json::json!({"draft": draft, "field": "items[0].unit_price", "answer": "8,000円"}),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["status"], "done");
        assert_eq!(body["order"]["items"][0]["unit_price"], "8000.00");
    }

    #[tokio::test]
    async fn reply_moves_to_the_next_question_while_fields_remain() {
        let app = app_with_model_output("unused");
        let response = app
            .oneshot(post_json(
                "/api/order/reply",
                serde_json::json!({"draft": {}, "field": "buyer.name", "answer": "ABC Corp"}),
            ))
            .await
            .expect("response");

        let body = response_json(response).await;
        assert_eq!(body["status"], "ask");
        assert_eq!(body["field"], "seller.name");
        assert_eq!(body["draft"]["buyer"]["name"], "ABC Corp");
    }

    #[tokio::test]
    async fn reply_with_an_unknown_field_reexamines_the_draft() {
        let app = app_with_model_output("unused");
        let response = app
            .oneshot(post_json(
                "/api/order/reply",
                serde_json::json!({"draft": {}, "field": "garbage", "answer": "whatever"}),
            ))
            .await
            .expect("response");

        let body = response_json(response).await;
        assert_eq!(body["status"], "ask");
        assert_eq!(body["field"], "buyer.name");
    }

    #[tokio::test]
    async fn create_returns_the_validated_order_in_one_shot() {
        let app = app_with_model_output(COMPLETE_OUTPUT);
        let response = app
            .oneshot(post_json("/api/order/create", serde_json::json!({"text": "注文"})))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["template_id"], "invoice_default_v1");
        assert_eq!(body["currency"], "JPY");
        assert_eq!(body["items"][0]["unit_price"], "100.00");
    }

    #[tokio::test]
    async fn create_rejects_a_strictly_invalid_extraction() {
        let app = app_with_model_output(r#"{"buyer": {"name": "ABC Corp"}}"#);
        let response = app
            .oneshot(post_json("/api/order/create", serde_json::json!({"text": "注文"})))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = app_with_model_output("unused");
        let response = app
            .oneshot(
                Request::builder().uri("/health").body(Body::empty()).expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["status"], "ok");
    }
}
