use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use super::service::{BillingError, BillingService, WebhookOutcome};
use super::{PaymentGateway, WebhookVerifier};
use crate::accounts::{AccountStore, PurchaseKind};
use crate::routines::router::require_user;

pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

fn error_response(error: BillingError) -> Response {
    match &error {
        BillingError::InvalidSignature => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
        }
        BillingError::Malformed(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
        BillingError::Gateway(_) => {
            tracing::error!(error = %error, "payment gateway failure");
            let payload = json!({ "error": "payment provider unavailable" });
            (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
        }
        _ => {
            tracing::error!(error = %error, "billing service failure");
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

async fn create_checkout<S, G, V>(
    State(service): State<Arc<BillingService<S, G, V>>>,
    headers: HeaderMap,
    Json(kind): Json<PurchaseKind>,
) -> Response
where
    S: AccountStore,
    G: PaymentGateway,
    V: WebhookVerifier,
{
    let user = match require_user(&headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match service.create_checkout(&user, &kind) {
        Ok(session) => (StatusCode::CREATED, Json(session)).into_response(),
        Err(error) => error_response(error),
    }
}

// Takes the raw body so the verifier sees exactly what the gateway signed.
async fn handle_webhook<S, G, V>(
    State(service): State<Arc<BillingService<S, G, V>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    S: AccountStore,
    G: PaymentGateway,
    V: WebhookVerifier,
{
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    match service.handle_webhook(&body, signature, Utc::now()) {
        Ok(WebhookOutcome::Processed) => {
            Json(json!({ "status": "processed" })).into_response()
        }
        Ok(WebhookOutcome::Duplicate) => {
            Json(json!({ "status": "duplicate" })).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub fn billing_router<S, G, V>(service: Arc<BillingService<S, G, V>>) -> Router
where
    S: AccountStore + 'static,
    G: PaymentGateway + 'static,
    V: WebhookVerifier + 'static,
{
    Router::new()
        .route("/api/v1/billing/checkout", post(create_checkout::<S, G, V>))
        .route("/api/v1/billing/webhook", post(handle_webhook::<S, G, V>))
        .with_state(service)
}
