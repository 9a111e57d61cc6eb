//! Checkout sessions and payment-gateway webhook processing.
//!
//! The gateway itself lives behind [`PaymentGateway`] and
//! [`WebhookVerifier`] traits; this module owns what happens to the
//! account once money has moved, including duplicate-delivery handling.

pub mod router;
pub mod service;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::accounts::{PurchaseKind, UserId};

pub use router::billing_router;
pub use service::{BillingError, BillingService, WebhookOutcome};

/// Hosted-checkout session handed back to the client for redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutSession {
    pub session_id: String,
    pub checkout_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway rejected the request: {0}")]
    Rejected(String),
    #[error("gateway unreachable: {0}")]
    Unreachable(String),
}

/// Creates hosted checkout sessions with the payment provider.
pub trait PaymentGateway: Send + Sync {
    fn create_checkout(
        &self,
        user: &UserId,
        kind: &PurchaseKind,
    ) -> Result<CheckoutSession, GatewayError>;
}

/// Validates a webhook delivery before anything in the body is trusted.
/// Runs over the raw bytes so re-serialization cannot break the signature.
pub trait WebhookVerifier: Send + Sync {
    fn verify(&self, body: &[u8], signature: &str) -> bool;
}

/// A verified, parsed webhook delivery. `event_id` is the gateway's
/// delivery id and is the idempotency key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub event_id: String,
    pub user_id: UserId,
    #[serde(flatten)]
    pub kind: PurchaseKind,
    pub occurred_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn webhook_event_deserializes_flattened_kind() {
        let raw = r#"{
            "event_id": "evt-001",
            "user_id": "user-1",
            "type": "premium_membership",
            "founding_rate": true,
            "expires_at": null,
            "occurred_at": "2025-06-01T12:00:00Z"
        }"#;
        let event: WebhookEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.event_id, "evt-001");
        assert!(event.kind.is_founding_rate());
        assert_eq!(
            event.occurred_at,
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn webhook_event_deserializes_credit_pack() {
        let raw = r#"{
            "event_id": "evt-002",
            "user_id": "user-2",
            "type": "scan_credit_pack",
            "credits": 10,
            "occurred_at": "2025-06-01T12:00:00Z"
        }"#;
        let event: WebhookEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.kind, PurchaseKind::ScanCreditPack { credits: 10 });
    }
}
