use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::{CheckoutSession, GatewayError, PaymentGateway, WebhookEvent, WebhookVerifier};
use crate::accounts::{
    AccountStore, MembershipTier, PurchaseKind, PurchaseRecord, StoreError, UserAccount, UserId,
};

#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error("webhook signature rejected")]
    InvalidSignature,
    #[error("malformed webhook payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    Processed,
    /// Delivery with an already-seen event id. Acknowledged, no state change.
    Duplicate,
}

pub struct BillingService<S, G, V> {
    accounts: Arc<S>,
    gateway: Arc<G>,
    verifier: Arc<V>,
}

impl<S, G, V> BillingService<S, G, V>
where
    S: AccountStore,
    G: PaymentGateway,
    V: WebhookVerifier,
{
    pub fn new(accounts: Arc<S>, gateway: Arc<G>, verifier: Arc<V>) -> Self {
        Self {
            accounts,
            gateway,
            verifier,
        }
    }

    pub fn create_checkout(
        &self,
        user: &UserId,
        kind: &PurchaseKind,
    ) -> Result<CheckoutSession, BillingError> {
        let session = self.gateway.create_checkout(user, kind)?;
        tracing::info!(user = %user, session_id = %session.session_id, "checkout session created");
        Ok(session)
    }

    /// Verifies, parses, and applies one webhook delivery. Gateways retry
    /// until acknowledged, so duplicates are expected and must not grant
    /// anything twice.
    pub fn handle_webhook(
        &self,
        body: &[u8],
        signature: &str,
        now: DateTime<Utc>,
    ) -> Result<WebhookOutcome, BillingError> {
        if !self.verifier.verify(body, signature) {
            return Err(BillingError::InvalidSignature);
        }
        let event: WebhookEvent = serde_json::from_slice(body)?;
        self.process_event(event, now)
    }

    fn process_event(
        &self,
        event: WebhookEvent,
        now: DateTime<Utc>,
    ) -> Result<WebhookOutcome, BillingError> {
        let prior = self.accounts.purchases(&event.user_id)?;
        if prior
            .iter()
            .any(|record| record.gateway_event_id == event.event_id)
        {
            tracing::info!(event_id = %event.event_id, "duplicate webhook delivery ignored");
            return Ok(WebhookOutcome::Duplicate);
        }

        let mut account = match self.accounts.fetch(&event.user_id)? {
            Some(account) => account,
            // Checkout can complete before the account record exists.
            None => UserAccount::new(event.user_id.clone(), now),
        };

        match &event.kind {
            PurchaseKind::PremiumMembership {
                founding_rate,
                expires_at,
            } => {
                account.tier = MembershipTier::Premium;
                account.membership_expires_at = *expires_at;
                // The founding counter tracks distinct members, not
                // purchases; a renewal at the founding rate adds nothing.
                let already_founding = account.is_founding_member
                    || prior.iter().any(|record| record.kind.is_founding_rate());
                if *founding_rate && !already_founding {
                    account.is_founding_member = true;
                    let total = self.accounts.increment_founding_members()?;
                    tracing::info!(user = %event.user_id, total, "founding member joined");
                }
            }
            PurchaseKind::ScanCreditPack { credits } => {
                account.scan_credits = account.scan_credits.saturating_add(*credits);
            }
            PurchaseKind::UnlimitedScanner { until } => {
                account.unlimited_scanner_until = match account.unlimited_scanner_until {
                    Some(existing) => Some(existing.max(*until)),
                    None => Some(*until),
                };
            }
            PurchaseKind::PremiumRoutineAccess => {
                account.has_premium_routine_access = true;
            }
            PurchaseKind::DetailedPdfAccess => {
                account.has_detailed_pdf_access = true;
            }
        }

        self.accounts.upsert(account)?;
        self.accounts.record_purchase(PurchaseRecord {
            user_id: event.user_id.clone(),
            gateway_event_id: event.event_id.clone(),
            kind: event.kind.clone(),
            purchased_at: event.occurred_at,
        })?;
        tracing::info!(user = %event.user_id, event_id = %event.event_id, "purchase applied");
        Ok(WebhookOutcome::Processed)
    }
}
