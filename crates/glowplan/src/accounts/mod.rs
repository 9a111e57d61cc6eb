//! User account and purchase records backing entitlement derivation and billing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for user accounts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipTier {
    Free,
    Premium,
    PremiumPlus,
}

/// Persisted per-user state. Entitlements are always derived from these
/// fields plus the current wall clock; no cached premium boolean is trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub tier: MembershipTier,
    pub membership_expires_at: Option<DateTime<Utc>>,
    pub unlimited_scanner_until: Option<DateTime<Utc>>,
    pub scan_credits: u32,
    pub scans_used: u32,
    pub has_premium_routine_access: bool,
    pub has_detailed_pdf_access: bool,
    pub is_founding_member: bool,
}

impl UserAccount {
    /// Fresh free-tier account.
    pub fn new(user_id: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            created_at,
            tier: MembershipTier::Free,
            membership_expires_at: None,
            unlimited_scanner_until: None,
            scan_credits: 0,
            scans_used: 0,
            has_premium_routine_access: false,
            has_detailed_pdf_access: false,
            is_founding_member: false,
        }
    }
}

/// What a completed checkout granted. Doubles as the checkout request shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PurchaseKind {
    PremiumMembership {
        founding_rate: bool,
        expires_at: Option<DateTime<Utc>>,
    },
    ScanCreditPack {
        credits: u32,
    },
    UnlimitedScanner {
        until: DateTime<Utc>,
    },
    PremiumRoutineAccess,
    DetailedPdfAccess,
}

impl PurchaseKind {
    pub fn is_founding_rate(&self) -> bool {
        matches!(
            self,
            PurchaseKind::PremiumMembership {
                founding_rate: true,
                ..
            }
        )
    }
}

/// One finalized purchase, keyed by the gateway's delivery event id so
/// duplicate webhook deliveries can be detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub user_id: UserId,
    pub gateway_event_id: String,
    pub kind: PurchaseKind,
    pub purchased_at: DateTime<Utc>,
}

/// Storage abstraction over accounts, purchases, and the founding counter.
pub trait AccountStore: Send + Sync {
    fn fetch(&self, id: &UserId) -> Result<Option<UserAccount>, StoreError>;
    fn upsert(&self, account: UserAccount) -> Result<(), StoreError>;
    fn purchases(&self, id: &UserId) -> Result<Vec<PurchaseRecord>, StoreError>;
    fn record_purchase(&self, record: PurchaseRecord) -> Result<(), StoreError>;
    fn founding_member_count(&self) -> Result<u32, StoreError>;
    fn increment_founding_members(&self) -> Result<u32, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
