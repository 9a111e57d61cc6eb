//! Entitlement derivation: a pure function of persisted flags and the clock.

use crate::accounts::{MembershipTier, UserAccount};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scans available to a free-tier user before purchased credits.
pub const FREE_SCAN_LIMIT: u32 = 3;

/// Derived feature access for one request. Never persisted; recomputed from
/// the account record and `now` on every call so expiries take effect
/// without a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlements {
    pub tier: MembershipTier,
    pub is_premium: bool,
    pub has_unlimited_scans: bool,
    /// Meaningful only when `has_unlimited_scans` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_scans: Option<u32>,
    pub has_premium_routine_access: bool,
    pub has_detailed_pdf_access: bool,
    pub is_founding_member: bool,
}

impl Entitlements {
    /// Fully unentitled state, used when no account record exists. An auth
    /// edge case must never crash the page.
    pub fn free() -> Self {
        Self {
            tier: MembershipTier::Free,
            is_premium: false,
            has_unlimited_scans: false,
            remaining_scans: Some(FREE_SCAN_LIMIT),
            has_premium_routine_access: false,
            has_detailed_pdf_access: false,
            is_founding_member: false,
        }
    }

    pub fn derive(account: Option<&UserAccount>, now: DateTime<Utc>) -> Self {
        let Some(account) = account else {
            return Self::free();
        };

        let tier_is_paid = matches!(
            account.tier,
            MembershipTier::Premium | MembershipTier::PremiumPlus
        );
        let membership_active = match account.membership_expires_at {
            None => true,
            Some(expires_at) => expires_at > now,
        };
        let is_premium = tier_is_paid && membership_active;

        let scanner_window_active = account
            .unlimited_scanner_until
            .map(|until| until > now)
            .unwrap_or(false);
        let has_unlimited_scans = is_premium || scanner_window_active;

        let remaining_scans = if has_unlimited_scans {
            None
        } else {
            Some(
                FREE_SCAN_LIMIT
                    .saturating_add(account.scan_credits)
                    .saturating_sub(account.scans_used),
            )
        };

        Self {
            tier: account.tier,
            is_premium,
            has_unlimited_scans,
            remaining_scans,
            has_premium_routine_access: account.has_premium_routine_access,
            has_detailed_pdf_access: account.has_detailed_pdf_access,
            is_founding_member: account.is_founding_member,
        }
    }

    /// Whether the caller sees premium variant recommendations and
    /// alternatives when a routine is resolved.
    pub fn premium_routine_entitled(&self) -> bool {
        self.is_premium || self.has_premium_routine_access
    }
}
