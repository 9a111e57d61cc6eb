use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::cards::{CARD_PREMIUM_UPGRADE, CARD_SCANNER_ACCESS};

/// Interaction events reported by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardAction {
    Viewed,
    Clicked,
    Dismissed,
}

/// Visibility state for one card or banner. Suppression simply expires;
/// nothing is ever hard-deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CardState {
    Eligible,
    Suppressed { until: DateTime<Utc> },
}

impl CardState {
    pub fn is_suppressed(&self, now: DateTime<Utc>) -> bool {
        match self {
            CardState::Eligible => false,
            CardState::Suppressed { until } => *until > now,
        }
    }

    /// Pure transition: any interaction suppresses the card for a
    /// card-and-action-specific window.
    pub fn apply(self, key: &str, action: CardAction, now: DateTime<Utc>) -> CardState {
        CardState::Suppressed {
            until: now + suppression_window(key, action),
        }
    }
}

/// Suppression windows are card-specific constants: 7 days by default,
/// longer after a click on the two conversion cards.
fn suppression_window(key: &str, action: CardAction) -> Duration {
    match (key, action) {
        (CARD_PREMIUM_UPGRADE, CardAction::Clicked) => Duration::days(30),
        (CARD_SCANNER_ACCESS, CardAction::Clicked) => Duration::days(14),
        _ => Duration::days(7),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn dismissal_suppresses_for_seven_days() {
        let state = CardState::Eligible.apply("routine_coaching", CardAction::Dismissed, now());
        assert!(state.is_suppressed(now() + Duration::days(1)));
        assert!(!state.is_suppressed(now() + Duration::days(8)));
    }

    #[test]
    fn premium_upgrade_click_suppresses_for_thirty_days() {
        let state = CardState::Eligible.apply(CARD_PREMIUM_UPGRADE, CardAction::Clicked, now());
        assert!(state.is_suppressed(now() + Duration::days(29)));
        assert!(!state.is_suppressed(now() + Duration::days(31)));
    }

    #[test]
    fn scanner_click_suppresses_for_fourteen_days() {
        let state = CardState::Eligible.apply(CARD_SCANNER_ACCESS, CardAction::Clicked, now());
        assert!(state.is_suppressed(now() + Duration::days(13)));
        assert!(!state.is_suppressed(now() + Duration::days(15)));
    }

    #[test]
    fn suppression_boundary_is_exclusive() {
        let state = CardState::Eligible.apply("any", CardAction::Viewed, now());
        assert!(!state.is_suppressed(now() + Duration::days(7)));
    }
}
