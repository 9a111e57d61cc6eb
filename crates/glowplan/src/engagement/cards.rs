use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::state::CardState;
use crate::accounts::UserAccount;
use crate::entitlements::Entitlements;

pub const CARD_PREMIUM_UPGRADE: &str = "premium_upgrade";
pub const CARD_SCANNER_ACCESS: &str = "scanner_access";
pub const CARD_ROUTINE_COACHING: &str = "routine_coaching";
pub const CARD_DETAILED_PDF: &str = "detailed_pdf";

/// Scanner-access card only shows inside this window from account creation.
pub const SCANNER_TRIAL_DAYS: i64 = 7;

/// At most this many cards render on a page, highest priority first.
pub const MAX_VISIBLE_CARDS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardPage {
    Home,
    Routine,
    Progress,
}

/// Static card copy and placement. Priority is a fixed total order,
/// lower value first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardMetadata {
    pub id: &'static str,
    pub title: &'static str,
    pub body: &'static str,
    pub priority: u8,
    pub pages: &'static [DashboardPage],
}

const CARDS: &[CardMetadata] = &[
    CardMetadata {
        id: CARD_PREMIUM_UPGRADE,
        title: "Unlock your full routine",
        body: "Premium members see dermatologist-recommended picks and alternatives for every step.",
        priority: 0,
        pages: &[DashboardPage::Home, DashboardPage::Routine],
    },
    CardMetadata {
        id: CARD_SCANNER_ACCESS,
        title: "Try the skin scanner",
        body: "Scan your skin to track progress while your trial scans last.",
        priority: 1,
        pages: &[DashboardPage::Home, DashboardPage::Progress],
    },
    CardMetadata {
        id: CARD_DETAILED_PDF,
        title: "Your routine, printable",
        body: "Get the detailed PDF guide with usage order and frequency for every product.",
        priority: 2,
        pages: &[DashboardPage::Routine],
    },
    CardMetadata {
        id: CARD_ROUTINE_COACHING,
        title: "This week's coaching",
        body: "See what to focus on this week for your routine type.",
        priority: 3,
        pages: &[DashboardPage::Home, DashboardPage::Routine, DashboardPage::Progress],
    },
];

pub fn is_known_card(id: &str) -> bool {
    CARDS.iter().any(|card| card.id == id)
}

fn eligible(
    card: &CardMetadata,
    account: Option<&UserAccount>,
    entitlements: &Entitlements,
    now: DateTime<Utc>,
) -> bool {
    match card.id {
        CARD_PREMIUM_UPGRADE => !entitlements.is_premium,
        // Three gates, all required: inside the trial window, scans left,
        // and no unlimited scanner already.
        CARD_SCANNER_ACCESS => {
            let Some(account) = account else {
                return false;
            };
            let in_trial = now - account.created_at <= Duration::days(SCANNER_TRIAL_DAYS);
            let has_scans_left = entitlements
                .remaining_scans
                .map(|remaining| remaining > 0)
                .unwrap_or(false);
            in_trial && has_scans_left && !entitlements.has_unlimited_scans
        }
        CARD_DETAILED_PDF => !entitlements.has_detailed_pdf_access,
        _ => true,
    }
}

/// Cards visible on a page: gated, unsuppressed, sorted by fixed priority,
/// capped at [`MAX_VISIBLE_CARDS`].
pub fn visible_cards(
    account: Option<&UserAccount>,
    entitlements: &Entitlements,
    states: &BTreeMap<String, CardState>,
    page: DashboardPage,
    now: DateTime<Utc>,
) -> Vec<&'static CardMetadata> {
    let mut cards: Vec<&'static CardMetadata> = CARDS
        .iter()
        .filter(|card| card.pages.contains(&page))
        .filter(|card| eligible(card, account, entitlements, now))
        .filter(|card| {
            states
                .get(card.id)
                .map(|state| !state.is_suppressed(now))
                .unwrap_or(true)
        })
        .collect();
    cards.sort_by_key(|card| card.priority);
    cards.truncate(MAX_VISIBLE_CARDS);
    cards
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::UserId;
    use crate::engagement::state::CardAction;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
    }

    fn fresh_account() -> UserAccount {
        UserAccount::new(UserId::new("user-1"), now() - Duration::days(2))
    }

    #[test]
    fn at_most_two_cards_in_priority_order() {
        let account = fresh_account();
        let entitlements = Entitlements::derive(Some(&account), now());
        let cards = visible_cards(
            Some(&account),
            &entitlements,
            &BTreeMap::new(),
            DashboardPage::Home,
            now(),
        );
        assert_eq!(cards.len(), MAX_VISIBLE_CARDS);
        assert_eq!(cards[0].id, CARD_PREMIUM_UPGRADE);
        assert_eq!(cards[1].id, CARD_SCANNER_ACCESS);
    }

    #[test]
    fn scanner_card_hidden_outside_trial_window() {
        let mut account = fresh_account();
        account.created_at = now() - Duration::days(SCANNER_TRIAL_DAYS + 1);
        let entitlements = Entitlements::derive(Some(&account), now());
        let cards = visible_cards(
            Some(&account),
            &entitlements,
            &BTreeMap::new(),
            DashboardPage::Home,
            now(),
        );
        assert!(cards.iter().all(|card| card.id != CARD_SCANNER_ACCESS));
    }

    #[test]
    fn scanner_card_hidden_without_remaining_scans() {
        let mut account = fresh_account();
        account.scans_used = 10;
        let entitlements = Entitlements::derive(Some(&account), now());
        let cards = visible_cards(
            Some(&account),
            &entitlements,
            &BTreeMap::new(),
            DashboardPage::Home,
            now(),
        );
        assert!(cards.iter().all(|card| card.id != CARD_SCANNER_ACCESS));
    }

    #[test]
    fn scanner_card_hidden_when_scans_are_unlimited() {
        let mut account = fresh_account();
        account.unlimited_scanner_until = Some(now() + Duration::days(30));
        let entitlements = Entitlements::derive(Some(&account), now());
        let cards = visible_cards(
            Some(&account),
            &entitlements,
            &BTreeMap::new(),
            DashboardPage::Home,
            now(),
        );
        assert!(cards.iter().all(|card| card.id != CARD_SCANNER_ACCESS));
    }

    #[test]
    fn dismissed_card_reappears_after_suppression_expires() {
        let account = fresh_account();
        let entitlements = Entitlements::derive(Some(&account), now());
        let mut states = BTreeMap::new();
        states.insert(
            CARD_PREMIUM_UPGRADE.to_string(),
            CardState::Eligible.apply(CARD_PREMIUM_UPGRADE, CardAction::Dismissed, now()),
        );

        let at_one_day = visible_cards(
            Some(&account),
            &entitlements,
            &states,
            DashboardPage::Home,
            now() + Duration::days(1),
        );
        assert!(at_one_day.iter().all(|card| card.id != CARD_PREMIUM_UPGRADE));

        // The trial gate has lapsed by day 8, but the upgrade card is back.
        let at_eight_days = visible_cards(
            Some(&account),
            &entitlements,
            &states,
            DashboardPage::Home,
            now() + Duration::days(8),
        );
        assert!(at_eight_days.iter().any(|card| card.id == CARD_PREMIUM_UPGRADE));
    }

    #[test]
    fn missing_account_still_gets_generic_cards() {
        let entitlements = Entitlements::free();
        let cards = visible_cards(
            None,
            &entitlements,
            &BTreeMap::new(),
            DashboardPage::Home,
            now(),
        );
        assert!(cards.iter().any(|card| card.id == CARD_PREMIUM_UPGRADE));
        assert!(cards.iter().all(|card| card.id != CARD_SCANNER_ACCESS));
    }

    #[test]
    fn page_filter_restricts_placement() {
        let account = fresh_account();
        let entitlements = Entitlements::derive(Some(&account), now());
        let cards = visible_cards(
            Some(&account),
            &entitlements,
            &BTreeMap::new(),
            DashboardPage::Routine,
            now(),
        );
        assert!(cards.iter().all(|card| card.pages.contains(&DashboardPage::Routine)));
    }
}
