//! Card suppression windows and the weekly banner rotation, exercised
//! through the engagement service with in-memory stores.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use glowplan::accounts::{
    AccountStore, MembershipTier, PurchaseRecord, StoreError, UserAccount, UserId,
};
use glowplan::engagement::{
    CardAction, CardState, DashboardPage, EngagementError, EngagementService,
    InteractionRepository,
};

#[derive(Default, Clone)]
struct MemoryAccounts {
    accounts: Arc<Mutex<HashMap<UserId, UserAccount>>>,
}

impl MemoryAccounts {
    fn put(&self, account: UserAccount) {
        self.accounts
            .lock()
            .expect("lock")
            .insert(account.user_id.clone(), account);
    }
}

impl AccountStore for MemoryAccounts {
    fn fetch(&self, id: &UserId) -> Result<Option<UserAccount>, StoreError> {
        Ok(self.accounts.lock().expect("lock").get(id).cloned())
    }

    fn upsert(&self, account: UserAccount) -> Result<(), StoreError> {
        self.put(account);
        Ok(())
    }

    fn purchases(&self, _id: &UserId) -> Result<Vec<PurchaseRecord>, StoreError> {
        Ok(Vec::new())
    }

    fn record_purchase(&self, _record: PurchaseRecord) -> Result<(), StoreError> {
        Ok(())
    }

    fn founding_member_count(&self) -> Result<u32, StoreError> {
        Ok(0)
    }

    fn increment_founding_members(&self) -> Result<u32, StoreError> {
        Ok(1)
    }
}

#[derive(Default, Clone)]
struct MemoryInteractions {
    states: Arc<Mutex<HashMap<UserId, BTreeMap<String, CardState>>>>,
}

impl InteractionRepository for MemoryInteractions {
    fn states_for_user(&self, user: &UserId) -> Result<BTreeMap<String, CardState>, StoreError> {
        Ok(self
            .states
            .lock()
            .expect("lock")
            .get(user)
            .cloned()
            .unwrap_or_default())
    }

    fn upsert_state(
        &self,
        user: &UserId,
        card_id: &str,
        state: CardState,
    ) -> Result<(), StoreError> {
        self.states
            .lock()
            .expect("lock")
            .entry(user.clone())
            .or_default()
            .insert(card_id.to_string(), state);
        Ok(())
    }
}

fn build_service() -> (
    EngagementService<MemoryAccounts, MemoryInteractions>,
    Arc<MemoryAccounts>,
) {
    let accounts = Arc::new(MemoryAccounts::default());
    let interactions = Arc::new(MemoryInteractions::default());
    let service = EngagementService::new(accounts.clone(), interactions);
    (service, accounts)
}

fn user() -> UserId {
    UserId::new("user-engagement")
}

fn anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()
}

#[test]
fn dismissal_suppresses_for_a_week() {
    let (service, accounts) = build_service();
    accounts.put(UserAccount::new(user(), anchor() - Duration::days(1)));

    let before = service
        .visible_cards(&user(), DashboardPage::Home, anchor())
        .expect("cards");
    let target = before.first().expect("a visible card").id;

    service
        .record_interaction(&user(), target, CardAction::Dismissed, anchor())
        .expect("interaction stored");

    let at_one_day = service
        .visible_cards(&user(), DashboardPage::Home, anchor() + Duration::days(1))
        .expect("cards");
    assert!(at_one_day.iter().all(|card| card.id != target));

    let at_eight_days = service
        .visible_cards(&user(), DashboardPage::Home, anchor() + Duration::days(8))
        .expect("cards");
    assert!(at_eight_days.iter().any(|card| card.id == target));
}

#[test]
fn a_view_also_starts_the_default_window() {
    let (service, accounts) = build_service();
    accounts.put(UserAccount::new(user(), anchor() - Duration::days(1)));

    let before = service
        .visible_cards(&user(), DashboardPage::Home, anchor())
        .expect("cards");
    let target = before.first().expect("a visible card").id;

    service
        .record_interaction(&user(), target, CardAction::Viewed, anchor())
        .expect("interaction stored");

    let within_window = service
        .visible_cards(&user(), DashboardPage::Home, anchor() + Duration::days(3))
        .expect("cards");
    assert!(within_window.iter().all(|card| card.id != target));
}

#[test]
fn a_click_on_the_upgrade_card_suppresses_for_a_month() {
    let (service, accounts) = build_service();
    accounts.put(UserAccount::new(user(), anchor() - Duration::days(1)));

    service
        .record_interaction(&user(), "premium_upgrade", CardAction::Clicked, anchor())
        .expect("interaction stored");

    let at_three_weeks = service
        .visible_cards(&user(), DashboardPage::Home, anchor() + Duration::days(21))
        .expect("cards");
    assert!(at_three_weeks.iter().all(|card| card.id != "premium_upgrade"));

    let at_five_weeks = service
        .visible_cards(&user(), DashboardPage::Home, anchor() + Duration::days(35))
        .expect("cards");
    assert!(at_five_weeks.iter().any(|card| card.id == "premium_upgrade"));
}

#[test]
fn unknown_card_ids_are_rejected() {
    let (service, accounts) = build_service();
    accounts.put(UserAccount::new(user(), anchor()));
    let result = service.record_interaction(&user(), "mystery", CardAction::Clicked, anchor());
    assert!(matches!(result, Err(EngagementError::UnknownCard(_))));
}

#[test]
fn card_count_is_capped() {
    let (service, accounts) = build_service();
    accounts.put(UserAccount::new(user(), anchor()));
    let cards = service
        .visible_cards(&user(), DashboardPage::Home, anchor())
        .expect("cards");
    assert!(cards.len() <= 2);
}

#[test]
fn banner_requires_a_paid_entitlement() {
    let (service, accounts) = build_service();
    accounts.put(UserAccount::new(user(), anchor()));

    let banner = service.current_banner(&user(), anchor()).expect("read");
    assert!(banner.is_none());

    let mut account = UserAccount::new(user(), anchor());
    account.tier = MembershipTier::Premium;
    accounts.put(account);

    let banner = service.current_banner(&user(), anchor()).expect("read");
    assert!(banner.is_some());
}

#[test]
fn dismissed_banner_falls_through_to_the_next_slot() {
    let (service, accounts) = build_service();
    let mut account = UserAccount::new(user(), anchor());
    account.tier = MembershipTier::Premium;
    accounts.put(account);

    let scheduled = service
        .current_banner(&user(), anchor())
        .expect("read")
        .expect("banner shown");
    service
        .record_interaction(&user(), scheduled.id, CardAction::Dismissed, anchor())
        .expect("interaction stored");

    let fallback = service
        .current_banner(&user(), anchor())
        .expect("read")
        .expect("fallback shown");
    assert_ne!(fallback.id, scheduled.id);
}

#[test]
fn banner_is_stable_within_a_week() {
    let (service, accounts) = build_service();
    let mut account = UserAccount::new(user(), anchor());
    account.tier = MembershipTier::Premium;
    accounts.put(account);

    let monday = service.current_banner(&user(), anchor()).expect("read");
    let friday = service
        .current_banner(&user(), anchor() + Duration::days(4))
        .expect("read");
    assert_eq!(
        monday.map(|banner| banner.id),
        friday.map(|banner| banner.id)
    );

    let next_week = service
        .current_banner(&user(), anchor() + Duration::days(7))
        .expect("read");
    assert_ne!(
        monday.map(|banner| banner.id),
        next_week.map(|banner| banner.id)
    );
}
