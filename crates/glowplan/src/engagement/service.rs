use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::banners::{current_banner, Banner};
use super::cards::{visible_cards, CardMetadata, DashboardPage};
use super::state::{CardAction, CardState};
use crate::accounts::{AccountStore, StoreError, UserId};
use crate::entitlements::Entitlements;

/// Storage for per-user card interaction state.
pub trait InteractionRepository: Send + Sync {
    fn states_for_user(&self, user: &UserId) -> Result<BTreeMap<String, CardState>, StoreError>;
    fn upsert_state(
        &self,
        user: &UserId,
        card_id: &str,
        state: CardState,
    ) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EngagementError {
    #[error("unknown card id: {0}")]
    UnknownCard(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Read-mostly engagement surface: which cards and banner a user sees now.
pub struct EngagementService<S, I> {
    accounts: Arc<S>,
    interactions: Arc<I>,
}

impl<S, I> EngagementService<S, I>
where
    S: AccountStore,
    I: InteractionRepository,
{
    pub fn new(accounts: Arc<S>, interactions: Arc<I>) -> Self {
        Self {
            accounts,
            interactions,
        }
    }

    pub fn visible_cards(
        &self,
        user: &UserId,
        page: DashboardPage,
        now: DateTime<Utc>,
    ) -> Result<Vec<&'static CardMetadata>, EngagementError> {
        let account = self.accounts.fetch(user)?;
        let entitlements = Entitlements::derive(account.as_ref(), now);
        let states = self.interactions.states_for_user(user)?;
        Ok(visible_cards(
            account.as_ref(),
            &entitlements,
            &states,
            page,
            now,
        ))
    }

    pub fn current_banner(
        &self,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<&'static Banner>, EngagementError> {
        let account = self.accounts.fetch(user)?;
        let entitlements = Entitlements::derive(account.as_ref(), now);
        let states = self.interactions.states_for_user(user)?;
        Ok(current_banner(&entitlements, &states, now))
    }

    /// Records a view, click, or dismissal against a card or banner and
    /// updates its suppression state.
    pub fn record_interaction(
        &self,
        user: &UserId,
        card_id: &str,
        action: CardAction,
        now: DateTime<Utc>,
    ) -> Result<(), EngagementError> {
        if !super::cards::is_known_card(card_id) && !super::banners::is_known_banner(card_id) {
            return Err(EngagementError::UnknownCard(card_id.to_string()));
        }
        let states = self.interactions.states_for_user(user)?;
        let current = states.get(card_id).cloned().unwrap_or(CardState::Eligible);
        let next = current.apply(card_id, action, now);
        self.interactions.upsert_state(user, card_id, next)?;
        tracing::debug!(user = %user, card_id, ?action, "card interaction recorded");
        Ok(())
    }
}
