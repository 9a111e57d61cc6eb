use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use glowplan::accounts::{AccountStore, PurchaseRecord, StoreError, UserAccount, UserId};
use glowplan::billing::{CheckoutSession, GatewayError, PaymentGateway, WebhookVerifier};
use glowplan::engagement::{CardState, InteractionRepository};
use glowplan::routines::{RepositoryError, Routine, RoutineId, RoutineRepository};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryRoutineRepository {
    records: Arc<Mutex<HashMap<RoutineId, Routine>>>,
}

impl RoutineRepository for InMemoryRoutineRepository {
    fn insert(&self, routine: Routine) -> Result<Routine, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&routine.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(routine.id.clone(), routine.clone());
        Ok(routine)
    }

    fn update(&self, routine: Routine) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&routine.id) {
            guard.insert(routine.id.clone(), routine);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &RoutineId) -> Result<Option<Routine>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Routine>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut routines: Vec<Routine> = guard
            .values()
            .filter(|routine| &routine.user_id == user_id)
            .cloned()
            .collect();
        routines.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(routines)
    }

    fn current_for_user(&self, user_id: &UserId) -> Result<Option<Routine>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .find(|routine| &routine.user_id == user_id && routine.is_current)
            .cloned())
    }

    fn set_current(&self, user_id: &UserId, id: &RoutineId) -> Result<(), RepositoryError> {
        // Single lock scope so no reader ever observes two current routines.
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard
            .get(id)
            .map(|routine| &routine.user_id == user_id)
            .unwrap_or(false)
        {
            return Err(RepositoryError::NotFound);
        }
        for routine in guard.values_mut() {
            if &routine.user_id == user_id {
                routine.is_current = &routine.id == id;
            }
        }
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAccountStore {
    accounts: Arc<Mutex<HashMap<UserId, UserAccount>>>,
    purchases: Arc<Mutex<Vec<PurchaseRecord>>>,
    founding_members: Arc<AtomicU64>,
}

impl AccountStore for InMemoryAccountStore {
    fn fetch(&self, id: &UserId) -> Result<Option<UserAccount>, StoreError> {
        let guard = self.accounts.lock().expect("account mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn upsert(&self, account: UserAccount) -> Result<(), StoreError> {
        let mut guard = self.accounts.lock().expect("account mutex poisoned");
        guard.insert(account.user_id.clone(), account);
        Ok(())
    }

    fn purchases(&self, id: &UserId) -> Result<Vec<PurchaseRecord>, StoreError> {
        let guard = self.purchases.lock().expect("purchase mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.user_id == id)
            .cloned()
            .collect())
    }

    fn record_purchase(&self, record: PurchaseRecord) -> Result<(), StoreError> {
        let mut guard = self.purchases.lock().expect("purchase mutex poisoned");
        guard.push(record);
        Ok(())
    }

    fn founding_member_count(&self) -> Result<u32, StoreError> {
        Ok(self.founding_members.load(Ordering::SeqCst) as u32)
    }

    fn increment_founding_members(&self) -> Result<u32, StoreError> {
        Ok(self.founding_members.fetch_add(1, Ordering::SeqCst) as u32 + 1)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryInteractionStore {
    states: Arc<Mutex<HashMap<UserId, BTreeMap<String, CardState>>>>,
}

impl InteractionRepository for InMemoryInteractionStore {
    fn states_for_user(&self, user: &UserId) -> Result<BTreeMap<String, CardState>, StoreError> {
        let guard = self.states.lock().expect("interaction mutex poisoned");
        Ok(guard.get(user).cloned().unwrap_or_default())
    }

    fn upsert_state(
        &self,
        user: &UserId,
        card_id: &str,
        state: CardState,
    ) -> Result<(), StoreError> {
        let mut guard = self.states.lock().expect("interaction mutex poisoned");
        guard
            .entry(user.clone())
            .or_default()
            .insert(card_id.to_string(), state);
        Ok(())
    }
}

/// Compares the signature header against a shared secret from configuration.
/// With no secret configured (local development) every delivery passes.
pub(crate) struct SharedSecretVerifier {
    secret: Option<String>,
}

impl SharedSecretVerifier {
    pub(crate) fn new(secret: Option<String>) -> Self {
        Self { secret }
    }
}

impl WebhookVerifier for SharedSecretVerifier {
    fn verify(&self, _body: &[u8], signature: &str) -> bool {
        match &self.secret {
            Some(secret) => signature == secret,
            None => true,
        }
    }
}

/// Stand-in gateway that mints deterministic hosted-checkout sessions.
#[derive(Default)]
pub(crate) struct HostedCheckoutGateway {
    sequence: AtomicU64,
}

impl PaymentGateway for HostedCheckoutGateway {
    fn create_checkout(
        &self,
        user: &UserId,
        _kind: &glowplan::accounts::PurchaseKind,
    ) -> Result<CheckoutSession, GatewayError> {
        let id = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let session_id = format!("cs-{id:06}");
        tracing::debug!(user = %user, session_id = %session_id, "minted checkout session");
        Ok(CheckoutSession {
            checkout_url: format!("https://pay.glowplan.example/checkout/{session_id}"),
            session_id,
        })
    }
}
