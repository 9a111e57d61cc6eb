use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{NoteId, Routine, RoutineId, RoutineNote, RoutineType, StoredSlotIds};
use super::repository::{RepositoryError, RoutineRepository};
use super::resolver::{self, ResolvedRoutine};
use crate::accounts::{AccountStore, StoreError, UserId};
use crate::catalog::{ProductCatalog, ProductCategory};
use crate::entitlements::Entitlements;
use crate::quiz::QuizAnswers;
use crate::rules::RuleTable;

/// Routine payload returned to callers: stored metadata plus the product
/// lists re-resolved against the caller's current entitlements.
#[derive(Debug, Clone, Serialize)]
pub struct RoutineView {
    pub id: RoutineId,
    pub routine_type: &'static str,
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
    pub morning: Vec<super::resolver::ResolvedProduct>,
    pub evening: Vec<super::resolver::ResolvedProduct>,
    pub notes: Vec<RoutineNote>,
    pub product_selections: std::collections::BTreeMap<ProductCategory, String>,
}

/// Service composing the rule table, catalog, repository, and account store.
pub struct RoutineService<R, S> {
    repository: Arc<R>,
    accounts: Arc<S>,
    catalog: Arc<ProductCatalog>,
    rules: Arc<RuleTable>,
}

static ROUTINE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static NOTE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_routine_id() -> RoutineId {
    let id = ROUTINE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RoutineId(format!("rtn-{id:06}"))
}

fn next_note_id() -> NoteId {
    let id = NOTE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    NoteId(format!("note-{id:06}"))
}

impl<R, S> RoutineService<R, S>
where
    R: RoutineRepository + 'static,
    S: AccountStore + 'static,
{
    pub fn new(
        repository: Arc<R>,
        accounts: Arc<S>,
        catalog: Arc<ProductCatalog>,
        rules: Arc<RuleTable>,
    ) -> Self {
        Self {
            repository,
            accounts,
            catalog,
            rules,
        }
    }

    /// Match the profile against the rule table and persist a new current
    /// routine. No matching row is terminal for this profile, not a
    /// transient failure.
    pub fn submit_quiz(
        &self,
        user_id: &UserId,
        answers: QuizAnswers,
        now: DateTime<Utc>,
    ) -> Result<RoutineView, RoutineServiceError> {
        let profile = answers.profile();
        let row = self
            .rules
            .first_match(&profile)
            .ok_or(RoutineServiceError::NoMatch)?;
        let slot_ids = row.slots.ordered();

        let routine = Routine {
            id: next_routine_id(),
            user_id: user_id.clone(),
            answers,
            routine_type: RoutineType::from_profile(&profile),
            profile,
            slot_ids: StoredSlotIds::Flat(slot_ids),
            product_selections: Default::default(),
            notes: Vec::new(),
            // Inserted clear; only the atomic set_current below flips the
            // flag, so no reader ever sees two current routines.
            is_current: false,
            created_at: now,
        };

        let mut stored = self.repository.insert(routine)?;
        self.repository.set_current(user_id, &stored.id)?;
        stored.is_current = true;
        tracing::info!(user = %user_id, routine = %stored.id, "created routine from quiz");
        self.view(&stored, now)
    }

    pub fn current(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<RoutineView, RoutineServiceError> {
        let routine = self
            .repository
            .current_for_user(user_id)?
            .ok_or(RoutineServiceError::NotFound)?;
        self.view(&routine, now)
    }

    pub fn get(
        &self,
        user_id: &UserId,
        id: &RoutineId,
        now: DateTime<Utc>,
    ) -> Result<RoutineView, RoutineServiceError> {
        let routine = self.owned(user_id, id)?;
        self.view(&routine, now)
    }

    pub fn list(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<RoutineView>, RoutineServiceError> {
        let routines = self.repository.list_for_user(user_id)?;
        routines
            .iter()
            .map(|routine| self.view(routine, now))
            .collect()
    }

    /// Persist a per-category override. The stored slot list is untouched.
    pub fn set_product(
        &self,
        user_id: &UserId,
        id: &RoutineId,
        category: ProductCategory,
        product_name: String,
        now: DateTime<Utc>,
    ) -> Result<RoutineView, RoutineServiceError> {
        let mut routine = self.owned(user_id, id)?;
        routine.product_selections.insert(category, product_name);
        self.repository.update(routine.clone())?;
        self.view(&routine, now)
    }

    /// Atomically transfer the current flag to this routine.
    pub fn set_current(
        &self,
        user_id: &UserId,
        id: &RoutineId,
    ) -> Result<(), RoutineServiceError> {
        self.owned(user_id, id)?;
        self.repository.set_current(user_id, id)?;
        Ok(())
    }

    pub fn add_note(
        &self,
        user_id: &UserId,
        id: &RoutineId,
        text: String,
        now: DateTime<Utc>,
    ) -> Result<RoutineView, RoutineServiceError> {
        let mut routine = self.owned(user_id, id)?;
        routine.notes.push(RoutineNote {
            id: next_note_id(),
            written_at: now,
            text,
        });
        self.repository.update(routine.clone())?;
        self.view(&routine, now)
    }

    pub fn delete_note(
        &self,
        user_id: &UserId,
        id: &RoutineId,
        note_id: &NoteId,
    ) -> Result<(), RoutineServiceError> {
        let mut routine = self.owned(user_id, id)?;
        let before = routine.notes.len();
        routine.notes.retain(|note| &note.id != note_id);
        if routine.notes.len() == before {
            return Err(RoutineServiceError::NotFound);
        }
        self.repository.update(routine)?;
        Ok(())
    }

    /// Derived entitlements for the caller; a missing account is free tier.
    pub fn entitlements(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Entitlements, RoutineServiceError> {
        let account = self.accounts.fetch(user_id)?;
        Ok(Entitlements::derive(account.as_ref(), now))
    }

    /// Ownership check collapsing "does not exist" and "belongs to someone
    /// else" into the same not-found outcome.
    fn owned(&self, user_id: &UserId, id: &RoutineId) -> Result<Routine, RoutineServiceError> {
        let routine = self
            .repository
            .fetch(id)?
            .ok_or(RoutineServiceError::NotFound)?;
        if &routine.user_id != user_id {
            return Err(RoutineServiceError::NotFound);
        }
        Ok(routine)
    }

    fn view(
        &self,
        routine: &Routine,
        now: DateTime<Utc>,
    ) -> Result<RoutineView, RoutineServiceError> {
        let entitlements = self.entitlements(&routine.user_id, now)?;
        let slot_ids = routine.slot_ids.normalize();
        let mut resolved: ResolvedRoutine = resolver::resolve(
            &self.catalog,
            &slot_ids,
            entitlements.premium_routine_entitled(),
        );
        resolver::apply_selections(&self.catalog, &mut resolved, &routine.product_selections);

        Ok(RoutineView {
            id: routine.id.clone(),
            routine_type: routine.routine_type.label(),
            is_current: routine.is_current,
            created_at: routine.created_at,
            morning: resolved.morning,
            evening: resolved.evening,
            notes: routine.notes.clone(),
            product_selections: routine.product_selections.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{PurchaseRecord, UserAccount};
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicBool;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryRepository {
        records: Mutex<HashMap<RoutineId, Routine>>,
        fail_set_current: AtomicBool,
    }

    impl RoutineRepository for MemoryRepository {
        fn insert(&self, routine: Routine) -> Result<Routine, RepositoryError> {
            let mut guard = self.records.lock().unwrap();
            if guard.contains_key(&routine.id) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(routine.id.clone(), routine.clone());
            Ok(routine)
        }

        fn update(&self, routine: Routine) -> Result<(), RepositoryError> {
            let mut guard = self.records.lock().unwrap();
            if !guard.contains_key(&routine.id) {
                return Err(RepositoryError::NotFound);
            }
            guard.insert(routine.id.clone(), routine);
            Ok(())
        }

        fn fetch(&self, id: &RoutineId) -> Result<Option<Routine>, RepositoryError> {
            Ok(self.records.lock().unwrap().get(id).cloned())
        }

        fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Routine>, RepositoryError> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .values()
                .filter(|routine| &routine.user_id == user_id)
                .cloned()
                .collect())
        }

        fn current_for_user(&self, user_id: &UserId) -> Result<Option<Routine>, RepositoryError> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .values()
                .find(|routine| &routine.user_id == user_id && routine.is_current)
                .cloned())
        }

        fn set_current(&self, user_id: &UserId, id: &RoutineId) -> Result<(), RepositoryError> {
            if self.fail_set_current.load(Ordering::SeqCst) {
                return Err(RepositoryError::Unavailable("injected outage".to_string()));
            }
            let mut guard = self.records.lock().unwrap();
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

    struct NoAccounts;

    impl AccountStore for NoAccounts {
        fn fetch(&self, _id: &UserId) -> Result<Option<UserAccount>, StoreError> {
            Ok(None)
        }

        fn upsert(&self, _account: UserAccount) -> Result<(), StoreError> {
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

    fn build_service(
        repository: Arc<MemoryRepository>,
    ) -> RoutineService<MemoryRepository, NoAccounts> {
        RoutineService::new(
            repository,
            Arc::new(NoAccounts),
            Arc::new(ProductCatalog::standard()),
            Arc::new(RuleTable::standard()),
        )
    }

    fn answers() -> QuizAnswers {
        QuizAnswers {
            name: "Robin".to_string(),
            age: 30,
            skin_type: "oily".to_string(),
            fitzpatrick_group: "1-3".to_string(),
            acne_types: vec!["inflamed".to_string()],
            acne_severity: "moderate".to_string(),
            is_pregnant_or_nursing: false,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn submitted_routine_comes_back_current() {
        let repository = Arc::new(MemoryRepository::default());
        let service = build_service(Arc::clone(&repository));
        let user = UserId::new("user-current");

        let view = service.submit_quiz(&user, answers(), now()).unwrap();
        assert!(view.is_current);

        let stored = repository.current_for_user(&user).unwrap().unwrap();
        assert_eq!(stored.id, view.id);
    }

    #[test]
    fn failed_current_transfer_leaves_the_previous_routine_current() {
        let repository = Arc::new(MemoryRepository::default());
        let service = build_service(Arc::clone(&repository));
        let user = UserId::new("user-outage");

        let first = service.submit_quiz(&user, answers(), now()).unwrap();

        repository.fail_set_current.store(true, Ordering::SeqCst);
        let outcome = service.submit_quiz(&user, answers(), now());
        assert!(matches!(
            outcome,
            Err(RoutineServiceError::Repository(RepositoryError::Unavailable(_)))
        ));

        // The half-created routine must not steal or split the flag.
        let current = repository.current_for_user(&user).unwrap().unwrap();
        assert_eq!(current.id, first.id);
        let flagged = repository
            .list_for_user(&user)
            .unwrap()
            .into_iter()
            .filter(|routine| routine.is_current)
            .count();
        assert_eq!(flagged, 1);
    }
}

/// Error raised by the routine service.
#[derive(Debug, thiserror::Error)]
pub enum RoutineServiceError {
    #[error("no routine available for this skin profile")]
    NoMatch,
    #[error("routine not found")]
    NotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
