use super::domain::{Routine, RoutineId};
use crate::accounts::UserId;

/// Storage abstraction so the routine service can be exercised in isolation.
///
/// `set_current` is one logical transaction: clear every current flag for
/// the user, then set exactly one. Implementations must never leave two
/// routines simultaneously marked current.
pub trait RoutineRepository: Send + Sync {
    fn insert(&self, routine: Routine) -> Result<Routine, RepositoryError>;
    fn update(&self, routine: Routine) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &RoutineId) -> Result<Option<Routine>, RepositoryError>;
    fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Routine>, RepositoryError>;
    fn current_for_user(&self, user_id: &UserId) -> Result<Option<Routine>, RepositoryError>;
    fn set_current(&self, user_id: &UserId, id: &RoutineId) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
