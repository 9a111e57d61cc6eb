//! Persisted routines and their resolution against the product catalog.

pub mod domain;
pub mod repository;
pub mod resolver;
pub mod router;
pub mod service;

pub use domain::{NoteId, Routine, RoutineId, RoutineNote, RoutineType, StoredSlotIds};
pub use repository::{RepositoryError, RoutineRepository};
pub use resolver::{resolve, PremiumOption, ResolvedProduct, ResolvedRoutine};
pub use router::routine_router;
pub use service::{RoutineService, RoutineServiceError, RoutineView};
