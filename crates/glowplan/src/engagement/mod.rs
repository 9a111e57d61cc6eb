//! Upsell/info card and banner visibility scheduling.
//!
//! Every card and banner is a tiny explicit state machine
//! (`eligible | suppressed(until)`) driven by a pure transition function,
//! rather than date math scattered across call sites.

pub mod banners;
pub mod cards;
pub mod router;
pub mod service;
pub mod state;

pub use banners::{current_banner, Banner};
pub use cards::{visible_cards, CardMetadata, DashboardPage};
pub use router::engagement_router;
pub use service::{EngagementError, EngagementService, InteractionRepository};
pub use state::{CardAction, CardState};
