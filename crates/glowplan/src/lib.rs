//! Domain logic for the GlowPlan personalized skincare routine service.
//!
//! The crate is organized around the quiz-to-routine pipeline: quiz answers
//! become a [`rules::SkinProfile`], the rule table picks an ordered list of
//! product slots, and the resolver turns those slots into concrete morning
//! and evening product lists against the caller's current entitlements.

pub mod accounts;
pub mod billing;
pub mod catalog;
pub mod config;
pub mod engagement;
pub mod entitlements;
pub mod error;
pub mod quiz;
pub mod routines;
pub mod rules;
pub mod telemetry;
