use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::state::CardState;
use crate::entitlements::Entitlements;

/// Monday anchoring the rotation. Week indices count forward from here.
const ROTATION_ANCHOR: NaiveDate = match NaiveDate::from_ymd_opt(2025, 1, 6) {
    Some(date) => date,
    None => panic!("invalid rotation anchor"),
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub id: &'static str,
    pub headline: &'static str,
    pub body: &'static str,
}

const BANNERS: &[Banner] = &[
    Banner {
        id: "consistency",
        headline: "Consistency beats intensity",
        body: "Results come from showing up twice a day, not from adding more actives.",
    },
    Banner {
        id: "patch_test",
        headline: "New product? Patch test first",
        body: "Apply a small amount behind your ear for three nights before full use.",
    },
    Banner {
        id: "spf_reminder",
        headline: "SPF is the whole morning routine",
        body: "Skipping sunscreen undoes the work of every other step.",
    },
];

pub fn is_known_banner(id: &str) -> bool {
    BANNERS.iter().any(|banner| banner.id == id)
}

fn suppressed(states: &BTreeMap<String, CardState>, id: &str, now: DateTime<Utc>) -> bool {
    states
        .get(id)
        .map(|state| state.is_suppressed(now))
        .unwrap_or(false)
}

/// Banner for the current week, or `None` for free-tier members. The index
/// rotates weekly from the anchor; a suppressed banner falls through to the
/// next slot exactly once, never further.
pub fn current_banner(
    entitlements: &Entitlements,
    states: &BTreeMap<String, CardState>,
    now: DateTime<Utc>,
) -> Option<&'static Banner> {
    if !entitlements.is_premium {
        return None;
    }

    let days = (now.date_naive() - ROTATION_ANCHOR).num_days();
    if days < 0 {
        return None;
    }
    let weeks = (days / 7) as usize;
    let index = weeks % BANNERS.len();

    let scheduled = &BANNERS[index];
    if !suppressed(states, scheduled.id, now) {
        return Some(scheduled);
    }
    let fallback = &BANNERS[(index + 1) % BANNERS.len()];
    (!suppressed(states, fallback.id, now)).then_some(fallback)
}
