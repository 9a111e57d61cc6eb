use crate::accounts::UserId;
use crate::catalog::{ProductCategory, SlotId};
use crate::quiz::QuizAnswers;
use crate::rules::SkinProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier wrapper for persisted routines.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoutineId(pub String);

impl fmt::Display for RoutineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for routine notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteId(pub String);

/// Free-text dated note attached to a routine from the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineNote {
    pub id: NoteId,
    pub written_at: DateTime<Utc>,
    pub text: String,
}

/// Slot ids as persisted. Older records stored a `{morning, evening}` pair;
/// current records store one flat list. The tagged union keeps the
/// polymorphism at the persistence boundary only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredSlotIds {
    Flat(Vec<SlotId>),
    Split {
        morning: Vec<SlotId>,
        evening: Vec<SlotId>,
    },
}

impl StoredSlotIds {
    /// Canonical flat shape: the legacy split is unioned in order
    /// (morning first) with duplicates dropped.
    pub fn normalize(&self) -> Vec<SlotId> {
        match self {
            StoredSlotIds::Flat(ids) => ids.clone(),
            StoredSlotIds::Split { morning, evening } => {
                let mut seen = Vec::with_capacity(morning.len() + evening.len());
                for id in morning.iter().chain(evening.iter()) {
                    if !seen.contains(id) {
                        seen.push(id.clone());
                    }
                }
                seen
            }
        }
    }
}

/// Coaching track selected by the routine's dominant concern; drives the
/// weekly schedule label shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineType {
    GentleCare,
    IntensiveClearing,
    Clearing,
    Renewal,
    Balancing,
}

impl RoutineType {
    pub fn from_profile(profile: &SkinProfile) -> Self {
        if profile.is_pregnant_or_nursing {
            RoutineType::GentleCare
        } else if profile.severity.eq_ignore_ascii_case("severe") {
            RoutineType::IntensiveClearing
        } else if profile.acne_type.eq_ignore_ascii_case("inflamed")
            || profile.acne_type.eq_ignore_ascii_case("mixed")
        {
            RoutineType::Clearing
        } else if profile.is_mature {
            RoutineType::Renewal
        } else {
            RoutineType::Balancing
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RoutineType::GentleCare => "gentle_care",
            RoutineType::IntensiveClearing => "intensive_clearing",
            RoutineType::Clearing => "clearing",
            RoutineType::Renewal => "renewal",
            RoutineType::Balancing => "balancing",
        }
    }
}

/// A user's persisted routine: profile answers, slot list, overrides, notes.
/// Never hard-deleted; retakes create a new record and transfer `is_current`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    pub id: RoutineId,
    pub user_id: UserId,
    pub answers: QuizAnswers,
    pub profile: SkinProfile,
    pub slot_ids: StoredSlotIds,
    pub routine_type: RoutineType,
    /// Per-category user overrides: category to chosen product name.
    pub product_selections: BTreeMap<ProductCategory, String>,
    pub notes: Vec<RoutineNote>,
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<SlotId> {
        values.iter().map(|value| SlotId::new(*value)).collect()
    }

    #[test]
    fn flat_shape_normalizes_to_itself() {
        let stored = StoredSlotIds::Flat(ids(&["a", "b"]));
        assert_eq!(stored.normalize(), ids(&["a", "b"]));
    }

    #[test]
    fn legacy_split_shape_unions_and_dedupes() {
        let stored = StoredSlotIds::Split {
            morning: ids(&["cleanser", "spf", "moisturizer"]),
            evening: ids(&["cleanser", "moisturizer", "bpo-5"]),
        };
        assert_eq!(
            stored.normalize(),
            ids(&["cleanser", "spf", "moisturizer", "bpo-5"])
        );
    }

    #[test]
    fn split_shape_deserializes_from_legacy_json() {
        let legacy = r#"{"morning": ["a"], "evening": ["b"]}"#;
        let stored: StoredSlotIds = serde_json::from_str(legacy).expect("legacy shape parses");
        assert_eq!(stored.normalize(), ids(&["a", "b"]));

        let flat = r#"["a", "b"]"#;
        let stored: StoredSlotIds = serde_json::from_str(flat).expect("flat shape parses");
        assert_eq!(stored.normalize(), ids(&["a", "b"]));
    }

    #[test]
    fn routine_type_precedence_follows_profile() {
        let mut profile = SkinProfile {
            is_pregnant_or_nursing: true,
            acne_type: "inflamed".to_string(),
            severity: "severe".to_string(),
            is_mature: true,
            fitzpatrick_group: "1-3".to_string(),
            skin_type: "oily".to_string(),
        };
        assert_eq!(RoutineType::from_profile(&profile), RoutineType::GentleCare);

        profile.is_pregnant_or_nursing = false;
        assert_eq!(RoutineType::from_profile(&profile), RoutineType::IntensiveClearing);

        profile.severity = "moderate".to_string();
        assert_eq!(RoutineType::from_profile(&profile), RoutineType::Clearing);

        profile.acne_type = "none".to_string();
        assert_eq!(RoutineType::from_profile(&profile), RoutineType::Renewal);

        profile.is_mature = false;
        assert_eq!(RoutineType::from_profile(&profile), RoutineType::Balancing);
    }
}
