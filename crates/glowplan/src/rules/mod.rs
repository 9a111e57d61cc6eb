//! Routine rule table: maps a discrete skin-profile tuple to ordered product slots.
//!
//! Rows are scanned in load order and the first fully-matching row wins.
//! There is deliberately no best-match or specificity scoring; the table is
//! authored spreadsheet-style and row order is the tie-break.

mod builtin;
pub mod parser;

use crate::catalog::{ProductCatalog, SlotId};
use serde::{Deserialize, Serialize};

pub use parser::RuleTableLoadError;

/// Age at and above which the maturity predicate derives to true.
pub const MATURITY_AGE: u8 = 45;

/// The six-predicate input tuple derived from quiz answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkinProfile {
    pub is_pregnant_or_nursing: bool,
    /// Canonical acne type: "inflamed", "noninflamed", or "mixed".
    pub acne_type: String,
    /// Single severity value: "mild", "moderate", or "severe".
    pub severity: String,
    /// Derived from age (`age >= 45`).
    pub is_mature: bool,
    /// Fitzpatrick grouping: "1-3" or "4-6".
    pub fitzpatrick_group: String,
    pub skin_type: String,
}

/// Ordered slot references of one rule row. Empty cells are skipped; the
/// collection order (cleanser through treatment) is fixed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSlots {
    pub cleanser: Option<SlotId>,
    pub toner: Option<SlotId>,
    pub serum: Option<SlotId>,
    pub sunscreen: Option<SlotId>,
    pub hydrator: Option<SlotId>,
    pub moisturizer: Option<SlotId>,
    pub treatment: Option<SlotId>,
}

impl RowSlots {
    pub fn ordered(&self) -> Vec<SlotId> {
        [
            &self.cleanser,
            &self.toner,
            &self.serum,
            &self.sunscreen,
            &self.hydrator,
            &self.moisturizer,
            &self.treatment,
        ]
        .into_iter()
        .filter_map(|slot| slot.clone())
        .collect()
    }
}

/// One row of the rule table: match predicates plus slot references.
///
/// Predicate cells keep their spreadsheet text form; `All` (or an empty
/// cell) is a wildcard, severity may be a comma list, and skin type matches
/// on substring containment in either direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineRuleRow {
    pub pregnant: String,
    pub acne_type: String,
    pub severity: String,
    pub mature: String,
    pub fitzpatrick: String,
    pub skin_type: String,
    pub slots: RowSlots,
}

impl RoutineRuleRow {
    pub fn matches(&self, profile: &SkinProfile) -> bool {
        matches_yes_no(&self.pregnant, profile.is_pregnant_or_nursing)
            && matches_exact(&self.acne_type, &profile.acne_type)
            && matches_severity(&self.severity, &profile.severity)
            && matches_yes_no(&self.mature, profile.is_mature)
            && matches_exact(&self.fitzpatrick, &profile.fitzpatrick_group)
            && matches_skin_type(&self.skin_type, &profile.skin_type)
    }
}

fn is_wildcard(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all")
}

fn matches_exact(cell: &str, value: &str) -> bool {
    is_wildcard(cell) || cell.trim().eq_ignore_ascii_case(value.trim())
}

fn matches_yes_no(cell: &str, value: bool) -> bool {
    if is_wildcard(cell) {
        return true;
    }
    match cell.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" => value,
        "no" | "n" | "false" => !value,
        _ => false,
    }
}

/// Severity cells may hold a comma list ("mild,moderate") matched
/// case-insensitively against the single profile value.
fn matches_severity(cell: &str, value: &str) -> bool {
    is_wildcard(cell)
        || cell
            .split(',')
            .any(|entry| entry.trim().eq_ignore_ascii_case(value.trim()))
}

/// Skin type matches on substring containment in either direction, so a row
/// authored as "combination" matches a profile of "combination/oily" and
/// vice versa.
fn matches_skin_type(cell: &str, value: &str) -> bool {
    if is_wildcard(cell) {
        return true;
    }
    let cell = cell.trim().to_ascii_lowercase();
    let value = value.trim().to_ascii_lowercase();
    cell.contains(&value) || value.contains(&cell)
}

/// The loaded rule table. Row order is preserved from the source.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rows: Vec<RoutineRuleRow>,
}

impl RuleTable {
    /// Built-in table mirroring the production spreadsheet fixture.
    pub fn standard() -> Self {
        Self {
            rows: builtin::standard_rows(),
        }
    }

    pub fn new(rows: Vec<RoutineRuleRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[RoutineRuleRow] {
        &self.rows
    }

    /// Scan rows in order; the first fully-matching row wins.
    pub fn first_match(&self, profile: &SkinProfile) -> Option<&RoutineRuleRow> {
        self.rows.iter().find(|row| row.matches(profile))
    }

    /// Indices of rows provably unreachable because an earlier row matches
    /// every profile the later row could match. The check is conservative:
    /// it only compares wildcard coverage, exact equality, and severity-list
    /// containment, so it reports no false positives.
    pub fn shadowed_rows(&self) -> Vec<usize> {
        let mut shadowed = Vec::new();
        for (later_index, later) in self.rows.iter().enumerate() {
            let is_shadowed = self.rows[..later_index]
                .iter()
                .any(|earlier| covers(earlier, later));
            if is_shadowed {
                shadowed.push(later_index);
            }
        }
        shadowed
    }

    /// Verify every slot referenced by the table exists in the catalog.
    /// Missing slots are returned so the caller can log them at startup.
    pub fn missing_slots(&self, catalog: &ProductCatalog) -> Vec<SlotId> {
        let mut missing = Vec::new();
        for row in &self.rows {
            for slot_id in row.slots.ordered() {
                if !catalog.contains(&slot_id) && !missing.contains(&slot_id) {
                    missing.push(slot_id);
                }
            }
        }
        missing
    }
}

fn cell_covers(earlier: &str, later: &str) -> bool {
    is_wildcard(earlier) || earlier.trim().eq_ignore_ascii_case(later.trim())
}

fn severity_covers(earlier: &str, later: &str) -> bool {
    if is_wildcard(earlier) {
        return true;
    }
    if is_wildcard(later) {
        return false;
    }
    later.split(',').all(|entry| {
        earlier
            .split(',')
            .any(|candidate| candidate.trim().eq_ignore_ascii_case(entry.trim()))
    })
}

fn covers(earlier: &RoutineRuleRow, later: &RoutineRuleRow) -> bool {
    cell_covers(&earlier.pregnant, &later.pregnant)
        && cell_covers(&earlier.acne_type, &later.acne_type)
        && severity_covers(&earlier.severity, &later.severity)
        && cell_covers(&earlier.mature, &later.mature)
        && cell_covers(&earlier.fitzpatrick, &later.fitzpatrick)
        && cell_covers(&earlier.skin_type, &later.skin_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> SkinProfile {
        SkinProfile {
            is_pregnant_or_nursing: false,
            acne_type: "inflamed".to_string(),
            severity: "moderate".to_string(),
            is_mature: false,
            fitzpatrick_group: "1-3".to_string(),
            skin_type: "oily".to_string(),
        }
    }

    fn row(pregnant: &str, acne: &str, severity: &str, mature: &str, fitz: &str, skin: &str) -> RoutineRuleRow {
        RoutineRuleRow {
            pregnant: pregnant.to_string(),
            acne_type: acne.to_string(),
            severity: severity.to_string(),
            mature: mature.to_string(),
            fitzpatrick: fitz.to_string(),
            skin_type: skin.to_string(),
            slots: RowSlots {
                cleanser: Some(SlotId::new("gel-cleanser")),
                ..RowSlots::default()
            },
        }
    }

    #[test]
    fn wildcard_cells_match_anything() {
        let all = row("All", "All", "All", "All", "All", "All");
        assert!(all.matches(&profile()));
        let mut pregnant = profile();
        pregnant.is_pregnant_or_nursing = true;
        assert!(all.matches(&pregnant));
    }

    #[test]
    fn severity_comma_list_matches_case_insensitively() {
        let listed = row("No", "inflamed", "Mild,Moderate", "All", "All", "All");
        assert!(listed.matches(&profile()));
        let mut severe = profile();
        severe.severity = "severe".to_string();
        assert!(!listed.matches(&severe));
    }

    #[test]
    fn skin_type_matches_substring_in_either_direction() {
        let combo_row = row("No", "All", "All", "All", "All", "combination");
        let mut combo = profile();
        combo.skin_type = "combination/oily".to_string();
        assert!(combo_row.matches(&combo));

        let broader_profile_row = row("No", "All", "All", "All", "All", "combination/oily");
        let mut plain = profile();
        plain.skin_type = "oily".to_string();
        assert!(broader_profile_row.matches(&plain));
    }

    #[test]
    fn maturity_compares_derived_boolean_against_yes_no() {
        let mature_only = row("No", "All", "All", "Yes", "All", "All");
        assert!(!mature_only.matches(&profile()));
        let mut mature = profile();
        mature.is_mature = true;
        assert!(mature_only.matches(&mature));
    }

    #[test]
    fn first_match_wins_over_later_more_specific_rows() {
        let broad = row("No", "inflamed", "All", "All", "All", "All");
        let specific = row("No", "inflamed", "moderate", "No", "1-3", "oily");
        let table = RuleTable::new(vec![broad.clone(), specific]);
        let matched = table.first_match(&profile()).expect("a row matches");
        assert_eq!(matched, &broad);
    }

    #[test]
    fn no_match_returns_none() {
        let table = RuleTable::new(vec![row("Yes", "All", "All", "All", "All", "All")]);
        assert!(table.first_match(&profile()).is_none());
    }

    #[test]
    fn shadowed_rows_flags_rows_behind_a_broader_row() {
        let broad = row("No", "inflamed", "All", "All", "All", "All");
        let narrow = row("No", "inflamed", "mild,moderate", "All", "All", "All");
        let unrelated = row("Yes", "All", "All", "All", "All", "All");
        let table = RuleTable::new(vec![broad, narrow, unrelated]);
        assert_eq!(table.shadowed_rows(), vec![1]);
    }

    #[test]
    fn standard_table_has_no_shadowed_rows() {
        assert!(RuleTable::standard().shadowed_rows().is_empty());
    }

    #[test]
    fn standard_table_references_only_catalog_slots() {
        let catalog = crate::catalog::ProductCatalog::standard();
        assert!(RuleTable::standard().missing_slots(&catalog).is_empty());
    }

    #[test]
    fn standard_table_matches_regression_profile() {
        let table = RuleTable::standard();
        let matched = table.first_match(&profile()).expect("fixture profile matches");
        assert_eq!(
            matched.slots.cleanser,
            Some(SlotId::new("active-cleanser"))
        );
        assert_eq!(matched.slots.treatment, Some(SlotId::new("bpo-5")));
    }
}
