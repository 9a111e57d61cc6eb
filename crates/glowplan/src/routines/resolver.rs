//! Slot resolution: abstract slot ids become concrete morning/evening
//! product lists against the caller's current entitlement state.
//!
//! Resolution is pure and idempotent. It runs on every read of a routine,
//! never just at creation, so a subscription upgrade or downgrade changes
//! the variants shown without mutating the stored slot list.

use crate::catalog::{ProductCatalog, ProductCategory, ProductSlot, ProductVariant, SlotId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Benefits copy used when a slot carries none of its own.
pub const BENEFITS_PLACEHOLDER: &str =
    "Targets your skin concerns as part of your personalized plan";

fn benefits_for(slot: &ProductSlot) -> String {
    slot.benefits
        .clone()
        .unwrap_or_else(|| BENEFITS_PLACEHOLDER.to_string())
}

/// An alternative variant surfaced to premium-entitled callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumOption {
    pub brand: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliate_link: Option<String>,
}

/// One resolved routine step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedProduct {
    pub slot_id: SlotId,
    pub slot_name: String,
    pub category: ProductCategory,
    pub brand: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliate_link: Option<String>,
    pub benefits: String,
    /// Empty for non-entitled callers; the UI hides the alternatives
    /// affordance when nothing is attached.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub premium_options: Vec<PremiumOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRoutine {
    pub morning: Vec<ResolvedProduct>,
    pub evening: Vec<ResolvedProduct>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    MorningOnly,
    EveningOnly,
    Both,
}

/// AM/PM placement is a total function over category, not configurable.
fn placement(category: ProductCategory) -> Placement {
    match category {
        ProductCategory::Spf => Placement::MorningOnly,
        ProductCategory::SpotTreatment => Placement::EveningOnly,
        ProductCategory::Cleanser
        | ProductCategory::Toner
        | ProductCategory::Serum
        | ProductCategory::Hydrator
        | ProductCategory::Moisturizer
        | ProductCategory::Tool => Placement::Both,
    }
}

/// Variant selection is an explicit total ordering rather than an ad hoc
/// flag scan: `recommended > default > first-in-list` for entitled callers,
/// `default > first-in-list` otherwise. The first variant carrying a flag
/// wins when several claim it.
fn select_variant(slot: &ProductSlot, premium_entitled: bool) -> Option<&ProductVariant> {
    if premium_entitled {
        slot.recommended_variant()
            .or_else(|| slot.default_variant())
            .or_else(|| slot.variants.first())
    } else {
        slot.default_variant().or_else(|| slot.variants.first())
    }
}

fn resolve_slot(slot: &ProductSlot, premium_entitled: bool) -> ResolvedProduct {
    match select_variant(slot, premium_entitled) {
        Some(variant) => {
            let premium_options = if premium_entitled {
                slot.variants
                    .iter()
                    .filter(|candidate| *candidate != variant)
                    .map(|candidate| PremiumOption {
                        brand: candidate.brand.clone(),
                        name: candidate.name.clone(),
                        original_link: candidate.original_link.clone(),
                        affiliate_link: candidate.affiliate_link.clone(),
                    })
                    .collect()
            } else {
                Vec::new()
            };

            ResolvedProduct {
                slot_id: slot.id.clone(),
                slot_name: slot.display_name.clone(),
                category: slot.category,
                brand: variant.brand.clone(),
                name: variant.name.clone(),
                price_range: variant.price_range.clone(),
                original_link: variant.original_link.clone(),
                affiliate_link: variant.affiliate_link.clone(),
                benefits: benefits_for(slot),
                premium_options,
            }
        }
        // Flat slots (legacy/tool items) synthesize from the slot itself.
        None => ResolvedProduct {
            slot_id: slot.id.clone(),
            slot_name: slot.display_name.clone(),
            category: slot.category,
            brand: String::new(),
            name: slot.display_name.clone(),
            price_range: slot.price_range.clone(),
            original_link: None,
            affiliate_link: slot.affiliate_link.clone(),
            benefits: benefits_for(slot),
            premium_options: Vec::new(),
        },
    }
}

/// Resolve a normalized slot list into morning and evening product lists.
///
/// Slot ids missing from the catalog are logged as a data-integrity error
/// and skipped; a partial routine is more useful than none.
pub fn resolve(
    catalog: &ProductCatalog,
    slot_ids: &[SlotId],
    premium_entitled: bool,
) -> ResolvedRoutine {
    let mut routine = ResolvedRoutine::default();

    for slot_id in slot_ids {
        let Some(slot) = catalog.get(slot_id) else {
            tracing::error!(slot = %slot_id, "rule table references a slot missing from the catalog");
            continue;
        };

        let product = resolve_slot(slot, premium_entitled);
        match placement(slot.category) {
            Placement::MorningOnly => routine.morning.push(product),
            Placement::EveningOnly => routine.evening.push(product),
            Placement::Both => {
                routine.morning.push(product.clone());
                routine.evening.push(product);
            }
        }
    }

    routine
}

/// Swap displayed products for categories the user overrode, when the
/// chosen name still exists among the slot's variants. Overrides never
/// touch the stored slot list.
pub fn apply_selections(
    catalog: &ProductCatalog,
    routine: &mut ResolvedRoutine,
    selections: &BTreeMap<ProductCategory, String>,
) {
    for products in [&mut routine.morning, &mut routine.evening] {
        for product in products.iter_mut() {
            let Some(chosen) = selections.get(&product.category) else {
                continue;
            };
            let Some(slot) = catalog.get(&product.slot_id) else {
                continue;
            };
            let Some(variant) = slot
                .variants
                .iter()
                .find(|variant| variant.name.eq_ignore_ascii_case(chosen))
            else {
                continue;
            };
            product.brand = variant.brand.clone();
            product.name = variant.name.clone();
            product.price_range = variant.price_range.clone();
            product.original_link = variant.original_link.clone();
            product.affiliate_link = variant.affiliate_link.clone();
        }
    }
}
