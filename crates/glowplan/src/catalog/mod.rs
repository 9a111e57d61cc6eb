//! Static product catalog: abstract routine slots and their purchasable variants.

mod builtin;
pub mod enrichment;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub use enrichment::{CatalogLoadError, PurchaseLinkRow};

/// Identifier for an abstract treatment step (e.g. "gel-cleanser", "bpo-5").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotId(pub String);

impl SlotId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Treatment categories; the resolver's morning/evening split is total over this enum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Cleanser,
    Toner,
    Serum,
    Hydrator,
    Moisturizer,
    Spf,
    SpotTreatment,
    Tool,
}

impl ProductCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ProductCategory::Cleanser => "cleanser",
            ProductCategory::Toner => "toner",
            ProductCategory::Serum => "serum",
            ProductCategory::Hydrator => "hydrator",
            ProductCategory::Moisturizer => "moisturizer",
            ProductCategory::Spf => "spf",
            ProductCategory::SpotTreatment => "spot_treatment",
            ProductCategory::Tool => "tool",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    Budget,
    Standard,
    Premium,
}

/// A concrete purchasable product fulfilling a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub brand: String,
    pub name: String,
    pub price_range: Option<String>,
    pub original_link: Option<String>,
    pub affiliate_link: Option<String>,
    pub is_default: bool,
    pub is_recommended: bool,
}

/// An abstract routine step plus its purchasable variants.
///
/// Legacy and tool slots carry no variants; their flat `affiliate_link` and
/// display name are used directly when the resolver synthesizes a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSlot {
    pub id: SlotId,
    pub display_name: String,
    pub category: ProductCategory,
    pub tier: PriceTier,
    pub price_range: Option<String>,
    pub affiliate_link: Option<String>,
    /// Benefits copy shown with the resolved product; the resolver falls
    /// back to generic copy when absent.
    pub benefits: Option<String>,
    pub variants: Vec<ProductVariant>,
}

impl ProductSlot {
    /// First variant flagged recommended, in list order.
    pub fn recommended_variant(&self) -> Option<&ProductVariant> {
        self.variants.iter().find(|variant| variant.is_recommended)
    }

    /// First variant flagged default, in list order.
    pub fn default_variant(&self) -> Option<&ProductVariant> {
        self.variants.iter().find(|variant| variant.is_default)
    }
}

/// Immutable slot registry constructed once at process start and shared by reference.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    slots: BTreeMap<SlotId, ProductSlot>,
}

impl ProductCatalog {
    /// Built-in registry covering the standard routine slots.
    pub fn standard() -> Self {
        let mut catalog = Self::default();
        for slot in builtin::standard_slots() {
            catalog.insert(slot);
        }
        catalog
    }

    pub fn insert(&mut self, slot: ProductSlot) {
        self.slots.insert(slot.id.clone(), slot);
    }

    pub fn get(&self, id: &SlotId) -> Option<&ProductSlot> {
        self.slots.get(id)
    }

    pub fn contains(&self, id: &SlotId) -> bool {
        self.slots.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> impl Iterator<Item = &ProductSlot> {
        self.slots.values()
    }

    /// Overlay purchase links from an enrichment CSV onto matching variants.
    ///
    /// Rows referencing unknown slots or variants are logged and skipped so a
    /// stale spreadsheet cannot take the catalog down.
    pub fn apply_purchase_links(&mut self, rows: Vec<PurchaseLinkRow>) {
        for row in rows {
            let Some(slot) = self.slots.get_mut(&row.slot_id) else {
                tracing::warn!(slot = %row.slot_id, "purchase link references unknown slot");
                continue;
            };

            if slot.variants.is_empty() {
                // Flat slots take the link directly.
                slot.affiliate_link = Some(row.affiliate_link);
                continue;
            }

            let matched = slot
                .variants
                .iter_mut()
                .find(|variant| variant.name.eq_ignore_ascii_case(&row.variant_name));
            match matched {
                Some(variant) => {
                    if let Some(original) = row.original_link {
                        variant.original_link = Some(original);
                    }
                    variant.affiliate_link = Some(row.affiliate_link);
                }
                None => {
                    tracing::warn!(
                        slot = %row.slot_id,
                        variant = %row.variant_name,
                        "purchase link references unknown variant"
                    );
                }
            }
        }
    }
}
