use super::{PriceTier, ProductCategory, ProductSlot, ProductVariant, SlotId};

fn variant(
    brand: &str,
    name: &str,
    price_range: &str,
    is_default: bool,
    is_recommended: bool,
) -> ProductVariant {
    ProductVariant {
        brand: brand.to_string(),
        name: name.to_string(),
        price_range: Some(price_range.to_string()),
        original_link: None,
        affiliate_link: None,
        is_default,
        is_recommended,
    }
}

fn slot(
    id: &str,
    display_name: &str,
    category: ProductCategory,
    tier: PriceTier,
    benefits: &str,
    variants: Vec<ProductVariant>,
) -> ProductSlot {
    ProductSlot {
        id: SlotId::new(id),
        display_name: display_name.to_string(),
        category,
        tier,
        price_range: None,
        affiliate_link: None,
        benefits: Some(benefits.to_string()),
        variants,
    }
}

pub(super) fn standard_slots() -> Vec<ProductSlot> {
    vec![
        slot(
            "gel-cleanser",
            "Gel Cleanser",
            ProductCategory::Cleanser,
            PriceTier::Budget,
            "Removes oil and buildup without stripping the skin barrier",
            vec![
                variant("CeraVe", "Foaming Facial Cleanser", "$10-15", true, false),
                variant(
                    "La Roche-Posay",
                    "Toleriane Purifying Foaming Cleanser",
                    "$15-20",
                    false,
                    true,
                ),
                variant("Vanicream", "Gentle Facial Cleanser", "$8-12", false, false),
            ],
        ),
        slot(
            "active-cleanser",
            "Active Cleanser",
            ProductCategory::Cleanser,
            PriceTier::Standard,
            "Salicylic acid clears pores and treats breakouts at the wash step",
            vec![
                variant(
                    "Neutrogena",
                    "Oil-Free Salicylic Acid Acne Wash",
                    "$8-12",
                    true,
                    false,
                ),
                variant(
                    "Paula's Choice",
                    "Pore Normalizing Cleanser",
                    "$20-25",
                    false,
                    true,
                ),
                variant("CeraVe", "Renewing SA Cleanser", "$12-16", false, false),
            ],
        ),
        slot(
            "cream-cleanser",
            "Cream Cleanser",
            ProductCategory::Cleanser,
            PriceTier::Budget,
            "Cleanses gently while supporting a dry or sensitized barrier",
            vec![
                variant("CeraVe", "Hydrating Facial Cleanser", "$10-15", true, false),
                variant(
                    "La Roche-Posay",
                    "Toleriane Hydrating Gentle Cleanser",
                    "$15-20",
                    false,
                    true,
                ),
            ],
        ),
        slot(
            "soothing-toner",
            "Soothing Toner",
            ProductCategory::Toner,
            PriceTier::Budget,
            "Calms redness and preps skin for treatment steps",
            vec![
                variant("Thayers", "Alcohol-Free Rose Petal Toner", "$9-13", true, false),
                variant("Klairs", "Supple Preparation Unscented Toner", "$18-24", false, true),
            ],
        ),
        slot(
            "balancing-toner",
            "Balancing Toner",
            ProductCategory::Toner,
            PriceTier::Standard,
            "Rebalances oily skin and minimizes the look of pores",
            vec![
                variant("Paula's Choice", "Skin Balancing Pore-Reducing Toner", "$22-26", true, false),
                variant("COSRX", "AHA/BHA Clarifying Treatment Toner", "$12-16", false, true),
            ],
        ),
        slot(
            "azelaic-serum",
            "Azelaic Acid Serum",
            ProductCategory::Serum,
            PriceTier::Standard,
            "Fades post-acne marks and evens tone, pregnancy safe",
            vec![
                variant("The Ordinary", "Azelaic Acid Suspension 10%", "$9-12", true, false),
                variant("Paula's Choice", "10% Azelaic Acid Booster", "$35-40", false, true),
            ],
        ),
        slot(
            "niacinamide-serum",
            "Niacinamide Serum",
            ProductCategory::Serum,
            PriceTier::Budget,
            "Regulates oil and supports the barrier while calming blemishes",
            vec![
                variant("The Ordinary", "Niacinamide 10% + Zinc 1%", "$6-10", true, false),
                variant("Naturium", "Niacinamide Serum 12% Plus Zinc 2%", "$14-18", false, true),
            ],
        ),
        slot(
            "retinal-serum",
            "Retinal Serum",
            ProductCategory::Serum,
            PriceTier::Premium,
            "Speeds cell turnover to smooth texture and prevent clogged pores",
            vec![
                variant("The Ordinary", "Retinal 0.2% Emulsion", "$12-16", true, false),
                variant("Medik8", "Crystal Retinal 3", "$50-60", false, true),
            ],
        ),
        slot(
            "daily-spf",
            "Daily SPF 30",
            ProductCategory::Spf,
            PriceTier::Budget,
            "Protects against UV damage and keeps dark marks from setting in",
            vec![
                variant("CeraVe", "Hydrating Mineral Sunscreen SPF 30", "$13-17", true, false),
                variant("EltaMD", "UV Clear Broad-Spectrum SPF 46", "$38-44", false, true),
                variant("Neutrogena", "Ultra Sheer Dry-Touch SPF 45", "$9-13", false, false),
            ],
        ),
        slot(
            "tinted-spf",
            "Tinted SPF",
            ProductCategory::Spf,
            PriceTier::Standard,
            "Mineral UV protection with a tint that avoids a white cast",
            vec![
                variant("Black Girl Sunscreen", "Make It Matte SPF 45", "$15-19", true, false),
                variant("EltaMD", "UV Clear Tinted SPF 46", "$40-46", false, true),
            ],
        ),
        slot(
            "light-hydrator",
            "Lightweight Hydrator",
            ProductCategory::Hydrator,
            PriceTier::Budget,
            "Adds water-based hydration without clogging pores",
            vec![
                variant("Neutrogena", "Hydro Boost Water Gel", "$18-24", true, false),
                variant("La Roche-Posay", "Hyalu B5 Serum", "$30-36", false, true),
            ],
        ),
        slot(
            "oil-free-moisturizer",
            "Oil-Free Moisturizer",
            ProductCategory::Moisturizer,
            PriceTier::Budget,
            "Locks in moisture with a matte, non-comedogenic finish",
            vec![
                variant("CeraVe", "PM Facial Moisturizing Lotion", "$12-16", true, false),
                variant("La Roche-Posay", "Effaclar Mat Daily Moisturizer", "$22-26", false, true),
            ],
        ),
        slot(
            "rich-moisturizer",
            "Rich Moisturizer",
            ProductCategory::Moisturizer,
            PriceTier::Standard,
            "Replenishes dry skin and repairs the moisture barrier overnight",
            vec![
                variant("CeraVe", "Moisturizing Cream", "$14-18", true, false),
                variant("First Aid Beauty", "Ultra Repair Cream", "$34-38", false, true),
            ],
        ),
        slot(
            "bpo-5",
            "BPO 5%",
            ProductCategory::SpotTreatment,
            PriceTier::Budget,
            "Benzoyl peroxide clears acne bacteria in active blemishes",
            vec![
                variant("PanOxyl", "Adhesive Spot Patch BPO 5%", "$8-12", true, false),
                variant(
                    "La Roche-Posay",
                    "Effaclar Duo Dual Action Treatment",
                    "$30-34",
                    false,
                    true,
                ),
            ],
        ),
        // Flat slots: no variants and no copy, the resolver synthesizes both.
        ProductSlot {
            id: SlotId::new("sulfur-spot"),
            display_name: "Sulfur Spot Treatment".to_string(),
            category: ProductCategory::SpotTreatment,
            tier: PriceTier::Budget,
            price_range: Some("$10-14".to_string()),
            affiliate_link: Some("https://shop.glowplan.example/sulfur-spot".to_string()),
            benefits: None,
            variants: Vec::new(),
        },
        ProductSlot {
            id: SlotId::new("ice-roller"),
            display_name: "Ice Roller".to_string(),
            category: ProductCategory::Tool,
            tier: PriceTier::Budget,
            price_range: Some("$10-16".to_string()),
            affiliate_link: Some("https://shop.glowplan.example/ice-roller".to_string()),
            benefits: None,
            variants: Vec::new(),
        },
    ]
}
