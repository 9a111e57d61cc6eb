use super::{RoutineRuleRow, RowSlots};
use crate::catalog::SlotId;

fn row(
    pregnant: &str,
    acne_type: &str,
    severity: &str,
    mature: &str,
    fitzpatrick: &str,
    skin_type: &str,
    slots: [Option<&str>; 7],
) -> RoutineRuleRow {
    let [cleanser, toner, serum, sunscreen, hydrator, moisturizer, treatment] = slots;
    RoutineRuleRow {
        pregnant: pregnant.to_string(),
        acne_type: acne_type.to_string(),
        severity: severity.to_string(),
        mature: mature.to_string(),
        fitzpatrick: fitzpatrick.to_string(),
        skin_type: skin_type.to_string(),
        slots: RowSlots {
            cleanser: cleanser.map(SlotId::new),
            toner: toner.map(SlotId::new),
            serum: serum.map(SlotId::new),
            sunscreen: sunscreen.map(SlotId::new),
            hydrator: hydrator.map(SlotId::new),
            moisturizer: moisturizer.map(SlotId::new),
            treatment: treatment.map(SlotId::new),
        },
    }
}

/// Built-in rule rows in spreadsheet order. Row order is load-bearing:
/// pregnancy-safe routing sits first so it wins over every acne-specific row.
pub(super) fn standard_rows() -> Vec<RoutineRuleRow> {
    vec![
        row(
            "Yes",
            "All",
            "All",
            "All",
            "All",
            "All",
            [
                Some("gel-cleanser"),
                Some("soothing-toner"),
                Some("azelaic-serum"),
                Some("daily-spf"),
                Some("light-hydrator"),
                Some("rich-moisturizer"),
                Some("sulfur-spot"),
            ],
        ),
        row(
            "No",
            "inflamed",
            "severe",
            "All",
            "All",
            "All",
            [
                Some("gel-cleanser"),
                None,
                Some("niacinamide-serum"),
                Some("daily-spf"),
                None,
                Some("oil-free-moisturizer"),
                Some("bpo-5"),
            ],
        ),
        row(
            "No",
            "inflamed",
            "mild,moderate",
            "All",
            "All",
            "oily",
            [
                Some("active-cleanser"),
                Some("balancing-toner"),
                Some("niacinamide-serum"),
                Some("daily-spf"),
                Some("light-hydrator"),
                Some("oil-free-moisturizer"),
                Some("bpo-5"),
            ],
        ),
        row(
            "No",
            "inflamed",
            "mild,moderate",
            "All",
            "4-6",
            "All",
            [
                Some("active-cleanser"),
                Some("soothing-toner"),
                Some("azelaic-serum"),
                Some("tinted-spf"),
                Some("light-hydrator"),
                Some("oil-free-moisturizer"),
                Some("bpo-5"),
            ],
        ),
        row(
            "No",
            "inflamed",
            "mild,moderate",
            "All",
            "All",
            "dry",
            [
                Some("cream-cleanser"),
                Some("soothing-toner"),
                Some("niacinamide-serum"),
                Some("daily-spf"),
                Some("light-hydrator"),
                Some("rich-moisturizer"),
                Some("sulfur-spot"),
            ],
        ),
        row(
            "No",
            "noninflamed",
            "All",
            "All",
            "All",
            "All",
            [
                Some("active-cleanser"),
                Some("balancing-toner"),
                Some("niacinamide-serum"),
                Some("daily-spf"),
                Some("light-hydrator"),
                Some("oil-free-moisturizer"),
                None,
            ],
        ),
        row(
            "No",
            "All",
            "All",
            "Yes",
            "All",
            "All",
            [
                Some("cream-cleanser"),
                Some("soothing-toner"),
                Some("retinal-serum"),
                Some("daily-spf"),
                Some("light-hydrator"),
                Some("rich-moisturizer"),
                None,
            ],
        ),
        row(
            "No",
            "All",
            "All",
            "All",
            "All",
            "All",
            [
                Some("gel-cleanser"),
                None,
                Some("niacinamide-serum"),
                Some("daily-spf"),
                None,
                Some("rich-moisturizer"),
                None,
            ],
        ),
    ]
}
