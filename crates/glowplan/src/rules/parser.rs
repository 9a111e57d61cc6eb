//! CSV loading for the routine rule table, preserving source row order.

use super::{RoutineRuleRow, RowSlots, RuleTable};
use crate::catalog::SlotId;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum RuleTableLoadError {
    Io(std::io::Error),
    Csv(csv::Error),
    Empty,
}

impl std::fmt::Display for RuleTableLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleTableLoadError::Io(err) => write!(f, "failed to read rule table: {}", err),
            RuleTableLoadError::Csv(err) => write!(f, "invalid rule table CSV data: {}", err),
            RuleTableLoadError::Empty => write!(f, "rule table contains no rows"),
        }
    }
}

impl std::error::Error for RuleTableLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuleTableLoadError::Io(err) => Some(err),
            RuleTableLoadError::Csv(err) => Some(err),
            RuleTableLoadError::Empty => None,
        }
    }
}

impl From<std::io::Error> for RuleTableLoadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RuleTableLoadError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub fn from_path<P: AsRef<Path>>(path: P) -> Result<RuleTable, RuleTableLoadError> {
    let file = std::fs::File::open(path)?;
    from_reader(file)
}

pub fn from_reader<R: Read>(reader: R) -> Result<RuleTable, RuleTableLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for record in csv_reader.deserialize::<RuleRow>() {
        let row = record?;
        rows.push(RoutineRuleRow {
            pregnant: row.pregnant,
            acne_type: row.acne_type,
            severity: row.severity,
            mature: row.mature,
            fitzpatrick: row.fitzpatrick,
            skin_type: row.skin_type,
            slots: RowSlots {
                cleanser: row.cleanser.map(SlotId::new),
                toner: row.toner.map(SlotId::new),
                serum: row.serum.map(SlotId::new),
                sunscreen: row.sunscreen.map(SlotId::new),
                hydrator: row.hydrator.map(SlotId::new),
                moisturizer: row.moisturizer.map(SlotId::new),
                treatment: row.treatment.map(SlotId::new),
            },
        });
    }

    if rows.is_empty() {
        return Err(RuleTableLoadError::Empty);
    }

    let table = RuleTable::new(rows);
    for index in table.shadowed_rows() {
        tracing::warn!(row = index + 1, "rule table row is shadowed by an earlier row");
    }

    Ok(table)
}

#[derive(Debug, Deserialize)]
struct RuleRow {
    #[serde(rename = "Pregnant", default)]
    pregnant: String,
    #[serde(rename = "Acne Type", default)]
    acne_type: String,
    #[serde(rename = "Severity", default)]
    severity: String,
    #[serde(rename = "Mature", default)]
    mature: String,
    #[serde(rename = "Fitzpatrick", default)]
    fitzpatrick: String,
    #[serde(rename = "Skin Type", default)]
    skin_type: String,
    #[serde(rename = "Cleanser", default, deserialize_with = "empty_string_as_none")]
    cleanser: Option<String>,
    #[serde(rename = "Toner", default, deserialize_with = "empty_string_as_none")]
    toner: Option<String>,
    #[serde(rename = "Serum", default, deserialize_with = "empty_string_as_none")]
    serum: Option<String>,
    #[serde(rename = "Sunscreen", default, deserialize_with = "empty_string_as_none")]
    sunscreen: Option<String>,
    #[serde(rename = "Hydrator", default, deserialize_with = "empty_string_as_none")]
    hydrator: Option<String>,
    #[serde(rename = "Moisturizer", default, deserialize_with = "empty_string_as_none")]
    moisturizer: Option<String>,
    #[serde(rename = "Treatment", default, deserialize_with = "empty_string_as_none")]
    treatment: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::SkinProfile;
    use std::io::Cursor;

    const FIXTURE: &str = "\
Pregnant,Acne Type,Severity,Mature,Fitzpatrick,Skin Type,Cleanser,Toner,Serum,Sunscreen,Hydrator,Moisturizer,Treatment
Yes,All,All,All,All,All,gel-cleanser,,azelaic-serum,daily-spf,,rich-moisturizer,sulfur-spot
No,inflamed,\"mild,moderate\",All,All,oily,active-cleanser,,niacinamide-serum,daily-spf,,oil-free-moisturizer,bpo-5
";

    #[test]
    fn loads_rows_in_file_order() {
        let table = from_reader(Cursor::new(FIXTURE)).expect("fixture parses");
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[0].pregnant, "Yes");
        assert_eq!(
            table.rows()[1].slots.treatment,
            Some(SlotId::new("bpo-5"))
        );
    }

    #[test]
    fn loaded_table_matches_profiles() {
        let table = from_reader(Cursor::new(FIXTURE)).expect("fixture parses");
        let profile = SkinProfile {
            is_pregnant_or_nursing: false,
            acne_type: "inflamed".to_string(),
            severity: "moderate".to_string(),
            is_mature: false,
            fitzpatrick_group: "1-3".to_string(),
            skin_type: "oily".to_string(),
        };
        let matched = table.first_match(&profile).expect("row matches");
        assert_eq!(matched.slots.cleanser, Some(SlotId::new("active-cleanser")));
    }

    #[test]
    fn empty_table_is_rejected() {
        let header_only =
            "Pregnant,Acne Type,Severity,Mature,Fitzpatrick,Skin Type,Cleanser,Toner,Serum,Sunscreen,Hydrator,Moisturizer,Treatment\n";
        assert!(matches!(
            from_reader(Cursor::new(header_only)),
            Err(RuleTableLoadError::Empty)
        ));
    }
}
