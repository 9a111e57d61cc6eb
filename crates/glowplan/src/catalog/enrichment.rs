//! Purchase-link enrichment loaded from a CSV export of the product spreadsheet.

use super::SlotId;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;

/// One row of the purchase-link sheet, keyed by slot and variant name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseLinkRow {
    pub slot_id: SlotId,
    pub variant_name: String,
    pub original_link: Option<String>,
    pub affiliate_link: String,
}

#[derive(Debug)]
pub enum CatalogLoadError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for CatalogLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogLoadError::Io(err) => write!(f, "failed to read purchase link sheet: {}", err),
            CatalogLoadError::Csv(err) => write!(f, "invalid purchase link CSV data: {}", err),
        }
    }
}

impl std::error::Error for CatalogLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogLoadError::Io(err) => Some(err),
            CatalogLoadError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for CatalogLoadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogLoadError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<PurchaseLinkRow>, CatalogLoadError> {
    let file = std::fs::File::open(path)?;
    from_reader(file)
}

pub fn from_reader<R: Read>(reader: R) -> Result<Vec<PurchaseLinkRow>, CatalogLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for record in csv_reader.deserialize::<LinkRow>() {
        let row = record?;
        let Some(affiliate_link) = row.affiliate_link else {
            // Rows without an affiliate link carry nothing worth overlaying.
            continue;
        };
        rows.push(PurchaseLinkRow {
            slot_id: SlotId::new(row.slot),
            variant_name: row.product,
            original_link: row.original_link,
            affiliate_link,
        });
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct LinkRow {
    #[serde(rename = "Slot")]
    slot: String,
    #[serde(rename = "Product")]
    product: String,
    #[serde(
        rename = "Original Link",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    original_link: Option<String>,
    #[serde(
        rename = "Affiliate Link",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    affiliate_link: Option<String>,
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
    use std::io::Cursor;

    #[test]
    fn parses_rows_and_drops_linkless_entries() {
        let csv = "\
Slot,Product,Original Link,Affiliate Link
bpo-5,Effaclar Duo Dual Action Treatment,https://example.com/duo,https://aff.example.com/duo
gel-cleanser,Foaming Facial Cleanser,,
";
        let rows = from_reader(Cursor::new(csv)).expect("parses");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].slot_id, SlotId::new("bpo-5"));
        assert_eq!(rows[0].original_link.as_deref(), Some("https://example.com/duo"));
    }

    #[test]
    fn rejects_malformed_csv() {
        let csv = "Slot,Product\n\"unterminated";
        assert!(matches!(
            from_reader(Cursor::new(csv)),
            Err(CatalogLoadError::Csv(_))
        ));
    }
}
