use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One costed row from an estimator's line-item export.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub description: String,
    pub category: LineItemCategory,
    pub quantity: f64,
    pub unit_cost: f64,
}

impl LineItem {
    pub fn extended_cost(&self) -> f64 {
        self.quantity * self.unit_cost
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineItemCategory {
    Material,
    Labor,
}

/// Base-cost totals summed from an imported line-item sheet.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImportedTotals {
    pub material_base_cost: f64,
    pub labor_base_cost: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum LineItemImportError {
    #[error("failed to read line-item CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unknown category '{value}' (expected material or labor)")]
    UnknownCategory { row: usize, value: String },
    #[error("row {row}: {field} must be non-negative, got {value}")]
    NegativeValue {
        row: usize,
        field: &'static str,
        value: f64,
    },
}

/// Parse a line-item CSV (`Description, Category, Quantity, Unit Cost`) into
/// individual items.
pub fn parse_line_items<R: Read>(reader: R) -> Result<Vec<LineItem>, LineItemImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut items = Vec::new();

    for (index, record) in csv_reader.deserialize::<LineItemRow>().enumerate() {
        let row_number = index + 2; // 1-based, after the header row
        let row = record?;

        let category = match row.category.to_ascii_lowercase().as_str() {
            "material" | "materials" => LineItemCategory::Material,
            "labor" | "labour" => LineItemCategory::Labor,
            other => {
                return Err(LineItemImportError::UnknownCategory {
                    row: row_number,
                    value: other.to_string(),
                })
            }
        };

        for (field, value) in [("Quantity", row.quantity), ("Unit Cost", row.unit_cost)] {
            if value < 0.0 {
                return Err(LineItemImportError::NegativeValue {
                    row: row_number,
                    field,
                    value,
                });
            }
        }

        items.push(LineItem {
            description: row.description,
            category,
            quantity: row.quantity,
            unit_cost: row.unit_cost,
        });
    }

    Ok(items)
}

/// Sum parsed items into the material/labor base costs the engine consumes.
pub fn totals(items: &[LineItem]) -> ImportedTotals {
    items.iter().fold(ImportedTotals::default(), |mut acc, item| {
        match item.category {
            LineItemCategory::Material => acc.material_base_cost += item.extended_cost(),
            LineItemCategory::Labor => acc.labor_base_cost += item.extended_cost(),
        }
        acc
    })
}

/// Read and total a sheet in one step.
pub fn totals_from_reader<R: Read>(reader: R) -> Result<ImportedTotals, LineItemImportError> {
    let items = parse_line_items(reader)?;
    Ok(totals(&items))
}

#[derive(Debug, Deserialize)]
struct LineItemRow {
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Quantity", deserialize_with = "flexible_number")]
    quantity: f64,
    #[serde(rename = "Unit Cost", deserialize_with = "flexible_number")]
    unit_cost: f64,
}

fn flexible_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ','))
        .collect::<String>();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed.parse::<f64>().map_err(serde::de::Error::custom)
}
