//! FILENAME: core/rollup-engine/src/datasets/capital.rs
//! Capital budget: project appropriations rolled up by agency.

use fiscal::{AmountParser, CapitalItem};
use serde::{Deserialize, Serialize};
use crate::definition::{Dataset, DatasetDefinition, DetailRow, GroupKey};
use super::text_or;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalDetail {
    pub description: String,
    pub financing_source: String,
    pub recommended_amount: f64,
    pub reference_number: String,
    pub budget_line: String,
}

impl DetailRow for CapitalDetail {
    fn label(&self) -> &str {
        &self.description
    }

    fn primary_amount(&self) -> f64 {
        self.recommended_amount
    }

    fn context_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Financing source", self.financing_source.clone()),
            ("Reference", self.reference_number.clone()),
            ("Budget line", self.budget_line.clone()),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct CapitalDataset {
    definition: DatasetDefinition,
    parser: AmountParser,
}

impl CapitalDataset {
    pub const ID: &'static str = "capital";

    pub fn new() -> Self {
        CapitalDataset::with_definition(CapitalDataset::default_definition())
    }

    pub fn with_definition(definition: DatasetDefinition) -> Self {
        let parser = AmountParser::for_unit(definition.amount_unit);
        CapitalDataset { definition, parser }
    }

    pub fn default_definition() -> DatasetDefinition {
        DatasetDefinition::new(Self::ID, "Capital Budget", "capital_budget_items", "Agency").with_columns(&[
            "agency",
            "project_description",
            "financing_source",
            "recommended_amount",
            "reference_number",
            "budget_line",
        ])
    }
}

impl Default for CapitalDataset {
    fn default() -> Self {
        CapitalDataset::new()
    }
}

impl Dataset for CapitalDataset {
    type Row = CapitalItem;
    type Detail = CapitalDetail;

    fn definition(&self) -> &DatasetDefinition {
        &self.definition
    }

    fn group_key(&self, row: &CapitalItem) -> GroupKey {
        GroupKey::normalize(row.agency.as_deref())
    }

    fn amount(&self, row: &CapitalItem) -> f64 {
        self.parser.parse_raw(row.recommended_amount.as_ref())
    }

    fn to_detail(&self, row: &CapitalItem) -> CapitalDetail {
        CapitalDetail {
            description: text_or(&row.project_description, "Untitled project"),
            financing_source: text_or(&row.financing_source, ""),
            recommended_amount: self.amount(row),
            reference_number: text_or(&row.reference_number, ""),
            budget_line: text_or(&row.budget_line, ""),
        }
    }
}
