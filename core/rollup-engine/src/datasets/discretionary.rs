//! FILENAME: core/rollup-engine/src/datasets/discretionary.rs
//! Discretionary grants rolled up by awarding agency.

use fiscal::{AmountParser, GrantRecord};
use serde::{Deserialize, Serialize};
use crate::definition::{Dataset, DatasetDefinition, DetailRow, GroupKey};
use super::text_or;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantDetail {
    pub program: String,
    pub recipient: String,
    pub amount: f64,
    pub council_member: String,
    pub fiscal_year: String,
}

impl DetailRow for GrantDetail {
    fn label(&self) -> &str {
        &self.program
    }

    fn primary_amount(&self) -> f64 {
        self.amount
    }

    fn context_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Recipient", self.recipient.clone()),
            ("Council member", self.council_member.clone()),
            ("Fiscal year", self.fiscal_year.clone()),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct DiscretionaryDataset {
    definition: DatasetDefinition,
    parser: AmountParser,
}

impl DiscretionaryDataset {
    pub const ID: &'static str = "discretionary";

    pub fn new() -> Self {
        DiscretionaryDataset::with_definition(DiscretionaryDataset::default_definition())
    }

    pub fn with_definition(definition: DatasetDefinition) -> Self {
        let parser = AmountParser::for_unit(definition.amount_unit);
        DiscretionaryDataset { definition, parser }
    }

    pub fn default_definition() -> DatasetDefinition {
        DatasetDefinition::new(Self::ID, "Discretionary Grants", "discretionary_grants", "Agency").with_columns(&[
            "agency",
            "program_name",
            "recipient_name",
            "amount",
            "council_member",
            "fiscal_year",
        ])
    }
}

impl Default for DiscretionaryDataset {
    fn default() -> Self {
        DiscretionaryDataset::new()
    }
}

impl Dataset for DiscretionaryDataset {
    type Row = GrantRecord;
    type Detail = GrantDetail;

    fn definition(&self) -> &DatasetDefinition {
        &self.definition
    }

    fn group_key(&self, row: &GrantRecord) -> GroupKey {
        GroupKey::normalize(row.agency.as_deref())
    }

    fn amount(&self, row: &GrantRecord) -> f64 {
        self.parser.parse_raw(row.amount.as_ref())
    }

    fn to_detail(&self, row: &GrantRecord) -> GrantDetail {
        // Program is the label; fall back to the recipient when it is missing
        let recipient = text_or(&row.recipient_name, "Unnamed recipient");
        let program = match row.program_name.as_deref() {
            Some(p) if !p.trim().is_empty() => p.to_string(),
            _ => recipient.clone(),
        };
        GrantDetail {
            program,
            recipient,
            amount: self.amount(row),
            council_member: text_or(&row.council_member, ""),
            fiscal_year: text_or(&row.fiscal_year, ""),
        }
    }
}
