//! FILENAME: core/rollup-engine/src/datasets/revenue.rs
//! Revenue receipts rolled up by fund group. The source stores amounts in
//! millions, so the default definition scales them.

use fiscal::{AmountParser, AmountUnit, RevenueLine};
use serde::{Deserialize, Serialize};
use crate::definition::{Dataset, DatasetDefinition, DetailRow, GroupKey};
use super::text_or;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueDetail {
    pub source: String,
    pub category: String,
    pub amount: f64,
    pub fiscal_year: String,
}

impl DetailRow for RevenueDetail {
    fn label(&self) -> &str {
        &self.source
    }

    fn primary_amount(&self) -> f64 {
        self.amount
    }

    fn context_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Category", self.category.clone()),
            ("Fiscal year", self.fiscal_year.clone()),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct RevenueDataset {
    definition: DatasetDefinition,
    parser: AmountParser,
}

impl RevenueDataset {
    pub const ID: &'static str = "revenue";

    pub fn new() -> Self {
        RevenueDataset::with_definition(RevenueDataset::default_definition())
    }

    pub fn with_definition(definition: DatasetDefinition) -> Self {
        let parser = AmountParser::for_unit(definition.amount_unit);
        RevenueDataset { definition, parser }
    }

    pub fn default_definition() -> DatasetDefinition {
        DatasetDefinition::new(Self::ID, "Revenue", "revenue_budget_lines", "Fund group")
            .with_columns(&["fund_group", "revenue_source", "revenue_category", "amount", "fiscal_year"])
            .with_amount_unit(AmountUnit::Millions)
    }
}

impl Default for RevenueDataset {
    fn default() -> Self {
        RevenueDataset::new()
    }
}

impl Dataset for RevenueDataset {
    type Row = RevenueLine;
    type Detail = RevenueDetail;

    fn definition(&self) -> &DatasetDefinition {
        &self.definition
    }

    fn group_key(&self, row: &RevenueLine) -> GroupKey {
        GroupKey::normalize(row.fund_group.as_deref())
    }

    fn amount(&self, row: &RevenueLine) -> f64 {
        self.parser.parse_raw(row.amount.as_ref())
    }

    fn to_detail(&self, row: &RevenueLine) -> RevenueDetail {
        RevenueDetail {
            source: text_or(&row.revenue_source, "Unspecified source"),
            category: text_or(&row.revenue_category, ""),
            amount: self.amount(row),
            fiscal_year: text_or(&row.fiscal_year, ""),
        }
    }
}
