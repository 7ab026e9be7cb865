//! FILENAME: core/fiscal/src/rows.rs
//! PURPOSE: Raw row shapes for the three fiscal datasets.
//! CONTEXT: Rows are decoded as-is from the source and never mutated. Every
//! column is optional because the source tables are sparsely populated.

use serde::{Deserialize, Serialize};
use crate::amount::RawAmount;

/// One line of the capital budget (a project appropriation).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapitalItem {
    pub agency: Option<String>,
    pub project_description: Option<String>,
    pub financing_source: Option<String>,
    pub recommended_amount: Option<RawAmount>,
    pub reference_number: Option<String>,
    pub budget_line: Option<String>,
}

/// One discretionary grant award.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrantRecord {
    pub agency: Option<String>,
    pub program_name: Option<String>,
    pub recipient_name: Option<String>,
    pub amount: Option<RawAmount>,
    pub council_member: Option<String>,
    pub fiscal_year: Option<String>,
}

/// One revenue receipt line. `amount` is stored in millions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevenueLine {
    pub fund_group: Option<String>,
    pub revenue_source: Option<String>,
    pub revenue_category: Option<String>,
    pub amount: Option<RawAmount>,
    pub fiscal_year: Option<String>,
}
