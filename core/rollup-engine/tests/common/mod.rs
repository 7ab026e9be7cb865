//! FILENAME: tests/common/mod.rs
//! Fixtures for rollup-engine integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rollup_engine::{Dataset, DatasetDefinition, DetailRow, GroupKey, RollupEngine};
use fiscal::parse_amount;

// ============================================================================
// SPEND DATASET
// ============================================================================

/// A minimal raw row: an agency and an amount string.
#[derive(Debug, Clone, PartialEq)]
pub struct SpendRow {
    pub agency: Option<String>,
    pub amount: Option<String>,
    pub memo: String,
}

impl SpendRow {
    pub fn new(agency: &str, amount: &str) -> Self {
        SpendRow {
            agency: Some(agency.to_string()),
            amount: Some(amount.to_string()),
            memo: format!("{} {}", agency, amount),
        }
    }

    pub fn without_agency(amount: &str) -> Self {
        SpendRow {
            agency: None,
            amount: Some(amount.to_string()),
            memo: format!("unassigned {}", amount),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpendDetail {
    pub memo: String,
    pub amount: f64,
}

impl DetailRow for SpendDetail {
    fn label(&self) -> &str {
        &self.memo
    }

    fn primary_amount(&self) -> f64 {
        self.amount
    }
}

/// Dataset whose detail mapper counts its calls.
pub struct SpendDataset {
    definition: DatasetDefinition,
    pub mapper_calls: Arc<AtomicUsize>,
}

impl SpendDataset {
    pub fn new() -> Self {
        SpendDataset {
            definition: DatasetDefinition::new("spend", "Spend", "spend_lines", "Agency"),
            mapper_calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Dataset for SpendDataset {
    type Row = SpendRow;
    type Detail = SpendDetail;

    fn definition(&self) -> &DatasetDefinition {
        &self.definition
    }

    fn group_key(&self, row: &SpendRow) -> GroupKey {
        GroupKey::normalize(row.agency.as_deref())
    }

    fn amount(&self, row: &SpendRow) -> f64 {
        parse_amount(row.amount.as_deref())
    }

    fn to_detail(&self, row: &SpendRow) -> SpendDetail {
        self.mapper_calls.fetch_add(1, Ordering::SeqCst);
        SpendDetail {
            memo: row.memo.clone(),
            amount: self.amount(row),
        }
    }
}

// ============================================================================
// ROW FIXTURES
// ============================================================================

/// A:100, A:50, B:300
pub fn scenario_rows() -> Vec<SpendRow> {
    vec![
        SpendRow::new("A", "100"),
        SpendRow::new("A", "50"),
        SpendRow::new("B", "300"),
    ]
}

/// Deterministic pseudo-random rows spread over `groups` agencies, including
/// blank agencies, formatted amounts and unparsable amounts.
pub fn synthetic_rows(count: usize, groups: usize) -> Vec<SpendRow> {
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    let mut next = move || {
        // xorshift64
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    (0..count)
        .map(|i| {
            let r = next();
            let group = (r % groups as u64) as usize;
            let dollars = (r >> 16) % 5_000_000;
            let amount = match i % 7 {
                0 => format!("${},{:03}", dollars / 1000, dollars % 1000),
                1 => "n/a".to_string(),
                _ => dollars.to_string(),
            };
            let mut row = if group == 0 {
                SpendRow::without_agency(&amount)
            } else {
                SpendRow::new(&format!("Agency {:02}", group), &amount)
            };
            row.memo = format!("line {}", i);
            row
        })
        .collect()
}

/// An engine that already holds `rows`.
pub fn ready_engine(rows: Vec<SpendRow>) -> RollupEngine<SpendDataset> {
    let engine = RollupEngine::new(SpendDataset::new());
    engine.load_rows(rows).expect("fresh engine accepts rows");
    engine
}

pub fn mapper_calls(engine: &RollupEngine<SpendDataset>) -> usize {
    engine.dataset().mapper_calls.load(Ordering::SeqCst)
}

/// Full re-scan reference for the aggregation index.
pub fn rescan_total(rows: &[SpendRow]) -> f64 {
    rows.iter().map(|r| parse_amount(r.amount.as_deref())).sum()
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}
