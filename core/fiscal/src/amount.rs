//! FILENAME: core/fiscal/src/amount.rs
//! PURPOSE: Converts locale-formatted amount text into numbers.
//! CONTEXT: Source tables store amounts as display strings ("1,500,000",
//! "$45.2", "(1,200)"). Parsing never fails: anything unusable becomes 0.0 so
//! aggregation can proceed over dirty data.

use serde::{Deserialize, Serialize};

/// An amount column as it arrives from the source: usually text, sometimes a
/// plain JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
}

impl From<&str> for RawAmount {
    fn from(value: &str) -> Self {
        RawAmount::Text(value.to_string())
    }
}

impl From<f64> for RawAmount {
    fn from(value: f64) -> Self {
        RawAmount::Number(value)
    }
}

/// Unit the source stores amounts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountUnit {
    #[default]
    Units,
    /// Values are stored in millions and must be scaled up.
    Millions,
}

impl AmountUnit {
    pub fn scale(self) -> f64 {
        match self {
            AmountUnit::Units => 1.0,
            AmountUnit::Millions => 1_000_000.0,
        }
    }
}

/// Parses an unscaled amount. Returns 0.0 for null, blank or unparsable input.
pub fn parse_amount(input: Option<&str>) -> f64 {
    let Some(raw) = input else {
        return 0.0;
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    // Accounting negatives: "(1,200)"
    let (negative, body) = match trimmed.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };

    let cleaned: String = body
        .chars()
        .filter(|c| !matches!(c, ',' | '$') && !c.is_whitespace())
        .collect();

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => {
            if negative {
                -value
            } else {
                value
            }
        }
        _ => 0.0,
    }
}

/// Amount parser bound to a storage unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountParser {
    scale: f64,
}

impl AmountParser {
    pub const UNITS: AmountParser = AmountParser { scale: 1.0 };
    pub const MILLIONS: AmountParser = AmountParser { scale: 1_000_000.0 };

    pub fn for_unit(unit: AmountUnit) -> Self {
        AmountParser { scale: unit.scale() }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn parse(&self, input: Option<&str>) -> f64 {
        parse_amount(input) * self.scale
    }

    /// Parses a raw column value, which may already be numeric.
    pub fn parse_raw(&self, input: Option<&RawAmount>) -> f64 {
        match input {
            None => 0.0,
            Some(RawAmount::Text(text)) => self.parse(Some(text)),
            Some(RawAmount::Number(n)) if n.is_finite() => n * self.scale,
            Some(RawAmount::Number(_)) => 0.0,
        }
    }
}

impl Default for AmountParser {
    fn default() -> Self {
        AmountParser::UNITS
    }
}
