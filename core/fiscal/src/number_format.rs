//! FILENAME: core/fiscal/src/number_format.rs
//! PURPOSE: Currency formatting for rollup tables and chat context strings.
//! CONTEXT: Output is locale-independent: fixed "$" prefix, "." decimal
//! separator and "," thousands separator.

/// Compact tiers: (threshold, suffix, decimal places).
const COMPACT_TIERS: [(f64, &str, usize); 4] = [
    (1e12, "T", 1),
    (1e9, "B", 1),
    (1e6, "M", 1),
    (1e3, "K", 0),
];

/// Format an amount as an abbreviated currency string ($1.2B, $45.0M, $2K, $999).
pub fn format_compact(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0".to_string();
    }

    let abs_value = amount.abs();
    let body = COMPACT_TIERS
        .iter()
        .find(|(threshold, _, _)| abs_value >= *threshold)
        .map(|(threshold, suffix, places)| {
            format!("{:.prec$}{}", abs_value / threshold, suffix, prec = *places)
        })
        .unwrap_or_else(|| format!("{:.0}", abs_value));

    with_sign(amount, body)
}

/// Format an amount as whole dollars with thousands separators ($1,234,567).
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0".to_string();
    }
    let body = add_thousands_separator(&format!("{:.0}", amount.abs()));
    with_sign(amount, body)
}

/// Format a fraction (0.0..=1.0) as a one-decimal percentage.
pub fn format_percent(share: f64) -> String {
    if !share.is_finite() {
        return "0.0%".to_string();
    }
    format!("{:.1}%", share * 100.0)
}

fn with_sign(amount: f64, body: String) -> String {
    // "-$0" is never useful
    if amount < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-${}", body)
    } else {
        format!("${}", body)
    }
}

/// Add thousands separators to an unsigned numeric string.
fn add_thousands_separator(s: &str) -> String {
    let parts: Vec<&str> = s.split('.').collect();
    let integer_part = parts[0];
    let decimal_part = parts.get(1);

    let digits: String = integer_part.chars().filter(|c| c.is_ascii_digit()).collect();

    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    let len = digits.len();

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    if let Some(decimal) = decimal_part {
        result.push('.');
        result.push_str(decimal);
    }

    result
}
