//! Value normalizers (C1): locale-tolerant amount parsing, multi-format date
//! parsing, and reference/account canonicalization.

use chrono::NaiveDate;

const DATE_FORMATS: &[&str] = &[
    "%d/%m/%Y",
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%d/%m/%y",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%Y.%m.%d",
    "%d %m %Y",
    "%Y %m %d",
];

/// Parse an amount that may arrive as JSON number, string, or nothing, under
/// the FR/EN comma-vs-period heuristic from the spec: strip anything outside
/// `[0-9.,-]`, then if both separators are present the rightmost one is the
/// decimal point; if only a comma is present it is the decimal point iff its
/// right-hand segment has 1-2 digits.
pub fn parse_amount(raw: &serde_json::Value) -> f64 {
    match raw {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => parse_amount_str(s),
        _ => 0.0,
    }
}

pub fn parse_amount_str(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") {
        return 0.0;
    }

    let negative = trimmed.starts_with('-');
    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',' || *c == '-')
        .collect();
    let body: String = cleaned.chars().filter(|c| *c != '-').collect();

    let last_comma = body.rfind(',');
    let last_dot = body.rfind('.');

    let normalized = match (last_comma, last_dot) {
        (Some(ci), Some(di)) => {
            if di > ci {
                // '.' is decimal; ',' are grouping separators
                body.replace(',', "")
            } else {
                // ',' is decimal; '.' are grouping separators
                let mut s = body.replace('.', "");
                if let Some(pos) = s.rfind(',') {
                    s.replace_range(pos..pos + 1, ".");
                }
                s
            }
        }
        (Some(ci), None) => {
            let right_len = body.len() - ci - 1;
            if (1..=2).contains(&right_len) {
                let mut s = body.clone();
                s.replace_range(ci..ci + 1, ".");
                s
            } else {
                body.replace(',', "")
            }
        }
        (None, Some(_)) => body,
        (None, None) => body,
    };

    let magnitude: f64 = normalized.parse().unwrap_or(0.0);
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// Try each of the nine accepted wire formats in order; first success wins.
/// Returns the canonical ISO `YYYY-MM-DD` form, or `None` if unparsable.
pub fn parse_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
        // %y (two-digit year) pivots at 1969/2068 per chrono's default rule.
    }
    None
}

/// Render a canonical ISO date back to the GL wire format `DD/MM/YYYY`.
pub fn to_wire_date(iso: &str) -> Option<String> {
    let date = NaiveDate::parse_from_str(iso, "%Y-%m-%d").ok()?;
    Some(date.format("%d/%m/%Y").to_string())
}

/// Parse a GL wire-format date (`DD/MM/YYYY`) straight to ISO, used by
/// round-trip tests and by callers who know they hold wire-format input.
pub fn from_wire_date(wire: &str) -> Option<String> {
    let date = NaiveDate::parse_from_str(wire.trim(), "%d/%m/%Y").ok()?;
    Some(date.format("%Y-%m-%d").to_string())
}

pub fn canonicalize_account(raw: &str) -> String {
    raw.trim().to_string()
}

/// Uppercase a reference token. Applied by callers that opt in; the core
/// never forces casing on references it did not mint itself (see Open
/// Questions in the design notes).
pub fn canonicalize_ref(raw: &str) -> String {
    raw.trim().to_uppercase()
}
