//! Best-effort conversion of listing strings to numbers.

use regex::Regex;
use std::sync::OnceLock;

/// Trailing qualifiers Dutch and Spanish listings attach to prices.
fn qualifier_suffix() -> &'static Regex {
    static SUFFIX: OnceLock<Regex> = OnceLock::new();
    SUFFIX.get_or_init(|| {
        Regex::new(r"(?i)\s*(k\.k\.|v\.o\.n\.|/mes|/maand|per maand)\s*$").expect("static regex")
    })
}

/// Digit groups of three, e.g. `425.000` or `1,250,000`.
fn grouped_thousands() -> &'static Regex {
    static GROUPED: OnceLock<Regex> = OnceLock::new();
    GROUPED.get_or_init(|| Regex::new(r"^-?\d{1,3}([.,])\d{3}(?:[.,]\d{3})*$").expect("static regex"))
}

/// Drop qualifiers, currency symbols, units and whitespace. `None` if
/// anything but digits, separators and a sign remains.
fn clean(raw: &str) -> Option<String> {
    let without_suffix = qualifier_suffix().replace(raw.trim(), "");

    let mut cleaned = without_suffix
        .replace("m²", "")
        .replace("m2", "")
        .replace(['€', '$', '£'], "")
        .replace("EUR", "")
        .replace("kr", "");
    cleaned.retain(|c| !c.is_whitespace());

    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',' || c == '-') {
        return None;
    }
    Some(cleaned)
}

fn parse_cleaned(cleaned: String) -> Option<f64> {
    let dots = cleaned.matches('.').count();
    let commas = cleaned.matches(',').count();
    let normalized = match (dots, commas) {
        (0, 0) => cleaned,
        (_, c) if dots > 0 && c > 0 => cleaned.replace('.', "").replace(',', "."),
        (0, 1) => cleaned.replace(',', "."),
        (0, _) => cleaned.replace(',', ""),
        (1, 0) => cleaned,
        _ => cleaned.replace('.', ""),
    };

    normalized.parse::<f64>().ok()
}

/// Strip currency symbols, unit suffixes and separators, then parse.
///
/// Separator handling:
/// - both `.` and `,` present: `.` groups thousands, `,` is the decimal mark
/// - only `,`: decimal mark, unless it appears more than once
/// - only `.`: parsed as-is, unless it appears more than once
///
/// Returns `None` when nothing numeric remains.
pub fn to_number(raw: &str) -> Option<f64> {
    parse_cleaned(clean(raw)?)
}

/// Like [`to_number`], for monetary amounts: a lone separator followed by
/// exactly three digits groups thousands, so `"€ 425.000 k.k."` is 425000.
pub fn to_amount(raw: &str) -> Option<f64> {
    let cleaned = clean(raw)?;
    if let Some(caps) = grouped_thousands().captures(&cleaned) {
        let sep = caps.get(1).map_or('.', |m| if m.as_str() == "," { ',' } else { '.' });
        // Mixed separators ("1.234,567") are not a plain grouping.
        let other = if sep == '.' { ',' } else { '.' };
        if !cleaned.contains(other) {
            return cleaned.replace(sep, "").parse::<f64>().ok();
        }
    }
    parse_cleaned(cleaned)
}

/// [`to_amount`] truncated to an integer.
pub fn to_integer(raw: &str) -> Option<i64> {
    to_amount(raw).map(|n| n.trunc() as i64)
}
