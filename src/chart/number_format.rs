//! Number formatting for tooltips
//!
//! Understands the subset of GoodData format strings the chart layer needs:
//! the first `;` section is used, `[...]` condition/color blocks are dropped,
//! `%` scales by 100, and the digit pattern (`#,##0.00`) decides grouping and
//! decimals. Text around the digit pattern is kept as prefix/suffix.

use crate::config::Separators;
use once_cell::sync::Lazy;
use regex::Regex;

/// Format used when a measure carries none
pub const DEFAULT_FORMAT: &str = "#,##0.00";

/// Rendered in place of a missing value
pub const EMPTY_VALUE: &str = "-";

static BRACKET_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]").expect("bracket regex is valid"));

static DIGIT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[#0,]*[#0](?:\.[#0]+)?").expect("digit regex is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
struct NumberPattern {
    prefix: String,
    suffix: String,
    grouping: bool,
    min_decimals: usize,
    max_decimals: usize,
    percent: bool,
}

impl NumberPattern {
    fn parse(format: &str) -> NumberPattern {
        let section = format.split(';').next().unwrap_or_default();
        let cleaned = BRACKET_BLOCK.replace_all(section, "").replace('"', "");
        let cleaned = if DIGIT_PATTERN.is_match(&cleaned) {
            cleaned
        } else {
            DEFAULT_FORMAT.to_string()
        };

        let (prefix, digits, suffix) = match DIGIT_PATTERN.find(&cleaned) {
            Some(m) => (
                &cleaned[..m.start()],
                m.as_str(),
                &cleaned[m.end()..],
            ),
            None => ("", DEFAULT_FORMAT, ""),
        };
        let (integer, fraction) = digits.split_once('.').unwrap_or((digits, ""));

        NumberPattern {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            grouping: integer.contains(','),
            min_decimals: fraction.chars().filter(|c| *c == '0').count(),
            max_decimals: fraction.len(),
            percent: cleaned.contains('%'),
        }
    }
}

/// Insert `separator` between groups of three digits
fn group_thousands(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(c);
    }
    out
}

fn format_digits(
    value: f64,
    min_decimals: usize,
    max_decimals: usize,
    grouping: bool,
    separators: &Separators,
) -> (bool, String) {
    let rounded = format!("{:.*}", max_decimals, value.abs());
    let (integer, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));

    let mut fraction = fraction.to_string();
    while fraction.len() > min_decimals && fraction.ends_with('0') {
        fraction.pop();
    }

    let negative = value < 0.0 && rounded.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut out = if grouping {
        group_thousands(integer, &separators.thousand)
    } else {
        integer.to_string()
    };
    if !fraction.is_empty() {
        out.push_str(&separators.decimal);
        out.push_str(&fraction);
    }
    (negative, out)
}

/// Format a value with a measure format string.
///
/// # Arguments
/// * `value` - Parsed value; `None` renders as `-`
/// * `format` - GoodData format string, e.g. `#,##0.00` or `#,##0.0%`
/// * `separators` - Thousands and decimal separators
pub fn format_value(value: Option<f64>, format: &str, separators: &Separators) -> String {
    let Some(value) = value else {
        return EMPTY_VALUE.to_string();
    };
    let pattern = NumberPattern::parse(format);
    let scaled = if pattern.percent { value * 100.0 } else { value };
    let (negative, digits) = format_digits(
        scaled,
        pattern.min_decimals,
        pattern.max_decimals,
        pattern.grouping,
        separators,
    );
    format!(
        "{}{}{}{}",
        if negative { "-" } else { "" },
        pattern.prefix,
        digits,
        pattern.suffix
    )
}

/// Percentage with at most two decimals, trailing zeros trimmed: `12.5%`
pub fn format_percent(value: f64, separators: &Separators) -> String {
    let (negative, digits) = format_digits(value, 0, 2, false, separators);
    format!("{}{}%", if negative { "-" } else { "" }, digits)
}
