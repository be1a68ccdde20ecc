//! Number rendering helpers used when writing CGATS text.
//!
//! Data rows are written with a fixed number of fractional digits per
//! `DATA` block (the widest precision seen while filling it), rounding half
//! away from zero so that `0.125` at two digits becomes `0.13` on every
//! platform.

use crate::Value;

/// Magnitude from which floats are written in scientific notation.
const SCIENTIFIC_THRESHOLD: f64 = 1e16;

/// Largest number of fractional digits that rounding can represent.
const MAX_DIGITS: usize = 15;

/// Rounds `value` to `digits` fractional digits, halves away from zero.
pub fn round_half_away(value: f64, digits: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(digits.min(MAX_DIGITS) as i32);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Renders a row cell.
///
/// Integers are written verbatim, floats rounded and padded to exactly
/// `digits` fractional digits, strings double-quoted. Floats too large, or
/// needing more digits than an `f64` rounds reliably, use scientific
/// notation.
pub fn rpad(value: &Value, digits: usize) -> String {
    match value {
        Value::Int(i) => i.to_string(),
        Value::Float(v) if !v.is_finite() => v.to_string(),
        Value::Float(v) if v.abs() >= SCIENTIFIC_THRESHOLD || digits > MAX_DIGITS => format!("{v:e}"),
        Value::Float(v) => format!("{:.*}", digits, round_half_away(*v, digits)),
        Value::Str(s) => quote(s),
    }
}

/// Cuts `text` to at most `width` characters.
pub fn rcut(text: &str, width: usize) -> &str {
    match text.char_indices().nth(width) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Renders a float so that it reads back as a float.
pub fn format_float(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }
    if v.abs() >= SCIENTIFIC_THRESHOLD {
        return format!("{v:e}");
    }
    let text = v.to_string();
    if text.contains('.') { text } else { format!("{text}.0") }
}

/// Renders a header value: numbers bare, everything else quoted.
pub fn format_scalar(value: &Value) -> String {
    match value {
        Value::Str(s) => quote(s),
        other => other.to_string(),
    }
}

fn quote(s: &str) -> String {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        s.to_string()
    } else {
        format!("\"{s}\"")
    }
}
