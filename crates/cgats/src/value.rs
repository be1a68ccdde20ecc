//! Scalar values and keys stored in a CGATS tree.
//!
//! Every scalar is classified exactly once, when it enters the tree, by the
//! numeric literal rule of the format:
//!
//! ```text
//! 42        -> Int
//! 0.5 1e-3  -> Float
//! "A1" -1   -> Str   (no sign in the literal rule)
//! ```
//!
//! Data columns are stricter (see [`crate::Cgats::add_data`]); this module
//! only provides the shared building blocks.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// Unsigned integer or decimal numeral with optional exponent.
fn numeric_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$").expect("numeric pattern compiles")
    })
}

/// Returns `true` if `text` is a numeral under the format's literal rule.
pub fn is_numeral(text: &str) -> bool {
    numeric_pattern().is_match(text)
}

/// Fractional digits needed to write a numeral in fixed point.
///
/// The exponent shifts the mantissa digits: `"1.25e-4"` needs 6,
/// `"1.5e2"` needs none.
pub fn decimals(text: &str) -> usize {
    let (mantissa, exponent) = match text.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i64>().unwrap_or(0)),
        None => (text, 0),
    };
    let fraction = match mantissa.split_once('.') {
        Some((_, frac)) => frac.chars().take_while(char::is_ascii_digit).count() as i64,
        None => 0,
    };
    (fraction - exponent).max(0) as usize
}

/// A scalar cell or header value.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Integral numeral.
    Int(i64),
    /// Numeral with a fractional part or exponent.
    Float(f64),
    /// Anything else.
    Str(String),
}

impl Value {
    /// Classifies raw text: numerals become `Int`/`Float`, the rest `Str`.
    pub fn coerce(text: &str) -> Self {
        if is_numeral(text) {
            if text.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(i) = text.parse::<i64>() {
                    return Value::Int(i);
                }
            }
            if let Ok(f) = text.parse::<f64>() {
                return Value::Float(f);
            }
        }
        Value::Str(text.to_string())
    }

    /// Returns `true` for `Int` and `Float`.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Numeric view of the value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Str(_) => None,
        }
    }

    /// Integer view of the value (`Float` only when integral).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// String view of the value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Fractional digits this value carries when written out.
    pub(crate) fn precision(&self) -> usize {
        match self {
            Value::Int(_) => 0,
            Value::Float(f) => decimals(&f.to_string()),
            Value::Str(s) => decimals(s),
        }
    }
}

/// Numbers compare by magnitude across `Int`/`Float`, so `Int(100) == Float(100.0)`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(_), _) | (_, Value::Str(_)) => false,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => f.write_str(&crate::format::format_float(*v)),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

/// Key of a slot: a position in indexed nodes, a name in documents and samples.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Key {
    /// Position in `ROOT`, `SECTION`, `DATA_FORMAT`, `DATA` or `KEYWORDS`.
    Index(usize),
    /// Name in a document or sample.
    Name(String),
}

impl Key {
    /// Name view of the key.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Key::Name(n) => Some(n),
            Key::Index(_) => None,
        }
    }

    /// Index view of the key.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(i) => Some(*i),
            Key::Name(_) => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{i}"),
            Key::Name(n) => f.write_str(n),
        }
    }
}

impl From<usize> for Key {
    fn from(v: usize) -> Self {
        Key::Index(v)
    }
}

impl From<&str> for Key {
    fn from(v: &str) -> Self {
        Key::Name(v.to_string())
    }
}

impl From<String> for Key {
    fn from(v: String) -> Self {
        Key::Name(v)
    }
}

impl From<&String> for Key {
    fn from(v: &String) -> Self {
        Key::Name(v.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_numerals() {
        assert_eq!(Value::coerce("42"), Value::Int(42));
        assert!(matches!(Value::coerce("42"), Value::Int(_)));
        assert!(matches!(Value::coerce("0.5"), Value::Float(_)));
        assert!(matches!(Value::coerce(".5"), Value::Float(_)));
        assert!(matches!(Value::coerce("1e-3"), Value::Float(_)));
        assert!(matches!(Value::coerce("2.5E+2"), Value::Float(_)));
    }

    #[test]
    fn coerce_keeps_text() {
        assert_eq!(Value::coerce("A1"), Value::Str("A1".into()));
        assert_eq!(Value::coerce("-1"), Value::Str("-1".into()));
        assert_eq!(Value::coerce(""), Value::Str(String::new()));
        assert_eq!(Value::coerce("1.2.3"), Value::Str("1.2.3".into()));
    }

    #[test]
    fn huge_integer_falls_back_to_float() {
        assert!(matches!(Value::coerce("99999999999999999999"), Value::Float(_)));
    }

    #[test]
    fn numbers_compare_across_types() {
        assert_eq!(Value::Int(100), Value::Float(100.0));
        assert_ne!(Value::Int(1), Value::Str("1".into()));
        assert_ne!(Value::Float(0.5), Value::Float(0.25));
    }

    #[test]
    fn decimal_counting() {
        assert_eq!(decimals("100"), 0);
        assert_eq!(decimals("100.0"), 1);
        assert_eq!(decimals("0.12345"), 5);
        assert_eq!(decimals("1.25e-4"), 6);
        assert_eq!(decimals("1.5e2"), 0);
        assert_eq!(decimals("1.2345E+2"), 2);
        assert_eq!(decimals("5e-3"), 3);
        assert_eq!(Value::Float(0.125).precision(), 3);
    }

    #[test]
    fn display_keeps_float_type_visible() {
        assert_eq!(Value::Float(100.0).to_string(), "100.0");
        assert_eq!(Value::Int(100).to_string(), "100");
        assert_eq!(Value::from("x").to_string(), "x");
    }
}
