//! Casting of loosely typed JSON input into domain scalars.
//!
//! Numbers arrive either as JSON numbers or as numeric strings; both are read
//! through their decimal text so that `12.345` stays `12.345` and never passes
//! through a binary float.

use core::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

/// Outcome of reading an optional numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Numeric {
    Missing,
    /// Present but not a number (the "NaN" case).
    Invalid,
    /// A well-formed number too large to represent.
    OutOfRange,
    Value(Decimal),
}

/// Outcome of reading an optional integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Integer {
    Missing,
    Invalid,
    OutOfRange,
    Fractional,
    Value(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Text<'a> {
    Missing,
    NotString,
    Value(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flag {
    Missing,
    Invalid,
    Value(bool),
}

pub(crate) fn decimal(value: Option<&Value>) -> Numeric {
    match value {
        None | Some(Value::Null) => Numeric::Missing,
        Some(Value::Number(n)) => parse_decimal(&n.to_string()),
        Some(Value::String(s)) => parse_decimal(s.trim()),
        Some(_) => Numeric::Invalid,
    }
}

fn parse_decimal(s: &str) -> Numeric {
    if s.is_empty() {
        return Numeric::Invalid;
    }
    if let Ok(d) = Decimal::from_str(s).or_else(|_| Decimal::from_scientific(s)) {
        return Numeric::Value(d);
    }

    // Well-formed literals outside `Decimal`'s range: huge magnitudes are
    // reported, magnitudes below its precision are zero at any cents scale.
    // `inf`/`nan` parse as f64 but carry no digit.
    match s.parse::<f64>() {
        Ok(f) if s.bytes().any(|b| b.is_ascii_digit()) => {
            if f.is_finite() && f.abs() < 1.0 {
                Numeric::Value(Decimal::ZERO)
            } else {
                Numeric::OutOfRange
            }
        }
        _ => Numeric::Invalid,
    }
}

pub(crate) fn integer(value: Option<&Value>) -> Integer {
    match decimal(value) {
        Numeric::Missing => Integer::Missing,
        Numeric::Invalid => Integer::Invalid,
        Numeric::OutOfRange => Integer::OutOfRange,
        Numeric::Value(d) if !d.fract().is_zero() => Integer::Fractional,
        Numeric::Value(d) => d.to_i64().map(Integer::Value).unwrap_or(Integer::OutOfRange),
    }
}

pub(crate) fn text(value: Option<&Value>) -> Text<'_> {
    match value {
        None | Some(Value::Null) => Text::Missing,
        Some(Value::String(s)) => Text::Value(s),
        Some(_) => Text::NotString,
    }
}

pub(crate) fn flag(value: Option<&Value>) -> Flag {
    match value {
        None | Some(Value::Null) => Flag::Missing,
        Some(Value::Bool(b)) => Flag::Value(*b),
        Some(Value::String(s)) => match s.trim() {
            "true" => Flag::Value(true),
            "false" => Flag::Value(false),
            _ => Flag::Invalid,
        },
        Some(_) => Flag::Invalid,
    }
}
