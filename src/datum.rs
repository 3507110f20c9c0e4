//! Typed data parsed from the fragments that belong to a field.
//!
//! Every fragment consumed by a field is turned into exactly one [`Datum`].
//! Parsing tries, in order: unit, value, two-sided reference interval,
//! one-sided reference interval, and falls back to opaque text. Units are
//! checked first because the vocabulary contains numeric-looking entries such
//! as `1`.
//!
//! # Examples
//!
//! ```
//! use labtool::datum::{parse_datum, Comparator, Datum};
//!
//! assert_eq!(parse_datum("12.5"), Datum::value("12.5"));
//! assert_eq!(parse_datum("----"), Datum::Value { raw: None });
//! assert_eq!(parse_datum("[ 3.5 - 5.0 ]"), Datum::TwoSidedInterval { min: 3.5, max: 5.0 });
//! assert_eq!(
//!     parse_datum("[ < 200 ]"),
//!     Datum::OneSidedInterval { comparator: Comparator::Lt, limit: 200.0 }
//! );
//! ```

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::error::Error;
use crate::vocabulary::Vocabulary;

lazy_static! {
    /// Optional flag marker, optional sign, decimal number; anchored at the start only
    static ref RE_VALUE: Regex = Regex::new(r"^(?:\*\s+)?([<>]?\d+(?:\.\d+)?)").unwrap();

    /// `[ min - max ]`
    static ref RE_TWO_SIDED: Regex =
        Regex::new(r"^\[ (\d+(?:\.\d+)?) - (\d+(?:\.\d+)?) \]").unwrap();

    /// `[ <cmp> limit ]`
    static ref RE_ONE_SIDED: Regex = Regex::new(r"^\[ ([<>≤≥]) (\d+(?:\.\d+)?) \]").unwrap();

    /// `Valor desitjable <cmp> limit` and `Concentracio desitjable <cmp> limit`
    static ref RE_DESIRABLE: Regex =
        Regex::new(r"^(?:Valor|Concentracio) desitjable ([<>≤≥]) (\d+(?:\.\d+)?)").unwrap();
}

/// Contents reported by the instrument when no reading is available yet.
pub const UNAVAILABLE_SENTINELS: &[&str] = &["Pendent", "----"];

/// Relational sign of a one-sided reference interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    /// `<`
    Lt,
    /// `≤`
    Le,
    /// `>`
    Gt,
    /// `≥`
    Ge,
}

impl Comparator {
    /// The sign as printed on the report.
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Lt => "<",
            Comparator::Le => "≤",
            Comparator::Gt => ">",
            Comparator::Ge => "≥",
        }
    }

    /// Encoding key for a reference bound with this sign.
    pub fn encode_key(&self) -> &'static str {
        match self {
            Comparator::Lt => "refvalue.lt",
            Comparator::Le => "refvalue.le",
            Comparator::Gt => "refvalue.gt",
            Comparator::Ge => "refvalue.ge",
        }
    }
}

impl FromStr for Comparator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "<" => Ok(Comparator::Lt),
            "≤" => Ok(Comparator::Le),
            ">" => Ok(Comparator::Gt),
            "≥" => Ok(Comparator::Ge),
            other => Err(Error::UnknownComparator(other.to_string())),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One typed piece of data attached to a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    /// Numeric reading kept verbatim, or `None` for a pending placeholder
    Value {
        /// The numeric token as printed (sign and decimals preserved)
        raw: Option<String>,
    },
    /// Unit from the closed unit vocabulary
    Unit {
        /// Unit string as printed
        symbol: String,
    },
    /// Reference range `[min, max)`
    TwoSidedInterval {
        /// Inclusive lower bound
        min: f64,
        /// Exclusive upper bound
        max: f64,
    },
    /// Reference bound with a single relational sign
    OneSidedInterval {
        /// Relational sign
        comparator: Comparator,
        /// Bound value
        limit: f64,
    },
    /// Anything else; carried along but never encoded
    Text {
        /// Normalized fragment text
        content: String,
    },
}

/// A scalar produced by encoding a datum.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EncodedValue {
    /// Verbatim text; `None` for a pending reading
    Text(Option<String>),
    /// Numeric reference bound
    Number(f64),
}

impl Datum {
    /// Shorthand for a present value.
    pub fn value(raw: impl Into<String>) -> Self {
        Datum::Value {
            raw: Some(raw.into()),
        }
    }

    /// Shorthand for a unit.
    pub fn unit(symbol: impl Into<String>) -> Self {
        Datum::Unit {
            symbol: symbol.into(),
        }
    }

    /// Shorthand for opaque text.
    pub fn text(content: impl Into<String>) -> Self {
        Datum::Text {
            content: content.into(),
        }
    }

    /// Whether this datum is a `Value`, the item that closes a reading.
    pub fn is_value(&self) -> bool {
        matches!(self, Datum::Value { .. })
    }

    /// Whether this datum is a `Unit`.
    pub fn is_unit(&self) -> bool {
        matches!(self, Datum::Unit { .. })
    }

    /// Key/value pairs this datum contributes to an encoded field.
    ///
    /// `Text` contributes nothing.
    pub fn encode(&self) -> Vec<(&'static str, EncodedValue)> {
        match self {
            Datum::Value { raw } => vec![("value", EncodedValue::Text(raw.clone()))],
            Datum::Unit { symbol } => vec![("unit", EncodedValue::Text(Some(symbol.clone())))],
            Datum::TwoSidedInterval { min, max } => vec![
                ("refvalue.ge", EncodedValue::Number(*min)),
                ("refvalue.lt", EncodedValue::Number(*max)),
            ],
            Datum::OneSidedInterval { comparator, limit } => {
                vec![(comparator.encode_key(), EncodedValue::Number(*limit))]
            },
            Datum::Text { .. } => Vec::new(),
        }
    }
}

/// Parse a normalized fragment using the built-in unit vocabulary.
pub fn parse_datum(content: &str) -> Datum {
    parse_datum_with(content, Vocabulary::builtin())
}

/// Parse a normalized fragment, first match wins.
pub fn parse_datum_with(content: &str, vocabulary: &Vocabulary) -> Datum {
    if vocabulary.is_unit(content) {
        return Datum::unit(content);
    }

    if let Some(datum) = try_parse_value(content) {
        return datum;
    }

    if let Some(datum) = try_parse_reference(content) {
        return datum;
    }

    Datum::text(content)
}

fn try_parse_value(content: &str) -> Option<Datum> {
    if let Some(caps) = RE_VALUE.captures(content) {
        return Some(Datum::value(&caps[1]));
    }

    if UNAVAILABLE_SENTINELS.contains(&content) {
        return Some(Datum::Value { raw: None });
    }

    None
}

fn try_parse_reference(content: &str) -> Option<Datum> {
    if let Some(caps) = RE_TWO_SIDED.captures(content) {
        let min = parse_bound(&caps[1])?;
        let max = parse_bound(&caps[2])?;
        return Some(Datum::TwoSidedInterval { min, max });
    }

    let caps = RE_ONE_SIDED
        .captures(content)
        .or_else(|| RE_DESIRABLE.captures(content))?;

    // The regex alternation only admits the four known signs
    let comparator = match caps[1].parse::<Comparator>() {
        Ok(comparator) => comparator,
        Err(e) => unreachable!("{}", e),
    };
    let limit = parse_bound(&caps[2])?;
    Some(Datum::OneSidedInterval { comparator, limit })
}

fn parse_bound(token: &str) -> Option<f64> {
    token.parse::<f64>().ok()
}
