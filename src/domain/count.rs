//! Loot count values and their scaling
//!
//! A `count` attribute is either a fixed amount (`"5"`) or an inclusive
//! range (`"30,40"`). Block counts are always fixed.

use std::fmt;
use std::str::FromStr;

use crate::domain::DomainError;

/// Separator between the bounds of a ranged count.
pub const RANGE_SEPARATOR: char = ',';

/// Kind of loot entry carrying a `count` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Item,
    Block,
}

impl ElementKind {
    /// Map an XML tag name to a loot entry kind.
    pub fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"item" => Some(Self::Item),
            b"block" => Some(Self::Block),
            _ => None,
        }
    }

    /// Whether this kind accepts `min,max` ranges.
    pub fn allows_range(self) -> bool {
        matches!(self, Self::Item)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Block => "block",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Factor applied to every count. Always finite; zero and negatives are allowed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Multiplier(f64);

impl Multiplier {
    pub fn new(value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() {
            return Err(DomainError::InvalidMultiplier {
                value: value.to_string(),
                reason: "must be a finite number".into(),
            });
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Multiply and truncate toward zero.
    ///
    /// Out-of-range products saturate at the `i64` bounds.
    pub fn apply(self, count: i64) -> i64 {
        (count as f64 * self.0).trunc() as i64
    }
}

impl FromStr for Multiplier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: f64 = trimmed
            .parse()
            .map_err(|e: std::num::ParseFloatError| DomainError::InvalidMultiplier {
                value: trimmed.to_string(),
                reason: e.to_string(),
            })?;
        Self::new(value).map_err(|_| DomainError::InvalidMultiplier {
            value: trimmed.to_string(),
            reason: "must be a finite number".into(),
        })
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Debug keeps the decimal point on whole numbers: 2.0, not 2.
        write!(f, "{:?}", self.0)
    }
}

/// Parsed value of a `count` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountValue {
    Scalar(i64),
    Range { min: i64, max: i64 },
}

impl CountValue {
    /// Parse a raw attribute value for the given element kind.
    ///
    /// Items accept `"n"` and `"min,max"`; blocks accept `"n"` only.
    pub fn parse(raw: &str, kind: ElementKind) -> Result<Self, DomainError> {
        let invalid = |reason: String| DomainError::InvalidCount {
            kind,
            value: raw.to_string(),
            reason,
        };

        if !raw.contains(RANGE_SEPARATOR) {
            return parse_component(raw).map(Self::Scalar).map_err(invalid);
        }
        if !kind.allows_range() {
            return Err(invalid(format!("{kind} counts cannot be ranges")));
        }

        let parts: Vec<&str> = raw.split(RANGE_SEPARATOR).collect();
        match parts.as_slice() {
            [min, max] => {
                let min = parse_component(min).map_err(&invalid)?;
                let max = parse_component(max).map_err(&invalid)?;
                Ok(Self::Range { min, max })
            }
            _ => Err(invalid(format!(
                "expected `min{RANGE_SEPARATOR}max`, found {} values",
                parts.len()
            ))),
        }
    }

    /// Scale every component by `multiplier`.
    pub fn scale(self, multiplier: Multiplier) -> Self {
        match self {
            Self::Scalar(n) => Self::Scalar(multiplier.apply(n)),
            Self::Range { min, max } => Self::Range {
                min: multiplier.apply(min),
                max: multiplier.apply(max),
            },
        }
    }
}

impl fmt::Display for CountValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(n) => write!(f, "{n}"),
            Self::Range { min, max } => write!(f, "{min}{RANGE_SEPARATOR}{max}"),
        }
    }
}

fn parse_component(s: &str) -> Result<i64, String> {
    s.trim()
        .parse::<i64>()
        .map_err(|e| format!("{:?} is not an integer ({e})", s.trim()))
}
