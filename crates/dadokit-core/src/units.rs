//! Unit conversion utilities
//!
//! Handles measured values in millimeters and inches, conversion between
//! them, and the numeric formatting used when rendering G-code words.

use crate::error::UnitError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Millimeters per inch
pub const MM_PER_INCH: f64 = 25.4;

/// Length unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Millimeters
    #[default]
    Millimeter,
    /// Inches
    Inch,
}

impl Unit {
    /// Short label ("mm" or "in")
    pub fn label(self) -> &'static str {
        match self {
            Self::Millimeter => "mm",
            Self::Inch => "in",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mm" | "millimeter" | "millimeters" => Ok(Self::Millimeter),
            "in" | "inch" | "inches" => Ok(Self::Inch),
            _ => Err(format!("Unknown unit: {}", s)),
        }
    }
}

/// A measured amount tagged with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub unit: Unit,
    pub amount: f64,
}

impl Quantity {
    pub const fn new(unit: Unit, amount: f64) -> Self {
        Self { unit, amount }
    }

    pub const fn mm(amount: f64) -> Self {
        Self::new(Unit::Millimeter, amount)
    }

    pub const fn inches(amount: f64) -> Self {
        Self::new(Unit::Inch, amount)
    }

    /// Amount expressed in `to`
    pub fn to_unit(self, to: Unit) -> f64 {
        match (self.unit, to) {
            (Unit::Millimeter, Unit::Millimeter) | (Unit::Inch, Unit::Inch) => self.amount,
            (Unit::Millimeter, Unit::Inch) => self.amount / MM_PER_INCH,
            (Unit::Inch, Unit::Millimeter) => self.amount * MM_PER_INCH,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit)
    }
}

/// A G-code word value: either a plain number or a unit-tagged quantity.
///
/// Plain numbers are taken to already be in whatever unit they are read in.
/// Feed rates and other unitless words rely on this.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measure {
    Number(f64),
    Quantity(Quantity),
}

impl From<f64> for Measure {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Measure {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<Quantity> for Measure {
    fn from(value: Quantity) -> Self {
        Self::Quantity(value)
    }
}

/// Convert a measure to `to`
pub fn convert(measure: impl Into<Measure>, to: Unit) -> f64 {
    match measure.into() {
        Measure::Number(value) => value,
        Measure::Quantity(q) => q.to_unit(to),
    }
}

/// Convert an amount whose unit is only known by name
///
/// * `unit` - Unit name as written by the user (e.g. "in", "mm")
/// * `amount` - Value in that unit
/// * `to` - Target unit
pub fn convert_named(unit: &str, amount: f64, to: Unit) -> Result<f64, UnitError> {
    let from = unit
        .parse::<Unit>()
        .map_err(|_| UnitError::UnrecognizedConversion {
            unit: unit.to_string(),
            amount,
            target: to,
        })?;
    Ok(Quantity::new(from, amount).to_unit(to))
}

/// Format a number as a G-code word value
///
/// Integral values are written without a decimal point, everything else with
/// exactly two decimals. Halves round away from zero on the shortest decimal
/// form of the value, so `3.005` becomes `3.01` and `0.125` becomes `0.13`.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        // -0.0 would otherwise print as "-0"
        return format!("{}", value as i64);
    }

    match Decimal::from_str(&value.to_string()) {
        Ok(decimal) => format!(
            "{:.2}",
            decimal.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        ),
        // Outside the decimal range
        Err(_) => format!("{:.2}", value),
    }
}
