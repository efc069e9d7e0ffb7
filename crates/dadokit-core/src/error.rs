//! Error handling for DadoKit core
//!
//! Provides the error types raised while converting units and while
//! compiling an operation tree to G-code:
//! - Unit errors (conversion between unrecognised units)
//! - Compile errors (unrenderable operands, output failures)
//!
//! All error types use `thiserror` for ergonomic error handling.

use crate::units::Unit;
use std::io;
use thiserror::Error;

/// Unit conversion error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitError {
    /// The source unit is not one this crate can convert from
    #[error("Unrecognized conversion of {amount} {unit} to {target}")]
    UnrecognizedConversion {
        /// The unit name as supplied.
        unit: String,
        /// The amount that was being converted.
        amount: f64,
        /// The requested target unit.
        target: Unit,
    },
}

/// G-code compile error type
#[derive(Error, Debug)]
pub enum CompileError {
    /// An instruction argument is not a token, text, or parameter map
    #[error("Unknown operand: {operand}")]
    UnknownOperand {
        /// The offending value, rendered for diagnostics.
        operand: String,
    },

    /// Writing a rendered line failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CompileError {
    /// Create an unknown-operand error from anything printable
    pub fn unknown_operand(operand: impl ToString) -> Self {
        Self::UnknownOperand {
            operand: operand.to_string(),
        }
    }
}

/// Result type alias for compile operations.
pub type CompileResult<T> = Result<T, CompileError>;
