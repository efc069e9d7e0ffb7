//! # DadoKit Core
//!
//! Core types and utilities for DadoKit.
//! Provides unit-tagged quantities, the machining context (current unit and
//! positioning mode), the operation tree that CAM tools build, and the
//! compiler that renders that tree as G-code lines.

pub mod compiler;
pub mod context;
pub mod error;
pub mod gcode;
pub mod program;
pub mod units;

pub use compiler::{compile, compile_json, compile_to, render_instruction};
pub use context::{Positioning, PositioningScope, UnitContext, UnitScope};
pub use error::{CompileError, CompileResult, UnitError};
pub use program::{Arg, Instruction, Operation, Program};
pub use units::{convert, convert_named, format_number, Measure, Quantity, Unit};
