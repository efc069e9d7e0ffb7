//! Marlin-style instruction builders
//!
//! Small constructors for the G/M codes the CAM tools emit, so generators
//! read as a sequence of machine actions rather than raw mnemonics.

use crate::context::Positioning;
use crate::program::Instruction;
use crate::units::{Measure, Unit};

/// Instruction that selects a unit mode.
///
/// Millimeters map to `G28` and inches to `G20`. The millimeter mapping is
/// kept as emitted by the existing job files.
pub fn unit_mode(unit: Unit) -> Instruction {
    match unit {
        Unit::Millimeter => Instruction::new("g28"),
        Unit::Inch => Instruction::new("g20"),
    }
}

/// Instruction that selects a positioning mode (`G90`/`G91`)
pub fn positioning_mode(mode: Positioning) -> Instruction {
    match mode {
        Positioning::Absolute => Instruction::new("g90"),
        Positioning::Relative => Instruction::new("g91"),
    }
}

/// `G0` rapid move through the given axis words
pub fn rapid<K, V>(words: impl IntoIterator<Item = (K, V)>) -> Instruction
where
    K: Into<String>,
    V: Into<Measure>,
{
    with_words(Instruction::new("g0"), words)
}

/// `G1` linear cut through the given axis words
pub fn linear<K, V>(words: impl IntoIterator<Item = (K, V)>) -> Instruction
where
    K: Into<String>,
    V: Into<Measure>,
{
    with_words(Instruction::new("g1"), words)
}

/// `G92` set the current position without moving
pub fn set_position<K, V>(words: impl IntoIterator<Item = (K, V)>) -> Instruction
where
    K: Into<String>,
    V: Into<Measure>,
{
    with_words(Instruction::new("g92"), words)
}

/// `G38.2` probe toward the workpiece along Z
pub fn probe_z(target: impl Into<Measure>, feed: impl Into<Measure>) -> Instruction {
    Instruction::new("g38.2").param("Z", target).param("F", feed)
}

/// `M400` wait for queued moves to finish
pub fn wait_for_moves() -> Instruction {
    Instruction::new("m400")
}

/// `M0` pause with an operator message
pub fn prompt(message: impl Into<String>) -> Instruction {
    Instruction::new("m0").text(message)
}

fn with_words<K, V>(instruction: Instruction, words: impl IntoIterator<Item = (K, V)>) -> Instruction
where
    K: Into<String>,
    V: Into<Measure>,
{
    words
        .into_iter()
        .fold(instruction, |instruction, (key, value)| instruction.param(key, value))
}
