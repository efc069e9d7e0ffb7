//! Machining context
//!
//! Tracks the unit and positioning mode in effect while a toolpath is being
//! described. Overrides are pushed by scope guards and popped when the guard
//! drops, so a scope always restores the previous mode on every exit path:
//! normal return, `?` propagation, or unwinding.

use crate::gcode;
use crate::program::Program;
use crate::units::{convert, Measure, Unit};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, DerefMut};
use tracing::trace;

/// Coordinate positioning mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Positioning {
    /// Coordinates are relative to the work origin
    #[default]
    Absolute,
    /// Coordinates are offsets from the current position
    Relative,
}

impl fmt::Display for Positioning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute => write!(f, "absolute"),
            Self::Relative => write!(f, "relative"),
        }
    }
}

/// Ambient unit and positioning mode
#[derive(Debug, Clone, Default)]
pub struct UnitContext {
    base_unit: Unit,
    base_positioning: Positioning,
    unit_overrides: Vec<Unit>,
    positioning_overrides: Vec<Positioning>,
}

impl UnitContext {
    pub fn new(unit: Unit, positioning: Positioning) -> Self {
        Self {
            base_unit: unit,
            base_positioning: positioning,
            ..Self::default()
        }
    }

    /// Current unit
    pub fn unit(&self) -> Unit {
        self.unit_overrides
            .last()
            .copied()
            .unwrap_or(self.base_unit)
    }

    /// Current positioning mode
    pub fn positioning(&self) -> Positioning {
        self.positioning_overrides
            .last()
            .copied()
            .unwrap_or(self.base_positioning)
    }

    /// Convert a measure to the current unit
    pub fn convert(&self, measure: impl Into<Measure>) -> f64 {
        convert(measure, self.unit())
    }

    /// Convert each measure to the current unit and hand the numbers to `body`
    pub fn with_conversions<M, R, const N: usize>(
        &self,
        measures: [M; N],
        body: impl FnOnce([f64; N]) -> R,
    ) -> R
    where
        M: Into<Measure>,
    {
        body(measures.map(|m| self.convert(m)))
    }

    /// Override the unit until the returned guard drops
    pub fn enter_unit(&mut self, unit: Unit) -> UnitScope<'_> {
        trace!(from = %self.unit(), to = %unit, "entering unit scope");
        self.unit_overrides.push(unit);
        UnitScope { ctx: self }
    }

    /// Override the positioning mode until the returned guard drops
    pub fn enter_positioning(&mut self, mode: Positioning) -> PositioningScope<'_> {
        trace!(from = %self.positioning(), to = %mode, "entering positioning scope");
        self.positioning_overrides.push(mode);
        PositioningScope { ctx: self }
    }

    /// Run `body` with `unit` in effect, bracketed by unit-mode instructions.
    ///
    /// Returns `[enter, body, restore]` as one program. The restore
    /// instruction selects whichever unit was in effect before the call.
    pub fn with_unit_scope<E>(
        &mut self,
        unit: Unit,
        body: impl FnOnce(&mut UnitContext) -> Result<Program, E>,
    ) -> Result<Program, E> {
        let previous = self.unit();
        let inner = {
            let mut scope = self.enter_unit(unit);
            body(&mut *scope)?
        };
        Ok(Program::new()
            .with(gcode::unit_mode(unit))
            .with(inner)
            .with(gcode::unit_mode(previous)))
    }

    /// Run `body` with `mode` in effect, bracketed by positioning instructions
    pub fn with_positioning_scope<E>(
        &mut self,
        mode: Positioning,
        body: impl FnOnce(&mut UnitContext) -> Result<Program, E>,
    ) -> Result<Program, E> {
        let previous = self.positioning();
        let inner = {
            let mut scope = self.enter_positioning(mode);
            body(&mut *scope)?
        };
        Ok(Program::new()
            .with(gcode::positioning_mode(mode))
            .with(inner)
            .with(gcode::positioning_mode(previous)))
    }
}

/// Guard returned by [`UnitContext::enter_unit`]
pub struct UnitScope<'a> {
    ctx: &'a mut UnitContext,
}

impl Deref for UnitScope<'_> {
    type Target = UnitContext;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl DerefMut for UnitScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl Drop for UnitScope<'_> {
    fn drop(&mut self) {
        self.ctx.unit_overrides.pop();
        trace!(restored = %self.ctx.unit(), "left unit scope");
    }
}

/// Guard returned by [`UnitContext::enter_positioning`]
pub struct PositioningScope<'a> {
    ctx: &'a mut UnitContext,
}

impl Deref for PositioningScope<'_> {
    type Target = UnitContext;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl DerefMut for PositioningScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl Drop for PositioningScope<'_> {
    fn drop(&mut self) {
        self.ctx.positioning_overrides.pop();
        trace!(restored = %self.ctx.positioning(), "left positioning scope");
    }
}
