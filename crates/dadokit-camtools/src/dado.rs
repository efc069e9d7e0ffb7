//! Dado toolpath generator
//!
//! Produces the full job for cutting a straight dado: zero the work
//! coordinates, probe Z against a touch plate, prompt the operator through
//! setup, then clear the dado in stepped-depth passes.

use crate::error::{CamToolError, CamToolResult, ParameterError};
use dadokit_core::gcode::{linear, probe_z, prompt, rapid, set_position, wait_for_moves};
use dadokit_core::{Operation, Positioning, Program, Quantity, Unit, UnitContext};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Feed rate for the retract after probing (mm/min)
pub const RETRACT_FEED: f64 = 300.0;
/// Z travel for the probe move, below the current position (mm)
pub const PROBE_TRAVEL: f64 = -25.0;
/// Feed rate for the probe move (mm/min)
pub const PROBE_FEED: f64 = 100.0;

/// Upper bound on stepped passes for one dado
pub const MAX_PASSES: usize = 10_000;

/// Depths within this distance of the dado width count as full depth
const DEPTH_EPSILON: f64 = 1e-9;

/// Parameters for the Dado CAMTool
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DadoParameters {
    /// Thickness of the Z touch plate
    pub plate_thickness: Quantity,
    /// Height to retract to after probing
    pub retract_height: Quantity,
    /// Thickness of the mating stock; the dado is half of it
    pub stock_thickness: Quantity,
    /// Diameter of the cutter
    pub cutter_diameter: Quantity,
    /// X offset of the joint from the work origin
    pub work_offset_x: Quantity,
    /// Length of each cutting pass along Y
    pub pass_length: Quantity,
}

impl Default for DadoParameters {
    fn default() -> Self {
        Self {
            plate_thickness: Quantity::mm(4.2),
            retract_height: Quantity::mm(5.0),
            stock_thickness: Quantity::inches(0.5),
            cutter_diameter: Quantity::inches(0.125),
            work_offset_x: Quantity::mm(20.0),
            pass_length: Quantity::inches(6.0),
        }
    }
}

impl DadoParameters {
    pub fn validate(&self) -> Result<(), ParameterError> {
        let positive = [
            ("cutter_diameter", self.cutter_diameter),
            ("stock_thickness", self.stock_thickness),
        ];
        for (name, q) in positive {
            if !q.amount.is_finite() || q.amount <= 0.0 {
                return Err(ParameterError::invalid(
                    name,
                    format!("must be greater than zero, got {}", q),
                ));
            }
        }
        let finite = [
            ("plate_thickness", self.plate_thickness),
            ("retract_height", self.retract_height),
            ("work_offset_x", self.work_offset_x),
            ("pass_length", self.pass_length),
        ];
        for (name, q) in finite {
            if !q.amount.is_finite() {
                return Err(ParameterError::invalid(name, "must be a finite number"));
            }
        }
        let dado_width = self.stock_thickness.to_unit(Unit::Millimeter) / 2.0;
        let bit_radius = self.cutter_diameter.to_unit(Unit::Millimeter) / 2.0;
        if dado_width / bit_radius > MAX_PASSES as f64 {
            return Err(ParameterError::invalid(
                "cutter_diameter",
                format!("too small for the stock, needs more than {} passes", MAX_PASSES),
            ));
        }
        Ok(())
    }
}

/// Cut geometry derived from [`DadoParameters`], in the context's unit
#[derive(Debug, Clone, PartialEq)]
pub struct DadoPlan {
    pub plate_thickness: f64,
    pub retract_height: f64,
    pub pass_length: f64,
    pub bit_radius: f64,
    /// Half the stock thickness
    pub dado_width: f64,
    pub pass_offset: f64,
    /// X of the first side of each pass
    pub x1: f64,
    /// X of the return side of each pass
    pub x2: f64,
    /// Positive pass depths, shallowest first
    pub depths: Vec<f64>,
}

impl DadoPlan {
    fn compute(params: &DadoParameters, ctx: &UnitContext) -> Self {
        let p = params;
        ctx.with_conversions(
            [
                p.plate_thickness,
                p.retract_height,
                p.stock_thickness,
                p.cutter_diameter,
                p.work_offset_x,
                p.pass_length,
            ],
            |[plate, retract, stock, cutter, offset_x, pass_length]| {
                let bit_radius = cutter / 2.0;
                let dado_width = stock / 2.0;
                let pass_offset = dado_width - cutter;
                let x1 = offset_x - bit_radius + stock;
                Self {
                    plate_thickness: plate,
                    retract_height: retract,
                    pass_length,
                    bit_radius,
                    dado_width,
                    pass_offset,
                    x1,
                    x2: x1 - pass_offset,
                    depths: pass_depths(bit_radius, dado_width),
                }
            },
        )
    }
}

/// Multiples of `step` up to and including the first that reaches `limit`
fn pass_depths(step: f64, limit: f64) -> Vec<f64> {
    let mut depths = Vec::new();
    for k in 1u32.. {
        let depth = f64::from(k) * step;
        depths.push(depth);
        if depth >= limit - DEPTH_EPSILON {
            break;
        }
    }
    depths
}

/// Generator for dado G-Code
pub struct DadoGenerator {
    params: DadoParameters,
}

impl DadoGenerator {
    /// Create a new DadoGenerator with the given parameters
    pub fn new(params: DadoParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DadoParameters {
        &self.params
    }

    /// Validate the parameters and work out the cut geometry
    pub fn plan(&self, ctx: &UnitContext) -> CamToolResult<DadoPlan> {
        self.params.validate()?;
        Ok(DadoPlan::compute(&self.params, ctx))
    }

    /// Generate the dado job in the default context (millimeters, absolute)
    pub fn generate(&self) -> CamToolResult<Program> {
        self.generate_in(&mut UnitContext::default())
    }

    /// Generate the dado job, normalising parameters to `ctx`'s current unit
    pub fn generate_in(&self, ctx: &mut UnitContext) -> CamToolResult<Program> {
        let plan = self.plan(ctx)?;
        info!(
            passes = plan.depths.len(),
            dado_width = plan.dado_width,
            bit_radius = plan.bit_radius,
            unit = %ctx.unit(),
            "generating dado toolpath"
        );

        let cut = ctx.with_positioning_scope(Positioning::Absolute, |ctx| {
            ctx.with_unit_scope(Unit::Millimeter, |_| {
                Ok::<_, CamToolError>(cut_sequence(&plan))
            })
        })?;

        Ok(Program::new().with(cut).with(prompt("Stop Spindle")))
    }
}

/// Generate the dado job for `params` in `ctx`
pub fn generate_dado_path(
    params: &DadoParameters,
    ctx: &mut UnitContext,
) -> CamToolResult<Program> {
    DadoGenerator::new(*params).generate_in(ctx)
}

fn cut_sequence(plan: &DadoPlan) -> Program {
    let probe = Program::new()
        .with(prompt("Attach ZProbe - Top"))
        .with(probe_z(PROBE_TRAVEL, PROBE_FEED))
        .with(set_position([("Z", plan.plate_thickness)]))
        .with(rapid([("Z", plan.retract_height), ("F", RETRACT_FEED)]))
        .with(wait_for_moves())
        .with(prompt("Detach ZProbe"));

    let setup = Program::new()
        .with(prompt("Position Part for Dado"))
        .with(prompt("Start Spindle"));

    let passes = plan
        .depths
        .iter()
        .enumerate()
        .map(|(i, depth)| {
            debug!(pass = i + 1, depth, x1 = plan.x1, x2 = plan.x2, "dado pass");
            Operation::from(dado_pass(plan, -depth))
        })
        .collect::<Program>();

    Program::new()
        .with(set_position([("X", 0.0), ("Y", 0.0)]))
        .with(probe)
        .with(setup)
        .with(passes)
}

fn dado_pass(plan: &DadoPlan, z: f64) -> Program {
    Program::new()
        .with(rapid([("X", plan.x1), ("Y", 0.0)]))
        .with(rapid([("Z", z)]))
        .with(linear([("X", plan.x1), ("Y", plan.pass_length)]))
        .with(linear([("X", plan.x2), ("Y", plan.pass_length)]))
        .with(linear([("X", plan.x2), ("Y", 0.0)]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_pass_depths_reach_width() {
        let depths = pass_depths(1.5875, 6.35);
        assert_eq!(depths.len(), 4);
        assert!(close(depths[3], 6.35));
    }

    #[test]
    fn test_pass_depths_overshoot_to_first_reaching_value() {
        let depths = pass_depths(1.5, 4.0);
        assert_eq!(depths, vec![1.5, 3.0, 4.5]);
    }

    #[test]
    fn test_single_pass_when_radius_exceeds_width() {
        assert_eq!(pass_depths(3.0, 2.0), vec![3.0]);
        assert_eq!(pass_depths(2.0, 2.0), vec![2.0]);
    }

    #[test]
    fn test_plan_for_default_job() {
        let generator = DadoGenerator::new(DadoParameters::default());
        let plan = generator.plan(&UnitContext::default()).unwrap();

        assert!(close(plan.bit_radius, 1.5875));
        assert!(close(plan.dado_width, 6.35));
        assert!(close(plan.pass_offset, 3.175));
        assert!(close(plan.x1, 31.1125));
        assert!(close(plan.x2, 27.9375));
        assert!(close(plan.pass_length, 152.4));
        assert_eq!(plan.depths.len(), 4);
    }

    #[test]
    fn test_plan_in_inches() {
        let ctx = UnitContext::new(Unit::Inch, Positioning::Absolute);
        let plan = DadoGenerator::new(DadoParameters::default())
            .plan(&ctx)
            .unwrap();
        assert!(close(plan.bit_radius, 0.0625));
        assert!(close(plan.dado_width, 0.25));
        assert_eq!(plan.depths.len(), 4);
    }

    #[test]
    fn test_wide_cutter_gives_negative_offset() {
        let params = DadoParameters {
            cutter_diameter: Quantity::inches(0.5),
            ..DadoParameters::default()
        };
        let plan = DadoGenerator::new(params)
            .plan(&UnitContext::default())
            .unwrap();
        assert!(plan.pass_offset < 0.0);
        assert!(plan.x2 > plan.x1);
        assert_eq!(plan.depths.len(), 1);
    }

    #[test]
    fn test_rejects_non_positive_cutter() {
        let params = DadoParameters {
            cutter_diameter: Quantity::mm(0.0),
            ..DadoParameters::default()
        };
        let err = DadoGenerator::new(params).generate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parameter error: Invalid value for 'cutter_diameter': must be greater than zero, got 0mm"
        );
    }

    #[test]
    fn test_rejects_pass_explosion() {
        let params = DadoParameters {
            cutter_diameter: Quantity::mm(1e-6),
            ..DadoParameters::default()
        };
        assert!(DadoGenerator::new(params).generate().is_err());
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let params = DadoParameters {
            pass_length: Quantity::mm(f64::NAN),
            ..DadoParameters::default()
        };
        assert!(DadoGenerator::new(params).generate().is_err());
    }
}
