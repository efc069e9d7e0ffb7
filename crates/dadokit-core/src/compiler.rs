//! G-code compiler
//!
//! Flattens an operation tree and renders each instruction as one line of
//! text: the uppercased mnemonic followed by its space-separated arguments.

use crate::context::UnitContext;
use crate::error::CompileResult;
use crate::program::{Arg, Instruction, Operation, Program};
use crate::units::{format_number, Measure};
use serde_json::Value;
use std::io::Write;
use tracing::debug;

/// Compile a program to G-code lines
pub fn compile(program: &Program, ctx: &UnitContext) -> CompileResult<Vec<String>> {
    let mut lines = Vec::new();
    emit_program(program, ctx, &mut |line: String| -> CompileResult<()> {
        lines.push(line);
        Ok(())
    })?;
    Ok(lines)
}

/// Compile a program, writing each line to `out` as soon as it is rendered.
///
/// Returns the number of lines written. Lines written before a failure are
/// left in place.
pub fn compile_to<W: Write + ?Sized>(
    program: &Program,
    ctx: &UnitContext,
    out: &mut W,
) -> CompileResult<usize> {
    let mut count = 0;
    emit_program(program, ctx, &mut |line: String| -> CompileResult<()> {
        writeln!(out, "{}", line)?;
        count += 1;
        Ok(())
    })?;
    debug!(lines = count, "compiled program");
    Ok(count)
}

/// Decode a JSON operation tree and compile it
pub fn compile_json(value: &Value, ctx: &UnitContext) -> CompileResult<Vec<String>> {
    match Operation::from_json(value)? {
        Operation::Program(program) => compile(&program, ctx),
        Operation::Instruction(instruction) => Ok(vec![render_instruction(&instruction, ctx)?]),
    }
}

fn emit_program(
    program: &Program,
    ctx: &UnitContext,
    emit: &mut dyn FnMut(String) -> CompileResult<()>,
) -> CompileResult<()> {
    for op in program.operations() {
        match op {
            Operation::Program(inner) => emit_program(inner, ctx, emit)?,
            Operation::Instruction(instruction) => emit(render_instruction(instruction, ctx)?)?,
        }
    }
    Ok(())
}

/// Render a single instruction line
pub fn render_instruction(instruction: &Instruction, ctx: &UnitContext) -> CompileResult<String> {
    let mut line = instruction.mnemonic.to_uppercase();
    for arg in &instruction.args {
        line.push(' ');
        line.push_str(&render_arg(arg, ctx));
    }
    Ok(line)
}

fn render_arg(arg: &Arg, ctx: &UnitContext) -> String {
    match arg {
        Arg::Token(token) => token.to_uppercase(),
        Arg::Text(text) => text.clone(),
        Arg::Params(params) => params
            .iter()
            .map(|(key, value)| format!("{}{}", key.to_uppercase(), render_measure(*value, ctx)))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Render a word value in the context's current unit
pub fn render_measure(value: Measure, ctx: &UnitContext) -> String {
    format_number(ctx.convert(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use crate::units::{Quantity, Unit};
    use crate::Positioning;
    use serde_json::json;

    #[test]
    fn test_render_instruction() {
        let ctx = UnitContext::default();
        let instruction = Instruction::new("g0").param("x", 31.1).param("y", 0.0);
        assert_eq!(render_instruction(&instruction, &ctx).unwrap(), "G0 X31.10 Y0");

        let prompt = Instruction::new("m0").text("Attach ZProbe - Top");
        assert_eq!(
            render_instruction(&prompt, &ctx).unwrap(),
            "M0 Attach ZProbe - Top"
        );

        let home = Instruction::new("g28").token("z");
        assert_eq!(render_instruction(&home, &ctx).unwrap(), "G28 Z");

        assert_eq!(
            render_instruction(&Instruction::new("m400"), &ctx).unwrap(),
            "M400"
        );
    }

    #[test]
    fn test_quantities_follow_context_unit() {
        let instruction = Instruction::new("g1").param("Y", Quantity::inches(6.0));

        let mm = UnitContext::default();
        assert_eq!(render_instruction(&instruction, &mm).unwrap(), "G1 Y152.40");

        let inch = UnitContext::new(Unit::Inch, Positioning::Absolute);
        assert_eq!(render_instruction(&instruction, &inch).unwrap(), "G1 Y6");
    }

    #[test]
    fn test_compile_flattens_nested_programs() {
        let ctx = UnitContext::default();
        let program = Program::new()
            .with(Instruction::new("g90"))
            .with(
                Program::new()
                    .with(Instruction::new("g0").param("Z", 5).param("F", 300))
                    .with(Program::new().with(Instruction::new("m400"))),
            )
            .with(Instruction::new("m0").text("Stop Spindle"));

        let lines = compile(&program, &ctx).unwrap();
        assert_eq!(lines, vec!["G90", "G0 Z5 F300", "M400", "M0 Stop Spindle"]);
    }

    #[test]
    fn test_compile_to_writer() {
        let ctx = UnitContext::default();
        let program = Program::new()
            .with(Instruction::new("g92").param("Z", 4.2))
            .with(Instruction::new("m400"));

        let mut out = Vec::new();
        let count = compile_to(&program, &ctx, &mut out).unwrap();
        assert_eq!(count, 2);
        assert_eq!(String::from_utf8(out).unwrap(), "G92 Z4.20\nM400\n");
    }

    #[test]
    fn test_compile_json_rejects_boolean_operand() {
        let ctx = UnitContext::default();
        let value = json!([{"op": "g0", "args": [true]}]);
        let err = compile_json(&value, &ctx).unwrap_err();
        match err {
            CompileError::UnknownOperand { operand } => assert_eq!(operand, "true"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_empty_parameter_map_renders_empty_word_list() {
        let ctx = UnitContext::default();
        let instruction = Instruction {
            mnemonic: "g0".to_string(),
            args: vec![Arg::Params(Vec::new())],
        };
        assert_eq!(render_instruction(&instruction, &ctx).unwrap(), "G0 ");

        let value = json!([{"op": "g0", "args": [{}]}, {"op": "m400", "args": []}]);
        assert_eq!(compile_json(&value, &ctx).unwrap(), vec!["G0 ", "M400"]);
    }

    #[test]
    fn test_compile_json_single_instruction() {
        let ctx = UnitContext::default();
        let value = json!({"op": "g0", "args": [{"Z": {"unit": "in", "amount": 0.5}}]});
        assert_eq!(compile_json(&value, &ctx).unwrap(), vec!["G0 Z12.70"]);
    }
}
