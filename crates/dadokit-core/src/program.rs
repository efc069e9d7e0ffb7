//! Operation tree
//!
//! A toolpath is described as a tree of [`Operation`]s: single G-code
//! instructions and nested [`Program`]s that group related instructions.
//! Grouping has no effect on the output beyond ordering; the compiler
//! flattens the tree depth first.

use crate::error::{CompileError, CompileResult};
use crate::units::{Measure, Quantity, Unit};
use serde_json::Value;

/// Instruction argument
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// Bare keyword, rendered uppercased (e.g. `Z` in `G28 Z`)
    Token(String),
    /// Literal text, rendered verbatim (operator messages)
    Text(String),
    /// Axis/parameter words in insertion order, rendered as `KEYvalue`
    Params(Vec<(String, Measure)>),
}

/// A single G-code instruction
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub mnemonic: String,
    pub args: Vec<Arg>,
}

impl Instruction {
    pub fn new(mnemonic: impl Into<String>) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            args: Vec::new(),
        }
    }

    /// Append a bare token argument
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.args.push(Arg::Token(token.into()));
        self
    }

    /// Append a literal text argument
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.args.push(Arg::Text(text.into()));
        self
    }

    /// Append a parameter word.
    ///
    /// Consecutive parameters share one [`Arg::Params`] map.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Measure>) -> Self {
        let entry = (key.into(), value.into());
        match self.args.last_mut() {
            Some(Arg::Params(params)) => params.push(entry),
            _ => self.args.push(Arg::Params(vec![entry])),
        }
        self
    }
}

/// An operation in the tree
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Instruction(Instruction),
    Program(Program),
}

impl From<Instruction> for Operation {
    fn from(value: Instruction) -> Self {
        Self::Instruction(value)
    }
}

impl From<Program> for Operation {
    fn from(value: Program) -> Self {
        Self::Program(value)
    }
}

/// Ordered group of operations
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    operations: Vec<Operation>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, operation: impl Into<Operation>) {
        self.operations.push(operation.into());
    }

    /// Builder form of [`Program::push`]
    pub fn with(mut self, operation: impl Into<Operation>) -> Self {
        self.push(operation);
        self
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// All instructions in emission order
    pub fn instructions(&self) -> Vec<&Instruction> {
        let mut out = Vec::new();
        self.collect_instructions(&mut out);
        out
    }

    fn collect_instructions<'a>(&'a self, out: &mut Vec<&'a Instruction>) {
        for op in &self.operations {
            match op {
                Operation::Instruction(instruction) => out.push(instruction),
                Operation::Program(program) => program.collect_instructions(out),
            }
        }
    }
}

impl FromIterator<Operation> for Program {
    fn from_iter<T: IntoIterator<Item = Operation>>(iter: T) -> Self {
        Self {
            operations: iter.into_iter().collect(),
        }
    }
}

impl Operation {
    /// Decode an operation tree from JSON
    ///
    /// Arrays are programs and `{"op": "g0", "args": [...]}` objects are
    /// instructions. Arguments are a string (text), `{"token": "z"}`, or an
    /// object of parameter words whose values are numbers or
    /// `{"unit": "in", "amount": 0.5}` quantities. Any other argument shape
    /// is an unknown operand.
    pub fn from_json(value: &Value) -> CompileResult<Self> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(Operation::from_json)
                .collect::<CompileResult<Program>>()
                .map(Operation::Program),
            Value::Object(map) => {
                let mnemonic = map
                    .get("op")
                    .and_then(Value::as_str)
                    .ok_or_else(|| CompileError::unknown_operand(value))?;
                let mut instruction = Instruction::new(mnemonic);
                if let Some(args) = map.get("args") {
                    let args = args
                        .as_array()
                        .ok_or_else(|| CompileError::unknown_operand(args))?;
                    for arg in args {
                        instruction.args.push(arg_from_json(arg)?);
                    }
                }
                Ok(Operation::Instruction(instruction))
            }
            other => Err(CompileError::unknown_operand(other)),
        }
    }
}

fn arg_from_json(value: &Value) -> CompileResult<Arg> {
    match value {
        Value::String(text) => Ok(Arg::Text(text.clone())),
        Value::Object(map) => {
            if let (1, Some(Value::String(token))) = (map.len(), map.get("token")) {
                return Ok(Arg::Token(token.clone()));
            }
            map.iter()
                .map(|(key, v)| Ok((key.clone(), measure_from_json(v)?)))
                .collect::<CompileResult<Vec<_>>>()
                .map(Arg::Params)
        }
        other => Err(CompileError::unknown_operand(other)),
    }
}

fn measure_from_json(value: &Value) -> CompileResult<Measure> {
    if let Some(number) = value.as_f64() {
        return Ok(Measure::Number(number));
    }
    let quantity = value.as_object().and_then(|map| {
        let unit = map.get("unit")?.as_str()?.parse::<Unit>().ok()?;
        let amount = map.get("amount")?.as_f64()?;
        Some(Quantity::new(unit, amount))
    });
    quantity
        .map(Measure::Quantity)
        .ok_or_else(|| CompileError::unknown_operand(value))
}
