//! # DadoKit CAM Tools
//!
//! Toolpath generators that turn joint parameters into an operation tree
//! ready for the core G-code compiler.
//!
//! ## CAM Tools Included
//!
//! - **Dado**: Probe, set up, and cut a straight dado in stepped passes

pub mod dado;
pub mod error;

pub use dado::{generate_dado_path, DadoGenerator, DadoParameters, DadoPlan};
pub use error::{CamToolError, CamToolResult, ParameterError};
