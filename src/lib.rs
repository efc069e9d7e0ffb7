//! # DadoKit
//!
//! Generates CNC router G-code for cutting a straight dado joint.
//!
//! ## Architecture
//!
//! DadoKit is organized as a workspace with multiple crates:
//!
//! 1. **dadokit-core** - Units, machining context, operation tree, G-code compiler
//! 2. **dadokit-camtools** - Toolpath generators (dado)
//! 3. **dadokit-settings** - Job configuration files
//! 4. **dadokit** - Command line binary that ties the crates together

use anyhow::Context;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub mod cli;

pub use dadokit_camtools::{generate_dado_path, DadoGenerator, DadoParameters};
pub use dadokit_core::{compile, compile_to, Program, Quantity, Unit, UnitContext};
pub use dadokit_settings::JobConfig;

/// Initialize logging
///
/// Logs go to stderr so stdout carries nothing but G-code. `RUST_LOG`
/// overrides the default level.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(())
}

/// Load the job to generate
///
/// Uses `path` when given, otherwise the default job file if one exists,
/// otherwise the built-in reference job.
pub fn load_job(path: Option<&Path>) -> anyhow::Result<JobConfig> {
    if let Some(path) = path {
        return JobConfig::load_from_file(path)
            .with_context(|| format!("failed to load job file {}", path.display()));
    }

    match dadokit_settings::default_config_path() {
        Ok(default) if default.exists() => {
            info!(path = %default.display(), "using default job file");
            JobConfig::load_from_file(&default)
                .with_context(|| format!("failed to load job file {}", default.display()))
        }
        _ => Ok(JobConfig::default()),
    }
}

/// Generate the job's toolpath and write it as G-code
pub fn write_job(config: &JobConfig, out: &mut dyn Write) -> anyhow::Result<usize> {
    let params = config.dado_parameters()?;
    let mut ctx = config.unit_context();
    let program = generate_dado_path(&params, &mut ctx)?;
    let lines = compile_to(&program, &ctx, out)?;
    out.flush()?;
    Ok(lines)
}

/// Compile a JSON program file and write it as G-code
pub fn write_program_file(path: &Path, out: &mut dyn Write) -> anyhow::Result<usize> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read program {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("invalid JSON in {}", path.display()))?;

    let lines = dadokit_core::compile_json(&value, &UnitContext::default())?;
    for line in &lines {
        writeln!(out, "{}", line)?;
    }
    out.flush()?;
    Ok(lines.len())
}

/// Open the output destination: a file when given, stdout otherwise
pub fn open_output(path: Option<&PathBuf>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}
