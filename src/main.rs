use clap::Parser;
use dadokit::cli::{Cli, Command};
use dadokit::{init_logging, load_job, open_output, write_job, write_program_file, JobConfig};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose)?;

    match cli.command {
        Command::Generate { config, output } => {
            let job = load_job(config.as_deref())?;
            let mut out = open_output(output.as_ref())?;
            let lines = write_job(&job, &mut out)?;
            info!(lines, "dado job written");
        }
        Command::Compile { program, output } => {
            let mut out = open_output(output.as_ref())?;
            let lines = write_program_file(&program, &mut out)?;
            info!(lines, "program compiled");
        }
        Command::InitConfig { path } => {
            JobConfig::default().save_to_file(&path)?;
            info!(path = %path.display(), "reference job written");
        }
    }

    Ok(())
}
