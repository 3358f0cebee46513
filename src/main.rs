use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use natip::config::{Cli, Config, Mode};
use natip::{build_registry, filter, resolve, resolve_all, ResolutionError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = Config::from(Cli::parse());
    init_logging(&config);

    match run(&config).await {
        Ok(code) => code,
        Err(e) => exit_code(&e),
    }
}

async fn run(config: &Config) -> Result<ExitCode> {
    let registry = build_registry(&config.dig_bin, &config.stunip_bin, config.timeout);
    tracing::debug!(resolvers = registry.len(), "registry ready");

    if config.mode == Mode::List {
        let mut out = io::stdout().lock();
        for name in registry.names() {
            writeln!(out, "{name}")?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    let selection = filter(&registry, config.name.as_deref(), &config.disable)?;

    match config.mode {
        Mode::All => {
            let results = resolve_all(&selection).await;
            let mut out = io::stdout().lock();
            let mut resolved = false;
            for (name, result) in &results {
                match result {
                    Ok(addr) => {
                        resolved = true;
                        writeln!(out, "{name} {addr}")?;
                    }
                    Err(e) => writeln!(out, "{name} error: {e}")?,
                }
            }
            Ok(if resolved {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        _ => {
            let addr = resolve(&selection).await?;
            writeln!(io::stdout().lock(), "{addr}")?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_code(e: &anyhow::Error) -> ExitCode {
    if let Some(e) = e.downcast_ref::<io::Error>() {
        if e.kind() == io::ErrorKind::BrokenPipe {
            return ExitCode::SUCCESS;
        }
        eprintln!("natip: error: {e}");
        return ExitCode::FAILURE;
    }

    eprintln!("natip: error: {e}");
    if e.is::<ResolutionError>() {
        ExitCode::FAILURE
    } else {
        ExitCode::from(2)
    }
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
