mod config;
mod driver;
mod error;
mod shader;
#[cfg(test)]
mod test_util;
mod watch;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use config::{Args, Config, SDK_VARIABLE};
use driver::{Driver, RunSummary};

#[macro_use]
extern crate tracing;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let working_directory =
        std::env::current_dir().context("could not determine the working directory")?;
    let sdk_root = std::env::var_os(SDK_VARIABLE).map(PathBuf::from);

    let config = Config::resolve(args, sdk_root, &working_directory)
        .context("invalid configuration")?;
    debug!(compiler = ?config.compiler.program(), directory = ?config.directory, "configured");

    if !config.watch {
        compile_all(&config)?;
        return Ok(());
    }

    let compile_and_report = || {
        if let Err(error) = compile_all(&config) {
            error!("{error:#}");
        }
    };

    compile_and_report();
    watch::watch_shader_changes(&config.directory, compile_and_report)?;
    Ok(())
}

/// Discovers and compiles every shader in the configured directory.
fn compile_all(config: &Config) -> anyhow::Result<RunSummary> {
    let driver = Driver::new(&config.compiler, config.naming, config.policy);
    let mut diagnostics = codespan_reporting::term::termcolor::Ansi::new(std::io::stderr());
    let summary = driver.compile_directory(&config.directory, &mut diagnostics)?;
    Ok(summary)
}
