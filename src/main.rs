use anyhow::{Context, Result};
use clap::Parser;
use coupon_quorum::cli::Cli;
use coupon_quorum::config::Config;
use coupon_quorum::{CancelToken, Validator};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::from_cli(cli)?;
    let codes = if config.codes_from_stdin() {
        read_codes(io::stdin().lock())?
    } else {
        config.codes.clone()
    };

    let validator = Validator::new(config.validator.clone()).context("invalid configuration")?;
    validator.set_reference_files(config.reference_files.iter().cloned());

    // Codes run one after another so repeats are answered from the cache.
    let cancel = CancelToken::new();
    let mut failed = false;
    let mut out = io::stdout().lock();
    for code in &codes {
        match validator.validate(&cancel, code) {
            Ok(true) => writeln!(out, "{code}\tvalid")?,
            Ok(false) => writeln!(out, "{code}\tinvalid")?,
            Err(e) => {
                failed = true;
                writeln!(out, "{code}\terror\t{e}")?;
            }
        }
    }
    out.flush()?;

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_codes(input: impl BufRead) -> Result<Vec<String>> {
    let mut codes = Vec::new();
    for line in input.lines() {
        let line = line.context("failed to read codes from stdin")?;
        let code = line.trim();
        if !code.is_empty() {
            codes.push(code.to_string());
        }
    }
    Ok(codes)
}
