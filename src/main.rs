//! # `tfdeclare`
//!
//! `tfdeclare` compiles YAML declaration files (`*.tf.yaml`) into a single
//! Terraform JSON document.
//!
//! ## Features
//! - Declare providers, variables, outputs, modules, data sources and resources in YAML.
//! - Select per-environment overrides with variants (`prod_variant: {...}`).
//! - Scope data sources and resources under an aliased provider.
//! - Keep several same-named providers apart in the output.
//! - Deterministic output: sorted keys, four-space indentation.
//!
//! ## Usage
//!
//! ```sh
//! tfdeclare --dir ./infra --output main.tf.json
//! tfdeclare --variant prod --dry-run
//! ```
//!
//! See `tfdeclare --help` for more options.

use anyhow::Result;
use clap::Parser as _;
use std::io::Write as _;
use tfdeclare::cli::Args;
use tfdeclare::error::DeclareError;
use tfdeclare::system::RealSystem;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // Logs go to stderr so that dry runs can be piped
    fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let system = RealSystem::new();
    match tfdeclare::run(&args, &system) {
        Ok(summary) => {
            if args.dry_run {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{}", summary.document)?;
            }
            std::process::exit(0)
        }
        Err(err) => {
            error!("{:#}", err);
            std::process::exit(
                err.downcast_ref::<DeclareError>()
                    .map_or(1, DeclareError::exit_code),
            );
        }
    }
}
