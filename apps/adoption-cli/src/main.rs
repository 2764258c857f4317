//! adoption-cli: command-line host for the animal adoption backend.
//!
//! Wires configuration, logging and a storage backend around the adoption
//! service and prints every result as JSON on stdout. Logs go to stderr.
//!
//! Run:
//! ```bash
//! # SQLite file at ./data/adoptions.db (default)
//! cargo run -p adoption-cli -- add-adoptant --name Dupont --address "123 Rue Test" --phone 0123456789
//! cargo run -p adoption-cli -- add-animal --name Médor --age 3 --species dog --sterilized
//! cargo run -p adoption-cli -- add-adoption --fee 150 --adoptant-id 1 --animal-id 1
//! cargo run -p adoption-cli -- total-fees --adoptant-id 1
//!
//! # throwaway in-memory store with JSON logs
//! STORAGE_PROVIDER=memory LOG_FORMAT=json cargo run -p adoption-cli -- show-adoptant 1
//! ```
//!
//! Configuration: See `config.rs` for all environment variables.

mod commands;
mod config;
mod store;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::commands::Command;
use crate::store::Store;

#[derive(Debug, Parser)]
#[command(name = "adoption-cli", version)]
#[command(about = "Manage adoptants, animals and adoptions")]
struct Cli {
    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    // Arguments first so --help and --version never depend on the environment
    let cli = Cli::parse();
    let cfg = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    init_tracing(&cfg);
    cfg.warn_if_ephemeral();

    if let Err(e) = run(&cfg, cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cfg: &config::Config, cli: Cli) -> anyhow::Result<()> {
    let store = Store::from_config(cfg).context("failed to open storage")?;
    tracing::debug!(provider = ?cfg.storage_provider, about = %adoption_domain::about(), "store ready");
    let svc = store.into_service();

    let out = commands::execute(&svc, cli.command)?;
    let text = if cli.pretty {
        serde_json::to_string_pretty(&out)?
    } else {
        serde_json::to_string(&out)?
    };
    println!("{text}");
    Ok(())
}

fn init_tracing(cfg: &config::Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    match cfg.log_format {
        config::LogFormat::Json => {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(fmt::time::SystemTime)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        config::LogFormat::Pretty => {
            registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_animal() {
        let cli = Cli::try_parse_from([
            "adoption-cli",
            "add-animal",
            "--name",
            "Médor",
            "--age",
            "3",
            "--species",
            "chien",
            "--sterilized",
        ])
        .unwrap();
        match cli.command {
            Command::AddAnimal {
                species,
                sterilized,
                age,
                ..
            } => {
                assert_eq!(species, adoption_domain::Species::Dog);
                assert!(sterilized);
                assert_eq!(age, 3);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_species() {
        let res = Cli::try_parse_from([
            "adoption-cli",
            "add-animal",
            "--name",
            "X",
            "--age",
            "1",
            "--species",
            "dragon",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn help_is_answered_by_the_parser() {
        let err = Cli::try_parse_from(["adoption-cli", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
        let err = Cli::try_parse_from(["adoption-cli", "add-adoption", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);

        // An invalid environment is only inspected after parsing.
        let bad = config::Config::from_lookup(|k| (k == "DB_PATH").then(String::new));
        assert!(bad.is_err());
    }

    #[test]
    fn rejects_non_finite_fee() {
        for fee in ["NaN", "inf"] {
            let res = Cli::try_parse_from([
                "adoption-cli",
                "add-adoption",
                "--fee",
                fee,
                "--adoptant-id",
                "1",
                "--animal-id",
                "1",
            ]);
            assert_eq!(
                res.unwrap_err().kind(),
                clap::error::ErrorKind::ValueValidation
            );
        }
    }

    #[test]
    fn run_against_memory_store() {
        let cfg = config::Config::from_lookup(|k| {
            (k == "STORAGE_PROVIDER").then(|| "memory".to_string())
        })
        .unwrap();
        let cli = Cli::try_parse_from(["adoption-cli", "total-fees", "--adoptant-id", "1"]).unwrap();
        run(&cfg, cli).unwrap();

        let cli = Cli::try_parse_from([
            "adoption-cli",
            "add-adoption",
            "--fee",
            "10",
            "--adoptant-id",
            "1",
            "--animal-id",
            "1",
        ])
        .unwrap();
        assert!(run(&cfg, cli).is_err());
    }
}
