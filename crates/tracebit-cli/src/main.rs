//! # tracebit CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tracebit_cli::replay::{run_check_genesis, run_replay, CheckGenesisArgs, ReplayArgs};

/// Tracebit contract harness.
///
/// Replays case-workflow and entity-registry calls against state built
/// from a genesis document.
#[derive(Parser, Debug)]
#[command(name = "tracebit", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply a script of contract calls and report each result.
    Replay(ReplayArgs),

    /// Validate a genesis document.
    CheckGenesis(CheckGenesisArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Replay(args) => run_replay(&args),
        Commands::CheckGenesis(args) => run_check_genesis(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracebit_cli::replay::OutputFormat;

    #[test]
    fn parse_replay_defaults() {
        let cli =
            Cli::try_parse_from(["tracebit", "replay", "--genesis", "g.yaml", "--script", "s.yaml"])
                .unwrap();
        assert_eq!(cli.verbose, 0);
        let Commands::Replay(args) = cli.command else {
            panic!("expected replay");
        };
        assert_eq!(args.format, OutputFormat::Json);
        assert!(!args.fail_on_reject);
        assert!(!args.dump_state);
    }

    #[test]
    fn parse_replay_all_flags() {
        let cli = Cli::try_parse_from([
            "tracebit",
            "-vv",
            "replay",
            "--genesis",
            "g.yaml",
            "--script",
            "s.yaml",
            "--format",
            "text",
            "--fail-on-reject",
            "--dump-state",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Replay(args) = cli.command else {
            panic!("expected replay");
        };
        assert_eq!(args.format, OutputFormat::Text);
        assert!(args.fail_on_reject);
        assert!(args.dump_state);
    }

    #[test]
    fn parse_check_genesis() {
        let cli = Cli::try_parse_from(["tracebit", "check-genesis", "--genesis", "genesis.yaml"])
            .unwrap();
        assert!(matches!(cli.command, Commands::CheckGenesis(_)));
    }

    #[test]
    fn replay_requires_script() {
        assert!(Cli::try_parse_from(["tracebit", "replay", "--genesis", "g.yaml"]).is_err());
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from([
            "tracebit", "replay", "--genesis", "g", "--script", "s", "--format", "xml",
        ])
        .is_err());
    }
}
