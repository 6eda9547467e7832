//! # Replay and Genesis Subcommands
//!
//! `tracebit replay` builds fresh contract state from a genesis document,
//! applies a script step by step, and prints one result line per step.
//! `tracebit check-genesis` validates a genesis document on its own.
//!
//! ## Output
//!
//! JSON (the default) writes one object per line:
//!
//! ```text
//! {"op":"submit_case","result":{"value":1},"step":1}
//! {"op":"submit_case","result":{"error":"ERR-EMPTY-METADATA"},"step":2}
//! ```
//!
//! Text writes `[1] submit_case -> 1` and `[2] submit_case -> REJECTED
//! ERR-EMPTY-METADATA`.
//!
//! ## Exit codes
//!
//! `0` when the script ran, `2` when `--fail-on-reject` is set and at
//! least one step was rejected. Unreadable input, or a script that
//! addresses a contract missing from genesis, exits `1` via `main`.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde_json::{json, Value};

use tracebit_core::ContractResponse;

use crate::genesis::Genesis;
use crate::script::{check_coverage, load_script, Operation, Session};

/// How step results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable lines.
    Text,
}

/// Arguments for `tracebit replay`.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Genesis YAML describing the initial contract state.
    #[arg(long)]
    pub genesis: PathBuf,

    /// Script YAML listing the calls to apply.
    #[arg(long)]
    pub script: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Exit with status 2 if any step was rejected.
    #[arg(long)]
    pub fail_on_reject: bool,

    /// Print the final contract state after the step results.
    #[arg(long)]
    pub dump_state: bool,
}

/// Arguments for `tracebit check-genesis`.
#[derive(Args, Debug)]
pub struct CheckGenesisArgs {
    /// Genesis YAML to validate.
    #[arg(long)]
    pub genesis: PathBuf,
}

/// Execute `tracebit replay`, printing to stdout.
pub fn run_replay(args: &ReplayArgs) -> Result<u8> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    replay(args, &mut out)
}

/// Execute `tracebit replay`, writing results to `out`.
pub fn replay(args: &ReplayArgs, out: &mut impl Write) -> Result<u8> {
    let genesis = Genesis::load(&args.genesis)?;
    for problem in genesis.validate() {
        tracing::warn!(genesis = %args.genesis.display(), "{problem}");
    }

    let ops = load_script(&args.script)?;
    check_coverage(&genesis, &ops)?;
    tracing::debug!(steps = ops.len(), script = %args.script.display(), "script loaded");

    let mut session = Session::from_genesis(&genesis);
    let responses = session.run(&ops)?;

    for (index, (op, response)) in ops.iter().zip(&responses).enumerate() {
        write_step(out, args.format, index + 1, op, response)?;
    }

    if args.dump_state {
        write_state(out, args.format, &session)?;
    }

    let rejected = responses.iter().filter(|r| r.is_err()).count();
    tracing::info!(steps = responses.len(), rejected, "replay finished");

    if args.fail_on_reject && rejected > 0 {
        return Ok(2);
    }
    Ok(0)
}

fn write_step(
    out: &mut impl Write,
    format: OutputFormat,
    step: usize,
    op: &Operation,
    response: &ContractResponse<Value>,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let line = json!({
                "step": step,
                "op": op.name(),
                "result": serde_json::to_value(response)?,
            });
            writeln!(out, "{line}")?;
        }
        OutputFormat::Text => match response {
            ContractResponse::Value(value) => writeln!(out, "[{step}] {} -> {value}", op.name())?,
            ContractResponse::Error(code) => {
                writeln!(out, "[{step}] {} -> REJECTED {code}", op.name())?
            }
        },
    }
    Ok(())
}

fn write_state(out: &mut impl Write, format: OutputFormat, session: &Session) -> Result<()> {
    let state = json!({
        "cases": serde_json::to_value(session.cases())?,
        "registry": serde_json::to_value(session.registry())?,
    });
    match format {
        OutputFormat::Json => writeln!(out, "{}", json!({ "state": state }))?,
        OutputFormat::Text => {
            let pretty = serde_json::to_string_pretty(&state).context("failed to render state")?;
            writeln!(out, "final state:\n{pretty}")?;
        }
    }
    Ok(())
}

/// Execute `tracebit check-genesis`.
pub fn run_check_genesis(args: &CheckGenesisArgs) -> Result<u8> {
    let genesis = Genesis::load(&args.genesis)?;
    let problems = genesis.validate();

    if problems.is_empty() {
        println!("OK: {}", args.genesis.display());
        if let Some(cases) = &genesis.cases {
            println!(
                "  cases:    admin {}, {} reporter(s), {} reviewer(s)",
                cases.admin,
                cases.reporters.len(),
                cases.reviewers.len()
            );
        }
        if let Some(registry) = &genesis.registry {
            println!(
                "  registry: admin {}, block height {}",
                registry.admin,
                registry.block_height.get()
            );
        }
        return Ok(0);
    }

    println!("FAIL: {}", args.genesis.display());
    for problem in &problems {
        println!("  - {problem}");
    }
    Ok(1)
}
