//! # tracebit-cli — Tracebit Command-Line Harness
//!
//! Drives the case workflow and the entity registry from files: a YAML
//! genesis document sets up the initial contract state, and a YAML
//! script lists the calls to replay against it.
//!
//! ## Subcommands
//!
//! - `replay`: apply a script and report one result per step.
//! - `check-genesis`: validate a genesis document without running anything.
//!
//! Handlers only parse, dispatch and print. All contract rules live in
//! `tracebit-state`.

pub mod genesis;
pub mod replay;
pub mod script;
