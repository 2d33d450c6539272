//! SDK header distribution engine.
//!
//! Keeps a small set of derived build artifacts (a generated version
//! header, an aggregated super header, a fixed list of special headers and
//! the mac `.r` resource files) in sync across many per-platform SDK
//! folders, writing a destination only when its content differs.
//!
//! The public API is organised into these layers:
//!
//! - **[`config`]**: the distribution layout and its validation
//! - **[`sync`]**: compare, write and fan-out primitives
//! - **[`pipeline`]**: the stage state machine that sequences a run
//! - **[`vcs`]**, **[`exec`]**, **[`operations`]**: collaborators for
//!   source control, external processes and the filesystem
//! - **[`commands`]**: top-level subcommand orchestration (`sync`, `version`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod destinations;
pub mod error;
pub mod exec;
pub mod logging;
pub mod operations;
pub mod pipeline;
pub mod sync;
pub mod vcs;
