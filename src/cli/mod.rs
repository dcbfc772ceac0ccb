//! Command Line Interface (CLI) layer for the submitter.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) that wires user-provided options
//! to the underlying library functionality exposed via `synthsub::api`.
//!
//! If you are embedding synthsub into another application, prefer using
//! the high-level `synthsub::api` module instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
