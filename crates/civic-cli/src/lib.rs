//! Command-line and environment configuration for the civic binaries.
//!
//! Every flag has a `CIVIC_*` environment fallback; the helpers on [`Cli`]
//! turn the parsed values into the per-crate config structs.

pub mod cli_args;

pub use cli_args::Cli;
