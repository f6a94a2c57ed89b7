//! CLI argument model and command execution for the `uskill` binary.

pub mod bootstrap;
pub mod call_args;
pub mod cli_args;
pub mod commands;

pub use bootstrap::init_tracing;
pub use call_args::{parse_call_params, parse_scalar};
pub use cli_args::{CallArgs, Cli, CliCommand, VerifyArgs};
pub use commands::execute_cli;
