use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use uskill_client::{default_registry_path, ClientTarget, CALL_TIMEOUT_MS};
use uskill_verify::DEFAULT_MAX_IN_FLIGHT;

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Parser)]
#[command(
    name = "uskill",
    about = "Remote control and verification client for Unity Skills editor instances",
    version
)]
/// Top-level `uskill` arguments.
pub struct Cli {
    #[arg(
        long,
        env = "USKILL_URL",
        global = true,
        help = "Full base URL of the editor instance. Takes precedence over --port and --target."
    )]
    pub url: Option<String>,

    #[arg(
        long,
        env = "USKILL_PORT",
        global = true,
        help = "Connect to an editor instance on this localhost port"
    )]
    pub port: Option<u16>,

    #[arg(
        long,
        env = "USKILL_TARGET",
        global = true,
        help = "Editor instance id or name, resolved through the instance registry"
    )]
    pub target: Option<String>,

    #[arg(
        long,
        env = "USKILL_REGISTRY",
        global = true,
        help = "Instance registry path. Defaults to ~/.unity_skills/registry.json"
    )]
    pub registry: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Invoke one skill with key=value parameters and print the JSON response.
    Call(CallArgs),
    /// Print the skill catalog of the addressed instance.
    Skills,
    /// Print every editor instance listed in the registry.
    Instances,
    /// Check whether the addressed instance is reachable.
    Health,
    /// Invoke every skill with safe parameters and print a report.
    Verify(VerifyArgs),
}

#[derive(Debug, Args)]
pub struct CallArgs {
    #[arg(help = "Skill name, e.g. gameobject_create")]
    pub skill: String,

    #[arg(
        value_name = "KEY=VALUE",
        help = "Skill parameters. Numeric values are sent as numbers."
    )]
    pub params: Vec<String>,

    #[arg(
        long,
        default_value_t = false,
        help = "Ask the editor for full results instead of summaries of large datasets"
    )]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    #[arg(
        long,
        env = "USKILL_WORKERS",
        default_value_t = DEFAULT_MAX_IN_FLIGHT,
        value_parser = parse_positive_usize,
        help = "Maximum number of skill invocations in flight"
    )]
    pub workers: usize,

    #[arg(
        long = "timeout-ms",
        env = "USKILL_TIMEOUT_MS",
        default_value_t = CALL_TIMEOUT_MS,
        value_parser = parse_positive_u64,
        help = "Per-invocation timeout in milliseconds"
    )]
    pub timeout_ms: u64,

    #[arg(long, help = "Also write the Markdown report to this file")]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        default_value_t = false,
        help = "Print the report as JSON instead of Markdown"
    )]
    pub json: bool,
}

impl Cli {
    pub fn registry_path(&self) -> Result<PathBuf> {
        self.registry
            .clone()
            .or_else(default_registry_path)
            .ok_or_else(|| {
                anyhow!("cannot locate the instance registry; pass --registry or set HOME")
            })
    }

    /// Picks the addressing mode: URL, then port, then registry target, then
    /// the default port.
    pub fn client_target(&self) -> Result<ClientTarget> {
        if let Some(url) = non_empty(self.url.as_deref()) {
            return Ok(ClientTarget::Url(url));
        }
        if let Some(port) = self.port {
            return Ok(ClientTarget::Port(port));
        }
        if let Some(token) = non_empty(self.target.as_deref()) {
            return Ok(ClientTarget::Instance {
                token,
                registry_path: self.registry_path()?,
            });
        }
        Ok(ClientTarget::Default)
    }
}
