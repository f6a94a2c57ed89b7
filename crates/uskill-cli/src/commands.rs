use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::json;
use uskill_client::{InstanceRecord, InstanceRegistry, ResolutionError, SkillsClient};
use uskill_verify::{
    persist_report, verify_instance, DispatchConfig, DispatchProgress, ProgressHandler,
    ReportFormat,
};

use crate::call_args::parse_call_params;
use crate::cli_args::{CallArgs, Cli, CliCommand, VerifyArgs};

const REPORT_RULE_WIDTH: usize = 80;

/// Runs the selected subcommand, printing results to stdout.
pub async fn execute_cli(cli: Cli) -> Result<ExitCode> {
    match &cli.command {
        CliCommand::Call(args) => execute_call(&cli, args).await,
        CliCommand::Skills => execute_skills(&cli).await,
        CliCommand::Instances => execute_instances(&cli),
        CliCommand::Health => execute_health(&cli).await,
        CliCommand::Verify(args) => execute_verify(&cli, args).await,
    }
}

fn connect(cli: &Cli) -> Result<SkillsClient> {
    let target = cli.client_target()?;
    let client = SkillsClient::connect(&target)
        .with_context(|| format!("failed to connect to editor instance ({target:?})"))?;
    tracing::debug!(base_url = client.base_url(), "editor client ready");
    Ok(client)
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn execute_call(cli: &Cli, args: &CallArgs) -> Result<ExitCode> {
    let client = connect(cli)?;
    let params = parse_call_params(&args.params);
    match client.call(&args.skill, params, args.verbose).await {
        Ok(body) => {
            print_json(&body)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            print_json(&json!({"status": "error", "error": error.to_string()}))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn execute_skills(cli: &Cli) -> Result<ExitCode> {
    let client = connect(cli)?;
    let skills = client
        .list_skills()
        .await
        .with_context(|| format!("failed to fetch skill catalog from {}", client.base_url()))?;
    print_json(&json!({ "skills": skills }))?;
    Ok(ExitCode::SUCCESS)
}

fn load_instances(cli: &Cli) -> Result<Vec<InstanceRecord>> {
    let path = cli.registry_path()?;
    match InstanceRegistry::load(&path) {
        Ok(registry) => Ok(registry.records().to_vec()),
        Err(ResolutionError::RegistryMissing { .. }) => Ok(Vec::new()),
        Err(error) => Err(error.into()),
    }
}

fn execute_instances(cli: &Cli) -> Result<ExitCode> {
    let instances = load_instances(cli)?;
    print_json(&instances)?;
    Ok(ExitCode::SUCCESS)
}

async fn execute_health(cli: &Cli) -> Result<ExitCode> {
    let client = connect(cli)?;
    if client.health().await {
        println!("ok");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("unreachable: {}", client.base_url());
        Ok(ExitCode::FAILURE)
    }
}

async fn execute_verify(cli: &Cli, args: &VerifyArgs) -> Result<ExitCode> {
    let client = connect(cli)?;
    let config = DispatchConfig {
        max_in_flight: args.workers,
        invoke_timeout: Duration::from_millis(args.timeout_ms),
    };
    let progress: ProgressHandler = Arc::new(|progress: DispatchProgress<'_>| {
        println!(
            "[{}/{}] {} {}",
            progress.completed, progress.total, progress.outcome.verdict, progress.outcome.skill
        );
    });

    println!("Fetching skill catalog from {}...", client.base_url());
    let report = verify_instance(&client, &config, Some(progress))
        .await
        .with_context(|| format!("failed to fetch skill catalog from {}", client.base_url()))?;

    let format = if args.json {
        ReportFormat::Json
    } else {
        ReportFormat::Markdown
    };
    let rendered = report.render(format)?;
    println!();
    println!("{}", "=".repeat(REPORT_RULE_WIDTH));
    print!("{rendered}");

    if let Some(path) = args.output.as_deref() {
        persist_report(path, &rendered)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        println!("Report saved to {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}
