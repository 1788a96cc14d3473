use crate::client::{ClientConfig, ReqpadClient, RequestExecutionResult};
use crate::commands::shared::{EnvArgs, OutputArgs, SourceArgs, VariableArgs};
use crate::commands::validators;
use crate::core::error::AppError;
use clap::{Args, Subcommand};
use reqpad_lib::debug_log;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
pub struct ExecutionResultsView {
    pub results: Vec<RequestExecutionResult>,
}

#[derive(Debug, Args)]
#[command(about = "Manage requests")]
pub struct RequestCommand {
    #[command(subcommand)]
    pub command: RequestSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum RequestSubcommand {
    #[command(about = "List requests")]
    List(ListArgs),
    #[command(about = "Show a request exactly as it would be sent")]
    Show(ShowArgs),
    #[command(about = "Run a request")]
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub struct RequestNameArgs {
    #[arg(
        short = 'n',
        long = "name",
        help = "Name of the request; defaults to the active request",
        value_parser = validators::validate_request_name
    )]
    pub name: Option<String>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub request_name_args: RequestNameArgs,

    #[command(flatten)]
    pub env_args: EnvArgs,

    #[command(flatten)]
    pub variables: VariableArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub request_name_args: RequestNameArgs,

    #[arg(
        long = "all",
        help = "Run every request in the collection, in order",
        conflicts_with = "name"
    )]
    pub all: bool,

    #[command(flatten)]
    pub env_args: EnvArgs,

    #[command(flatten)]
    pub variables: VariableArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn execute_list(args: &ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let source_path = Path::new(&args.source.source);
    let requests = ReqpadClient::list_requests(source_path)?;

    let formatter = crate::core::formatter::get_formatter(&args.output.output);
    print!(
        "{}",
        formatter.format_list(&requests, "", "No requests found")
    );

    Ok(())
}

pub fn execute_show(args: &ShowArgs) -> Result<(), Box<dyn std::error::Error>> {
    let source_path = Path::new(&args.source.source);
    let details = ReqpadClient::get_request_details(
        source_path,
        args.request_name_args.name.as_deref(),
        args.env_args.environment.as_deref(),
        &args.variables.variable,
    )?;

    let formatter = crate::core::formatter::get_formatter(&args.output.output);
    print!("{}", formatter.format(&details));

    Ok(())
}

pub async fn execute_run(args: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig {
        source_path: args.source.source.clone(),
        request_name: args.request_name_args.name.clone(),
        run_all: args.all,
        environment: args.env_args.environment.clone(),
        variables: args.variables.variable.clone(),
    };

    let client = ReqpadClient::new(config);
    let results = client.run().await?;

    for result in &results {
        debug_log!(
            "{} {} -> {} {} ({} ms)",
            result.method,
            result.url,
            result.status.code,
            result.status.text,
            result.status.time_ms
        );
    }

    let failed = results.iter().filter(|r| r.is_failure()).count();

    let formatter = crate::core::formatter::get_formatter(&args.output.output);
    let view = ExecutionResultsView { results };
    print!("{}", formatter.format(&view));

    if failed > 0 {
        return Err(Box::new(AppError::ExecutionFailed(failed)));
    }

    Ok(())
}
