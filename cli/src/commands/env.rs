use crate::client::ReqpadClient;
use crate::commands::shared::{EnvArgs, OutputArgs, SourceArgs, VariableArgs};
use clap::{Args, Subcommand};
use std::path::Path;

#[derive(Args)]
#[command(name = "env")]
#[command(about = "Manage environments")]
pub struct EnvCommand {
    #[command(subcommand)]
    pub command: EnvSubcommand,
}

#[derive(Subcommand)]
pub enum EnvSubcommand {
    #[command(about = "List environments")]
    List(ListArgs),
    #[command(about = "Show the variables a request would see")]
    Vars(VarsArgs),
}

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct VarsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub env_args: EnvArgs,

    #[command(flatten)]
    pub variables: VariableArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn execute_list(args: &ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(&args.source.source);
    let env_list = ReqpadClient::list_environments(path)?;

    let formatter = crate::core::formatter::get_formatter(&args.output.output);
    print!(
        "{}",
        formatter.format_list(
            &env_list,
            "Environments found:",
            "No environments found in collection"
        )
    );

    Ok(())
}

pub fn execute_vars(args: &VarsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(&args.source.source);
    let variables = ReqpadClient::effective_variables(
        path,
        args.env_args.environment.as_deref(),
        &args.variables.variable,
    )?;

    let formatter = crate::core::formatter::get_formatter(&args.output.output);
    print!(
        "{}",
        formatter.format_list(&variables, "", "No variables defined")
    );

    Ok(())
}
