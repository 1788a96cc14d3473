use crate::client::ReqpadClient;
use crate::commands::shared::{OutputArgs, SourceArgs};
use clap::{Args, Subcommand};
use std::path::Path;

#[derive(Debug, Args)]
#[command(about = "Inspect global headers merged into requests that use global auth")]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthSubcommand {
    #[command(about = "List global headers")]
    List(ListArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn execute_list(args: &ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(&args.source.source);
    let headers = ReqpadClient::list_global_headers(path)?;

    let formatter = crate::core::formatter::get_formatter(&args.output.output);
    print!(
        "{}",
        formatter.format_list(&headers, "Global headers:", "No global headers defined")
    );

    Ok(())
}
