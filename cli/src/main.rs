use clap::{CommandFactory, Parser};
use reqpad_lib::logger::Logger;
use std::path::Path;

mod client;
mod collection;
mod commands;
mod core;

use commands::Commands;
use core::exit_code::ExitCode;

#[derive(Parser)]
#[command(name = "reqpad")]
#[command(
    about = "Compose and send HTTP requests from a JSON collection. Defaults to 'request run' if no subcommand is provided."
)]
#[command(version = crate::core::version::app_version())]
struct Args {
    #[arg(short, long, help = "Enable debug logging", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser)]
#[command(name = "reqpad")]
struct DefaultArgs {
    #[arg(short, long, help = "Enable debug logging", global = true)]
    debug: bool,
    #[command(flatten)]
    run_args: commands::request::RunArgs,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        let exit_code = ExitCode::from(&e);
        std::process::exit(exit_code.code());
    }
}

const SUBCOMMANDS: [&str; 4] = ["env", "auth", "request", "help"];

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    match Args::try_parse() {
        Ok(Args {
            debug,
            command: Some(command),
        }) => {
            Logger::init(debug);
            dispatch(command).await
        }
        Ok(_) if args.len() == 1 && !has_collection_in_current_dir() => {
            Args::command().print_help()?;
            println!();
            Ok(())
        }
        Err(e)
            if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion =>
        {
            e.print()?;
            Ok(())
        }
        Err(e) if names_subcommand(&args) => e.exit(),
        _ => {
            let default_args = DefaultArgs::parse();
            Logger::init(default_args.debug);
            commands::request::execute_run(&default_args.run_args).await
        }
    }
}

/// True when the first argument past the global flags is a subcommand name.
fn names_subcommand(args: &[String]) -> bool {
    args.iter()
        .skip(1)
        .find(|arg| !matches!(arg.as_str(), "-d" | "--debug"))
        .is_some_and(|arg| SUBCOMMANDS.contains(&arg.as_str()))
}

async fn dispatch(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Env(env_command) => match env_command.command {
            commands::env::EnvSubcommand::List(list_args) => {
                commands::env::execute_list(&list_args)
            }
            commands::env::EnvSubcommand::Vars(vars_args) => {
                commands::env::execute_vars(&vars_args)
            }
        },
        Commands::Auth(auth_command) => match auth_command.command {
            commands::auth::AuthSubcommand::List(list_args) => {
                commands::auth::execute_list(&list_args)
            }
        },
        Commands::Request(request_command) => match request_command.command {
            commands::request::RequestSubcommand::List(list_args) => {
                commands::request::execute_list(&list_args)
            }
            commands::request::RequestSubcommand::Show(show_args) => {
                commands::request::execute_show(&show_args)
            }
            commands::request::RequestSubcommand::Run(run_args) => {
                commands::request::execute_run(&run_args).await
            }
        },
    }
}

fn has_collection_in_current_dir() -> bool {
    Path::new(collection::DEFAULT_FILE_NAME).is_file()
}
