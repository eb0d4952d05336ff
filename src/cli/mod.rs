mod commands;
pub mod error;
mod utils;


use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::api::{self, Config};
use crate::mcp;
use crate::services::ExecutionRegistry;

use error::CliError;
use utils::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "hrungnir")]
#[command(author, version, about = "MCP server for packaging workflows", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the MCP endpoint and system API over HTTP
    Serve {
        /// Host address to bind to
        #[arg(long, env = "HRUNGNIR_HOST", default_value = "127.0.0.1")]
        host: IpAddr,
        /// Port to listen on
        #[arg(short, long, env = "HRUNGNIR_PORT", default_value = "3000")]
        port: u16,
    },
    /// Serve MCP over stdin/stdout
    Stdio,
    /// Print the upstream URL of a spec file
    UpstreamUrl {
        /// Path to the .spec file
        specfile: PathBuf,
    },
    /// Inspect chain build plans offline
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
}

#[derive(Subcommand, Debug)]
enum PlanCommands {
    /// Check a plan file for structural errors
    Validate {
        /// Plan file (.json, .yaml or .yml)
        file: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// List packages that may start given already completed ones
    Ready {
        /// Plan file (.json, .yaml or .yml)
        file: PathBuf,
        /// Completed packages (comma-separated)
        #[arg(long, value_delimiter = ',')]
        completed: Vec<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

pub async fn run() -> miette::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            api::init_tracing();
            api::run(Config { host, port }).await.map_err(CliError::from)?;
        }
        Commands::Stdio => {
            api::init_stderr_tracing();
            mcp::serve_stdio(Arc::new(ExecutionRegistry::new()))
                .await
                .map_err(CliError::Stdio)?;
        }
        Commands::UpstreamUrl { specfile } => {
            println!("{}", commands::specfile::upstream_url(&specfile)?);
        }
        Commands::Plan { command } => match command {
            PlanCommands::Validate { file, format } => {
                println!("{}", commands::plan::validate(&file, format)?);
            }
            PlanCommands::Ready {
                file,
                completed,
                format,
            } => {
                println!("{}", commands::plan::ready(&file, &completed, format)?);
            }
        },
    }

    Ok(())
}
