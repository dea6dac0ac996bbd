use clap::{Parser, Subcommand};
use std::process::ExitCode;

mod commands;
mod error;

use error::CliError;

#[derive(Parser, Debug)]
#[command(name = "action-agent", version)]
#[command(about = "Action Agent - identity & access operations via PingOne and Microsoft Graph")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve A2A, action-group, invocation and health endpoints
    Serve {
        /// Listen host (overrides ACTION_AGENT_HOST)
        #[arg(long)]
        host: Option<String>,
        /// Listen port (overrides ACTION_AGENT_PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Execute instructions once and print the results.
    ///
    /// Several instructions are executed concurrently.
    Invoke {
        #[arg(required = true)]
        instructions: Vec<String>,
        /// Print replies as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check a structured request against the required-field table
    Validate {
        /// Request type, e.g. create_user
        #[arg(long = "type")]
        request_type: String,
        /// Request fields as a JSON object
        #[arg(long)]
        data: String,
    },
    /// Connect the tool providers and list every registered tool
    Tools,
    /// Print the OpenAPI document of the HTTP endpoints
    Openapi,
    /// Send a message to an A2A agent
    Send {
        /// Base URL of the agent
        #[arg(long, env = "ACTION_AGENT_URL", default_value = "http://127.0.0.1:9000")]
        url: String,
        /// Continue an existing task
        #[arg(long)]
        task_id: Option<String>,
        /// Attach a structured request of this type
        #[arg(long, requires = "data")]
        request_type: Option<String>,
        /// Fields of the structured request as a JSON object
        #[arg(long, requires = "request_type")]
        data: Option<String>,
        /// Bearer token for the agent
        #[arg(long, env = "ACTION_AGENT_TOKEN")]
        token: Option<String>,
        text: String,
    },
    /// Fetch and print the agent card of an A2A agent
    Card {
        #[arg(long, env = "ACTION_AGENT_URL", default_value = "http://127.0.0.1:9000")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Initialize JSON logging once.
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    let env_filter = match "info".parse() {
        Ok(directive) => env_filter.add_directive(directive),
        Err(_) => env_filter,
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .json()
        .try_init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Invalid) => ExitCode::from(2),
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Serve { host, port } => commands::serve(host, port).await,
        Commands::Invoke { instructions, json } => commands::invoke(&instructions, json).await,
        Commands::Validate { request_type, data } => commands::validate(&request_type, &data),
        Commands::Tools => commands::tools().await,
        Commands::Openapi => commands::openapi(),
        Commands::Send {
            url,
            task_id,
            request_type,
            data,
            token,
            text,
        } => {
            let structured = match (request_type, data) {
                (Some(request_type), Some(data)) => Some((request_type, data)),
                _ => None,
            };
            commands::send(&url, token, task_id, structured, text).await
        }
        Commands::Card { url } => commands::card(&url).await,
    }
}
