//! Subcommand implementations

use crate::error::CliError;
use action_agent_a2a::{A2aClient, Message, Part, Task};
use action_agent_core::{ToolRegistry, validation};
use action_agent_http::{HttpOptions, HttpServer, shutdown_signal};
use action_agent_runtime::{ActionAgentRuntime, AgentConfig};
use serde_json::{Value, json};
use tracing::info;

pub async fn serve(host: Option<String>, port: Option<u16>) -> Result<(), CliError> {
    let mut config = AgentConfig::from_env()?;
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    let runtime = ActionAgentRuntime::start(config).await?;
    let addr = runtime.config().listen_addr();
    let options = HttpOptions::default().with_request_timeout(runtime.config().request_timeout);

    let server = HttpServer::new(runtime.agent(), runtime.a2a_handler());
    let served = server.serve(&addr, &options, shutdown_signal()).await;

    // MCP sessions are closed even when serving failed
    runtime.shutdown().await;
    served?;
    info!("Action Agent stopped");
    Ok(())
}

pub async fn invoke(instructions: &[String], as_json: bool) -> Result<(), CliError> {
    let runtime = ActionAgentRuntime::start(AgentConfig::from_env()?).await?;
    let agent = runtime.agent();

    let results = agent.execute_many(instructions).await;
    runtime.shutdown().await;

    let mut first_error = None;
    for (instruction, result) in instructions.iter().zip(results) {
        match result {
            Ok(reply) if as_json => println!(
                "{}",
                json!({
                    "instruction": instruction,
                    "failure_kind": reply.failure_kind().map(|kind| kind.as_str()),
                    "result": reply.text,
                    "tool_calls": reply.tool_calls,
                    "tool_failures": reply.tool_failures
                })
            ),
            Ok(reply) => {
                if let Some(kind) = reply.failure_kind() {
                    eprintln!("{} tool call(s) failed ({kind})", reply.tool_failures);
                }
                println!("{}", reply.text);
            }
            Err(e) => {
                eprintln!("Instruction failed ({}): {e}", e.kind());
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

pub fn validate(request_type: &str, data: &str) -> Result<(), CliError> {
    let data: Value = serde_json::from_str(data)
        .map_err(|source| CliError::InvalidJson { flag: "data", source })?;

    let result = validation::validate_value(request_type, &data);
    println!("{}", validation::report(&result));

    result.map(|_| ()).map_err(|_| CliError::Invalid)
}

pub async fn tools() -> Result<(), CliError> {
    let runtime = ActionAgentRuntime::start(AgentConfig::from_env()?).await?;
    for spec in runtime.registry().specs() {
        println!("{:<32} {}", spec.name, spec.description);
    }
    runtime.shutdown().await;
    Ok(())
}

pub fn openapi() -> Result<(), CliError> {
    let doc =
        serde_json::to_string_pretty(&action_agent_http::openapi()).map_err(CliError::Output)?;
    println!("{doc}");
    Ok(())
}

pub async fn send(
    url: &str,
    token: Option<String>,
    task_id: Option<String>,
    structured: Option<(String, String)>,
    text: String,
) -> Result<(), CliError> {
    let mut client = A2aClient::new(url)?;
    if let Some(token) = token {
        client = client.with_bearer_token(token);
    }

    let mut message = Message::user(text);
    if let Some((request_type, data)) = structured {
        let data: Value = serde_json::from_str(&data)
            .map_err(|source| CliError::InvalidJson { flag: "data", source })?;
        message = message.with_part(Part::data(
            json!({ "request_type": request_type, "data": data }),
        ));
    }

    let task = client.send(message, task_id, None).await?;
    print_task(&task);
    Ok(())
}

fn print_task(task: &Task) {
    println!("task {} [{}]", task.id, task.status);
    if let Some(text) = task.latest_agent_text() {
        println!("{text}");
    }
}

pub async fn card(url: &str) -> Result<(), CliError> {
    let card = A2aClient::new(url)?.get_agent_card().await?;
    let rendered = serde_json::to_string_pretty(&card).map_err(CliError::Output)?;
    println!("{rendered}");
    Ok(())
}
