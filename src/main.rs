use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{json, Value};
use std::io::Read;

use agent_chat_bridge::config::{expand_tilde, CliArgs, Command, Config, HistoryArgs};
use agent_chat_bridge::converters::convert_history_value;
use agent_chat_bridge::http_client::HistoryClient;
use agent_chat_bridge::models::ui::UiMessage;
use agent_chat_bridge::providers::{ModelBackend, ModelProvider, ProviderSet};
use agent_chat_bridge::resolver::{default_backend_model, ModelResolver, CHAT_MODELS, DEFAULT_CHAT_MODEL};
use agent_chat_bridge::utils::most_recent_user_message;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap reads env-backed flags
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let config = Config::load(&args)?;
    config.validate()?;

    // Initialize logging on stderr so stdout carries only JSON
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::debug!(
        history_endpoint = %config.history_endpoint(),
        agent_id = %config.agent_id,
        test_environment = config.is_test_environment,
        "Configuration loaded"
    );

    match &args.command {
        Command::History(history_args) => run_history(&config, history_args).await,
        Command::Models => run_models(&config),
        Command::Resolve { model } => run_resolve(model),
        Command::Endpoints => run_endpoints(&config),
    }
}

/// Load history from a file, stdin or the agent service and print UI messages
async fn run_history(config: &Config, args: &HistoryArgs) -> Result<()> {
    let messages = match args.input.as_deref() {
        Some(input) => {
            let raw = read_input(input)?;
            let body: Value = serde_json::from_str(&raw)
                .with_context(|| format!("History input is not valid JSON: {}", input))?;
            convert_history_value(&body)
        }
        None => {
            let client = HistoryClient::from_config(config)?;
            tracing::info!("Fetching history from {}", client.history_endpoint());

            match client.fetch_ui_messages(&args.params).await {
                Ok(messages) => messages,
                Err(e) => {
                    eprintln!("{}", e.to_json());
                    return Err(e).context("Failed to load history from the agent service");
                }
            }
        }
    };

    log_summary(&messages);
    print_json(&serde_json::to_value(&messages)?, args.pretty)
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read history from stdin")?;
        return Ok(raw);
    }

    let path = expand_tilde(input);
    std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read history file: {}", path.display()))
}

fn log_summary(messages: &[UiMessage]) {
    tracing::info!("✅ Converted history into {} UI message(s)", messages.len());

    if let Some(last_user) = most_recent_user_message(messages) {
        tracing::debug!(
            id = %last_user.id,
            "Most recent user message: {}",
            last_user.text_content()
        );
    }
}

fn run_models(config: &Config) -> Result<()> {
    let resolver = ModelResolver::new();
    let providers = ProviderSet::for_environment(config.is_test_environment);

    let models: Vec<Value> = CHAT_MODELS
        .iter()
        .map(|model| {
            let gateway = providers
                .language_model(model.id)
                .ok()
                .map(|handle| match &handle.backend {
                    ModelBackend::Gateway { model: gateway_model } => gateway_model.clone(),
                    ModelBackend::Mock(mock) => format!("mock:{:?}", mock).to_lowercase(),
                });

            json!({
                "id": model.id,
                "name": model.name,
                "description": model.description,
                "backend_model": resolver.backend_model_for(model.id).ok(),
                "ui_provider_model": gateway,
                "default": model.id == DEFAULT_CHAT_MODEL,
            })
        })
        .collect();

    print_json(
        &json!({
            "default_backend_model": default_backend_model(),
            "models": models,
        }),
        true,
    )
}

fn run_resolve(model: &str) -> Result<()> {
    let resolver = ModelResolver::new();

    match resolver.resolve(model) {
        Ok(resolution) => {
            println!("{}", resolution.backend_model);
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e.to_json());
            Err(e.into())
        }
    }
}

fn run_endpoints(config: &Config) -> Result<()> {
    print_json(
        &json!({
            "client_base_url": config.client_base_url,
            "server_base_url": config.server_base_url,
            "stream_endpoint": config.stream_endpoint(),
            "history_endpoint": config.history_endpoint(),
            "agent_id": config.agent_id,
            "test_environment": config.is_test_environment,
        }),
        true,
    )
}

fn print_json(value: &Value, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", rendered);
    Ok(())
}
