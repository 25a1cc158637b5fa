pub mod cli;
pub mod config;
pub mod history;
pub mod llm;
pub mod models;
pub mod relay;
pub mod server;

use cli::Args;
use config::RelayConfig;
use history::initialize_history_store;
use llm::LlmConfig;
use llm::chat::new_client as new_chat_client;
use log::info;
use relay::ChatRelay;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub fn build_relay(args: &Args) -> Result<ChatRelay, Box<dyn Error + Send + Sync>> {
    let config = RelayConfig::from_args(args);
    let llm_config = LlmConfig {
        api_key: Some(args.chat_api_key.clone()).filter(|k| !k.is_empty()),
        base_url: Some(args.chat_base_url.clone()),
        timeout: config.upstream_timeout,
    };
    let chat_client = new_chat_client(&llm_config)?;
    let history_store = initialize_history_store(&config);
    Ok(ChatRelay::new(chat_client, history_store, config))
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat Endpoint: {}", args.chat_base_url);
    info!("Default Model: {}", args.chat_model);
    info!("Upstream Timeout: {}s", args.upstream_timeout_secs);
    info!("Context Window: {} turns", args.context_window);
    info!(
        "History Limit: {}",
        if args.history_limit == 0 { "unbounded".to_string() } else { args.history_limit.to_string() }
    );
    info!(
        "Sampling Defaults: temperature={} max_tokens={} top_p={} min_p={}",
        args.default_temperature,
        args.default_max_tokens,
        args.default_top_p,
        args.default_min_p
    );
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let relay = Arc::new(build_relay(&args)?);
    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, relay, args);
    server.run().await?;

    Ok(())
}
