use clap::Parser;
use crate::config;
use crate::llm::chat::openai::DEFAULT_CHAT_URL;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Server Args ---
    /// Host address and port for the HTTP server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = config::DEFAULT_SERVER_ADDR)]
    pub server_addr: String,

    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,

    // --- Chat LLM Provider Args ---
    /// Bearer token for the completion provider.
    #[arg(long, env = "DEEPINFRA_API_TOKEN", default_value = "", hide_env_values = true)]
    pub chat_api_key: String,

    /// Full URL of the OpenAI-compatible chat completions endpoint.
    #[arg(long, env = "CHAT_BASE_URL", default_value = DEFAULT_CHAT_URL)]
    pub chat_base_url: String,

    /// Model used when a request does not name one.
    #[arg(long, env = "CHAT_MODEL", default_value = config::DEFAULT_MODEL)]
    pub chat_model: String,

    /// Upstream request timeout in seconds. Exceeding it fails the request.
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = config::DEFAULT_UPSTREAM_TIMEOUT.as_secs())]
    pub upstream_timeout_secs: u64,

    // --- Conversation Args ---
    /// Number of most recent turns forwarded upstream after the system prompt (at least 1).
    #[arg(
        long,
        env = "CONTEXT_WINDOW",
        default_value_t = config::DEFAULT_CONTEXT_WINDOW as u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub context_window: u64,

    /// Maximum number of turns kept in memory. 0 keeps every turn.
    #[arg(long, env = "HISTORY_LIMIT", default_value = "0")]
    pub history_limit: usize,

    // --- Sampling Defaults ---
    #[arg(long, env = "DEFAULT_TEMPERATURE", default_value_t = config::DEFAULT_TEMPERATURE)]
    pub default_temperature: f64,

    #[arg(long, env = "DEFAULT_MAX_TOKENS", default_value_t = config::DEFAULT_MAX_TOKENS)]
    pub default_max_tokens: u32,

    #[arg(long, env = "DEFAULT_TOP_P", default_value_t = config::DEFAULT_TOP_P)]
    pub default_top_p: f64,

    #[arg(long, env = "DEFAULT_MIN_P", default_value_t = config::DEFAULT_MIN_P)]
    pub default_min_p: f64,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}
