//! Configuration for Waypoint
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;

/// Waypoint - backend for AI-assisted mindmap learning
#[derive(Parser, Debug, Clone)]
#[command(name = "waypoint")]
#[command(about = "Backend for AI-assisted mindmap learning paths and quizzes")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:5000")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "waypoint")]
    pub mongodb_db: String,

    /// Base URL of an OpenAI-compatible completion API
    #[arg(long, env = "LLM_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub llm_base_url: String,

    /// Model name sent to the completion API
    #[arg(long, env = "LLM_MODEL", default_value = "gpt-4o-mini")]
    pub llm_model: String,

    /// API key for the completion API (optional for local servers)
    #[arg(long, env = "LLM_API_KEY")]
    pub llm_api_key: Option<String>,

    /// Timeout for a single completion request in milliseconds
    #[arg(long, env = "LLM_TIMEOUT_MS", default_value = "30000")]
    pub llm_timeout_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}
