//! Waypoint - backend for AI-assisted mindmap learning

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use waypoint::{config::Args, db::MongoClient, server, server::AppState};
use waypoint_llm::OpenAiClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("waypoint={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("======================================");
    info!("  Waypoint - mindmap learning backend");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("MongoDB: {} (db '{}')", args.mongodb_uri, args.mongodb_db);
    info!("LLM: {} (model '{}')", args.llm_base_url, args.llm_model);
    info!("======================================");

    let mongo = match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
        Ok(client) => client,
        Err(e) => {
            error!("MongoDB connection failed: {}", e);
            std::process::exit(1);
        }
    };

    let llm = match OpenAiClient::new(
        &args.llm_base_url,
        &args.llm_model,
        args.llm_api_key.clone(),
        args.llm_timeout_ms,
    ) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("LLM client setup failed: {}", e);
            std::process::exit(1);
        }
    };

    let state = Arc::new(AppState::new(args, &mongo, llm).await?);

    server::run(state).await?;

    Ok(())
}
