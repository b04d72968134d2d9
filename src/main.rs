mod config;
mod handlers;
mod models;
mod prompts;
mod server;
mod services;

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::sync::Arc;

use config::Config;
use handlers::AnalysisHandler;
use server::create_router;
use services::{OpenAiService, VisionService};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before the logger reads RUST_LOG
    dotenv().ok();

    env_logger::init();

    log::info!("🚀 Starting Meal Lens nutrition API...");

    let config = Config::from_env()?;

    if config.openai_api_key.is_none() {
        log::warn!("⚠️ OPENAI_API_KEY not set, analysis requests will fail until it is configured");
    }

    let vision: Arc<dyn VisionService> = Arc::new(OpenAiService::new(
        config.openai_base_url.clone(),
        config.openai_model.clone(),
    ));
    log::info!("✅ OpenAI service initialized with model: {}", config.openai_model);

    let analysis_handler = Arc::new(AnalysisHandler::new(vision, config.openai_api_key.clone()));
    let app = create_router(analysis_handler, config.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    log::info!("🌐 Server listening on {}", config.bind_addr);
    log::info!("📸 Analysis endpoint: POST {}", server::ANALYZE_PATH);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    log::info!("🛑 Shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("❌ Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
