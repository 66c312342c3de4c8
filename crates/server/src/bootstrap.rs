use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use orderflow_agent::prompt::SYSTEM_JA;
use orderflow_agent::{AnthropicClient, DraftExtractor, LlmClient, OllamaClient};
use orderflow_core::config::{AppConfig, LlmProvider};

use crate::middleware::RateLimiter;
use crate::routes::{self, AppState};

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
    pub rate_limiter: RateLimiter,
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application> {
    let client: Arc<dyn LlmClient> = match config.llm.provider {
        LlmProvider::Anthropic => {
            Arc::new(AnthropicClient::new(&config.llm, Some(SYSTEM_JA.to_string()))?)
        }
        LlmProvider::Ollama => {
            Arc::new(OllamaClient::new(&config.llm, Some(SYSTEM_JA.to_string()))?)
        }
    };
    info!(
        event_name = "system.bootstrap.llm_client",
        provider = ?config.llm.provider,
        model = %config.llm.model,
        "extraction client initialized"
    );

    let state = AppState { extractor: Arc::new(DraftExtractor::new(client)) };
    let rate_limiter = RateLimiter::per_minute(config.server.rate_limit_per_minute);

    Ok(Application { config, state, rate_limiter })
}

impl Application {
    pub async fn serve(self) -> Result<()> {
        let address: SocketAddr = format!(
            "{}:{}",
            self.config.server.bind_address, self.config.server.port
        )
        .parse()
        .context("invalid bind address")?;

        let app = routes::app(self.state, self.rate_limiter)
            .into_make_service_with_connect_info::<SocketAddr>();
        let listener = tokio::net::TcpListener::bind(address).await?;

        info!(
            event_name = "system.server.started",
            bind_address = %address,
            "orderflow-server started"
        );

        axum::serve(listener, app).with_graceful_shutdown(wait_for_shutdown()).await?;

        info!(event_name = "system.server.stopped", "orderflow-server stopped");
        Ok(())
    }
}

async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
    info!(event_name = "system.server.stopping", "shutdown signal received");
}
