use std::net::SocketAddr;

use tracing::info;

use todolist_web::server::{WebServerConfig, DEFAULT_PLACEHOLDER};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let web_addr: SocketAddr = std::env::var("TODOLIST_WEB_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8000".to_string())
        .parse()?;

    let cfg = WebServerConfig {
        input_placeholder: std::env::var("TODOLIST_INPUT_PLACEHOLDER")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string()),
    };

    info!(
        "Starting To-Do lists on http://{} (placeholder: {:?})",
        web_addr, cfg.input_placeholder
    );

    todolist_web::server::serve(web_addr, cfg).await
}
