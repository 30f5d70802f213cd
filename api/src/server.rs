use crate::{create_router, AppState};
use tokio::task::JoinHandle;
use tracing::info;

/// API server configuration
pub struct ApiConfig {
    /// Port to listen on
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { port: 12475 }
    }
}

impl ApiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

/// Start the API server with the given configuration.
pub async fn start_server(
    state: AppState,
    config: ApiConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("API server listening on {}", addr);
    info!(
        "OpenAPI document available at http://localhost:{}/api/openapi.json",
        config.port
    );

    axum::serve(listener, app).await?;

    Ok(())
}

/// Start the API server in a background task.
pub fn spawn_server(state: AppState, config: ApiConfig) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = start_server(state, config).await {
            tracing::error!("API server error: {}", e);
        }
    })
}
