//! Hosted session endpoint.
//!
//! Exposes a single WebSocket route; everything per-session lives in
//! [`ws`], the request/response correlation in [`rpc`].

pub mod rpc;
pub mod ws;

use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::persona::Persona;
use crate::recipes::RecipeClient;
use crate::Result;

/// Shared state handed to every session
pub struct AppState {
    /// Gateway configuration
    pub config: Config,
    /// Persona announced at session start
    pub persona: Persona,
    /// Recipe provider client, shared across sessions
    pub recipes: RecipeClient,
}

/// The gateway server
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    /// Assemble the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the recipe provider client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let recipes = RecipeClient::new(&config.recipes)?;
        let persona = Persona::basil();
        Ok(Self {
            state: Arc::new(AppState {
                config,
                persona,
                recipes,
            }),
        })
    }

    /// Build the router
    fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/health", get(health))
            .merge(ws::router(Arc::clone(&self.state)))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until the process is stopped
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be bound or the server fails.
    pub async fn run(&self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.state.config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind session endpoint: {e}")))?;

        tracing::info!(port = self.state.config.port, agent = %self.state.persona.name, "session endpoint listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Session(format!("server error: {e}")))?;

        Ok(())
    }
}

/// Liveness probe
async fn health() -> &'static str {
    "ok"
}
