//! HTTP server assembly and startup

use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use crate::core::{Config, ServerState};

/// Request log middleware: one access line per request, plus a bump
/// of the per-resource counter
async fn log_request(
    axum::extract::State(state): axum::extract::State<ServerState>,
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = uuid::Uuid::new_v4();

    if let Some(resource) = resource_name(uri.path()) {
        state.metrics.increment(resource);
    }

    let response = next.run(request).await;
    let status = response.status();

    tracing::info!(target: "http_access", %request_id, "{} {} {}", method, uri, status);
    response
}

/// `/api/orders/SO-1/status` -> `orders`
fn resource_name(path: &str) -> Option<&str> {
    path.strip_prefix("/api/")?.split('/').next()
}

/// Build the router without state attached
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(crate::api::health::router())
        .merge(crate::api::products::router())
        .merge(crate::api::customers::router())
        .merge(crate::api::orders::router())
        .merge(crate::api::dashboard::router())
}

/// Build the complete application: routes, state, and middleware
pub fn build_router(state: ServerState) -> Router {
    build_app()
        .layer(middleware::from_fn_with_state(state.clone(), log_request))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
}

/// HTTP server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create a server over an already-initialized state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config)?,
        };

        let app = build_router(state);

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Store server listening on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
            })
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_name() {
        assert_eq!(resource_name("/api/orders/SO-1/status"), Some("orders"));
        assert_eq!(resource_name("/api/products"), Some("products"));
        assert_eq!(resource_name("/health"), None);
    }
}
