//! Axum-based RPC server.

use std::future::Future;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use coffer_service::CofferService;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::error::RpcError;
use crate::handlers;

/// Build the router over a shared service handle.
pub fn create_router(service: Arc<CofferService>) -> Router {
    Router::new()
        // Exchange endpoints
        .route("/deposit", post(handlers::deposit))
        .route("/redeem", post(handlers::redeem))
        .route("/top_up", post(handlers::top_up))
        // Transfer endpoints
        .route("/transfer", post(handlers::transfer))
        .route("/transfer_from", post(handlers::transfer_from))
        .route("/approve", post(handlers::approve))
        // Privileged endpoints
        .route("/mint", post(handlers::mint))
        .route("/burn", post(handlers::burn))
        .route("/rate", get(handlers::rate).post(handlers::set_rate))
        // Views
        .route("/account/:address", get(handlers::account))
        .route("/summary", get(handlers::summary))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// The RPC server, configured with a port and the shared service.
pub struct RpcServer {
    port: u16,
    service: Arc<CofferService>,
}

impl RpcServer {
    pub fn new(port: u16, service: Arc<CofferService>) -> Self {
        Self { port, service }
    }

    /// Serve requests until `shutdown` resolves, then drain and return.
    pub async fn start_with_shutdown(
        &self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), RpcError> {
        let app = create_router(Arc::clone(&self.service));
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {addr}: {e}")))?;
        info!("rpc server listening on {}", addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))?;
        Ok(())
    }

    /// Serve requests until the process exits.
    pub async fn start(&self) -> Result<(), RpcError> {
        self.start_with_shutdown(std::future::pending()).await
    }
}
