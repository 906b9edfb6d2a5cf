use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use crate::api::handlers::{
    handle_cancel, handle_credit, handle_generate_general, handle_generate_spec, handle_health, handle_result,
};
use crate::generation::Gateway;

pub struct SpecServer {
    pub port: u16,
    pub gateway: Arc<Gateway>,
}

pub fn router(gateway: Arc<Gateway>) -> Router {
    let generation = Router::new()
        .route("/generate-spec", post(handle_generate_spec))
        .route("/generate-general-spec", post(handle_generate_general))
        .route("/result/:task_id", get(handle_result))
        .route("/cancel/:task_id", post(handle_cancel))
        .route("/credit", get(handle_credit));

    Router::new()
        .route("/health", get(handle_health))
        .nest("/api/v1/generation", generation)
        .with_state(gateway)
}

impl SpecServer {
    pub fn new(port: u16, gateway: Arc<Gateway>) -> Self {
        Self { port, gateway }
    }

    pub async fn start(&self) -> Result<(), String> {
        let app = router(self.gateway.clone());
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!(%addr, "specgen listening");
        axum::Server::bind(&addr)
            .serve(app.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|err| err.to_string())
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
