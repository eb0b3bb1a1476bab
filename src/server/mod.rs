pub mod handlers;

pub use handlers::AppState;

use crate::{Result, config::Config, pipeline::Animator};
use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/generate-deformations",
            post(handlers::generate_deformations),
        )
        .route("/generate-animation", post(handlers::generate_animation))
        .route("/generate-pose", post(handlers::generate_pose))
        .route("/health", get(handlers::health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    let animator = Animator::new(&config.llm)?;
    let app = router(AppState::new(animator));

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
