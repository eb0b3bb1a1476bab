use crate::{
    Error, Result,
    pipeline::Animator,
    rig::{AnimationOutput, AnimationRequest, OutputMode},
};
use axum::{
    extract::{State, rejection::JsonRejection},
    response::Json,
};
use std::sync::Arc;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub animator: Arc<Animator>,
}

impl AppState {
    pub fn new(animator: Animator) -> Self {
        Self {
            animator: Arc::new(animator),
        }
    }
}

type Payload = std::result::Result<Json<AnimationRequest>, JsonRejection>;

/// Frames of absolute positions from the model, returned as deltas.
pub async fn generate_deformations(
    State(state): State<AppState>,
    payload: Payload,
) -> Result<Json<AnimationOutput>> {
    generate(state, OutputMode::Keyframes, payload).await
}

pub async fn generate_animation(
    State(state): State<AppState>,
    payload: Payload,
) -> Result<Json<AnimationOutput>> {
    generate(state, OutputMode::Animation, payload).await
}

pub async fn generate_pose(
    State(state): State<AppState>,
    payload: Payload,
) -> Result<Json<AnimationOutput>> {
    generate(state, OutputMode::Pose, payload).await
}

pub async fn health() -> &'static str {
    "ok"
}

async fn generate(
    state: AppState,
    mode: OutputMode,
    payload: Payload,
) -> Result<Json<AnimationOutput>> {
    let request_id = Uuid::new_v4();
    let span = info_span!("generate", %request_id, %mode);

    async move {
        let result = match payload {
            Ok(Json(request)) => {
                info!(
                    "Received {} request with {} control points",
                    mode,
                    request.control_points.len()
                );
                state.animator.process(mode, request).await
            }
            Err(rejection) => Err(Error::bad_request(format!(
                "Invalid JSON payload: {}",
                rejection.body_text()
            ))),
        };

        match result {
            Ok(output) => Ok(Json(output)),
            Err(e) if e.is_client_error() => {
                warn!("Rejected request: {}", e);
                Err(e)
            }
            Err(e) => {
                error!("Failed to generate deformations: {}", e);
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}
