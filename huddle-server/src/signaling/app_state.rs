use crate::coordinator::SessionCoordinator;
use crate::registry::{RegistryStats, RoomRegistry};
use crate::room::RoomPolicy;
use crate::signaling::{SignalingService, ws_handler};
use crate::transport::TransportConfig;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

/// Shared state behind every route.
#[derive(Clone)]
pub struct AppState {
    pub signaling: SignalingService,
    pub coordinator: SessionCoordinator,
}

impl AppState {
    pub fn new(transport: TransportConfig, room_policy: RoomPolicy) -> Self {
        let signaling = SignalingService::new(transport);
        let output = Arc::new(signaling.clone());
        let registry = RoomRegistry::new(output.clone(), room_policy);
        let coordinator = SessionCoordinator::new(registry, output);

        Self {
            signaling,
            coordinator,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .with_state(state)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<RegistryStats> {
    Json(state.coordinator.stats())
}
