use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/trainers", get(handlers::trainers::list_trainers))
        .route("/api/trainers", post(handlers::trainers::create_trainer))
        .route("/api/trainers/:id", put(handlers::trainers::update_trainer))
        .route(
            "/api/trainers/:id",
            delete(handlers::trainers::delete_trainer),
        )
}
