use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/classes", get(handlers::classes::list_classes))
        .route("/api/classes", post(handlers::classes::create_class))
        .route("/api/classes/:id", put(handlers::classes::update_class))
        .route("/api/classes/:id", delete(handlers::classes::delete_class))
}
