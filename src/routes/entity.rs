//! Entity CRUD routes. Paths are parameterized; handlers resolve the
//! resource from the registry by path segment.

use crate::handlers::entity::{create, delete_one, list, read, update};
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::limit::RequestBodyLimitLayer;

const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .route("/:resource", get(list).post(create))
        .route(
            "/:resource/:id",
            get(read).put(update).delete(delete_one),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}
