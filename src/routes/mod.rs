use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

mod tokens;

pub fn router() -> Router<Arc<AppState>> {
    tokens::router()
}
