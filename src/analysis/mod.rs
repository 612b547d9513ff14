pub mod ai_data;
pub mod dto;
pub mod handlers;
pub mod repo;
pub mod validate;
pub mod worker;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}
