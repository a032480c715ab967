pub mod dto;
pub mod filter;
pub mod handlers;
mod images;
pub mod repo;
pub mod repo_types;

use crate::state::AppState;
use axum::Router;

pub use repo_types::{Product, LOW_STOCK_THRESHOLD};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}
