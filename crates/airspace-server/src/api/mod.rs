//! API routes for the airspace server.

pub mod relay;
mod routes;
pub mod ws;
pub mod zone;

use axum::Router;

pub fn routes() -> Router<std::sync::Arc<crate::state::AppState>> {
    routes::create_router()
}

#[cfg(test)]
mod tests;
