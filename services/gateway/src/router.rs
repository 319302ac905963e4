use crate::handlers::{market, orders, ws};
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/orders", post(orders::create_order))
        .route("/orders/stop", post(orders::create_stop_order))
        .route("/orders/:id", delete(orders::cancel_order))
        .route("/orderbook/:symbol", get(market::get_orderbook))
        .route("/trades/:symbol", get(market::get_trades))
        .route("/stats", get(market::get_stats))
        .route("/health", get(market::health))
        .route("/symbols", get(market::get_symbols))
        .route("/ws", get(ws::ws_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Standalone router for the dedicated observer port: WebSocket only.
pub fn create_ws_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ws::ws_handler))
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
}
