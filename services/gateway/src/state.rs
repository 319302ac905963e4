use crate::handlers::ws::WsHub;
use engine::Engine;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub hub: Arc<WsHub>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(engine: Arc<Engine>, hub: Arc<WsHub>) -> Self {
        Self {
            engine,
            hub,
            started_at: Instant::now(),
        }
    }
}
