//! Query surface: depth, trades, stats, health, symbols

use crate::error::AppError;
use crate::models::{
    DepthQuery, HealthResponse, LevelView, OrderBookResponse, QuoteView, StatsResponse,
    SymbolsResponse, TradesQuery, TradesResponse, TradeView,
};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use std::collections::BTreeMap;
use types::time::now_iso;

const DEFAULT_DEPTH: usize = 10;
const DEFAULT_TRADE_LIMIT: usize = 50;

pub async fn get_orderbook(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<DepthQuery>,
) -> Result<Json<OrderBookResponse>, AppError> {
    let depth = query.depth.unwrap_or(DEFAULT_DEPTH);
    let snapshot = state
        .engine
        .orderbook(&symbol, depth)
        .ok_or_else(|| AppError::NotFound("symbol not found".into()))?;

    let best_bid = snapshot.best_bid.map(|p| p.as_major());
    let best_ask = snapshot.best_ask.map(|p| p.as_major());
    let spread = match (best_bid, best_ask) {
        (Some(bid), Some(ask)) => Some(ask - bid),
        _ => None,
    };

    Ok(Json(OrderBookResponse {
        symbol: snapshot.symbol,
        bids: snapshot.bids.iter().map(LevelView::from).collect(),
        asks: snapshot.asks.iter().map(LevelView::from).collect(),
        best_bid,
        best_ask,
        spread,
        timestamp: now_iso(),
    }))
}

pub async fn get_trades(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<TradesQuery>,
) -> Json<TradesResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_TRADE_LIMIT);
    let trades: Vec<TradeView> = state
        .engine
        .recent_trades(&symbol, limit)
        .iter()
        .map(TradeView::from)
        .collect();
    let count = trades.len();

    Json(TradesResponse {
        symbol,
        trades,
        count,
    })
}

pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.engine.stats();
    let symbols: BTreeMap<String, QuoteView> = stats
        .symbols
        .into_iter()
        .map(|quote| {
            (
                quote.symbol,
                QuoteView {
                    best_bid: quote.best_bid.map(|p| p.as_major()),
                    best_ask: quote.best_ask.map(|p| p.as_major()),
                },
            )
        })
        .collect();

    Json(StatsResponse {
        total_orders: stats.total_orders,
        total_trades: stats.total_trades,
        ws_clients: stats.ws_clients,
        symbols_count: symbols.len(),
        symbols,
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        uptime_seconds: state.started_at.elapsed().as_secs(),
        ws_clients: state.engine.ws_clients(),
    })
}

pub async fn get_symbols(State(state): State<AppState>) -> Json<SymbolsResponse> {
    let symbols = state.engine.symbols();
    let count = symbols.len();
    Json(SymbolsResponse { symbols, count })
}
