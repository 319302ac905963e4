//! Order submission and cancellation handlers

use crate::error::AppError;
use crate::models::{
    CancelResponse, CreateOrderRequest, CreateOrderResponse, CreateStopOrderRequest,
    CreateStopOrderResponse, StopOrderView,
};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use engine::{NewOrder, NewStopOrder};
use types::numeric::{Price, Quantity};
use types::order::{OrderType, Side};
use types::stop::StopType;
use types::time::now_iso;

fn missing(field: &str) -> AppError {
    AppError::BadRequest(format!("missing field: {field}"))
}

fn parse_side(side: &str) -> Result<Side, AppError> {
    match side {
        "buy" => Ok(Side::Buy),
        "sell" => Ok(Side::Sell),
        _ => Err(AppError::BadRequest("invalid side. Use: buy or sell".into())),
    }
}

pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, AppError> {
    let symbol = req.symbol.ok_or_else(|| missing("symbol"))?;
    let order_type = req.order_type.ok_or_else(|| missing("order_type"))?;
    let side = req.side.ok_or_else(|| missing("side"))?;
    let quantity = req.quantity.ok_or_else(|| missing("quantity"))?;

    let order_type = match order_type.as_str() {
        "limit" => OrderType::Limit,
        "market" => OrderType::Market,
        "ioc" => OrderType::Ioc,
        "fok" => OrderType::Fok,
        _ => {
            return Err(AppError::BadRequest(
                "invalid order_type. Use: market, limit, ioc, fok".into(),
            ))
        }
    };
    let side = parse_side(&side)?;

    if quantity <= 0.0 {
        return Err(AppError::BadRequest("quantity must be positive".into()));
    }
    let price = if order_type.requires_price() {
        let price = req
            .price
            .ok_or_else(|| AppError::BadRequest(format!("{order_type} order requires price")))?;
        if price <= 0.0 {
            return Err(AppError::BadRequest("price must be positive".into()));
        }
        Price::from_major(price)
    } else {
        Price::ZERO
    };

    let outcome = state.engine.submit_order(NewOrder {
        symbol,
        order_type,
        side,
        quantity: Quantity::from_units(quantity),
        price,
    })?;

    Ok(Json(CreateOrderResponse::from(outcome)))
}

pub async fn create_stop_order(
    State(state): State<AppState>,
    Json(req): Json<CreateStopOrderRequest>,
) -> Result<Json<CreateStopOrderResponse>, AppError> {
    let symbol = req.symbol.ok_or_else(|| missing("symbol"))?;
    let stop_type = req.stop_type.ok_or_else(|| missing("stop_type"))?;
    let side = req.side.ok_or_else(|| missing("side"))?;
    let quantity = req.quantity.ok_or_else(|| missing("quantity"))?;
    let trigger_price = req.trigger_price.ok_or_else(|| missing("trigger_price"))?;

    let stop_type = match stop_type.as_str() {
        "stop_loss" => StopType::StopLoss,
        "stop_limit" => StopType::StopLimit,
        "take_profit" => StopType::TakeProfit,
        "trailing_stop" => StopType::TrailingStop,
        _ => {
            return Err(AppError::BadRequest(
                "invalid stop_type. Use: stop_loss, stop_limit, take_profit, trailing_stop".into(),
            ))
        }
    };
    let side = parse_side(&side)?;

    if quantity <= 0.0 {
        return Err(AppError::BadRequest("quantity must be positive".into()));
    }
    if trigger_price <= 0.0 {
        return Err(AppError::BadRequest("trigger_price must be positive".into()));
    }
    let limit_price = match stop_type {
        StopType::StopLimit => {
            let limit_price = req
                .limit_price
                .ok_or_else(|| AppError::BadRequest("stop_limit requires limit_price".into()))?;
            Price::from_major(limit_price)
        }
        _ => Price::ZERO,
    };
    let trail_amount = match stop_type {
        StopType::TrailingStop => {
            let trail = req
                .trail_amount
                .ok_or_else(|| AppError::BadRequest("trailing_stop requires trail_amount".into()))?;
            Price::from_major(trail)
        }
        _ => Price::ZERO,
    };

    let stop = state.engine.submit_stop_order(NewStopOrder {
        symbol,
        stop_type,
        side,
        quantity: Quantity::from_units(quantity),
        trigger_price: Price::from_major(trigger_price),
        limit_price,
        trail_amount,
        user_id: req.user_id.unwrap_or_default(),
    })?;

    Ok(Json(CreateStopOrderResponse {
        status: "accepted",
        stop_order_id: stop.order_id.clone(),
        order: StopOrderView::from(&stop),
    }))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<CancelResponse>, AppError> {
    let outcome = state.engine.cancel_order(&order_id)?;
    Ok(Json(CancelResponse {
        cancelled: true,
        order_id: outcome.order_id,
        symbol: outcome.symbol,
        timestamp: now_iso(),
    }))
}
