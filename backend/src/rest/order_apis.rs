//! Handlers for ticket orders.
//!
//! Authentication is an external collaborator; callers identify themselves
//! with an opaque `user_id`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use tracing::info;

use super::{booking_error_response, AppState};
use shared::CreateOrderRequest;

/// Query parameters for order listing
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub user_id: i64,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/orders - user: {}, tickets: {}",
        request.user_id,
        request.tickets.len()
    );

    match state.booking.create_order(request).await {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(e) => booking_error_response(e),
    }
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> impl IntoResponse {
    info!("GET /api/orders - query: {:?}", query);

    match state
        .booking
        .list_orders(query.user_id, query.page, query.page_size)
        .await
    {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => booking_error_response(e),
    }
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/orders/{}", id);

    match state.booking.get_order(id).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => booking_error_response(e),
    }
}
