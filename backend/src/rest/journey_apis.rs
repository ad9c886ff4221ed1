//! Handlers for journeys and seat availability.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use tracing::info;

use super::{booking_error_response, parse_id_list, AppState};
use shared::CreateJourneyRequest;

/// Query parameters for journey listing
#[derive(Debug, Deserialize)]
pub struct JourneyListQuery {
    /// Comma-separated train ids, e.g. `?train=2,5`
    pub train: Option<String>,
    /// Departure calendar date, e.g. `?departure_time=2024-02-15`
    pub departure_time: Option<String>,
    /// Arrival calendar date, e.g. `?arrival_time=2024-02-15`
    pub arrival_time: Option<String>,
}

pub async fn create_journey(
    State(state): State<AppState>,
    Json(request): Json<CreateJourneyRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/journeys - route: {}, train: {}",
        request.route_id, request.train_id
    );

    match state.journeys.create_journey(request).await {
        Ok(journey) => (StatusCode::CREATED, Json(journey)).into_response(),
        Err(e) => booking_error_response(e),
    }
}

pub async fn list_journeys(
    State(state): State<AppState>,
    Query(query): Query<JourneyListQuery>,
) -> impl IntoResponse {
    info!("GET /api/journeys - query: {:?}", query);

    let train_ids = match query.train.as_deref().map(|t| parse_id_list("train", t)) {
        Some(Ok(ids)) => Some(ids),
        Some(Err(e)) => return booking_error_response(e),
        None => None,
    };

    match state
        .journeys
        .list_journeys(train_ids, query.departure_time, query.arrival_time)
        .await
    {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => booking_error_response(e),
    }
}

pub async fn get_journey(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/journeys/{}", id);

    match state.journeys.get_journey(id).await {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(e) => booking_error_response(e),
    }
}

pub async fn get_availability(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/journeys/{}/availability", id);

    match state.journeys.availability(id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => booking_error_response(e),
    }
}
