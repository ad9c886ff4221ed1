//! Handlers for the administrative catalog: stations, routes, crews, train
//! types, and trains.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use tracing::info;

use super::{booking_error_response, parse_id_list, AppState};
use shared::{
    CreateCrewRequest, CreateRouteRequest, CreateStationRequest, CreateTrainRequest,
    CreateTrainTypeRequest,
};

pub async fn create_station(
    State(state): State<AppState>,
    Json(request): Json<CreateStationRequest>,
) -> impl IntoResponse {
    info!("POST /api/stations - name: {}", request.name);

    match state.stations.create_station(request).await {
        Ok(station) => (StatusCode::CREATED, Json(station)).into_response(),
        Err(e) => booking_error_response(e),
    }
}

pub async fn list_stations(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/stations");

    match state.stations.list_stations().await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => booking_error_response(e),
    }
}

/// Query parameters for route listing
#[derive(Debug, Deserialize)]
pub struct RouteListQuery {
    /// Comma-separated source station ids, e.g. `?source=1,2`
    pub source: Option<String>,
}

pub async fn create_route(
    State(state): State<AppState>,
    Json(request): Json<CreateRouteRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/routes - {} -> {}",
        request.source_id, request.destination_id
    );

    match state.routes.create_route(request).await {
        Ok(route) => (StatusCode::CREATED, Json(route)).into_response(),
        Err(e) => booking_error_response(e),
    }
}

pub async fn list_routes(
    State(state): State<AppState>,
    Query(query): Query<RouteListQuery>,
) -> impl IntoResponse {
    info!("GET /api/routes - query: {:?}", query);

    let source_ids = match query.source.as_deref().map(|s| parse_id_list("source", s)) {
        Some(Ok(ids)) => Some(ids),
        Some(Err(e)) => return booking_error_response(e),
        None => None,
    };

    match state.routes.list_routes(source_ids).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => booking_error_response(e),
    }
}

pub async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/routes/{}", id);

    match state.routes.get_route(id).await {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(e) => booking_error_response(e),
    }
}

pub async fn create_crew(
    State(state): State<AppState>,
    Json(request): Json<CreateCrewRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/crews - {} {}",
        request.first_name, request.last_name
    );

    match state.crews.create_crew(request).await {
        Ok(crew) => (StatusCode::CREATED, Json(crew)).into_response(),
        Err(e) => booking_error_response(e),
    }
}

pub async fn list_crews(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/crews");

    match state.crews.list_crews().await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => booking_error_response(e),
    }
}

pub async fn create_train_type(
    State(state): State<AppState>,
    Json(request): Json<CreateTrainTypeRequest>,
) -> impl IntoResponse {
    info!("POST /api/train-types - name: {}", request.name);

    match state.trains.create_train_type(request).await {
        Ok(train_type) => (StatusCode::CREATED, Json(train_type)).into_response(),
        Err(e) => booking_error_response(e),
    }
}

pub async fn list_train_types(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/train-types");

    match state.trains.list_train_types().await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => booking_error_response(e),
    }
}

pub async fn create_train(
    State(state): State<AppState>,
    Json(request): Json<CreateTrainRequest>,
) -> impl IntoResponse {
    info!("POST /api/trains - name: {}", request.name);

    match state.trains.create_train(request).await {
        Ok(train) => (StatusCode::CREATED, Json(train)).into_response(),
        Err(e) => booking_error_response(e),
    }
}

pub async fn list_trains(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/trains");

    match state.trains.list_trains().await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => booking_error_response(e),
    }
}

pub async fn get_train(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/trains/{}", id);

    match state.trains.get_train(id).await {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(e) => booking_error_response(e),
    }
}
