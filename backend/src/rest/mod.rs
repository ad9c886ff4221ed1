//! # REST API Interface Layer
//!
//! HTTP endpoints for the train booking service. This layer handles
//! request/response serialization, query-parameter parsing, and translation
//! of domain errors to HTTP status codes; all business logic lives in the
//! domain services.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use tracing::error;

use crate::db::DbConnection;
use crate::domain::error::BookingError;
use crate::domain::{
    BookingService, CrewService, JourneyService, RouteService, StationService, TrainService,
};
use shared::ErrorResponse;

pub mod catalog_apis;
pub mod journey_apis;
pub mod order_apis;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub stations: StationService,
    pub routes: RouteService,
    pub crews: CrewService,
    pub trains: TrainService,
    pub journeys: JourneyService,
    pub booking: BookingService,
}

impl AppState {
    pub fn new(db: DbConnection) -> Self {
        Self {
            stations: StationService::new(db.clone()),
            routes: RouteService::new(db.clone()),
            crews: CrewService::new(db.clone()),
            trains: TrainService::new(db.clone()),
            journeys: JourneyService::new(db.clone()),
            booking: BookingService::new(db),
        }
    }
}

/// All API routes, to be nested under `/api`.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route(
            "/stations",
            post(catalog_apis::create_station).get(catalog_apis::list_stations),
        )
        .route(
            "/routes",
            post(catalog_apis::create_route).get(catalog_apis::list_routes),
        )
        .route("/routes/:id", get(catalog_apis::get_route))
        .route(
            "/crews",
            post(catalog_apis::create_crew).get(catalog_apis::list_crews),
        )
        .route(
            "/train-types",
            post(catalog_apis::create_train_type).get(catalog_apis::list_train_types),
        )
        .route(
            "/trains",
            post(catalog_apis::create_train).get(catalog_apis::list_trains),
        )
        .route("/trains/:id", get(catalog_apis::get_train))
        .route(
            "/journeys",
            post(journey_apis::create_journey).get(journey_apis::list_journeys),
        )
        .route("/journeys/:id", get(journey_apis::get_journey))
        .route(
            "/journeys/:id/availability",
            get(journey_apis::get_availability),
        )
        .route(
            "/orders",
            post(order_apis::create_order).get(order_apis::list_orders),
        )
        .route("/orders/:id", get(order_apis::get_order))
}

/// The full application router.
pub fn app(state: AppState) -> Router {
    Router::new().nest("/api", api_router()).with_state(state)
}

/// Map a domain failure to its HTTP response.
pub(crate) fn booking_error_response(err: BookingError) -> Response {
    let status = match &err {
        BookingError::CargoOutOfRange { .. }
        | BookingError::SeatOutOfRange { .. }
        | BookingError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        BookingError::SeatAlreadyTaken { .. } => StatusCode::CONFLICT,
        BookingError::NotFound { .. } => StatusCode::NOT_FOUND,
        BookingError::InvalidTrainConfig { .. } | BookingError::Database(_) => {
            error!("Internal error: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// Parse a comma-separated id list query parameter such as `?source=1,2`.
pub(crate) fn parse_id_list(field: &'static str, value: &str) -> Result<Vec<i64>, BookingError> {
    value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<i64>()
                .map_err(|_| BookingError::InvalidInput {
                    field,
                    message: format!("expected comma-separated ids, got {value:?}"),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use shared::{
        CreateJourneyRequest, CreateOrderRequest, CreateRouteRequest, CreateStationRequest,
        CreateTrainRequest, CreateTrainTypeRequest, ErrorResponse, OrderResponse, TicketRequest,
    };
    use tower::ServiceExt;

    async fn setup_app() -> (Router, i64) {
        let db = DbConnection::init_test()
            .await
            .expect("Failed to create test database");
        let state = AppState::new(db);

        let source = state
            .stations
            .create_station(CreateStationRequest {
                name: "Source".to_string(),
                latitude: 0.0,
                longitude: 0.0,
            })
            .await
            .unwrap();
        let destination = state
            .stations
            .create_station(CreateStationRequest {
                name: "Destination".to_string(),
                latitude: 1.0,
                longitude: 1.0,
            })
            .await
            .unwrap();
        let route = state
            .routes
            .create_route(CreateRouteRequest {
                source_id: source.id,
                destination_id: destination.id,
                distance: 100,
            })
            .await
            .unwrap();
        let train_type = state
            .trains
            .create_train_type(CreateTrainTypeRequest {
                name: "Regional".to_string(),
            })
            .await
            .unwrap();
        let train = state
            .trains
            .create_train(CreateTrainRequest {
                name: "Train 1".to_string(),
                cargo_num: 5,
                places_in_cargo: 5,
                train_type_id: train_type.id,
            })
            .await
            .unwrap();
        let journey = state
            .journeys
            .create_journey(CreateJourneyRequest {
                route_id: route.id,
                train_id: train.id,
                departure_time: "2024-02-15T10:00:00+00:00".to_string(),
                arrival_time: "2024-02-15T12:00:00+00:00".to_string(),
                crew_ids: vec![],
            })
            .await
            .unwrap();

        (app(state), journey.id)
    }

    fn post_json<T: serde::Serialize>(uri: &str, body: &T) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn order_request(user_id: i64, journey_id: i64, cargo: i64, seat: i64) -> CreateOrderRequest {
        CreateOrderRequest {
            user_id,
            tickets: vec![TicketRequest {
                journey_id,
                cargo,
                seat,
            }],
        }
    }

    #[tokio::test]
    async fn test_create_order_endpoint() {
        let (app, journey_id) = setup_app().await;

        let response = app
            .oneshot(post_json("/api/orders", &order_request(1, journey_id, 1, 1)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body: OrderResponse = read_json(response).await;
        assert_eq!(body.order.tickets.len(), 1);
    }

    #[tokio::test]
    async fn test_taken_seat_returns_conflict() {
        let (app, journey_id) = setup_app().await;

        let response = app
            .clone()
            .oneshot(post_json("/api/orders", &order_request(1, journey_id, 1, 1)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(post_json("/api/orders", &order_request(2, journey_id, 1, 1)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body: ErrorResponse = read_json(response).await;
        assert!(body.error.contains("already taken"));
    }

    #[tokio::test]
    async fn test_out_of_range_seat_returns_bad_request() {
        let (app, journey_id) = setup_app().await;

        let response = app
            .oneshot(post_json("/api/orders", &order_request(1, journey_id, 1, 6)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = read_json(response).await;
        assert!(body.error.contains("seat must be in range [1, 5]"));
    }

    #[tokio::test]
    async fn test_unknown_journey_returns_not_found() {
        let (app, _) = setup_app().await;

        let response = app
            .clone()
            .oneshot(post_json("/api/orders", &order_request(1, 404, 1, 1)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/journeys/404/availability")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_availability_endpoint() {
        let (app, journey_id) = setup_app().await;

        let response = app
            .clone()
            .oneshot(post_json("/api/orders", &order_request(1, journey_id, 2, 3)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/journeys/{journey_id}/availability"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: shared::AvailabilityResponse = read_json(response).await;
        assert_eq!(body.capacity, 25);
        assert_eq!(body.taken, 1);
        assert_eq!(body.remaining, 24);
    }

    #[tokio::test]
    async fn test_journey_list_with_bad_filter_returns_bad_request() {
        let (app, _) = setup_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/journeys?train=abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_parse_id_list() {
        assert_eq!(parse_id_list("train", "1,2,3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_id_list("train", " 4 , 5 ").unwrap(), vec![4, 5]);
        assert!(parse_id_list("train", "1,x").is_err());
    }
}
