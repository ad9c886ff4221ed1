use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use crate::db::{DbConnection, JourneyFilter};
use crate::domain::error::BookingError;
use crate::domain::seating;
use shared::{
    AvailabilityResponse, CreateJourneyRequest, Journey, JourneyDetail, JourneyListResponse,
    RouteDetail, TrainDetail,
};

/// Service for managing journeys and their seat availability.
#[derive(Clone)]
pub struct JourneyService {
    db: DbConnection,
}

impl JourneyService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Create a new journey.
    ///
    /// Timestamps are normalized to UTC so that text ordering in the store
    /// matches chronological ordering.
    pub async fn create_journey(
        &self,
        request: CreateJourneyRequest,
    ) -> Result<Journey, BookingError> {
        info!(
            "Creating journey: route={} train={} departing {}",
            request.route_id, request.train_id, request.departure_time
        );

        let departure = parse_timestamp("departure_time", &request.departure_time)?;
        let arrival = parse_timestamp("arrival_time", &request.arrival_time)?;

        self.db
            .get_route(request.route_id)
            .await?
            .ok_or_else(|| BookingError::not_found("route", request.route_id))?;
        self.db
            .get_train(request.train_id)
            .await?
            .ok_or_else(|| BookingError::not_found("train", request.train_id))?;
        for crew_id in &request.crew_ids {
            self.db
                .get_crew(*crew_id)
                .await?
                .ok_or_else(|| BookingError::not_found("crew", *crew_id))?;
        }

        let journey = self
            .db
            .insert_journey(&request, &departure.to_rfc3339(), &arrival.to_rfc3339())
            .await?;

        info!("Created journey with ID {}", journey.id);
        Ok(journey)
    }

    /// List journeys, newest departure first, annotated with seat occupancy.
    ///
    /// Date filters match the calendar date of the timestamp, mirroring the
    /// `?departure_time=2024-02-15` query convention.
    pub async fn list_journeys(
        &self,
        train_ids: Option<Vec<i64>>,
        departure_date: Option<String>,
        arrival_date: Option<String>,
    ) -> Result<JourneyListResponse, BookingError> {
        let filter = JourneyFilter {
            train_ids,
            departure_date: departure_date
                .map(|d| parse_date("departure_time", &d))
                .transpose()?,
            arrival_date: arrival_date
                .map(|d| parse_date("arrival_time", &d))
                .transpose()?,
        };

        let journeys = self.db.list_journeys(&filter).await?;
        info!("Found {} journeys", journeys.len());
        Ok(JourneyListResponse { journeys })
    }

    /// Get a journey with route, train, and crew embedded
    pub async fn get_journey(&self, journey_id: i64) -> Result<JourneyDetail, BookingError> {
        let journey = self
            .db
            .get_journey(journey_id)
            .await?
            .ok_or_else(|| BookingError::not_found("journey", journey_id))?;

        let route = self.route_detail(journey.route_id).await?;
        let train = self.train_detail(journey.train_id).await?;
        let crews = self.db.journey_crews(journey_id).await?;

        Ok(JourneyDetail {
            id: journey.id,
            route,
            train,
            departure_time: journey.departure_time,
            arrival_time: journey.arrival_time,
            crews,
        })
    }

    /// Read-side seat availability for a journey.
    ///
    /// This is a listing aggregate only; the write path never consults it.
    pub async fn availability(
        &self,
        journey_id: i64,
    ) -> Result<AvailabilityResponse, BookingError> {
        let journey = self
            .db
            .get_journey(journey_id)
            .await?
            .ok_or_else(|| BookingError::not_found("journey", journey_id))?;
        let train = self
            .db
            .get_train(journey.train_id)
            .await?
            .ok_or_else(|| BookingError::not_found("train", journey.train_id))?;

        let capacity = seating::capacity(train.cargo_num, train.places_in_cargo)?;
        let taken = self.db.count_tickets(journey_id).await?;

        Ok(AvailabilityResponse {
            journey_id,
            capacity,
            taken,
            remaining: capacity - taken,
        })
    }

    async fn route_detail(&self, route_id: i64) -> Result<RouteDetail, BookingError> {
        let route = self
            .db
            .get_route(route_id)
            .await?
            .ok_or_else(|| BookingError::not_found("route", route_id))?;
        let source = self
            .db
            .get_station(route.source_id)
            .await?
            .ok_or_else(|| BookingError::not_found("station", route.source_id))?;
        let destination = self
            .db
            .get_station(route.destination_id)
            .await?
            .ok_or_else(|| BookingError::not_found("station", route.destination_id))?;

        Ok(RouteDetail {
            id: route.id,
            source,
            destination,
            distance: route.distance,
        })
    }

    async fn train_detail(&self, train_id: i64) -> Result<TrainDetail, BookingError> {
        let train = self
            .db
            .get_train(train_id)
            .await?
            .ok_or_else(|| BookingError::not_found("train", train_id))?;
        let train_type = self
            .db
            .get_train_type(train.train_type_id)
            .await?
            .ok_or_else(|| BookingError::not_found("train type", train.train_type_id))?;
        let capacity = seating::capacity(train.cargo_num, train.places_in_cargo)?;

        Ok(TrainDetail {
            id: train.id,
            name: train.name,
            cargo_num: train.cargo_num,
            places_in_cargo: train.places_in_cargo,
            train_type,
            capacity,
        })
    }
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, BookingError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| BookingError::InvalidInput {
            field,
            message: format!("expected RFC 3339 timestamp, got {value:?}: {e}"),
        })
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, BookingError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| BookingError::InvalidInput {
        field,
        message: format!("expected YYYY-MM-DD date, got {value:?}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::route_service::RouteService;
    use crate::domain::station_service::StationService;
    use crate::domain::train_service::TrainService;
    use shared::{
        CreateRouteRequest, CreateStationRequest, CreateTrainRequest, CreateTrainTypeRequest,
    };

    async fn seed_route(db: &DbConnection) -> i64 {
        let stations = StationService::new(db.clone());
        let source = stations
            .create_station(CreateStationRequest {
                name: "Source".to_string(),
                latitude: 0.0,
                longitude: 0.0,
            })
            .await
            .unwrap();
        let destination = stations
            .create_station(CreateStationRequest {
                name: "Destination".to_string(),
                latitude: 1.0,
                longitude: 1.0,
            })
            .await
            .unwrap();
        RouteService::new(db.clone())
            .create_route(CreateRouteRequest {
                source_id: source.id,
                destination_id: destination.id,
                distance: 100,
            })
            .await
            .unwrap()
            .id
    }

    async fn seed_train(db: &DbConnection, name: &str) -> i64 {
        let trains = TrainService::new(db.clone());
        let train_type = trains
            .create_train_type(CreateTrainTypeRequest {
                name: format!("{name} type"),
            })
            .await
            .unwrap();
        trains
            .create_train(CreateTrainRequest {
                name: name.to_string(),
                cargo_num: 5,
                places_in_cargo: 5,
                train_type_id: train_type.id,
            })
            .await
            .unwrap()
            .id
    }

    fn journey_request(route_id: i64, train_id: i64, departure: &str) -> CreateJourneyRequest {
        CreateJourneyRequest {
            route_id,
            train_id,
            departure_time: departure.to_string(),
            arrival_time: "2024-02-15T12:00:00+00:00".to_string(),
            crew_ids: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_journey_rejects_bad_timestamp() {
        let db = DbConnection::init_test().await.unwrap();
        let service = JourneyService::new(db.clone());
        let route_id = seed_route(&db).await;
        let train_id = seed_train(&db, "Train 1").await;

        let mut request = journey_request(route_id, train_id, "2024-02-15T10:00:00+00:00");
        request.departure_time = "yesterday".to_string();
        let err = service.create_journey(request).await.unwrap_err();
        assert!(matches!(err, BookingError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_create_journey_rejects_unknown_crew() {
        let db = DbConnection::init_test().await.unwrap();
        let service = JourneyService::new(db.clone());
        let route_id = seed_route(&db).await;
        let train_id = seed_train(&db, "Train 1").await;

        let mut request = journey_request(route_id, train_id, "2024-02-15T10:00:00+00:00");
        request.crew_ids = vec![99];
        let err = service.create_journey(request).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::NotFound { entity: "crew", id: 99 }
        ));
    }

    #[tokio::test]
    async fn test_filter_journeys_by_train() {
        let db = DbConnection::init_test().await.unwrap();
        let service = JourneyService::new(db.clone());
        let route_id = seed_route(&db).await;
        let train1 = seed_train(&db, "Train 1").await;
        let train2 = seed_train(&db, "Train 2").await;

        let journey1 = service
            .create_journey(journey_request(route_id, train1, "2024-02-15T10:00:00+00:00"))
            .await
            .unwrap();
        service
            .create_journey(journey_request(route_id, train2, "2024-02-16T10:00:00+00:00"))
            .await
            .unwrap();

        let all = service.list_journeys(None, None, None).await.unwrap();
        assert_eq!(all.journeys.len(), 2);

        let filtered = service
            .list_journeys(Some(vec![train1]), None, None)
            .await
            .unwrap();
        assert_eq!(filtered.journeys.len(), 1);
        assert_eq!(filtered.journeys[0].id, journey1.id);
        assert_eq!(filtered.journeys[0].train_name, "Train 1");
    }

    #[tokio::test]
    async fn test_filter_journeys_by_departure_date() {
        let db = DbConnection::init_test().await.unwrap();
        let service = JourneyService::new(db.clone());
        let route_id = seed_route(&db).await;
        let train_id = seed_train(&db, "Train 1").await;

        let on_day = service
            .create_journey(journey_request(route_id, train_id, "2024-02-15T08:30:00+00:00"))
            .await
            .unwrap();
        service
            .create_journey(journey_request(route_id, train_id, "2024-02-16T08:30:00+00:00"))
            .await
            .unwrap();

        let filtered = service
            .list_journeys(None, Some("2024-02-15".to_string()), None)
            .await
            .unwrap();
        assert_eq!(filtered.journeys.len(), 1);
        assert_eq!(filtered.journeys[0].id, on_day.id);

        let err = service
            .list_journeys(None, Some("15/02/2024".to_string()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_list_journeys_newest_departure_first() {
        let db = DbConnection::init_test().await.unwrap();
        let service = JourneyService::new(db.clone());
        let route_id = seed_route(&db).await;
        let train_id = seed_train(&db, "Train 1").await;

        let early = service
            .create_journey(journey_request(route_id, train_id, "2024-02-10T08:00:00+00:00"))
            .await
            .unwrap();
        let late = service
            .create_journey(journey_request(route_id, train_id, "2024-03-10T08:00:00+00:00"))
            .await
            .unwrap();

        let listed = service.list_journeys(None, None, None).await.unwrap();
        assert_eq!(listed.journeys[0].id, late.id);
        assert_eq!(listed.journeys[1].id, early.id);
    }

    #[tokio::test]
    async fn test_availability_for_fresh_journey() {
        let db = DbConnection::init_test().await.unwrap();
        let service = JourneyService::new(db.clone());
        let route_id = seed_route(&db).await;
        let train_id = seed_train(&db, "Train 1").await;

        let journey = service
            .create_journey(journey_request(route_id, train_id, "2024-02-15T10:00:00+00:00"))
            .await
            .unwrap();

        let availability = service.availability(journey.id).await.unwrap();
        assert_eq!(availability.capacity, 25);
        assert_eq!(availability.taken, 0);
        assert_eq!(availability.remaining, 25);

        let err = service.availability(999).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_journey_detail_embeds_context() {
        let db = DbConnection::init_test().await.unwrap();
        let service = JourneyService::new(db.clone());
        let route_id = seed_route(&db).await;
        let train_id = seed_train(&db, "Train 1").await;

        let crew = crate::domain::crew_service::CrewService::new(db.clone())
            .create_crew(shared::CreateCrewRequest {
                first_name: "Jane".to_string(),
                last_name: "Smith".to_string(),
            })
            .await
            .unwrap();

        let mut request = journey_request(route_id, train_id, "2024-02-15T10:00:00+00:00");
        request.crew_ids = vec![crew.id];
        let journey = service.create_journey(request).await.unwrap();

        let detail = service.get_journey(journey.id).await.unwrap();
        assert_eq!(detail.route.source.name, "Source");
        assert_eq!(detail.train.capacity, 25);
        assert_eq!(detail.crews.len(), 1);
        assert_eq!(detail.crews[0].full_name(), "Jane Smith");
    }
}
