use tracing::info;

use crate::db::DbConnection;
use crate::domain::error::BookingError;
use shared::{CreateStationRequest, Station, StationListResponse};

/// Service for managing stations.
#[derive(Clone)]
pub struct StationService {
    db: DbConnection,
}

impl StationService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Create a new station
    pub async fn create_station(
        &self,
        request: CreateStationRequest,
    ) -> Result<Station, BookingError> {
        info!("Creating station: {}", request.name);

        if request.name.trim().is_empty() {
            return Err(BookingError::InvalidInput {
                field: "name",
                message: "station name must not be empty".to_string(),
            });
        }

        let station = self
            .db
            .insert_station(&CreateStationRequest {
                name: request.name.trim().to_string(),
                latitude: request.latitude,
                longitude: request.longitude,
            })
            .await?;

        info!("Created station {} with ID {}", station.name, station.id);
        Ok(station)
    }

    /// List all stations
    pub async fn list_stations(&self) -> Result<StationListResponse, BookingError> {
        let stations = self.db.list_stations().await?;
        info!("Found {} stations", stations.len());
        Ok(StationListResponse { stations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_list_stations() {
        let db = DbConnection::init_test().await.unwrap();
        let service = StationService::new(db);

        let created = service
            .create_station(CreateStationRequest {
                name: "Central".to_string(),
                latitude: 50.45,
                longitude: 30.52,
            })
            .await
            .unwrap();
        assert_eq!(created.name, "Central");

        let listed = service.list_stations().await.unwrap();
        assert_eq!(listed.stations.len(), 1);
        assert_eq!(listed.stations[0], created);
    }

    #[tokio::test]
    async fn test_create_station_rejects_blank_name() {
        let db = DbConnection::init_test().await.unwrap();
        let service = StationService::new(db);

        let err = service
            .create_station(CreateStationRequest {
                name: "   ".to_string(),
                latitude: 0.0,
                longitude: 0.0,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::InvalidInput { .. }));
    }
}
