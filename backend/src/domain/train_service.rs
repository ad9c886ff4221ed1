use tracing::info;

use crate::db::DbConnection;
use crate::domain::error::BookingError;
use crate::domain::seating;
use shared::{
    CreateTrainRequest, CreateTrainTypeRequest, Train, TrainDetail, TrainListResponse, TrainType,
    TrainTypeListResponse,
};

/// Service for managing train types and trains.
#[derive(Clone)]
pub struct TrainService {
    db: DbConnection,
}

impl TrainService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn create_train_type(
        &self,
        request: CreateTrainTypeRequest,
    ) -> Result<TrainType, BookingError> {
        info!("Creating train type: {}", request.name);

        if request.name.trim().is_empty() {
            return Err(BookingError::InvalidInput {
                field: "name",
                message: "train type name must not be empty".to_string(),
            });
        }

        let train_type = self
            .db
            .insert_train_type(&CreateTrainTypeRequest {
                name: request.name.trim().to_string(),
            })
            .await?;

        info!("Created train type {} with ID {}", train_type.name, train_type.id);
        Ok(train_type)
    }

    pub async fn list_train_types(&self) -> Result<TrainTypeListResponse, BookingError> {
        let train_types = self.db.list_train_types().await?;
        info!("Found {} train types", train_types.len());
        Ok(TrainTypeListResponse { train_types })
    }

    /// Create a new train.
    ///
    /// The layout must describe at least one seat; capacity is derived, never
    /// stored.
    pub async fn create_train(&self, request: CreateTrainRequest) -> Result<Train, BookingError> {
        info!(
            "Creating train: {} ({} cargos x {} places)",
            request.name, request.cargo_num, request.places_in_cargo
        );

        // rejects non-positive layouts up front
        seating::capacity(request.cargo_num, request.places_in_cargo)?;

        self.db
            .get_train_type(request.train_type_id)
            .await?
            .ok_or_else(|| BookingError::not_found("train type", request.train_type_id))?;

        let train = self.db.insert_train(&request).await?;
        info!("Created train {} with ID {}", train.name, train.id);
        Ok(train)
    }

    pub async fn list_trains(&self) -> Result<TrainListResponse, BookingError> {
        let trains = self.db.list_trains().await?;
        info!("Found {} trains", trains.len());
        Ok(TrainListResponse { trains })
    }

    /// Get a train with its type embedded and capacity reported
    pub async fn get_train(&self, train_id: i64) -> Result<TrainDetail, BookingError> {
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

#[cfg(test)]
mod tests {
    use super::*;

    async fn sample_train_type(service: &TrainService) -> i64 {
        service
            .create_train_type(CreateTrainTypeRequest {
                name: "Intercity".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_create_train_and_detail_capacity() {
        let db = DbConnection::init_test().await.unwrap();
        let service = TrainService::new(db);

        let type_id = sample_train_type(&service).await;
        let train = service
            .create_train(CreateTrainRequest {
                name: "Express 7".to_string(),
                cargo_num: 5,
                places_in_cargo: 5,
                train_type_id: type_id,
            })
            .await
            .unwrap();

        let detail = service.get_train(train.id).await.unwrap();
        assert_eq!(detail.capacity, 25);
        assert_eq!(detail.train_type.name, "Intercity");
    }

    #[tokio::test]
    async fn test_create_train_rejects_empty_layout() {
        let db = DbConnection::init_test().await.unwrap();
        let service = TrainService::new(db);

        let type_id = sample_train_type(&service).await;
        let err = service
            .create_train(CreateTrainRequest {
                name: "Ghost".to_string(),
                cargo_num: 0,
                places_in_cargo: 10,
                train_type_id: type_id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::InvalidTrainConfig { .. }));
    }

    #[tokio::test]
    async fn test_create_train_rejects_overflowing_layout() {
        let db = DbConnection::init_test().await.unwrap();
        let service = TrainService::new(db);

        let type_id = sample_train_type(&service).await;
        let err = service
            .create_train(CreateTrainRequest {
                name: "Leviathan".to_string(),
                cargo_num: i64::MAX / 2,
                places_in_cargo: 4,
                train_type_id: type_id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::InvalidTrainConfig { .. }));
    }

    #[tokio::test]
    async fn test_create_train_requires_existing_type() {
        let db = DbConnection::init_test().await.unwrap();
        let service = TrainService::new(db);

        let err = service
            .create_train(CreateTrainRequest {
                name: "Orphan".to_string(),
                cargo_num: 2,
                places_in_cargo: 10,
                train_type_id: 99,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::NotFound { .. }));
    }
}
