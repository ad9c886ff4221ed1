use tracing::info;

use crate::db::DbConnection;
use crate::domain::error::BookingError;
use shared::{CreateCrewRequest, Crew, CrewListResponse};

/// Service for managing crew members.
#[derive(Clone)]
pub struct CrewService {
    db: DbConnection,
}

impl CrewService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn create_crew(&self, request: CreateCrewRequest) -> Result<Crew, BookingError> {
        info!(
            "Creating crew member: {} {}",
            request.first_name, request.last_name
        );

        if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
            return Err(BookingError::InvalidInput {
                field: "name",
                message: "first and last name must not be empty".to_string(),
            });
        }

        let crew = self
            .db
            .insert_crew(&CreateCrewRequest {
                first_name: request.first_name.trim().to_string(),
                last_name: request.last_name.trim().to_string(),
            })
            .await?;

        info!("Created crew member {} with ID {}", crew.full_name(), crew.id);
        Ok(crew)
    }

    pub async fn list_crews(&self) -> Result<CrewListResponse, BookingError> {
        let crews = self.db.list_crews().await?;
        info!("Found {} crew members", crews.len());
        Ok(CrewListResponse { crews })
    }
}
