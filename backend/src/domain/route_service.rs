use tracing::info;

use crate::db::DbConnection;
use crate::domain::error::BookingError;
use shared::{CreateRouteRequest, Route, RouteDetail, RouteListResponse};

/// Service for managing routes between stations.
///
/// Source and destination are allowed to coincide; the original system never
/// enforced otherwise and this carries that policy over unchanged.
#[derive(Clone)]
pub struct RouteService {
    db: DbConnection,
}

impl RouteService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Create a new route between two existing stations
    pub async fn create_route(&self, request: CreateRouteRequest) -> Result<Route, BookingError> {
        info!(
            "Creating route: {} -> {} ({} km)",
            request.source_id, request.destination_id, request.distance
        );

        self.db
            .get_station(request.source_id)
            .await?
            .ok_or_else(|| BookingError::not_found("station", request.source_id))?;
        self.db
            .get_station(request.destination_id)
            .await?
            .ok_or_else(|| BookingError::not_found("station", request.destination_id))?;

        if request.distance < 0 {
            return Err(BookingError::InvalidInput {
                field: "distance",
                message: format!("distance must be non-negative, not {}", request.distance),
            });
        }

        let route = self.db.insert_route(&request).await?;
        info!("Created route with ID {}", route.id);
        Ok(route)
    }

    /// List routes, optionally filtered by source station ids
    pub async fn list_routes(
        &self,
        source_ids: Option<Vec<i64>>,
    ) -> Result<RouteListResponse, BookingError> {
        let routes = self.db.list_routes(source_ids.as_deref()).await?;
        info!("Found {} routes", routes.len());
        Ok(RouteListResponse { routes })
    }

    /// Get a route with both stations embedded
    pub async fn get_route(&self, route_id: i64) -> Result<RouteDetail, BookingError> {
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
}
