use serde::{Deserialize, Serialize};

/// A railway station with its geographic position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateStationRequest {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationListResponse {
    pub stations: Vec<Station>,
}

/// A directed connection between two stations.
///
/// Source and destination are not required to differ; the booking layer
/// treats route geometry as caller-supplied data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: i64,
    pub source_id: i64,
    pub destination_id: i64,
    /// Distance in kilometres.
    pub distance: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRouteRequest {
    pub source_id: i64,
    pub destination_id: i64,
    pub distance: i64,
}

/// Route as shown in list views: station names instead of raw ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteListItem {
    pub id: i64,
    pub source: String,
    pub destination: String,
    pub distance: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteListResponse {
    pub routes: Vec<RouteListItem>,
}

/// Route detail view with both stations embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDetail {
    pub id: i64,
    pub source: Station,
    pub destination: Station,
    pub distance: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crew {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl Crew {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCrewRequest {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewListResponse {
    pub crews: Vec<Crew>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainType {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTrainTypeRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainTypeListResponse {
    pub train_types: Vec<TrainType>,
}

/// A train: `cargo_num` sections, each with `places_in_cargo` seats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Train {
    pub id: i64,
    pub name: String,
    pub cargo_num: i64,
    pub places_in_cargo: i64,
    pub train_type_id: i64,
}

impl Train {
    /// Total number of seats across all cargo sections.
    ///
    /// Saturates on overflow; the backend rejects layouts that large before
    /// they are ever stored.
    pub fn capacity(&self) -> i64 {
        self.cargo_num.saturating_mul(self.places_in_cargo)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTrainRequest {
    pub name: String,
    pub cargo_num: i64,
    pub places_in_cargo: i64,
    pub train_type_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainListResponse {
    pub trains: Vec<Train>,
}

/// Train detail view with its type embedded and capacity reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainDetail {
    pub id: i64,
    pub name: String,
    pub cargo_num: i64,
    pub places_in_cargo: i64,
    pub train_type: TrainType,
    pub capacity: i64,
}

/// One scheduled run of a train along a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journey {
    pub id: i64,
    pub route_id: i64,
    pub train_id: i64,
    /// RFC 3339 timestamp.
    pub departure_time: String,
    /// RFC 3339 timestamp.
    pub arrival_time: String,
    pub crew_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateJourneyRequest {
    pub route_id: i64,
    pub train_id: i64,
    /// RFC 3339 timestamp.
    pub departure_time: String,
    /// RFC 3339 timestamp.
    pub arrival_time: String,
    #[serde(default)]
    pub crew_ids: Vec<i64>,
}

/// Journey as shown in list views, annotated with seat occupancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyListItem {
    pub id: i64,
    pub route: RouteListItem,
    pub train_name: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub capacity: i64,
    pub tickets_taken: i64,
    pub seats_available: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyListResponse {
    pub journeys: Vec<JourneyListItem>,
}

/// Journey detail view with route, train, and crew embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyDetail {
    pub id: i64,
    pub route: RouteDetail,
    pub train: TrainDetail,
    pub departure_time: String,
    pub arrival_time: String,
    pub crews: Vec<Crew>,
}

/// Read-side seat availability for a journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub journey_id: i64,
    pub capacity: i64,
    pub taken: i64,
    pub remaining: i64,
}

/// One requested seat within an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketRequest {
    pub journey_id: i64,
    pub cargo: i64,
    pub seat: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: i64,
    pub tickets: Vec<TicketRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub cargo: i64,
    pub seat: i64,
    pub journey_id: i64,
    pub order_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    /// RFC 3339 timestamp.
    pub created_at: String,
    pub tickets: Vec<Ticket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResponse {
    pub order: Order,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub pagination: PaginationInfo,
}

/// Error payload returned by the API for all failure responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
