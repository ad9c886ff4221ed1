//! Domain layer: one service per entity area plus the seat-reservation core.

pub mod booking_service;
pub mod crew_service;
pub mod error;
pub mod journey_service;
pub mod route_service;
pub mod seating;
pub mod station_service;
pub mod train_service;

pub use booking_service::BookingService;
pub use crew_service::CrewService;
pub use journey_service::JourneyService;
pub use route_service::RouteService;
pub use station_service::StationService;
pub use train_service::TrainService;
