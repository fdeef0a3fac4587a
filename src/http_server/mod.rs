//! # Booking HTTP Server Module
//!
//! Axum transport for the booking API.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/v1/flights/*` - Flights
//! - `/v1/flights/:flightId/seats/*` - Seats and seat allocation

pub mod body;
pub mod config;
pub mod errors;
pub mod flight_routes;
pub mod observability_routes;
pub mod path;
pub mod seat_routes;
pub mod server;
pub mod state;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult};
pub use server::HttpServer;
pub use state::BookingState;
