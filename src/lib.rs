//! booking - Flight seat booking service
//!
//! Flights are laid out from seating blocks, seats are queried through a
//! strict filter/sort compiler and allocated one at a time in priority order.

pub mod cli;
pub mod http_server;
pub mod layout;
pub mod models;
pub mod observability;
pub mod query;
pub mod store;
