//! Observability for the booking service
//!
//! Handlers and the store emit `tracing` events with structured fields; the
//! binary installs a JSON subscriber once at startup via [`init`].

mod logger;

pub use logger::{env_filter, init, Mode};
