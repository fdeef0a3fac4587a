//! # HTTP Server
//!
//! Combines the flight, seat and health routers. Versioned routes live
//! under `/v1`.

use std::any::Any as PanicPayload;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tower::{ServiceBuilder, ServiceExt};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use super::config::HttpServerConfig;
use super::flight_routes::flight_routes;
use super::observability_routes::health_routes;
use super::seat_routes::seat_routes;
use super::state::BookingState;

/// API version prefix
pub const API_VERSION: &str = "v1";

/// HTTP server for the booking API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server over shared handler state
    pub fn with_state(config: HttpServerConfig, state: Arc<BookingState>) -> Self {
        let router = Self::build_router(&config, state);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    pub fn build_router(config: &HttpServerConfig, state: Arc<BookingState>) -> Router {
        let api = Router::new()
            .merge(flight_routes(Arc::clone(&state)))
            .merge(seat_routes(state));

        let routes = Router::new()
            .merge(health_routes())
            .nest(&format!("/{}", API_VERSION), api);

        with_layers(routes, cors_layer(config))
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl-C or SIGTERM.
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(&addr).await?;
        info!(addr = %addr, "Booking API listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Booking API stopped");
        Ok(())
    }
}

fn cors_layer(config: &HttpServerConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Wrap `routes` with request tracing, panic recovery and CORS.
///
/// `CorsLayer` answers every `OPTIONS` request itself, but `OPTIONS` on the
/// list routes returns the record count. Only requests carrying
/// `Access-Control-Request-Method` are treated as preflights.
pub(crate) fn with_layers(routes: Router, cors: CorsLayer) -> Router {
    let with_cors = routes.clone().layer(cors);

    routes.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(middleware::from_fn_with_state(with_cors, route_cors)),
    )
}

async fn route_cors(State(with_cors): State<Router>, request: Request, next: Next) -> Response {
    let plain_options = request.method() == Method::OPTIONS
        && !request
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);
    if plain_options {
        return next.run(request).await;
    }

    match with_cors.oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    }
}

fn panic_response(payload: Box<dyn PanicPayload + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    error!(panic = detail, "Handler panicked");
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
