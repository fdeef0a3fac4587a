//! Flight HTTP Routes
//!
//! - `GET /flights/:flightId`
//! - `GET /flights`, `OPTIONS /flights` (total count), `POST /flights`
//! - `DELETE /flights/:flightId`

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::Value;
use tracing::info;

use super::body::json_object;
use super::errors::{ApiError, ApiResult};
use super::path;
use super::state::BookingState;
use crate::layout::{generate_seats, validate_flight};
use crate::models::{Flight, FlightCreate, ListMeta};
use crate::query::QueryParams;

/// Create flight routes
pub fn flight_routes(state: Arc<BookingState>) -> Router {
    Router::new()
        .route(
            "/flights",
            get(list_flights_handler)
                .options(flight_meta_handler)
                .post(create_flight_handler),
        )
        .route(
            "/flights/:flightId",
            get(retrieve_flight_handler).delete(delete_flight_handler),
        )
        .with_state(state)
}

/// Resolve the `flightId` path segment to a stored flight.
pub(super) async fn load_flight(state: &BookingState, raw_id: &str) -> ApiResult<Flight> {
    let id = path::flight_id(raw_id)?;
    state
        .run(move |store| store.retrieve_flight(id))
        .await?
        .ok_or(ApiError::NotFound)
}

async fn retrieve_flight_handler(
    State(state): State<Arc<BookingState>>,
    Path(flight_id): Path<String>,
) -> ApiResult<Json<Flight>> {
    let flight = load_flight(&state, &flight_id).await?;
    Ok(Json(flight))
}

async fn list_flights_handler(
    State(state): State<Arc<BookingState>>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Json<Vec<Flight>>> {
    let query = state.compiler.compile::<Flight>(&params)?;
    let flights = state.run(move |store| store.list_flights(&query)).await?;
    Ok(Json(flights))
}

async fn flight_meta_handler(
    State(state): State<Arc<BookingState>>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Json<ListMeta>> {
    let predicate = state.compiler.filtering::<Flight>(&params)?;
    let total_records = state
        .run(move |store| store.count_flights(&predicate))
        .await?;
    Ok(Json(ListMeta { total_records }))
}

async fn create_flight_handler(
    State(state): State<Arc<BookingState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Flight>)> {
    let payload: FlightCreate = json_object(body)?;
    let plan = validate_flight(&payload, &state.limits)?;

    let created_at = Utc::now().timestamp();
    let seats = generate_seats(&plan.blocks, created_at);
    let seat_count = seats.len();

    let flight = state
        .run(move |store| store.create_flight(&plan, &seats, created_at))
        .await?;

    info!(flight_id = flight.id, name = %flight.name, seats = seat_count, "Flight created");
    Ok((StatusCode::CREATED, Json(flight)))
}

async fn delete_flight_handler(
    State(state): State<Arc<BookingState>>,
    Path(flight_id): Path<String>,
) -> ApiResult<StatusCode> {
    let flight = load_flight(&state, &flight_id).await?;
    let id = flight.id;

    if !state.run(move |store| store.delete_flight(id)).await? {
        return Err(ApiError::NotFound);
    }

    info!(flight_id = id, "Flight deleted");
    Ok(StatusCode::NO_CONTENT)
}
