//! Seat HTTP Routes
//!
//! All seat routes resolve the flight first and answer 404 when it is
//! missing.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use chrono::Utc;
use serde_json::Value;
use tracing::info;

use super::body::json_object;
use super::errors::{ApiError, ApiResult};
use super::flight_routes::load_flight;
use super::path;
use super::state::BookingState;
use crate::models::{ListMeta, Seat, SeatUpdate};
use crate::query::QueryParams;

/// Create seat routes
pub fn seat_routes(state: Arc<BookingState>) -> Router {
    Router::new()
        .route(
            "/flights/:flightId/seats",
            get(list_seats_handler)
                .options(seat_meta_handler)
                .post(assign_seat_handler),
        )
        .route(
            "/flights/:flightId/seats/index/:index",
            get(retrieve_seat_handler),
        )
        .route(
            "/flights/:flightId/seats/row/:row/line/:line",
            get(find_seat_handler),
        )
        .route(
            "/flights/:flightId/seats/:index",
            patch(update_seat_handler).delete(unassign_seat_handler),
        )
        .with_state(state)
}

async fn load_seat(state: &BookingState, raw_flight_id: &str, raw_index: &str) -> ApiResult<Seat> {
    let flight = load_flight(state, raw_flight_id).await?;
    let index = path::seat_index(raw_index)?;
    let flight_id = flight.id;

    state
        .run(move |store| store.retrieve_seat(flight_id, index))
        .await?
        .ok_or(ApiError::NotFound)
}

async fn retrieve_seat_handler(
    State(state): State<Arc<BookingState>>,
    Path((flight_id, index)): Path<(String, String)>,
) -> ApiResult<Json<Seat>> {
    let seat = load_seat(&state, &flight_id, &index).await?;
    Ok(Json(seat))
}

async fn find_seat_handler(
    State(state): State<Arc<BookingState>>,
    Path((flight_id, row, line)): Path<(String, String, String)>,
) -> ApiResult<Json<Seat>> {
    let flight = load_flight(&state, &flight_id).await?;
    let row = path::row(&row)?;
    let line = path::line(&line)?;
    let flight_id = flight.id;

    let seat = state
        .run(move |store| store.find_seat(flight_id, row, &line))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(seat))
}

async fn list_seats_handler(
    State(state): State<Arc<BookingState>>,
    Path(flight_id): Path<String>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Json<Vec<Seat>>> {
    let flight = load_flight(&state, &flight_id).await?;
    let query = state.compiler.compile::<Seat>(&params)?;
    let flight_id = flight.id;

    let seats = state
        .run(move |store| store.list_seats(flight_id, &query))
        .await?;
    Ok(Json(seats))
}

async fn seat_meta_handler(
    State(state): State<Arc<BookingState>>,
    Path(flight_id): Path<String>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Json<ListMeta>> {
    let flight = load_flight(&state, &flight_id).await?;
    let predicate = state.compiler.filtering::<Seat>(&params)?;
    let flight_id = flight.id;

    let total_records = state
        .run(move |store| store.count_seats(flight_id, &predicate))
        .await?;
    Ok(Json(ListMeta { total_records }))
}

/// Allocate the next available seat; the body is `null` when the flight is full.
async fn assign_seat_handler(
    State(state): State<Arc<BookingState>>,
    Path(flight_id): Path<String>,
) -> ApiResult<(StatusCode, Json<Option<Seat>>)> {
    let flight = load_flight(&state, &flight_id).await?;
    let flight_id = flight.id;
    let now = Utc::now().timestamp();

    let seat = state
        .run(move |store| store.assign_seat(flight_id, now))
        .await?;

    match &seat {
        Some(seat) => info!(flight_id, index = seat.index, "Seat assigned"),
        None => info!(flight_id, "No seat available"),
    }
    Ok((StatusCode::CREATED, Json(seat)))
}

async fn update_seat_handler(
    State(state): State<Arc<BookingState>>,
    Path((flight_id, index)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Seat>> {
    let mut seat = load_seat(&state, &flight_id, &index).await?;
    let update: SeatUpdate = json_object(body)?;

    seat.assigned = update.assigned;
    seat.updated_at = Utc::now().timestamp();

    let stored = seat.clone();
    state.run(move |store| store.update_seat(&stored)).await?;

    info!(flight_id = seat.flight_id, index = seat.index, assigned = seat.assigned, "Seat updated");
    Ok(Json(seat))
}

async fn unassign_seat_handler(
    State(state): State<Arc<BookingState>>,
    Path((flight_id, index)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let mut seat = load_seat(&state, &flight_id, &index).await?;
    seat.assigned = false;
    seat.updated_at = Utc::now().timestamp();

    let flight_id = seat.flight_id;
    let index = seat.index;
    state.run(move |store| store.update_seat(&seat)).await?;

    info!(flight_id, index, "Seat unassigned");
    Ok(StatusCode::NO_CONTENT)
}
