//! Booking route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use meridian_core::{BookingId, BookingStatus, CustomerId, ItineraryId, PageRequest, PaymentStatus, Permission, paginate};

use crate::error::{AppError, ok};
use crate::middleware::RequireAuth;
use crate::models::Booking;
use crate::state::AppState;

/// `GET /api/bookings` - paginated listing.
#[instrument(skip(state, current))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Query(page): Query<PageRequest>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::BookingView)?;

    let bookings = state.store().bookings().list();
    let (items, page_info) = paginate(&bookings, page);
    Ok(ok(json!({ "items": items, "pageInfo": page_info })))
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub customer_id: Option<CustomerId>,
    pub itinerary_id: Option<ItineraryId>,
}

/// `POST /api/bookings` - create a booking.
///
/// Referential checks are application-level: the customer and itinerary
/// must exist at creation time.
#[instrument(skip(state, current, body))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(body): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::BookingManage)?;

    let customer_id = body
        .customer_id
        .ok_or_else(|| AppError::BadRequest("customer_id is required".to_owned()))?;
    let itinerary_id = body
        .itinerary_id
        .ok_or_else(|| AppError::BadRequest("itinerary_id is required".to_owned()))?;

    if state.store().customers().get(customer_id.as_str()).is_none() {
        return Err(AppError::NotFound(format!("customer '{customer_id}'")));
    }
    if state
        .store()
        .itineraries()
        .get(itinerary_id.as_str())
        .is_none()
    {
        return Err(AppError::NotFound(format!("itinerary '{itinerary_id}'")));
    }

    let now = Utc::now();
    let booking = state.store().bookings().insert(Booking {
        id: BookingId::generate(),
        customer_id,
        itinerary_id,
        status: BookingStatus::Pending,
        payment_status: PaymentStatus::Unpaid,
        created_at: now,
        updated_at: now,
    })?;

    tracing::info!(booking = %booking.id, by = %current.id(), "booking created");

    Ok(ok(booking))
}

/// `GET /api/bookings/{id}` - booking detail.
#[instrument(skip(state, current))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<BookingId>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::BookingView)?;

    let booking = state
        .store()
        .bookings()
        .get(id.as_str())
        .ok_or_else(|| AppError::NotFound(format!("booking '{id}'")))?;
    Ok(ok(booking))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookingRequest {
    pub status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
}

/// `PUT /api/bookings/{id}` - update booking and payment status.
#[instrument(skip(state, current, body))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<BookingId>,
    Json(body): Json<UpdateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::BookingManage)?;

    if state.store().bookings().get(id.as_str()).is_none() {
        return Err(AppError::NotFound(format!("booking '{id}'")));
    }

    let updated = state.store().bookings().update(id.as_str(), |booking| {
        if let Some(status) = body.status {
            booking.status = status;
        }
        if let Some(payment_status) = body.payment_status {
            booking.payment_status = payment_status;
        }
        booking.updated_at = Utc::now();
    })?;

    Ok(ok(updated))
}

/// `DELETE /api/bookings/{id}` - delete a booking.
#[instrument(skip(state, current))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<BookingId>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::BookingManage)?;

    state.store().bookings().delete(id.as_str())?;
    tracing::info!(booking = %id, by = %current.id(), "booking deleted");

    Ok(ok(json!({ "deleted": true })))
}
