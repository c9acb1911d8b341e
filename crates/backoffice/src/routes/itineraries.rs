//! Itinerary route handlers.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use meridian_core::{ApprovalStatus, CollateralId, ItineraryId, PageRequest, Permission, UserId, paginate};

use crate::error::{AppError, ok};
use crate::middleware::RequireAuth;
use crate::models::{Collateral, CoverImage, Itinerary};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<usize>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<usize>,
    /// Case-insensitive destination filter.
    pub q: Option<String>,
}

impl ListQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            page_size: self.page_size.unwrap_or(defaults.page_size),
        }
    }
}

/// `GET /api/itineraries` - paginated, searchable listing.
#[instrument(skip(state, current))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::ItineraryView)?;

    let mut itineraries = state.store().itineraries().list();
    for itinerary in &mut itineraries {
        itinerary.normalize_legacy_agent();
    }

    if let Some(q) = query.q.as_deref().map(str::to_lowercase) {
        itineraries.retain(|i| {
            i.destination.to_lowercase().contains(&q) || i.description.to_lowercase().contains(&q)
        });
    }

    let (items, page_info) = paginate(&itineraries, query.page_request());
    Ok(ok(json!({ "items": items, "pageInfo": page_info })))
}

#[derive(Debug, Deserialize)]
pub struct CreateItineraryRequest {
    pub destination: Option<String>,
    pub duration_days: Option<u32>,
    pub price: Option<Decimal>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub assigned_agent_ids: Vec<UserId>,
    pub cover_image_url: Option<String>,
}

/// `POST /api/itineraries` - create an itinerary.
#[instrument(skip(state, current, body))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(body): Json<CreateItineraryRequest>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::ItineraryManage)?;

    let destination = body
        .destination
        .map(|d| d.trim().to_owned())
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::BadRequest("destination is required".to_owned()))?;
    let duration_days = body
        .duration_days
        .filter(|d| *d > 0)
        .ok_or_else(|| AppError::BadRequest("duration_days must be positive".to_owned()))?;
    let price = body
        .price
        .ok_or_else(|| AppError::BadRequest("price is required".to_owned()))?;

    let now = Utc::now();
    let itinerary = state.store().itineraries().insert(Itinerary {
        id: ItineraryId::generate(),
        destination,
        duration_days,
        price,
        description: body.description,
        day_plans: vec![],
        assigned_agent_ids: body.assigned_agent_ids,
        assigned_agent_id: None,
        collateral: vec![],
        cover_image: body.cover_image_url.map(|url| CoverImage::External { url }),
        created_at: now,
        updated_at: now,
    })?;

    tracing::info!(itinerary = %itinerary.id, by = %current.id(), "itinerary created");

    Ok(ok(itinerary))
}

/// `GET /api/itineraries/{id}` - itinerary detail.
#[instrument(skip(state, current))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<ItineraryId>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::ItineraryView)?;

    let mut itinerary = fetch(&state, &id)?;
    itinerary.normalize_legacy_agent();
    Ok(ok(itinerary))
}

#[derive(Debug, Deserialize)]
pub struct UpdateItineraryRequest {
    pub destination: Option<String>,
    pub duration_days: Option<u32>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    /// Writing the agent list clears the deprecated single-agent field.
    pub assigned_agent_ids: Option<Vec<UserId>>,
}

/// `PUT /api/itineraries/{id}` - update an itinerary.
#[instrument(skip(state, current, body))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<ItineraryId>,
    Json(body): Json<UpdateItineraryRequest>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::ItineraryManage)?;

    if state.store().itineraries().get(id.as_str()).is_none() {
        return Err(AppError::NotFound(format!("itinerary '{id}'")));
    }

    let updated = state.store().itineraries().update(id.as_str(), |itinerary| {
        if let Some(destination) = body.destination {
            itinerary.destination = destination;
        }
        if let Some(duration_days) = body.duration_days {
            itinerary.duration_days = duration_days;
        }
        if let Some(price) = body.price {
            itinerary.price = price;
        }
        if let Some(description) = body.description {
            itinerary.description = description;
        }
        if let Some(agent_ids) = body.assigned_agent_ids {
            itinerary.set_assigned_agents(agent_ids);
        }
        itinerary.updated_at = Utc::now();
    })?;

    Ok(ok(updated))
}

/// `DELETE /api/itineraries/{id}` - delete an itinerary.
#[instrument(skip(state, current))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<ItineraryId>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::ItineraryManage)?;

    state.store().itineraries().delete(id.as_str())?;
    tracing::info!(itinerary = %id, by = %current.id(), "itinerary deleted");

    Ok(ok(json!({ "deleted": true })))
}

/// `PUT /api/itineraries/{id}/cover` - set the cover image.
///
/// Accepts either an external URL or an uploaded file reference.
#[instrument(skip(state, current, cover))]
pub async fn set_cover(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<ItineraryId>,
    Json(cover): Json<CoverImage>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::ItineraryManage)?;

    let updated = state.store().itineraries().update(id.as_str(), |itinerary| {
        itinerary.cover_image = Some(cover);
        itinerary.updated_at = Utc::now();
    })?;

    Ok(ok(updated))
}

/// `POST /api/itineraries/{id}/collateral` - upload a collateral file.
#[instrument(skip(state, current, multipart))]
pub async fn upload_collateral(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<ItineraryId>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::ItineraryManage)?;

    if state.store().itineraries().get(id.as_str()).is_none() {
        return Err(AppError::NotFound(format!("itinerary '{id}'")));
    }

    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
        .ok_or_else(|| AppError::BadRequest("a file field is required".to_owned()))?;

    let file_name = field.file_name().unwrap_or("collateral").to_owned();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_owned();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;

    let stored = state
        .storage()
        .save(&file_name, &content_type, &bytes)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let collateral = Collateral {
        id: CollateralId::generate(),
        file_name: stored.file_name,
        content_type: stored.content_type,
        size_bytes: stored.size_bytes,
        url: stored.url,
        status: ApprovalStatus::Pending,
        uploaded_by: current.id().clone(),
        uploaded_at: stored.stored_at,
    };

    let attached = collateral.clone();
    state.store().itineraries().update(id.as_str(), |itinerary| {
        itinerary.collateral.push(attached);
        itinerary.updated_at = Utc::now();
    })?;

    Ok(ok(collateral))
}

#[derive(Debug, Deserialize)]
pub struct ReviewCollateralRequest {
    pub status: Option<ApprovalStatus>,
}

/// `PATCH /api/itineraries/{id}/collateral/{collateral_id}` - approve or
/// reject a collateral file.
#[instrument(skip(state, current, body))]
pub async fn review_collateral(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path((id, collateral_id)): Path<(ItineraryId, CollateralId)>,
    Json(body): Json<ReviewCollateralRequest>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::ItineraryManage)?;

    let status = body
        .status
        .ok_or_else(|| AppError::BadRequest("status is required".to_owned()))?;

    let itinerary = fetch(&state, &id)?;
    if !itinerary.collateral.iter().any(|c| c.id == collateral_id) {
        return Err(AppError::NotFound(format!("collateral '{collateral_id}'")));
    }

    let updated = state.store().itineraries().update(id.as_str(), |itinerary| {
        if let Some(collateral) = itinerary
            .collateral
            .iter_mut()
            .find(|c| c.id == collateral_id)
        {
            collateral.status = status;
        }
        itinerary.updated_at = Utc::now();
    })?;

    Ok(ok(updated))
}

fn fetch(state: &AppState, id: &ItineraryId) -> Result<Itinerary, AppError> {
    state
        .store()
        .itineraries()
        .get(id.as_str())
        .ok_or_else(|| AppError::NotFound(format!("itinerary '{id}'")))
}
