//! Customer route handlers.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use meridian_core::{CustomerBookingState, CustomerDocumentId, CustomerId, Email, PageRequest, Permission, UserId, VerificationStatus, paginate};

use crate::error::{AppError, ok};
use crate::middleware::RequireAuth;
use crate::models::{Customer, CustomerDocument};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<usize>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<usize>,
    /// Case-insensitive name/email filter.
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

/// `GET /api/customers` - paginated, searchable listing.
#[instrument(skip(state, current))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::CustomerView)?;

    let mut customers = state.store().customers().list();
    if let Some(q) = query.q.as_deref().map(str::to_lowercase) {
        customers.retain(|c| {
            c.name.to_lowercase().contains(&q) || c.email.as_str().to_lowercase().contains(&q)
        });
    }

    let (items, page_info) = paginate(&customers, query.page_request());
    Ok(ok(json!({ "items": items, "pageInfo": page_info })))
}

#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub relationship_manager_id: Option<UserId>,
}

/// `POST /api/customers` - register a customer.
///
/// The caller becomes the registering agent.
#[instrument(skip(state, current, body))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Json(body): Json<CreateCustomerRequest>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::CustomerManage)?;

    let name = body
        .name
        .map(|n| n.trim().to_owned())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("name is required".to_owned()))?;
    let email = body
        .email
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("email is required".to_owned()))?;
    let email = Email::parse(email).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let now = Utc::now();
    let customer = state.store().customers().insert(Customer {
        id: CustomerId::generate(),
        name,
        email,
        phone: body.phone,
        registered_by: current.id().clone(),
        relationship_manager_id: body.relationship_manager_id,
        booking_state: CustomerBookingState::Prospect,
        documents: vec![],
        created_at: now,
        updated_at: now,
    })?;

    tracing::info!(customer = %customer.id, by = %current.id(), "customer registered");

    Ok(ok(customer))
}

/// `GET /api/customers/{id}` - customer detail.
#[instrument(skip(state, current))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<CustomerId>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::CustomerView)?;

    let customer = fetch(&state, &id)?;
    Ok(ok(customer))
}

#[derive(Debug, Deserialize)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub relationship_manager_id: Option<UserId>,
    pub booking_state: Option<CustomerBookingState>,
}

/// `PUT /api/customers/{id}` - update a customer.
#[instrument(skip(state, current, body))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<CustomerId>,
    Json(body): Json<UpdateCustomerRequest>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::CustomerManage)?;

    if state.store().customers().get(id.as_str()).is_none() {
        return Err(AppError::NotFound(format!("customer '{id}'")));
    }

    let updated = state.store().customers().update(id.as_str(), |customer| {
        if let Some(name) = body.name {
            customer.name = name;
        }
        if let Some(phone) = body.phone {
            customer.phone = Some(phone);
        }
        if let Some(rm) = body.relationship_manager_id {
            customer.relationship_manager_id = Some(rm);
        }
        if let Some(booking_state) = body.booking_state {
            customer.booking_state = booking_state;
        }
        customer.updated_at = Utc::now();
    })?;

    Ok(ok(updated))
}

/// `DELETE /api/customers/{id}` - delete a customer.
#[instrument(skip(state, current))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<CustomerId>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::CustomerManage)?;

    state.store().customers().delete(id.as_str())?;
    tracing::info!(customer = %id, by = %current.id(), "customer deleted");

    Ok(ok(json!({ "deleted": true })))
}

/// `POST /api/customers/{id}/documents` - upload an identity document.
#[instrument(skip(state, current, multipart))]
pub async fn upload_document(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<CustomerId>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::CustomerManage)?;

    if state.store().customers().get(id.as_str()).is_none() {
        return Err(AppError::NotFound(format!("customer '{id}'")));
    }

    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
        .ok_or_else(|| AppError::BadRequest("a file field is required".to_owned()))?;

    let file_name = field.file_name().unwrap_or("document").to_owned();
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

    let document = CustomerDocument {
        id: CustomerDocumentId::generate(),
        file_name: stored.file_name,
        content_type: stored.content_type,
        size_bytes: stored.size_bytes,
        url: stored.url,
        status: VerificationStatus::Pending,
        uploaded_at: stored.stored_at,
    };

    let attached = document.clone();
    state.store().customers().update(id.as_str(), |customer| {
        customer.documents.push(attached);
        customer.updated_at = Utc::now();
    })?;

    Ok(ok(document))
}

#[derive(Debug, Deserialize)]
pub struct ReviewDocumentRequest {
    pub status: Option<VerificationStatus>,
}

/// `PATCH /api/customers/{id}/documents/{document_id}` - verify or
/// reject an uploaded document.
#[instrument(skip(state, current, body))]
pub async fn review_document(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path((id, document_id)): Path<(CustomerId, CustomerDocumentId)>,
    Json(body): Json<ReviewDocumentRequest>,
) -> Result<impl IntoResponse, AppError> {
    current.require(Permission::DocumentVerify)?;

    let status = body
        .status
        .ok_or_else(|| AppError::BadRequest("status is required".to_owned()))?;

    let customer = fetch(&state, &id)?;
    if !customer.documents.iter().any(|d| d.id == document_id) {
        return Err(AppError::NotFound(format!("document '{document_id}'")));
    }

    let updated = state.store().customers().update(id.as_str(), |customer| {
        if let Some(document) = customer
            .documents
            .iter_mut()
            .find(|d| d.id == document_id)
        {
            document.status = status;
        }
        customer.updated_at = Utc::now();
    })?;

    Ok(ok(updated))
}

fn fetch(state: &AppState, id: &CustomerId) -> Result<Customer, AppError> {
    state
        .store()
        .customers()
        .get(id.as_str())
        .ok_or_else(|| AppError::NotFound(format!("customer '{id}'")))
}
