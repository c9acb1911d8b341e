//! HTTP route handlers for the back-office API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness (all collections synced)
//!
//! # Auth
//! POST /api/auth/login                  - Email/password sign-in, returns bearer token
//! GET  /api/auth/me                     - Current profile + resolved permissions
//! POST /api/auth/password               - Password update (self or user.manage)
//!
//! # Users (user.view / user.manage)
//! GET    /api/users                     - List users (paginated)
//! POST   /api/users                     - Create user (generated password returned once)
//! GET    /api/users/{id}                - User detail
//! PUT    /api/users/{id}                - Update profile, roles, grants
//! DELETE /api/users/{id}                - Delete (primary admin is guarded)
//!
//! # Roles
//! GET    /api/roles                     - Built-in tables + custom roles
//! POST   /api/roles/custom              - Create custom role (role.manage)
//! PUT    /api/roles/custom/{id}         - Update (system rename refused; admin immutable)
//! DELETE /api/roles/custom/{id}         - Delete custom role
//!
//! # Itineraries (itinerary.view / itinerary.manage)
//! GET    /api/itineraries               - List (paginated, searchable)
//! POST   /api/itineraries               - Create
//! GET    /api/itineraries/{id}          - Detail
//! PUT    /api/itineraries/{id}          - Update (agent list write clears legacy field)
//! DELETE /api/itineraries/{id}          - Delete
//! PUT    /api/itineraries/{id}/cover    - Set cover image
//! POST   /api/itineraries/{id}/collateral        - Upload collateral (multipart)
//! PATCH  /api/itineraries/{id}/collateral/{cid}  - Approve/reject collateral
//!
//! # Customers (customer.view / customer.manage / document.verify)
//! GET    /api/customers                 - List (paginated, searchable)
//! POST   /api/customers                 - Create
//! GET    /api/customers/{id}            - Detail
//! PUT    /api/customers/{id}            - Update
//! DELETE /api/customers/{id}            - Delete
//! POST   /api/customers/{id}/documents           - Upload document (multipart)
//! PATCH  /api/customers/{id}/documents/{doc_id}  - Verify/reject document
//!
//! # Bookings (booking.view / booking.manage)
//! GET    /api/bookings                  - List (paginated)
//! POST   /api/bookings                  - Create (validates customer + itinerary)
//! GET    /api/bookings/{id}             - Detail
//! PUT    /api/bookings/{id}             - Update status / payment status
//! DELETE /api/bookings/{id}             - Delete
//!
//! # AI proxy (ai.generate)
//! POST /api/ai/itinerary                - Day-by-day plan generation
//! POST /api/ai/chat                     - Assistant chat passthrough
//! POST /api/ai/image                    - Cover image generation
//!
//! # Messaging (message.broadcast)
//! POST /api/whatsapp/broadcast          - Text broadcast with per-recipient results
//!
//! # Credentials (credential.manage)
//! GET /api/credentials/{provider}/status - Masked key + fingerprint + source
//! PUT /api/credentials/{provider}        - Rotate / enable / disable
//!
//! # Live data
//! GET /api/sync/status                  - Aggregate readiness flag
//! GET /api/collections/{name}/stream    - SSE snapshot stream per collection
//! ```

pub mod ai;
pub mod auth;
pub mod bookings;
pub mod collections;
pub mod credentials;
pub mod customers;
pub mod itineraries;
pub mod roles;
pub mod users;
pub mod whatsapp;

use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::state::AppState;

/// Builds the `/api` router.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Auth
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/password", post(auth::update_password))
        // Users
        .route("/api/users", get(users::list).post(users::create))
        .route(
            "/api/users/{id}",
            get(users::show).put(users::update).delete(users::remove),
        )
        // Roles
        .route("/api/roles", get(roles::list))
        .route("/api/roles/custom", post(roles::create))
        .route(
            "/api/roles/custom/{id}",
            put(roles::update).delete(roles::remove),
        )
        // Itineraries
        .route(
            "/api/itineraries",
            get(itineraries::list).post(itineraries::create),
        )
        .route(
            "/api/itineraries/{id}",
            get(itineraries::show)
                .put(itineraries::update)
                .delete(itineraries::remove),
        )
        .route("/api/itineraries/{id}/cover", put(itineraries::set_cover))
        .route(
            "/api/itineraries/{id}/collateral",
            post(itineraries::upload_collateral),
        )
        .route(
            "/api/itineraries/{id}/collateral/{collateral_id}",
            patch(itineraries::review_collateral),
        )
        // Customers
        .route(
            "/api/customers",
            get(customers::list).post(customers::create),
        )
        .route(
            "/api/customers/{id}",
            get(customers::show)
                .put(customers::update)
                .delete(customers::remove),
        )
        .route(
            "/api/customers/{id}/documents",
            post(customers::upload_document),
        )
        .route(
            "/api/customers/{id}/documents/{document_id}",
            patch(customers::review_document),
        )
        // Bookings
        .route("/api/bookings", get(bookings::list).post(bookings::create))
        .route(
            "/api/bookings/{id}",
            get(bookings::show)
                .put(bookings::update)
                .delete(bookings::remove),
        )
        // AI proxy
        .route("/api/ai/itinerary", post(ai::generate_itinerary))
        .route("/api/ai/chat", post(ai::chat))
        .route("/api/ai/image", post(ai::generate_image))
        // Messaging
        .route("/api/whatsapp/broadcast", post(whatsapp::broadcast))
        // Credentials
        .route(
            "/api/credentials/{provider}/status",
            get(credentials::status),
        )
        .route("/api/credentials/{provider}", put(credentials::update))
        // Live data
        .route("/api/sync/status", get(collections::sync_status))
        .route("/api/collections/{name}/stream", get(collections::stream))
}
