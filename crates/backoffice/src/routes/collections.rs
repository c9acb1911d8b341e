//! Live collection feeds and the aggregate sync status.
//!
//! Each stream mirrors a document-store subscription onto SSE: the first
//! event is the current snapshot, and every write pushes a fresh one.
//! Streams tear down when the client disconnects; a client whose
//! identity changes simply reconnects with its new token.

use std::convert::Infallible;
use std::pin::Pin;

use axum::{
    extract::{Path, State},
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::Stream;
use serde::Serialize;
use serde_json::json;
use tokio::sync::watch;
use tracing::instrument;

use crate::error::{AppError, ok};
use crate::middleware::RequireAuth;
use crate::models::UserView;
use crate::state::AppState;
use crate::store::{Document, Snapshot};

/// Collections a client may subscribe to. Credentials are deliberately
/// absent: their snapshots contain raw keys.
const STREAMABLE: &[&str] = &["users", "itineraries", "customers", "bookings", "custom_roles"];

type EventStream = Pin<Box<dyn Stream<Item = Result<Event, Infallible>> + Send>>;

/// `GET /api/sync/status` - aggregate readiness flag.
#[instrument(skip(state, _current))]
pub async fn sync_status(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
) -> impl IntoResponse {
    ok(json!({
        "ready": state.sync().is_ready(),
        "collections": STREAMABLE,
    }))
}

/// `GET /api/collections/{name}/stream` - SSE snapshot stream.
#[instrument(skip(state, _current))]
pub async fn stream(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let events: EventStream = match name.as_str() {
        "users" => snapshot_events(state.store().users().watch(), |users| {
            users.iter().map(UserView::from).collect::<Vec<_>>()
        }),
        "itineraries" => snapshot_events(state.store().itineraries().watch(), <[_]>::to_vec),
        "customers" => snapshot_events(state.store().customers().watch(), <[_]>::to_vec),
        "bookings" => snapshot_events(state.store().bookings().watch(), <[_]>::to_vec),
        "custom_roles" => snapshot_events(state.store().custom_roles().watch(), <[_]>::to_vec),
        _ => {
            return Err(AppError::NotFound(format!("collection '{name}'")));
        }
    };

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Adapts a collection watch subscription into an SSE event stream,
/// projecting each snapshot through `project` before serialization.
fn snapshot_events<T, P, O>(mut rx: watch::Receiver<Snapshot<T>>, project: P) -> EventStream
where
    T: Document,
    P: Fn(&[T]) -> O + Send + 'static,
    O: Serialize,
{
    Box::pin(async_stream::stream! {
        loop {
            let payload = {
                let snapshot = rx.borrow_and_update();
                serde_json::to_string(&project(&snapshot))
            };

            match payload {
                Ok(data) => yield Ok(Event::default().event("snapshot").data(data)),
                Err(e) => tracing::error!(error = %e, "failed to serialize snapshot"),
            }

            if rx.changed().await.is_err() {
                break;
            }
        }
    })
}
