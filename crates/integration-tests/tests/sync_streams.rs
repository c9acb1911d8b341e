//! Sync readiness and live collection stream tests.

use chrono::Utc;
use meridian_backoffice::models::Booking;
use meridian_core::BookingId;
use meridian_integration_tests::TestContext;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn health_and_readiness_report_ok() {
    let ctx = TestContext::new().await;

    let health = ctx
        .client
        .get(format!("{}/health", ctx.base_url))
        .send()
        .await
        .expect("request");
    assert_eq!(health.status(), StatusCode::OK);

    // Every collection reports its first snapshot almost immediately;
    // wait on the flag rather than racing it.
    ctx.state.sync().await_ready().await;

    let ready = ctx
        .client
        .get(format!("{}/health/ready", ctx.base_url))
        .send()
        .await
        .expect("request");
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
async fn sync_status_reports_the_streamable_collections() {
    let ctx = TestContext::new().await;
    let token = ctx.agent_token().await;
    ctx.state.sync().await_ready().await;

    let body: Value = ctx
        .client
        .get(format!("{}/api/sync/status", ctx.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("body");

    assert_eq!(body["data"]["ready"], true);
    let collections = body["data"]["collections"]
        .as_array()
        .expect("collections");
    assert!(collections.iter().any(|c| c == "bookings"));
    // Credential snapshots are never streamable.
    assert!(!collections.iter().any(|c| c == "api_credentials"));
}

#[tokio::test]
async fn collection_streams_deliver_the_snapshot_then_changes() {
    let ctx = TestContext::new().await;
    let token = ctx.agent_token().await;

    let mut response = ctx
        .client
        .get(format!("{}/api/collections/bookings/stream", ctx.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    // The first event is the current (empty) snapshot.
    let first = response
        .chunk()
        .await
        .expect("read first event")
        .expect("first event");
    let first = String::from_utf8_lossy(&first).to_string();
    assert!(first.contains("event: snapshot"), "got: {first}");
    assert!(first.contains("[]"), "got: {first}");

    // A write-through insert pushes a fresh snapshot to the open stream.
    let now = Utc::now();
    let booking_id = BookingId::generate();
    ctx.state
        .store()
        .bookings()
        .insert(Booking {
            id: booking_id.clone(),
            customer_id: "customer-1".into(),
            itinerary_id: "itinerary-1".into(),
            status: meridian_core::BookingStatus::Pending,
            payment_status: meridian_core::PaymentStatus::Unpaid,
            created_at: now,
            updated_at: now,
        })
        .expect("insert booking");

    let mut second = String::new();
    // SSE frames may arrive split across chunks.
    for _ in 0..10 {
        let chunk = response
            .chunk()
            .await
            .expect("read second event")
            .expect("second event");
        second.push_str(&String::from_utf8_lossy(&chunk));
        if second.contains(booking_id.as_str()) {
            break;
        }
    }
    assert!(second.contains(booking_id.as_str()), "got: {second}");
}

#[tokio::test]
async fn unknown_and_restricted_collections_are_not_streamable() {
    let ctx = TestContext::new().await;
    let token = ctx.agent_token().await;

    for name in ["api_credentials", "invoices"] {
        let response = ctx
            .client
            .get(format!(
                "{}/api/collections/{name}/stream",
                ctx.base_url
            ))
            .bearer_auth(&token)
            .send()
            .await
            .expect("request");
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "collection {name}");
    }
}

#[tokio::test]
async fn streams_require_authentication() {
    let ctx = TestContext::new().await;

    let response = ctx
        .client
        .get(format!("{}/api/collections/bookings/stream", ctx.base_url))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
