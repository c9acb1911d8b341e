//! CRUD flow tests: itineraries, customers, bookings, users, roles.

use chrono::Utc;
use meridian_core::{BuiltinRole, ItineraryId};
use meridian_integration_tests::TestContext;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};

fn seed_itinerary(ctx: &TestContext, destination: &str) -> ItineraryId {
    let now = Utc::now();
    let itinerary = meridian_backoffice::models::Itinerary {
        id: ItineraryId::generate(),
        destination: destination.to_owned(),
        duration_days: 5,
        price: Decimal::new(199_900, 2),
        description: String::new(),
        day_plans: vec![],
        assigned_agent_ids: vec![],
        assigned_agent_id: None,
        collateral: vec![],
        cover_image: None,
        created_at: now,
        updated_at: now,
    };
    ctx.state
        .store()
        .itineraries()
        .insert(itinerary)
        .expect("seed itinerary")
        .id
}

#[tokio::test]
async fn itinerary_create_requires_destination() {
    let ctx = TestContext::new().await;
    let token = ctx.agent_token().await;

    let response = ctx
        .client
        .post(format!("{}/api/itineraries", ctx.base_url))
        .bearer_auth(&token)
        .json(&json!({ "duration_days": 5, "price": "1999.00" }))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn assigning_an_agent_updates_the_list_and_clears_the_legacy_field() {
    let ctx = TestContext::new().await;
    let token = ctx.agent_token().await;

    // Create with no assigned agents.
    let created: Value = ctx
        .client
        .post(format!("{}/api/itineraries", ctx.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "destination": "Kyoto",
            "duration_days": 7,
            "price": "2899.00",
            "description": "Temples and tea houses",
        }))
        .send()
        .await
        .expect("create")
        .json()
        .await
        .expect("body");
    let id = created["data"]["id"].as_str().expect("id").to_owned();
    assert_eq!(created["data"]["assigned_agent_ids"], json!([]));

    // A legacy document may still carry the deprecated single-agent field.
    ctx.state
        .store()
        .itineraries()
        .update(&id, |itinerary| {
            itinerary.assigned_agent_id = Some("legacy-agent".into());
        })
        .expect("inject legacy field");

    // Editing the agent list writes the new field and clears the old one.
    let updated: Value = ctx
        .client
        .put(format!("{}/api/itineraries/{id}", ctx.base_url))
        .bearer_auth(&token)
        .json(&json!({ "assigned_agent_ids": ["agent-7"] }))
        .send()
        .await
        .expect("update")
        .json()
        .await
        .expect("body");

    assert_eq!(updated["data"]["assigned_agent_ids"], json!(["agent-7"]));
    assert!(updated["data"].get("assigned_agent_id").is_none());

    let stored = ctx
        .state
        .store()
        .itineraries()
        .get(&id)
        .expect("stored itinerary");
    assert!(stored.assigned_agent_id.is_none());
}

#[tokio::test]
async fn legacy_single_agent_documents_are_normalized_on_read() {
    let ctx = TestContext::new().await;
    let token = ctx.agent_token().await;

    let id = seed_itinerary(&ctx, "Lisbon");
    ctx.state
        .store()
        .itineraries()
        .update(id.as_str(), |itinerary| {
            itinerary.assigned_agent_id = Some("legacy-agent".into());
        })
        .expect("inject legacy field");

    let body: Value = ctx
        .client
        .get(format!("{}/api/itineraries/{id}", ctx.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("body");

    assert_eq!(body["data"]["assigned_agent_ids"], json!(["legacy-agent"]));
    assert!(body["data"].get("assigned_agent_id").is_none());
}

#[tokio::test]
async fn listing_reports_the_documented_pagination_metadata() {
    let ctx = TestContext::new().await;
    let token = ctx.agent_token().await;

    for i in 0..25 {
        seed_itinerary(&ctx, &format!("Destination {i:02}"));
    }

    let first: Value = ctx
        .client
        .get(format!(
            "{}/api/itineraries?page=1&pageSize=10",
            ctx.base_url
        ))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("body");

    let info = &first["data"]["pageInfo"];
    assert_eq!(info["total"], 25);
    assert_eq!(info["totalPages"], 3);
    assert_eq!(info["hasNext"], true);
    assert_eq!(info["hasPrev"], false);
    assert_eq!(info["startIndex"], 1);
    assert_eq!(info["endIndex"], 10);
    assert_eq!(first["data"]["items"].as_array().expect("items").len(), 10);

    let last: Value = ctx
        .client
        .get(format!(
            "{}/api/itineraries?page=3&pageSize=10",
            ctx.base_url
        ))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("body");

    let info = &last["data"]["pageInfo"];
    assert_eq!(info["hasNext"], false);
    assert_eq!(info["hasPrev"], true);
    assert_eq!(info["endIndex"], 25);
    assert_eq!(last["data"]["items"].as_array().expect("items").len(), 5);
}

#[tokio::test]
async fn booking_creation_validates_its_references() {
    let ctx = TestContext::new().await;
    let token = ctx.agent_token().await;

    let missing_refs = ctx
        .client
        .post(format!("{}/api/bookings", ctx.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "customer_id": "ghost-customer",
            "itinerary_id": "ghost-itinerary",
        }))
        .send()
        .await
        .expect("request");
    assert_eq!(missing_refs.status(), StatusCode::NOT_FOUND);

    // With real references the booking goes through and can be updated.
    let itinerary_id = seed_itinerary(&ctx, "Marrakech");
    let customer: Value = ctx
        .client
        .post(format!("{}/api/customers", ctx.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Dana Traveller",
            "email": "dana@example.com",
        }))
        .send()
        .await
        .expect("create customer")
        .json()
        .await
        .expect("body");
    let customer_id = customer["data"]["id"].as_str().expect("id");

    let booking: Value = ctx
        .client
        .post(format!("{}/api/bookings", ctx.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "customer_id": customer_id,
            "itinerary_id": itinerary_id.as_str(),
        }))
        .send()
        .await
        .expect("create booking")
        .json()
        .await
        .expect("body");
    assert_eq!(booking["data"]["status"], "pending");
    assert_eq!(booking["data"]["payment_status"], "unpaid");

    let booking_id = booking["data"]["id"].as_str().expect("id");
    let updated: Value = ctx
        .client
        .put(format!("{}/api/bookings/{booking_id}", ctx.base_url))
        .bearer_auth(&token)
        .json(&json!({ "status": "confirmed", "payment_status": "partially_paid" }))
        .send()
        .await
        .expect("update booking")
        .json()
        .await
        .expect("body");
    assert_eq!(updated["data"]["status"], "confirmed");
    assert_eq!(updated["data"]["payment_status"], "partially_paid");
}

#[tokio::test]
async fn user_administration_is_admin_only() {
    let ctx = TestContext::new().await;
    let agent = ctx.agent_token().await;

    let response = ctx
        .client
        .get(format!("{}/api/users", ctx.base_url))
        .bearer_auth(&agent)
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn created_users_get_a_generated_password_exactly_once() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin_token().await;

    let created: Value = ctx
        .client
        .post(format!("{}/api/users", ctx.base_url))
        .bearer_auth(&admin)
        .json(&json!({
            "email": "newagent@meridianvoyages.travel",
            "name": "New Agent",
            "roles": ["agent"],
        }))
        .send()
        .await
        .expect("create user")
        .json()
        .await
        .expect("body");

    let generated = created["data"]["generatedPassword"]
        .as_str()
        .expect("generated password");

    // The password works, and it is not echoed anywhere else.
    let token = ctx.login("newagent@meridianvoyages.travel", generated).await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn the_primary_admin_account_cannot_be_deleted() {
    let ctx = TestContext::new().await;
    // admin_token creates the primary admin account itself.
    let admin = ctx.admin_token().await;

    let primary = ctx
        .state
        .store()
        .users()
        .find(|u| u.email.as_str() == "admin@meridianvoyages.travel")
        .expect("primary admin");

    let response = ctx
        .client
        .delete(format!("{}/api/users/{}", ctx.base_url, primary.id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Any other account deletes fine.
    let other = ctx.create_account("temp@meridianvoyages.travel", vec![BuiltinRole::Agent]);
    let response = ctx
        .client
        .delete(format!("{}/api/users/{}", ctx.base_url, other))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn system_roles_are_rename_guarded_and_admin_is_immutable() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin_token().await;

    let agent_role = ctx
        .state
        .store()
        .custom_roles()
        .find(|role| role.system && role.name == "agent")
        .expect("seeded agent role");
    let admin_role = ctx
        .state
        .store()
        .custom_roles()
        .find(meridian_core::CustomRole::is_admin_role)
        .expect("seeded admin role");

    // Renaming a system role is refused.
    let rename = ctx
        .client
        .put(format!(
            "{}/api/roles/custom/{}",
            ctx.base_url, agent_role.id
        ))
        .bearer_auth(&admin)
        .json(&json!({ "name": "sales" }))
        .send()
        .await
        .expect("request");
    assert_eq!(rename.status(), StatusCode::FORBIDDEN);

    // Adjusting a non-admin system role's permissions is allowed.
    let permissions = ctx
        .client
        .put(format!(
            "{}/api/roles/custom/{}",
            ctx.base_url, agent_role.id
        ))
        .bearer_auth(&admin)
        .json(&json!({ "permissions": ["itinerary.view"] }))
        .send()
        .await
        .expect("request");
    assert_eq!(permissions.status(), StatusCode::OK);

    // The admin role rejects every edit and deletion.
    let admin_edit = ctx
        .client
        .put(format!(
            "{}/api/roles/custom/{}",
            ctx.base_url, admin_role.id
        ))
        .bearer_auth(&admin)
        .json(&json!({ "description": "weaker" }))
        .send()
        .await
        .expect("request");
    assert_eq!(admin_edit.status(), StatusCode::FORBIDDEN);

    let admin_delete = ctx
        .client
        .delete(format!(
            "{}/api/roles/custom/{}",
            ctx.base_url, admin_role.id
        ))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("request");
    assert_eq!(admin_delete.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn custom_roles_grant_permissions_through_membership() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin_token().await;

    // A customer-role account cannot see customers...
    let viewer = ctx.create_account(
        "viewer@meridianvoyages.travel",
        vec![BuiltinRole::Customer],
    );
    let viewer_token = ctx
        .login("viewer@meridianvoyages.travel", meridian_integration_tests::TEST_PASSWORD)
        .await;

    let denied = ctx
        .client
        .get(format!("{}/api/customers", ctx.base_url))
        .bearer_auth(&viewer_token)
        .send()
        .await
        .expect("request");
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    // ...until an admin creates a custom role and assigns membership.
    let role: Value = ctx
        .client
        .post(format!("{}/api/roles/custom", ctx.base_url))
        .bearer_auth(&admin)
        .json(&json!({
            "name": "support-desk",
            "description": "Read-only customer access",
            "permissions": ["customer.view"],
        }))
        .send()
        .await
        .expect("create role")
        .json()
        .await
        .expect("body");
    let role_id = role["data"]["id"].as_str().expect("role id");

    let assigned = ctx
        .client
        .put(format!("{}/api/users/{viewer}", ctx.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "custom_role_ids": [role_id] }))
        .send()
        .await
        .expect("assign role");
    assert_eq!(assigned.status(), StatusCode::OK);

    // Permission resolution picks the grant up on the next request.
    let allowed = ctx
        .client
        .get(format!("{}/api/customers", ctx.base_url))
        .bearer_auth(&viewer_token)
        .send()
        .await
        .expect("request");
    assert_eq!(allowed.status(), StatusCode::OK);
}
