//! Collaboration invitation tests at the HTTP layer: local email-shape
//! validation, persistence, and the dispatcher call-count contract.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use actix_web::{App, test, web};
use serde_json::{Value, json};

use naccer::auth::identity::TokenConfig;
use naccer::db::DbPool;
use naccer::handlers;
use naccer::models::proposal::{self, Status};
use naccer::models::role::Role;
use naccer::notify::Dispatcher;

use common::{
    APPLICANT_NAME, RecordingMailer, TEST_SECRET, bearer, seed_actors, setup_test_pool,
};

fn test_config() -> TokenConfig {
    TokenConfig { secret: TEST_SECRET.to_vec(), expires_in_secs: 3600 }
}

macro_rules! spawn_app {
    ($pool:expr, $mailer:expr) => {{
        let dispatcher: web::Data<dyn Dispatcher> =
            web::Data::from($mailer.clone() as Arc<dyn Dispatcher>);
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .app_data(web::Data::new(test_config()))
                .app_data(dispatcher)
                .configure(handlers::api_routes),
        )
        .await
    }};
}

/// Seed the three actors plus one submitted proposal owned by the
/// applicant. Returns (applicant_id, proposal_id).
fn seed_proposal(pool: &DbPool) -> (i64, i64) {
    let conn = pool.get().expect("conn");
    let actors = seed_actors(&conn);
    let prop = proposal::create(
        &conn,
        actors.applicant_id,
        "Collaboration Target",
        "A proposal worth collaborating on",
        "AI",
        Some(100_000),
        Status::Submitted,
    )
    .expect("create proposal");
    (actors.applicant_id, prop.id)
}

#[actix_rt::test]
async fn test_invalid_email_never_reaches_dispatcher() {
    let (_dir, pool) = setup_test_pool();
    let (applicant_id, proposal_id) = seed_proposal(&pool);
    let mailer = Arc::new(RecordingMailer::default());
    let app = spawn_app!(pool, mailer);

    let req = test::TestRequest::post()
        .uri("/api/collaboration/invite")
        .insert_header(("Authorization", bearer(applicant_id, APPLICANT_NAME, Role::Applicant)))
        .set_json(json!({
            "proposal_id": proposal_id,
            "email": "not-an-email",
            "role": "Research Collaborator",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));

    // The dispatcher must never see a malformed address.
    assert_eq!(mailer.invite_count(), 0);

    println!("[PASS] test_invalid_email_never_reaches_dispatcher");
}

#[actix_rt::test]
async fn test_invite_is_persisted_and_dispatched() {
    let (_dir, pool) = setup_test_pool();
    let (applicant_id, proposal_id) = seed_proposal(&pool);
    let mailer = Arc::new(RecordingMailer::default());
    let app = spawn_app!(pool, mailer);
    let auth = bearer(applicant_id, APPLICANT_NAME, Role::Applicant);

    let req = test::TestRequest::post()
        .uri("/api/collaboration/invite")
        .insert_header(("Authorization", auth.clone()))
        .set_json(json!({
            "proposal_id": proposal_id,
            "email": "colleague@example.com",
            "role": "Research Collaborator",
            "message": "Join us on this one",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["delivered"], json!(true));
    assert_eq!(mailer.invite_count(), 1);

    // The stored invitation comes back on the listing endpoint.
    let req = test::TestRequest::get()
        .uri(&format!("/api/collaboration/invitations/{proposal_id}"))
        .insert_header(("Authorization", auth))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], json!(true));
    let invitations = body["invitations"].as_array().expect("array");
    assert_eq!(invitations.len(), 1);
    assert_eq!(invitations[0]["email"], json!("colleague@example.com"));
    assert_eq!(invitations[0]["status"], json!("pending"));
    assert_eq!(invitations[0]["invited_by"], json!(APPLICANT_NAME));

    println!("[PASS] test_invite_is_persisted_and_dispatched");
}

#[actix_rt::test]
async fn test_invite_for_unknown_proposal_is_not_found() {
    let (_dir, pool) = setup_test_pool();
    let (applicant_id, _) = seed_proposal(&pool);
    let mailer = Arc::new(RecordingMailer::default());
    let app = spawn_app!(pool, mailer);

    let req = test::TestRequest::post()
        .uri("/api/collaboration/invite")
        .insert_header(("Authorization", bearer(applicant_id, APPLICANT_NAME, Role::Applicant)))
        .set_json(json!({
            "proposal_id": 9999,
            "email": "colleague@example.com",
            "role": "Research Collaborator",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 404);
    assert_eq!(mailer.invite_count(), 0);

    println!("[PASS] test_invite_for_unknown_proposal_is_not_found");
}

#[actix_rt::test]
async fn test_dispatch_failure_still_records_the_invitation() {
    let (_dir, pool) = setup_test_pool();
    let (applicant_id, proposal_id) = seed_proposal(&pool);
    let mailer = Arc::new(RecordingMailer::default());
    mailer.fail.store(true, Ordering::SeqCst);
    let app = spawn_app!(pool, mailer);
    let auth = bearer(applicant_id, APPLICANT_NAME, Role::Applicant);

    let req = test::TestRequest::post()
        .uri("/api/collaboration/invite")
        .insert_header(("Authorization", auth.clone()))
        .set_json(json!({
            "proposal_id": proposal_id,
            "email": "colleague@example.com",
            "role": "Research Collaborator",
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], json!(true));
    assert_eq!(body["delivered"], json!(false));

    let req = test::TestRequest::get()
        .uri(&format!("/api/collaboration/invitations/{proposal_id}"))
        .insert_header(("Authorization", auth))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["invitations"].as_array().expect("array").len(), 1);

    println!("[PASS] test_dispatch_failure_still_records_the_invitation");
}

#[actix_rt::test]
async fn test_invitations_hidden_from_unrelated_applicant() {
    let (_dir, pool) = setup_test_pool();
    let (_, proposal_id) = seed_proposal(&pool);
    let outsider_id = {
        let conn = pool.get().expect("conn");
        common::seed_user(&conn, "bob", "Bob Wilson", Role::Applicant)
    };
    let mailer = Arc::new(RecordingMailer::default());
    let app = spawn_app!(pool, mailer);

    let req = test::TestRequest::get()
        .uri(&format!("/api/collaboration/invitations/{proposal_id}"))
        .insert_header(("Authorization", bearer(outsider_id, "Bob Wilson", Role::Applicant)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 403);

    println!("[PASS] test_invitations_hidden_from_unrelated_applicant");
}
