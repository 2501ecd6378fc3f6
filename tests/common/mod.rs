//! Shared test infrastructure: a temporary SQLite database with
//! migrations applied, helpers for provisioning the three actor roles,
//! and a recording notification dispatcher for call-count assertions.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use rusqlite::Connection;
use tempfile::TempDir;

use naccer::auth::{password, token};
use naccer::db::{self, DbPool, MIGRATIONS};
use naccer::errors::AppError;
use naccer::models::role::Role;
use naccer::models::user::{self, NewUser};
use naccer::notify::{Delivery, Dispatcher, InviteEmail};

// ============================================================================
// DATABASE SETUP
// ============================================================================

/// Setup a test database with schema applied.
///
/// Returns a tuple of (TempDir, Connection) where TempDir must be kept
/// alive for the Connection to remain valid.
pub fn setup_test_db() -> (TempDir, Connection) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("test.db");
    let conn = Connection::open(&db_path).expect("Failed to open test DB");

    conn.execute_batch("PRAGMA foreign_keys=ON; PRAGMA journal_mode=WAL;")
        .expect("Failed to set pragmas");

    conn.execute_batch(MIGRATIONS)
        .expect("Failed to run migrations");

    (dir, conn)
}

/// Same database setup, but behind the pooled handle the handlers use.
pub fn setup_test_pool() -> (TempDir, DbPool) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("test.db");
    let pool = db::init_pool(db_path.to_str().expect("utf8 path"));
    db::run_migrations(&pool);
    (dir, pool)
}

// ============================================================================
// TOKENS
// ============================================================================

pub const TEST_SECRET: &[u8] = b"test-secret-test-secret-test-secret!";

/// A ready-to-use Authorization header value for the given actor.
pub fn bearer(user_id: i64, name: &str, role: Role) -> String {
    let signed = token::issue_token(TEST_SECRET, user_id, name, role, 3600)
        .expect("Failed to issue test token");
    format!("Bearer {signed}")
}

// ============================================================================
// ACTOR PROVISIONING
// ============================================================================

/// Create a user with the given role. Returns the user id.
pub fn seed_user(conn: &Connection, username: &str, display_name: &str, role: Role) -> i64 {
    user::create(
        conn,
        &NewUser {
            username: username.to_string(),
            email: format!("{username}@test.com"),
            display_name: display_name.to_string(),
            password: password::hash_password("password123").expect("Failed to hash password"),
            role,
        },
    )
    .expect("Failed to create user")
}

/// One account per role, for tests exercising role gates.
pub struct Actors {
    pub applicant_id: i64,
    pub reviewer_id: i64,
    pub staff_id: i64,
}

pub const APPLICANT_NAME: &str = "Alice Kumar";
pub const REVIEWER_NAME: &str = "Dr. Rhea Menon";
pub const STAFF_NAME: &str = "Staff Member 1";

pub fn seed_actors(conn: &Connection) -> Actors {
    Actors {
        applicant_id: seed_user(conn, "alice", APPLICANT_NAME, Role::Applicant),
        reviewer_id: seed_user(conn, "rhea", REVIEWER_NAME, Role::Reviewer),
        staff_id: seed_user(conn, "sam", STAFF_NAME, Role::Staff),
    }
}

// ============================================================================
// RECORDING DISPATCHER
// ============================================================================

/// Dispatcher double that records every send, for asserting how often
/// (and whether) the notification boundary was crossed. Set `fail` to
/// make every send error, for best-effort delivery tests.
#[derive(Default)]
pub struct RecordingMailer {
    pub invites: Mutex<Vec<String>>,
    pub feedbacks: Mutex<Vec<String>>,
    pub fail: AtomicBool,
}

impl RecordingMailer {
    pub fn invite_count(&self) -> usize {
        self.invites.lock().expect("lock").len()
    }

    pub fn feedback_count(&self) -> usize {
        self.feedbacks.lock().expect("lock").len()
    }
}

impl Dispatcher for RecordingMailer {
    fn send_feedback(
        &self,
        author_email: &str,
        _proposal_id: i64,
        _proposal_title: &str,
        _feedback: &str,
    ) -> Result<Delivery, AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Dispatch("mailer offline".to_string()));
        }
        self.feedbacks.lock().expect("lock").push(author_email.to_string());
        Ok(Delivery { delivered: true, message_id: Some("test-mail".to_string()) })
    }

    fn send_invite(&self, invite: &InviteEmail<'_>) -> Result<Delivery, AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Dispatch("mailer offline".to_string()));
        }
        self.invites.lock().expect("lock").push(invite.to_email.to_string());
        Ok(Delivery { delivered: true, message_id: Some("test-mail".to_string()) })
    }
}
