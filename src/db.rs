use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::models::role::Role;
use crate::models::user::{self, NewUser};

pub type DbPool = Pool<SqliteConnectionManager>;

pub const MIGRATIONS: &str = include_str!("schema.sql");

pub fn init_pool(database_url: &str) -> DbPool {
    let manager = SqliteConnectionManager::file(database_url).with_init(|conn| {
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Ok(())
    });
    Pool::builder()
        .max_size(8)
        .build(manager)
        .expect("Failed to create DB pool")
}

pub fn run_migrations(pool: &DbPool) {
    let conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.execute_batch(MIGRATIONS)
        .expect("Failed to run migrations");
    log::info!("Database migrations complete");
}

/// Seed demo accounts (one per role) so every dashboard is reachable on
/// a fresh database. Skipped if any user already exists.
pub fn seed_demo(pool: &DbPool, password_hash: &str) {
    let conn = pool.get().expect("Failed to get DB connection for seeding");

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .unwrap_or(0);
    if count > 0 {
        log::info!("Database already seeded ({count} users), skipping demo seed");
        return;
    }

    let demo_users = [
        ("alice", "alice@example.com", "Alice Kumar", Role::Applicant),
        ("rhea", "rhea@example.com", "Dr. Rhea Menon", Role::Reviewer),
        ("sam", "sam@example.com", "Staff Member 1", Role::Staff),
    ];

    for (username, email, display_name, role) in demo_users {
        let result = user::create(
            &conn,
            &NewUser {
                username: username.to_string(),
                email: email.to_string(),
                display_name: display_name.to_string(),
                password: password_hash.to_string(),
                role,
            },
        );
        if let Err(e) = result {
            log::error!("Demo seed failed for {username}: {e}");
        }
    }

    log::info!("Demo seed complete");
}
