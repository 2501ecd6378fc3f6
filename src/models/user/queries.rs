use rusqlite::{Connection, OptionalExtension, params};

use super::types::{NewUser, User};
use crate::errors::AppError;
use crate::models::role::Role;

const SELECT_USER: &str = "\
    SELECT id, username, email, display_name, password, role, created_at \
    FROM users";

struct UserRow {
    id: i64,
    username: String,
    email: String,
    display_name: String,
    password: String,
    role: String,
    created_at: String,
}

fn row_to_user_row(row: &rusqlite::Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        display_name: row.get("display_name")?,
        password: row.get("password")?,
        role: row.get("role")?,
        created_at: row.get("created_at")?,
    })
}

/// The role column is free text at the SQL level; parsing it is where
/// an unrecognized value turns into a denial.
fn into_user(row: UserRow) -> Result<User, AppError> {
    let role = Role::parse(&row.role)?;
    Ok(User {
        id: row.id,
        username: row.username,
        email: row.email,
        display_name: row.display_name,
        password: row.password,
        role,
        created_at: row.created_at,
    })
}

/// Create a user. Returns the new row id.
pub fn create(conn: &Connection, new_user: &NewUser) -> Result<i64, AppError> {
    conn.execute(
        "INSERT INTO users (username, email, display_name, password, role) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            new_user.username,
            new_user.email,
            new_user.display_name,
            new_user.password,
            new_user.role.as_str(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_by_username(conn: &Connection, username: &str) -> Result<Option<User>, AppError> {
    let sql = format!("{SELECT_USER} WHERE username = ?1");
    let row = conn
        .query_row(&sql, params![username], row_to_user_row)
        .optional()?;
    row.map(into_user).transpose()
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<User>, AppError> {
    let sql = format!("{SELECT_USER} WHERE id = ?1");
    let row = conn.query_row(&sql, params![id], row_to_user_row).optional()?;
    row.map(into_user).transpose()
}

pub fn username_taken(conn: &Connection, username: &str) -> Result<bool, AppError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE username = ?1",
        params![username],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
