//! # SQLite
//!
//! Single-file store for registration records.
//!
//! ## Requirements
//!
//! - One table, a fixed handful of rows seeded at startup
//! - Read-only at request time, so concurrent reads need no locking beyond
//!   what SQLite already gives us
//! - Survives restarts, re-seeding an existing file is a no-op
//!
//! ## Schema
//!
//! - `reg_no` (**text**, unique), the lookup key
//! - Display fields: `name` (**text**), `father_name`/`mother_name`/`venue`
//!   (**text**, nullable)
//! - `verification_no` (**text**), derived once at seed time
//! - `created_at` defaults to the insert timestamp, informational only
use serde::Serialize;
use sqlx::{
    FromRow, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

/// Full display row returned to a caller holding a valid pair.
#[derive(FromRow)]
pub struct Registration {
    pub reg_no: String,
    pub name: String,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub venue: Option<String>,
    pub verification_no: String,
}

#[derive(FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationSummary {
    pub reg_no: String,
    pub name: String,
    pub verification_no: String,
}

pub async fn connect(path: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

pub async fn create_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS registrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            reg_no TEXT UNIQUE NOT NULL,
            name TEXT NOT NULL,
            father_name TEXT,
            mother_name TEXT,
            venue TEXT,
            verification_no TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Matches both columns in one query. A wrong verification number and an
/// unknown registration number are indistinguishable even internally.
pub async fn find_registration(
    pool: &SqlitePool,
    reg_no: &str,
    verification_no: &str,
) -> Result<Option<Registration>, sqlx::Error> {
    sqlx::query_as::<_, Registration>(
        "SELECT reg_no, name, father_name, mother_name, venue, verification_no
         FROM registrations
         WHERE reg_no = ? AND verification_no = ?",
    )
    .bind(reg_no)
    .bind(verification_no)
    .fetch_optional(pool)
    .await
}

pub async fn list_registrations(
    pool: &SqlitePool,
) -> Result<Vec<RegistrationSummary>, sqlx::Error> {
    sqlx::query_as::<_, RegistrationSummary>(
        "SELECT reg_no, name, verification_no FROM registrations ORDER BY reg_no",
    )
    .fetch_all(pool)
    .await
}

pub async fn count_registrations(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM registrations")
        .fetch_one(pool)
        .await
}

/// Upsert keyed on `reg_no`, so seeding stays idempotent under the same
/// secret and input.
pub async fn upsert_registration(
    pool: &SqlitePool,
    registration: &Registration,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT OR REPLACE INTO registrations
         (reg_no, name, father_name, mother_name, venue, verification_no)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&registration.reg_no)
    .bind(&registration.name)
    .bind(&registration.father_name)
    .bind(&registration.mother_name)
    .bind(&registration.venue)
    .bind(&registration.verification_no)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
pub async fn memory_pool() -> SqlitePool {
    // a single connection keeps every query on the same :memory: database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    create_schema(&pool).await.unwrap();

    pool
}
