//! Shared test helpers for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use jornal::config::{GeneratorConfig, ServerConfig};
use jornal::dashboard::{build_router, AppState};
use jornal::formatter::FixedClock;
use jornal::store::{MemoryStore, Store};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Instant all API tests run at: Monday 2025-03-10 08:00 UTC.
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap()
}

/// App state over an empty in-memory store and a fixed clock.
pub fn memory_state() -> Arc<AppState> {
    let clock = Arc::new(FixedClock(test_now()));
    AppState::new(
        Arc::new(MemoryStore::with_clock(clock.clone())),
        clock,
        GeneratorConfig::default(),
    )
}

/// Router over [`memory_state`]. Returns the state too so tests can inspect
/// the store behind the router.
pub fn build_test_app() -> (axum::Router, Arc<AppState>) {
    let state = memory_state();
    (build_router(state.clone(), &ServerConfig::default(), None), state)
}

/// Router over a memory store already seeded with the default batch.
pub async fn build_seeded_app() -> (axum::Router, Arc<AppState>) {
    let (app, state) = build_test_app();
    state.seed_if_empty().await.unwrap();
    (app, state)
}

/// Returns the test database URL from the `TEST_DATABASE_URL` environment variable.
/// Panics if the variable is not set.
pub fn test_db_url() -> String {
    std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must be set for integration tests")
}

/// Returns true if the test database URL is configured.
pub fn has_test_db() -> bool {
    std::env::var("TEST_DATABASE_URL").is_ok()
}

static SCHEMA_INIT: OnceCell<()> = OnceCell::const_new();

/// Connect to the test database with a clean schema.
pub async fn setup_test_db() -> jornal::db::Database {
    let db = jornal::db::Database::connect(&test_db_url())
        .await
        .expect("Failed to connect to test database");
    SCHEMA_INIT
        .get_or_init(|| async { run_migrations(db.pool()).await })
        .await;
    truncate_all_tables(db.pool()).await;
    db
}

/// Truncate all tables to ensure test isolation.
pub async fn truncate_all_tables(pool: &sqlx::PgPool) {
    sqlx::raw_sql("TRUNCATE TABLE jobs, contracts RESTART IDENTITY")
        .execute(pool)
        .await
        .unwrap();
}

async fn run_migrations(pool: &sqlx::PgPool) {
    let migration_files = ["migrations/001_jobs_contracts.sql"];

    for file in &migration_files {
        let path = std::path::Path::new(file);
        if !path.exists() {
            panic!("Migration file not found: {}", file);
        }
        let sql = std::fs::read_to_string(path).unwrap();
        sqlx::raw_sql(&sql).execute(pool).await.unwrap_or_else(|e| {
            panic!("Migration {} failed: {}", file, e);
        });
    }
}

/// Count jobs through the trait object, for assertions after requests.
pub async fn job_count(store: &dyn Store) -> i64 {
    store.count_jobs().await.unwrap()
}
