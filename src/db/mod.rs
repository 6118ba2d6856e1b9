pub mod audit_repo;
pub mod revocation_repo;
pub mod user_repo;

#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    // One connection: each in-memory SQLite connection is its own database.
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect in-memory sqlite");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("run migrations");

    pool
}
