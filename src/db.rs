//! Database module
//!
//! Connectivity and schema checks. The schema itself lives in
//! `migrations/0001_init.sql` and is applied by operators.

use sqlx::PgPool;

/// Tables the service reads and writes
const REQUIRED_TABLES: &[&str] = &["api_keys", "students", "payment_notifications", "payment_events"];

/// Verify database connectivity
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    for table in REQUIRED_TABLES {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(*table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    // Without the unique index, duplicate references could race past the existence check
    let has_unique_reference: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM pg_indexes
            WHERE tablename = 'payment_notifications'
              AND indexdef ILIKE '%UNIQUE%'
              AND indexdef ILIKE '%(payment_reference)%'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !has_unique_reference {
        tracing::error!("payment_notifications.payment_reference is not unique-indexed");
        return Ok(false);
    }

    tracing::info!("Database schema verified");
    Ok(true)
}
