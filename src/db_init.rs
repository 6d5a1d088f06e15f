//! Database initialization and cleanup utilities for option change triggers
//!
//! This module installs the PostgreSQL trigger function that publishes
//! option changes to [`DEFAULT_OPTIONS_CHANNEL`](crate::DEFAULT_OPTIONS_CHANNEL),
//! and attaches it to a settings table.

use sqlx::PgPool;

/// Initialize the `notify_option_change()` trigger function and attach it to `table`
///
/// # Example
///
/// ```rust,no_run
/// use sqlx::PgPool;
/// use prefix_options_cache::init_option_triggers;
///
/// # async fn example(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// init_option_triggers(pool, "options").await?;
/// # Ok(())
/// # }
/// ```
pub async fn init_option_triggers(pool: &PgPool, table: &str) -> Result<(), sqlx::Error> {
    const SQL: &str = include_str!("../sql/option_notification_triggers.sql");
    sqlx::raw_sql(SQL).execute(pool).await?;

    let trigger = format!(
        "DROP TRIGGER IF EXISTS {table}_notify_option_change ON {table};
         CREATE TRIGGER {table}_notify_option_change
         AFTER INSERT OR UPDATE OR DELETE ON {table}
         FOR EACH ROW EXECUTE FUNCTION notify_option_change();"
    );
    sqlx::raw_sql(&trigger).execute(pool).await?;
    Ok(())
}

/// Cleanup the `notify_option_change()` function and all triggers that use it
///
/// # Example
///
/// ```rust,no_run
/// use sqlx::PgPool;
/// use prefix_options_cache::cleanup_option_triggers;
///
/// # async fn example(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// cleanup_option_triggers(pool).await?;
/// # Ok(())
/// # }
/// ```
pub async fn cleanup_option_triggers(pool: &PgPool) -> Result<(), sqlx::Error> {
    const SQL: &str = include_str!("../cleanup/cleanup_option_notification_triggers.sql");
    sqlx::raw_sql(SQL).execute(pool).await?;
    Ok(())
}
