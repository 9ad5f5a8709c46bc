use anyhow::{Context, Result};
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;

use crate::store::admin_users;

pub async fn init_db(database_url: &str) -> Result<MySqlPool> {
    let pool = MySqlPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(pool)
}

/// Runs on every start; only missing protected admins are inserted.
pub async fn seed_protected_admins(pool: &MySqlPool, emails: &[String]) -> Result<()> {
    let added = admin_users::seed_protected_admins(pool, emails)
        .await
        .context("Failed to seed protected admins")?;
    if added > 0 {
        tracing::info!(added, "Seeded protected primary admins");
    }
    Ok(())
}
