use sqlx::MySqlPool;

use crate::auth::pin::{hash_pin, verify_pin};
use crate::error::{AppError, AppResult};
use crate::model::manager_user::{ManagerCredential, ManagerUser, UnlockedDepartment};

/// One manager row per email; saving again moves the manager and resets the PIN.
pub async fn upsert_manager(
    pool: &MySqlPool,
    email: &str,
    department_id: u64,
    pin: &str,
) -> AppResult<()> {
    let pin_hash = hash_pin(pin)?;

    sqlx::query(
        r#"
        INSERT INTO manager_users (email, department_id, pin_hash)
        VALUES (?, ?, ?)
        ON DUPLICATE KEY UPDATE
            department_id = VALUES(department_id),
            pin_hash = VALUES(pin_hash)
        "#,
    )
    .bind(email)
    .bind(department_id)
    .bind(pin_hash)
    .execute(pool)
    .await
    .map_err(|e| AppError::store("upsertManager", e))?;

    Ok(())
}

pub async fn list_managers(pool: &MySqlPool) -> AppResult<Vec<ManagerUser>> {
    sqlx::query_as::<_, ManagerUser>(
        "SELECT email, department_id FROM manager_users ORDER BY email ASC",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::store("listManagers", e))
}

pub async fn get_manager(pool: &MySqlPool, email: &str) -> AppResult<Option<ManagerUser>> {
    sqlx::query_as::<_, ManagerUser>(
        "SELECT email, department_id FROM manager_users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::store("getManager", e))
}

pub async fn delete_manager(pool: &MySqlPool, email: &str) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM manager_users WHERE email = ?")
        .bind(email)
        .execute(pool)
        .await
        .map_err(|e| AppError::store("deleteManager", e))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Manager not found".into()));
    }
    Ok(())
}

pub async fn get_manager_credential(
    pool: &MySqlPool,
    email: &str,
) -> AppResult<Option<ManagerCredential>> {
    sqlx::query_as::<_, ManagerCredential>(
        r#"
        SELECT m.department_id, d.name AS department_name, m.pin_hash
        FROM manager_users m
        LEFT JOIN departments d ON d.id = m.department_id
        WHERE m.email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::store("verifyManagerPin", e))
}

/// Where manager rows come from; the console asks on every request.
pub trait ManagerDirectory {
    async fn credential(&self, email: &str) -> AppResult<Option<ManagerCredential>>;
}

impl ManagerDirectory for MySqlPool {
    async fn credential(&self, email: &str) -> AppResult<Option<ManagerCredential>> {
        get_manager_credential(self, email).await
    }
}

/// `None` when the signed-in email is not a manager or the PIN does not match.
pub async fn verify_manager_pin<D: ManagerDirectory>(
    directory: &D,
    email: &str,
    pin: &str,
) -> AppResult<Option<(UnlockedDepartment, ManagerCredential)>> {
    let credential = directory.credential(email).await?;
    Ok(credential
        .filter(|c| verify_pin(pin, &c.pin_hash))
        .map(|c| (c.unlocked(), c)))
}
