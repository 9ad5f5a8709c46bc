use sqlx::MySqlPool;

use crate::error::{AppError, AppResult};
use crate::model::department::Department;

pub async fn get_departments(pool: &MySqlPool) -> AppResult<Vec<Department>> {
    sqlx::query_as::<_, Department>("SELECT id, name FROM departments ORDER BY name ASC")
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::store("getDepartments", e))
}

pub async fn create_department(pool: &MySqlPool, name: &str) -> AppResult<u64> {
    let result = sqlx::query("INSERT INTO departments (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await
        .map_err(|e| AppError::store("createDepartment", e))?;
    Ok(result.last_insert_id())
}

pub async fn rename_department(pool: &MySqlPool, id: u64, name: &str) -> AppResult<()> {
    let result = sqlx::query("UPDATE departments SET name = ? WHERE id = ?")
        .bind(name)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| AppError::store("renameDepartment", e))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Department not found".into()));
    }
    Ok(())
}

/// Employees and requests of the department keep existing without one.
pub async fn delete_department(pool: &MySqlPool, id: u64) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM departments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| AppError::store("deleteDepartment", e))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Department not found".into()));
    }
    Ok(())
}
