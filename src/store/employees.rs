use sqlx::MySqlPool;

use crate::error::{AppError, AppResult};
use crate::model::employee::Employee;
use crate::utils::db_utils::{SqlClause, SqlValue, bind_query_as};

#[derive(Debug, Default, Clone, Copy)]
pub struct EmployeeFilter {
    pub department_id: Option<u64>,
    pub limit: Option<u32>,
}

pub async fn get_employees(pool: &MySqlPool, filter: EmployeeFilter) -> AppResult<Vec<Employee>> {
    let mut clause = SqlClause::new();
    if let Some(department_id) = filter.department_id {
        clause = clause.eq("department_id", SqlValue::U64(department_id));
    }

    let mut sql = format!(
        "SELECT id, full_name, department_id FROM employees{} ORDER BY full_name ASC",
        clause.where_sql()
    );
    if let Some(limit) = filter.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    bind_query_as(sqlx::query_as::<_, Employee>(&sql), clause.values())
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::store("getEmployees", e))
}

pub async fn create_employee(
    pool: &MySqlPool,
    full_name: &str,
    department_id: Option<u64>,
) -> AppResult<u64> {
    let result = sqlx::query("INSERT INTO employees (full_name, department_id) VALUES (?, ?)")
        .bind(full_name)
        .bind(department_id)
        .execute(pool)
        .await
        .map_err(|e| AppError::store("createEmployee", e))?;
    Ok(result.last_insert_id())
}

pub async fn update_employee(
    pool: &MySqlPool,
    id: u64,
    full_name: &str,
    department_id: Option<u64>,
) -> AppResult<()> {
    let result = sqlx::query("UPDATE employees SET full_name = ?, department_id = ? WHERE id = ?")
        .bind(full_name)
        .bind(department_id)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| AppError::store("updateEmployee", e))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Employee not found".into()));
    }
    Ok(())
}

/// Their leave requests go with them (ON DELETE CASCADE).
pub async fn delete_employee(pool: &MySqlPool, id: u64) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| AppError::store("deleteEmployee", e))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Employee not found".into()));
    }
    Ok(())
}
