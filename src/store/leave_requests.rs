use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::MySqlPool;

use crate::error::{AppError, AppResult};
use crate::model::admin_user::DepartmentScope;
use crate::model::leave_request::{
    AdminLeaveRow, LeaveStatus, ManagerLeaveRow, NewLeaveRequest, PendingGroup, PendingItem,
    PendingRow, PublicLeaveRow,
};
use crate::utils::db_utils::{
    SqlClause, SqlValue, bind_query, bind_query_as, build_update_sql,
};
use crate::utils::validation::validate_date_order;

/// Upper bound for the manager and admin request tables.
pub const REQUEST_LIST_LIMIT: u32 = 200;

const UNKNOWN: &str = "Unknown";

pub async fn create_leave_request(pool: &MySqlPool, req: &NewLeaveRequest) -> AppResult<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO leave_requests
            (employee_id, department_id, start_date, end_date, reason, status)
        VALUES (?, ?, ?, ?, ?, 'pending')
        "#,
    )
    .bind(req.employee_id)
    .bind(req.department_id)
    .bind(req.start_date)
    .bind(req.end_date)
    .bind(req.reason.as_deref())
    .execute(pool)
    .await
    .map_err(|e| AppError::store("createLeaveRequest", e))?;

    Ok(result.last_insert_id())
}

/// Latest requests for the public page.
pub async fn get_public_leave_requests(
    pool: &MySqlPool,
    limit: u32,
) -> AppResult<Vec<PublicLeaveRow>> {
    sqlx::query_as::<_, PublicLeaveRow>(
        r#"
        SELECT id, employee_name, department_name, start_date, end_date, status, created_at
        FROM leave_requests_public
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::store("getPublicLeaveRequests", e))
}

#[derive(Debug, Clone)]
pub struct LeaveQuery {
    pub status: Option<LeaveStatus>,
    pub department_id: Option<u64>,
    pub scope: DepartmentScope,
    pub limit: u32,
}

fn scoped(
    clause: SqlClause,
    column: &'static str,
    scope: &DepartmentScope,
    requested: Option<u64>,
) -> SqlClause {
    match scope.constrain(requested) {
        None => clause,
        Some(ids) => clause.any_of(column, &ids),
    }
}

fn filter_clause(
    status: Option<LeaveStatus>,
    department_id: Option<u64>,
    scope: &DepartmentScope,
) -> SqlClause {
    let mut clause = SqlClause::new();
    if let Some(status) = status {
        clause = clause.eq("status", SqlValue::String(status.to_string()));
    }
    scoped(clause, "department_id", scope, department_id)
}

pub async fn get_leave_requests(
    pool: &MySqlPool,
    query: &LeaveQuery,
) -> AppResult<Vec<AdminLeaveRow>> {
    let clause = filter_clause(query.status, query.department_id, &query.scope);
    let sql = format!(
        r#"
        SELECT id, employee_id, employee_name, department_id, department_name,
               start_date, end_date, reason, status, created_at
        FROM leave_requests_admin
        {}
        ORDER BY created_at DESC, id DESC
        LIMIT {}
        "#,
        clause.where_sql(),
        query.limit
    );

    bind_query_as(sqlx::query_as::<_, AdminLeaveRow>(&sql), clause.values())
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::store("getLeaveRequests", e))
}

pub async fn get_manager_leave_requests(
    pool: &MySqlPool,
    department_id: u64,
    status: Option<LeaveStatus>,
) -> AppResult<Vec<ManagerLeaveRow>> {
    let clause = filter_clause(status, None, &DepartmentScope::single(department_id));
    let sql = format!(
        r#"
        SELECT id, department_id, employee_name, start_date, end_date, reason, status, created_at
        FROM leave_requests_manager
        {}
        ORDER BY created_at DESC, id DESC
        LIMIT {}
        "#,
        clause.where_sql(),
        REQUEST_LIST_LIMIT
    );

    bind_query_as(sqlx::query_as::<_, ManagerLeaveRow>(&sql), clause.values())
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::store("getManagerLeaveRequests", e))
}

pub fn parse_status(status: &str) -> AppResult<LeaveStatus> {
    status
        .parse()
        .map_err(|_| AppError::InvalidArgument(format!("Invalid status: {status}")))
}

/// Rows outside `scope` are left alone and reported as not found.
pub async fn set_leave_request_status(
    pool: &MySqlPool,
    request_id: u64,
    status: &str,
    scope: &DepartmentScope,
) -> AppResult<LeaveStatus> {
    let status = parse_status(status)?;

    let set = SqlClause::new().eq("status", SqlValue::String(status.to_string()));
    let filter = scoped(
        SqlClause::new().eq("id", SqlValue::U64(request_id)),
        "department_id",
        scope,
        None,
    );
    let Some(update) = build_update_sql("leave_requests", set, filter) else {
        return Ok(status);
    };

    let result = bind_query(sqlx::query(&update.sql), &update.values)
        .execute(pool)
        .await
        .map_err(|e| AppError::store("setLeaveRequestStatus", e))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Leave request not found".into()));
    }
    Ok(status)
}

/// Admin "Save edits". `reason: Some(None)` clears the reason.
#[derive(Debug, Default, Clone)]
pub struct LeavePatch {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub reason: Option<Option<String>>,
}

async fn fetch_dates(
    pool: &MySqlPool,
    request_id: u64,
    scope: &DepartmentScope,
) -> AppResult<(NaiveDate, NaiveDate)> {
    let clause = scoped(
        SqlClause::new().eq("id", SqlValue::U64(request_id)),
        "department_id",
        scope,
        None,
    );
    let sql = format!(
        "SELECT start_date, end_date FROM leave_requests{}",
        clause.where_sql()
    );

    bind_query_as(sqlx::query_as::<_, (NaiveDate, NaiveDate)>(&sql), clause.values())
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::store("updateLeaveRequest", e))?
        .ok_or_else(|| AppError::NotFound("Leave request not found".into()))
}

pub async fn update_leave_request(
    pool: &MySqlPool,
    request_id: u64,
    patch: LeavePatch,
    scope: &DepartmentScope,
) -> AppResult<()> {
    if patch.start_date.is_none() && patch.end_date.is_none() && patch.reason.is_none() {
        return Err(AppError::validation("No fields provided for update"));
    }

    let (current_start, current_end) = fetch_dates(pool, request_id, scope).await?;
    validate_date_order(
        patch.start_date.unwrap_or(current_start),
        patch.end_date.unwrap_or(current_end),
    )?;

    let mut set = SqlClause::new();
    if let Some(start) = patch.start_date {
        set = set.eq("start_date", SqlValue::Date(start));
    }
    if let Some(end) = patch.end_date {
        set = set.eq("end_date", SqlValue::Date(end));
    }
    if let Some(reason) = patch.reason {
        set = set.eq("reason", reason.map(SqlValue::String).unwrap_or(SqlValue::Null));
    }

    let filter = scoped(
        SqlClause::new().eq("id", SqlValue::U64(request_id)),
        "department_id",
        scope,
        None,
    );
    let Some(update) = build_update_sql("leave_requests", set, filter) else {
        return Err(AppError::validation("No fields provided for update"));
    };

    bind_query(sqlx::query(&update.sql), &update.values)
        .execute(pool)
        .await
        .map_err(|e| AppError::store("updateLeaveRequest", e))?;
    Ok(())
}

pub async fn delete_leave_request(
    pool: &MySqlPool,
    request_id: u64,
    scope: &DepartmentScope,
) -> AppResult<()> {
    let clause = scoped(
        SqlClause::new().eq("id", SqlValue::U64(request_id)),
        "department_id",
        scope,
        None,
    );
    let sql = format!("DELETE FROM leave_requests{}", clause.where_sql());

    let result = bind_query(sqlx::query(&sql), clause.values())
        .execute(pool)
        .await
        .map_err(|e| AppError::store("deleteLeaveRequest", e))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Leave request not found".into()));
    }
    Ok(())
}

pub async fn get_pending_summary_by_department(
    pool: &MySqlPool,
    scope: &DepartmentScope,
) -> AppResult<Vec<PendingGroup>> {
    let clause = scoped(
        SqlClause::new().eq("lr.status", SqlValue::String(LeaveStatus::Pending.to_string())),
        "lr.department_id",
        scope,
        None,
    );
    let sql = format!(
        r#"
        SELECT lr.id, lr.department_id, d.name AS department_name,
               e.full_name AS employee_name, lr.start_date, lr.end_date
        FROM leave_requests lr
        LEFT JOIN employees e ON e.id = lr.employee_id
        LEFT JOIN departments d ON d.id = lr.department_id
        {}
        ORDER BY lr.created_at DESC, lr.id DESC
        "#,
        clause.where_sql()
    );

    let rows = bind_query_as(sqlx::query_as::<_, PendingRow>(&sql), clause.values())
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::store("getPendingSummaryByDepartment", e))?;

    Ok(summarize_pending(rows))
}

/// Groups pending rows by department, keeping row order inside each group,
/// and sorts groups by department name.
pub fn summarize_pending(rows: Vec<PendingRow>) -> Vec<PendingGroup> {
    let mut groups: Vec<PendingGroup> = Vec::new();
    let mut index: HashMap<Option<u64>, usize> = HashMap::new();

    for row in rows {
        let slot = *index.entry(row.department_id).or_insert_with(|| {
            groups.push(PendingGroup {
                department_id: row.department_id,
                department_name: row
                    .department_name
                    .clone()
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                count: 0,
                items: Vec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.count += 1;
        group.items.push(PendingItem {
            request_id: row.id,
            employee_name: row.employee_name.unwrap_or_else(|| UNKNOWN.to_string()),
            start_date: row.start_date,
            end_date: row.end_date,
        });
    }

    groups.sort_by(|a, b| {
        a.department_name
            .to_lowercase()
            .cmp(&b.department_name.to_lowercase())
            .then_with(|| a.department_name.cmp(&b.department_name))
    });
    groups
}
