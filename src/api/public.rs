use crate::config::Config;
use crate::error::AppResult;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::leave_request::PublicLeaveRow;
use crate::realtime::{ChangeFeed, ChangeKind, Table};
use crate::store::{departments, employees, leave_requests};
use crate::utils::validation::LeaveSubmission;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

/// Form payload of the public page. Everything is optional so that missing
/// selections get the form's own messages instead of a decode error.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SubmitLeave {
    #[schema(example = 1)]
    pub department_id: Option<u64>,
    #[schema(example = 12)]
    pub employee_id: Option<u64>,
    #[schema(example = "2024-06-05", format = "date", value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2024-06-10", format = "date", value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
    #[schema(example = "Family trip")]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EmployeeQuery {
    /// Employees of this department; none without it
    pub department_id: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service status", body = Object, example = json!({
        "status": "ok",
        "auth_configured": true
    }))),
    tag = "Public"
)]
pub async fn health(config: web::Data<Config>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "auth_configured": config.auth_configured(),
    }))
}

#[utoipa::path(
    get,
    path = "/public/departments",
    responses((status = 200, description = "Departments by name", body = [Department])),
    tag = "Public"
)]
pub async fn list_departments(pool: web::Data<MySqlPool>) -> AppResult<impl Responder> {
    let rows = departments::get_departments(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    get,
    path = "/public/employees",
    params(EmployeeQuery),
    responses((status = 200, description = "Employees of the department by name", body = [Employee])),
    tag = "Public"
)]
pub async fn list_employees(
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> AppResult<impl Responder> {
    let Some(department_id) = query.department_id.filter(|id| *id != 0) else {
        return Ok(HttpResponse::Ok().json(Vec::<Employee>::new()));
    };

    let rows = employees::get_employees(
        pool.get_ref(),
        employees::EmployeeFilter {
            department_id: Some(department_id),
            limit: None,
        },
    )
    .await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    get,
    path = "/public/leave-requests",
    responses((status = 200, description = "Most recent requests", body = [PublicLeaveRow])),
    tag = "Public"
)]
pub async fn recent_requests(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> AppResult<impl Responder> {
    let rows =
        leave_requests::get_public_leave_requests(pool.get_ref(), config.live_refresh_limit)
            .await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    post,
    path = "/public/leave-requests",
    request_body = SubmitLeave,
    responses(
        (status = 201, description = "Request submitted", body = Object, example = json!({
            "message": "Request submitted. You can close this page.",
            "id": 42,
            "status": "pending"
        })),
        (status = 400, description = "Validation failed", body = Object, example = json!({
            "message": "End date can't be before start date."
        }))
    ),
    tag = "Public"
)]
pub async fn submit_request(
    pool: web::Data<MySqlPool>,
    feed: web::Data<ChangeFeed>,
    payload: web::Json<SubmitLeave>,
) -> AppResult<impl Responder> {
    let new_request = LeaveSubmission {
        department_id: payload.department_id,
        employee_id: payload.employee_id,
        start_date: payload.start_date,
        end_date: payload.end_date,
        reason: payload.reason.as_deref(),
    }
    .validate()?;

    let id = leave_requests::create_leave_request(pool.get_ref(), &new_request).await?;
    feed.publish(Table::LeaveRequests, ChangeKind::Insert, Some(id));

    info!(id, employee_id = new_request.employee_id, "Leave request submitted");
    Ok(HttpResponse::Created().json(json!({
        "message": "Request submitted. You can close this page.",
        "id": id,
        "status": "pending"
    })))
}
