use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    /// Parses a status filter where `all` (or nothing) means no filter.
    pub fn filter_from(value: Option<&str>) -> Result<Option<Self>, strum::ParseError> {
        match value.map(str::trim) {
            None | Some("") | Some("all") => Ok(None),
            Some(v) => v.parse().map(Some),
        }
    }
}

/// `leave_requests_public`: no personal data beyond the employee name.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PublicLeaveRow {
    pub id: u64,
    pub employee_name: Option<String>,
    pub department_name: Option<String>,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub status: String,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

/// `leave_requests_admin`
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AdminLeaveRow {
    pub id: u64,
    pub employee_id: u64,
    pub employee_name: Option<String>,
    pub department_id: Option<u64>,
    pub department_name: Option<String>,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub status: String,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

/// `leave_requests_manager`
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ManagerLeaveRow {
    pub id: u64,
    pub department_id: Option<u64>,
    pub employee_name: Option<String>,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub status: String,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

/// A validated submission, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLeaveRequest {
    pub employee_id: u64,
    pub department_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

/// Pending row joined with employee and department names.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PendingRow {
    pub id: u64,
    pub department_id: Option<u64>,
    pub department_name: Option<String>,
    pub employee_name: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PendingItem {
    pub request_id: u64,
    pub employee_name: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
}

/// Pending requests of one department. `department_id` is `None` for
/// requests whose department was deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PendingGroup {
    pub department_id: Option<u64>,
    pub department_name: String,
    pub count: usize,
    pub items: Vec<PendingItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_lowercase_only_known_values() {
        assert_eq!("approved".parse::<LeaveStatus>().ok(), Some(LeaveStatus::Approved));
        assert_eq!(LeaveStatus::Rejected.as_ref(), "rejected");
        assert!("cancelled".parse::<LeaveStatus>().is_err());
    }

    #[test]
    fn all_filter_means_no_predicate() {
        assert_eq!(LeaveStatus::filter_from(Some("all")).ok(), Some(None));
        assert_eq!(LeaveStatus::filter_from(None).ok(), Some(None));
        assert_eq!(
            LeaveStatus::filter_from(Some("pending")).ok(),
            Some(Some(LeaveStatus::Pending))
        );
        assert!(LeaveStatus::filter_from(Some("bogus")).is_err());
    }
}
