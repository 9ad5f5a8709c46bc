use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::NaiveDate;

use crate::error::{AppError, AppResult};
use crate::model::leave_request::NewLeaveRequest;

/// Length kept by PIN entry fields.
pub const PIN_INPUT_LEN: usize = 6;

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn validate_email(raw: &str) -> AppResult<String> {
    let email = normalize_email(raw);
    if email.is_empty() {
        return Err(AppError::validation("Enter your email."));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::validation("Enter a valid email address.")),
    }
}

/// Digits of a submitted PIN, in full. Unlock checks these against the hash,
/// so PINs of any length the admin console accepts still work.
pub fn pin_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Applied on every keystroke of a PIN entry field: digits only, at most six.
/// Server-side unlock uses [`pin_digits`] instead.
#[allow(dead_code)]
pub fn sanitize_pin_input(raw: &str) -> String {
    pin_digits(raw).chars().take(PIN_INPUT_LEN).collect()
}

/// PINs set from the admin console are 4 to 10 digits.
pub fn validate_manager_pin(pin: &str) -> AppResult<()> {
    let ok = (4..=10).contains(&pin.len()) && pin.chars().all(|c| c.is_ascii_digit());
    if ok {
        Ok(())
    } else {
        Err(AppError::validation("PIN should be 4-10 digits."))
    }
}

/// Random six digit PIN, never starting with zero.
pub fn generate_pin() -> String {
    let n = 100_000 + OsRng.next_u32() % 900_000;
    n.to_string()
}

pub fn validate_date_order(start: NaiveDate, end: NaiveDate) -> AppResult<()> {
    if end < start {
        return Err(AppError::validation("End date can't be before start date."));
    }
    Ok(())
}

/// Blank reasons are stored as NULL.
pub fn clean_reason(reason: Option<&str>) -> Option<String> {
    reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
}

pub fn require_text(raw: &str, message: &str) -> AppResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(AppError::validation(message));
    }
    Ok(value.to_string())
}

/// Raw public submission as the form sends it.
#[derive(Debug, Default, Clone)]
pub struct LeaveSubmission<'a> {
    pub department_id: Option<u64>,
    pub employee_id: Option<u64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub reason: Option<&'a str>,
}

impl LeaveSubmission<'_> {
    /// Checks run in the same order the form reports them.
    pub fn validate(&self) -> AppResult<NewLeaveRequest> {
        let department_id = self
            .department_id
            .filter(|id| *id != 0)
            .ok_or_else(|| AppError::validation("Pick a department."))?;
        let employee_id = self
            .employee_id
            .filter(|id| *id != 0)
            .ok_or_else(|| AppError::validation("Pick your name."))?;
        let (start_date, end_date) = match (self.start_date, self.end_date) {
            (Some(s), Some(e)) => (s, e),
            _ => return Err(AppError::validation("Pick start and end dates.")),
        };
        validate_date_order(start_date, end_date)?;

        Ok(NewLeaveRequest {
            employee_id,
            department_id,
            start_date,
            end_date,
            reason: clean_reason(self.reason),
        })
    }
}
