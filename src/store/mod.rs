//! Data access. Each function makes a single attempt and wraps database
//! failures as [`crate::error::AppError::Store`] with the operation name.

pub mod admin_users;
pub mod departments;
pub mod employees;
pub mod leave_requests;
pub mod managers;
