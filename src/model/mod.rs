pub mod admin_user;
pub mod department;
pub mod employee;
pub mod leave_request;
pub mod manager_user;
