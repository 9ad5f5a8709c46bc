pub mod admin;
pub mod admin_users;
pub mod manager;
pub mod overlay;
pub mod public;
pub mod realtime;
