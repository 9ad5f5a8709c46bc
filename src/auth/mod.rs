pub mod auth;
pub mod handlers;
pub mod jwt;
pub mod magic_link;
pub mod middleware;
pub mod pin;
