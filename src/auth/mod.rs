// Authentication & authorization module

pub mod password;
pub mod token;
pub mod user_store;
pub mod service;
pub mod auth_middleware;
pub mod audit_logger;
