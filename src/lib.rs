// Library root for the certificate registry

pub mod core;
pub mod auth;
pub mod certificate;
pub mod api;
pub mod config;
