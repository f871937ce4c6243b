// Core domain types shared by the certificate and account slices

pub mod errors;
pub mod models;
