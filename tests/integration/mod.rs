// Integration tests organized by flow

#[path = "../common/mod.rs"]
mod common;

pub mod test_certificate_flow;
