// Certificate records: QR encoding, image uploads, persistence

pub mod qr;
pub mod uploads;
pub mod student_store;
pub mod service;
