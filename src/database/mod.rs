pub mod attendance;
pub mod postgres_repository;
pub mod qr_session;
pub mod session;
pub mod user;
