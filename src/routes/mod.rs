pub mod attendance;
pub mod error;
pub mod health;
pub mod qr_session;
pub mod timetable;
pub mod user;
