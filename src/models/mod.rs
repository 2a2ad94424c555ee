pub mod attendance;
pub mod qr_session;
pub mod session;
pub mod timetable;
pub mod user;
