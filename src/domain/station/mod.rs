pub mod notification;
pub mod station;
