pub mod admin;
pub mod api;
pub mod downloads;
pub mod shared;
pub mod uploads;
