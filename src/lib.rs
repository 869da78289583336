pub mod app_state;
pub mod auth;
pub mod catalog;
pub mod client_ip;
pub mod config;
pub mod dispatch;
pub mod logging;
pub mod platform;
pub mod rate_limit;
pub mod server;
pub mod sessions;
pub mod templates;
pub mod uploads;
