pub mod auth;
pub mod devices;
pub mod motion;
pub mod notifications;
pub mod users;
