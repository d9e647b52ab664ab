pub mod dispatcher;
pub mod handlers;
pub mod models;
