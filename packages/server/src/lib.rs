// Smart Home Guard - service core
//
// Manages paired light/motion devices for registered users and reacts to
// motion signals: actuate the light, and alert the user when they are away.
// External collaborators (document store, twin registry, pub/sub topic,
// identity provider, mail channel) sit behind traits in kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
