pub mod api;
pub mod domain;
pub mod infrastructure;
pub mod modules;
pub mod services;

pub use infrastructure::config;
pub use infrastructure::server;
pub use infrastructure::{AppState, Config};
