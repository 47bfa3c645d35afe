pub mod config;
pub mod models;
pub mod service;

pub use config::*;
pub use models::*;
pub use service::*;
