pub mod api;
pub mod config;
pub mod database;
pub mod directory;
pub mod error;
pub mod review;
pub mod stats;

pub use error::ServiceError;
