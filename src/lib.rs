pub mod api;
pub mod capsules;
pub mod config;
pub mod error;
pub mod inventory;
pub mod monitor;
pub mod routes;
pub mod store;

pub use error::{Error, Result};
