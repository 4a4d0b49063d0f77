pub mod cli;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod import;
pub mod models;
pub mod store;

pub use db::Database;
pub use error::{Error, Result};
pub use store::ContactStore;
