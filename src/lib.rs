pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod operations;

pub use error::{AppError, Result, ValidationError};
