pub mod add;
pub mod aggregate;
pub mod budget;
pub mod dashboard;
pub mod export;
pub mod filter;
pub mod remove;
