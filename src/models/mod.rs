pub mod budget;
pub mod category;
pub mod period;
pub mod transaction;
