pub mod allocation;
pub mod costing;
pub mod database;
pub mod totals;

pub use database::Database;
