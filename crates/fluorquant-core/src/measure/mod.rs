pub mod config;
pub mod engine;
pub mod table;

pub use config::MeasurementConfig;
pub use engine::{measure, measure_region};
pub use table::{MeasurementRecord, ResultTable, Statistic};
