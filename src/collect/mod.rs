pub mod collector;
pub mod gpu;
pub mod host;
pub mod metric_source;
pub mod rate;
pub mod sensor;
pub mod system_data;
