pub mod color;
pub mod unit_interval;
