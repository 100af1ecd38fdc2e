pub mod report;
pub mod sampling_loop;
