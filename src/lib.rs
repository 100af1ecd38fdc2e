//! Samples host load and streams it as fixed 16-byte frames to a display on a serial port.

pub mod cli;
pub mod collect;
pub mod config;
pub mod init;
pub mod monitor;
pub mod protocol;
pub mod render;
pub mod transport;
