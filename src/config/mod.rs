use std::time::Duration;

pub mod monitor_config;

pub const DEFAULT_BAUD_RATE: u32 = 115_200;
pub const PLACEHOLDER_CPU_TEMP: f32 = 50.0;

pub fn default_sample_interval() -> Duration {
    Duration::from_millis(100)
}

pub fn default_settle_delay() -> Duration {
    Duration::from_secs(2)
}

pub fn default_gpu_command() -> Vec<String> {
    [
        "nvidia-smi",
        "--query-gpu=temperature.gpu,memory.used,memory.total",
        "--format=csv,noheader,nounits",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[cfg(windows)]
pub fn default_port_prefixes() -> Vec<String> {
    vec!["COM".to_string()]
}

#[cfg(not(windows))]
pub fn default_port_prefixes() -> Vec<String> {
    vec!["/dev/ttyUSB".to_string(), "/dev/ttyACM".to_string()]
}

#[cfg(windows)]
pub fn default_port_range() -> (u32, u32) {
    (1, 256)
}

// tty device numbering starts at zero
#[cfg(not(windows))]
pub fn default_port_range() -> (u32, u32) {
    (0, 255)
}
