use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sysinfo::NetworkData;

pub trait Evaluate<T>
where
    T: ?Sized,
{
    fn evaluate(&self, value: &T) -> bool;
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub enum Predicate {
    Contains(String),
    StartsWith(String),
    EndsWith(String),
    Equal(String),
    IEqual(String),
}

impl Evaluate<str> for Predicate {
    fn evaluate(&self, value: &str) -> bool {
        match self {
            Predicate::Contains(pattern) => value.contains(pattern),
            Predicate::StartsWith(pattern) => value.starts_with(pattern),
            Predicate::EndsWith(pattern) => value.ends_with(pattern),
            Predicate::Equal(pattern) => value == pattern,
            Predicate::IEqual(pattern) => value.eq_ignore_ascii_case(pattern),
        }
    }
}

/// Identity of a block device as reported by the kernel.
#[derive(Debug, Clone, Copy)]
pub struct DiskId<'a> {
    pub name: &'a str,
    pub major: i32,
    pub minor: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub enum DiskFilter {
    Name(Predicate),
    MajorMinor(i32, i32),
}

impl Evaluate<DiskId<'_>> for DiskFilter {
    fn evaluate(&self, value: &DiskId<'_>) -> bool {
        match self {
            DiskFilter::Name(predicate) => predicate.evaluate(value.name),
            DiskFilter::MajorMinor(major, minor) => value.major == *major && value.minor == *minor,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub enum NetworkFilter {
    Name(Predicate),
    MacAddress(Predicate),
}

impl Evaluate<(&String, &NetworkData)> for NetworkFilter {
    fn evaluate(&self, (name, network_data): &(&String, &NetworkData)) -> bool {
        match self {
            NetworkFilter::Name(predicate) => predicate.evaluate(name),
            NetworkFilter::MacAddress(predicate) => {
                predicate.evaluate(&network_data.mac_address().to_string())
            }
        }
    }
}

/// Where the CPU temperature comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CpuTemperature {
    /// Always report the given value.
    Constant(f32),
    /// Average of the hardware sensors whose label matches any predicate.
    Components(Vec<Predicate>),
}

impl Default for CpuTemperature {
    fn default() -> Self {
        CpuTemperature::Constant(super::PLACEHOLDER_CPU_TEMP)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SensorConfig {
    pub cpu_temperature: CpuTemperature,
    /// Program and arguments printing `temperature, vram used, vram total` on one line.
    /// Empty disables the GPU query.
    pub gpu_command: Vec<String>,
    /// Empty means every interface.
    pub network_interfaces: Vec<NetworkFilter>,
    /// Empty means every whole disk.
    pub disks: Vec<DiskFilter>,
}

impl Default for SensorConfig {
    fn default() -> Self {
        SensorConfig {
            cpu_temperature: CpuTemperature::default(),
            gpu_command: super::default_gpu_command(),
            network_interfaces: vec![],
            disks: vec![],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct SerialConfig {
    pub baud_rate: u32,
    /// Candidate names are every prefix followed by every number in `first_port..=last_port`.
    pub port_prefixes: Vec<String>,
    pub first_port: u32,
    pub last_port: u32,
    /// Skips the interactive prompt when set.
    pub port: Option<String>,
}

impl Default for SerialConfig {
    fn default() -> Self {
        let (first_port, last_port) = super::default_port_range();
        SerialConfig {
            baud_rate: super::DEFAULT_BAUD_RATE,
            port_prefixes: super::default_port_prefixes(),
            first_port,
            last_port,
            port: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    #[serde(with = "humantime_serde", default = "super::default_sample_interval")]
    pub sample_interval: Duration,
    #[serde(with = "humantime_serde", default = "super::default_settle_delay")]
    pub settle_delay: Duration,
    pub serial: SerialConfig,
    pub sensors: SensorConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            sample_interval: super::default_sample_interval(),
            settle_delay: super::default_settle_delay(),
            serial: SerialConfig::default(),
            sensors: SensorConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Reads the TOML config at `path`, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(MonitorConfig::default());
        };

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config)
    }
}
