use tracing::debug;

use crate::collect::gpu::{build_gpu_query, GpuQuery};
use crate::collect::host::HostMetricSource;
use crate::collect::metric_source::{Counter, MetricSource};
use crate::collect::sensor::{build_cpu_sensor, TemperatureSensor};
use crate::collect::system_data::SystemData;
use crate::config::monitor_config::SensorConfig;
use crate::render::color::temperature_to_color;

pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

pub fn bytes_to_mb(bytes_per_sec: f64) -> f32 {
    (bytes_per_sec / BYTES_PER_MB) as f32
}

/// Builds one [`SystemData`] per tick out of the metric source and sensors.
pub struct Collector {
    source: Box<dyn MetricSource>,
    cpu_sensor: Box<dyn TemperatureSensor>,
    gpu: Box<dyn GpuQuery>,
}

impl Collector {
    pub fn new(
        source: Box<dyn MetricSource>,
        cpu_sensor: Box<dyn TemperatureSensor>,
        gpu: Box<dyn GpuQuery>,
    ) -> Self {
        Collector {
            source,
            cpu_sensor,
            gpu,
        }
    }

    /// Collector reading the real host.
    pub fn for_host(config: &SensorConfig) -> Self {
        Collector::new(
            Box::new(HostMetricSource::new(config)),
            build_cpu_sensor(&config.cpu_temperature),
            build_gpu_query(&config.gpu_command),
        )
    }

    /// Samples every metric exactly once. Blocks on whatever the sources block on.
    pub fn collect(&mut self) -> SystemData {
        let cpu_usage = self.source.sample(Counter::CpuUsage) as f32;
        let cpu_temp = self.cpu_sensor.read_celsius();
        let ram_usage = self.source.sample(Counter::MemoryUsage) as f32;

        let (gpu_temp, vram_usage) = match self.gpu.query() {
            Some(stats) => (stats.temperature_c, stats.vram_percent()),
            None => {
                debug!("GPU stats unavailable");
                (0.0, 0.0)
            }
        };
        let gpu_color = temperature_to_color(gpu_temp);

        let disk_read = bytes_to_mb(self.source.sample(Counter::DiskReadBytesPerSec));
        let disk_write = bytes_to_mb(self.source.sample(Counter::DiskWriteBytesPerSec));
        let net_up = bytes_to_mb(self.source.sample(Counter::NetSentBytesPerSec));
        let net_down = bytes_to_mb(self.source.sample(Counter::NetReceivedBytesPerSec));

        SystemData {
            cpu_usage,
            cpu_temp,
            cpu_color: temperature_to_color(cpu_temp),
            ram_usage,
            // No separate GPU load query, VRAM usage stands in for it.
            gpu_usage: vram_usage,
            gpu_temp,
            gpu_color,
            vram_usage,
            vram_color: gpu_color,
            disk_read,
            disk_write,
            net_up,
            net_down,
        }
    }
}
