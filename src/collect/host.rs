//! Host counters backed by sysinfo, and procfs for disk I/O on Linux.

use std::time::Instant;

use sysinfo::{Networks, System};

use crate::collect::metric_source::{Counter, MetricSource};
use crate::collect::rate::RateCounter;
use crate::config::monitor_config::{DiskFilter, Evaluate, NetworkFilter, SensorConfig};

#[derive(Debug)]
pub struct HostMetricSource {
    system: System,
    networks: Networks,
    network_interfaces: Vec<NetworkFilter>,
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    disks: Vec<DiskFilter>,

    disk_read: RateCounter,
    disk_write: RateCounter,
    net_sent: RateCounter,
    net_received: RateCounter,
}

impl HostMetricSource {
    pub fn new(config: &SensorConfig) -> Self {
        let mut system = System::new();
        // CPU usage is computed between two refreshes, prime the first one.
        system.refresh_cpu();
        system.refresh_memory();

        let mut source = HostMetricSource {
            system,
            networks: Networks::new_with_refreshed_list(),
            network_interfaces: config.network_interfaces.clone(),
            disks: config.disks.clone(),
            disk_read: RateCounter::default(),
            disk_write: RateCounter::default(),
            net_sent: RateCounter::default(),
            net_received: RateCounter::default(),
        };

        // Seed the rate counters so the first real sample is not a zero.
        for counter in [
            Counter::DiskReadBytesPerSec,
            Counter::DiskWriteBytesPerSec,
            Counter::NetSentBytesPerSec,
            Counter::NetReceivedBytesPerSec,
        ] {
            source.sample(counter);
        }

        source
    }

    fn collect_cpu_usage(&mut self) -> f64 {
        self.system.refresh_cpu();
        self.system.global_cpu_info().cpu_usage() as f64
    }

    fn collect_mem_usage_percent(&mut self) -> f64 {
        self.system.refresh_memory();
        let total = self.system.total_memory();
        if total == 0 {
            return 0.0;
        }
        self.system.used_memory() as f64 / total as f64 * 100.0
    }

    /// Totals of bytes (transmitted, received) over the matching interfaces.
    fn collect_network_totals(&mut self) -> (u64, u64) {
        self.networks.refresh();

        let mut total_tx = 0u64;
        let mut total_rx = 0u64;

        self.networks
            .iter()
            .filter(|(name, network_data)| {
                self.network_interfaces.is_empty()
                    || self
                        .network_interfaces
                        .iter()
                        .any(|iface| iface.evaluate(&(*name, *network_data)))
            })
            .for_each(|(_, network_data)| {
                total_tx += network_data.total_transmitted();
                total_rx += network_data.total_received();
            });

        (total_tx, total_rx)
    }

    /// Totals of bytes (read, written) over the matching disks. `None` if unavailable.
    #[cfg(target_os = "linux")]
    fn collect_disk_totals(&mut self) -> Option<(u64, u64)> {
        use crate::config::monitor_config::DiskId;
        use tracing::debug;

        const SECTOR_SIZE: u64 = 512;

        let stats = procfs::diskstats()
            .map_err(|err| {
                debug!(?err, "Failed to read disk stats");
                err
            })
            .ok()?;

        let mut total_reads = 0u64;
        let mut total_writes = 0u64;

        stats
            .iter()
            .filter(|disk| {
                if self.disks.is_empty() {
                    // Only whole devices, partitions would be counted twice.
                    return std::path::Path::new("/sys/block").join(&disk.name).exists();
                }
                let id = DiskId {
                    name: &disk.name,
                    major: disk.major,
                    minor: disk.minor,
                };
                self.disks.iter().any(|disk_filter| disk_filter.evaluate(&id))
            })
            .for_each(|disk| {
                total_reads += disk.sectors_read as u64 * SECTOR_SIZE;
                total_writes += disk.sectors_written as u64 * SECTOR_SIZE;
            });

        Some((total_reads, total_writes))
    }

    #[cfg(not(target_os = "linux"))]
    fn collect_disk_totals(&mut self) -> Option<(u64, u64)> {
        self.system.refresh_processes();

        let (reads, writes) = self
            .system
            .processes()
            .values()
            .map(|process| process.disk_usage())
            .fold((0u64, 0u64), |(reads, writes), usage| {
                (
                    reads + usage.total_read_bytes,
                    writes + usage.total_written_bytes,
                )
            });

        Some((reads, writes))
    }
}

impl MetricSource for HostMetricSource {
    fn sample(&mut self, counter: Counter) -> f64 {
        match counter {
            Counter::CpuUsage => self.collect_cpu_usage(),
            Counter::MemoryUsage => self.collect_mem_usage_percent(),
            Counter::DiskReadBytesPerSec => match self.collect_disk_totals() {
                Some((reads, _)) => self.disk_read.update(Instant::now(), reads),
                None => 0.0,
            },
            Counter::DiskWriteBytesPerSec => match self.collect_disk_totals() {
                Some((_, writes)) => self.disk_write.update(Instant::now(), writes),
                None => 0.0,
            },
            Counter::NetSentBytesPerSec => {
                let (sent, _) = self.collect_network_totals();
                self.net_sent.update(Instant::now(), sent)
            }
            Counter::NetReceivedBytesPerSec => {
                let (_, received) = self.collect_network_totals();
                self.net_received.update(Instant::now(), received)
            }
        }
    }
}
