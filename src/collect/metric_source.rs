/// Counters the display needs from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    /// Percent of total processor time.
    CpuUsage,
    /// Percent of memory in use.
    MemoryUsage,
    DiskReadBytesPerSec,
    DiskWriteBytesPerSec,
    NetSentBytesPerSec,
    NetReceivedBytesPerSec,
}

/// Pull-based source of host counters.
///
/// Every call refreshes the underlying data, so it may block on I/O. Sources never fail;
/// a counter that cannot be read reports `0.0`.
pub trait MetricSource {
    fn sample(&mut self, counter: Counter) -> f64;
}

impl<F> MetricSource for F
where
    F: FnMut(Counter) -> f64,
{
    fn sample(&mut self, counter: Counter) -> f64 {
        self(counter)
    }
}
