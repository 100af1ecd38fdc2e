use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::collect::collector::Collector;
use crate::config::monitor_config::SerialConfig;
use crate::monitor::report::Reporter;
use crate::protocol::packet::{Packet, PAYLOAD_LEN};
use crate::transport::discovery::PortProber;
use crate::transport::error::TransportError;
use crate::transport::link::{PortOpener, SerialLink};
use crate::transport::selection::PortSelector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Connecting,
    Running,
    Stopped,
}

#[derive(Debug)]
pub enum StopReason {
    /// The stop flag was raised, usually by Ctrl+C.
    Interrupted,
    ConnectionLost(TransportError),
}

/// Drives collect → encode → transmit → report at a fixed period.
///
/// Pacing only sleeps for what is left of the period after the work; overruns are not
/// caught up. The stop flag is checked between iterations.
pub struct SamplingLoop {
    state: LoopState,
    interval: Duration,
    stop: Arc<AtomicBool>,
}

impl SamplingLoop {
    pub fn new(interval: Duration, stop: Arc<AtomicBool>) -> Self {
        SamplingLoop {
            state: LoopState::Idle,
            interval,
            stop,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Opens the link to the display. A failure stops the loop for good.
    pub fn connect<W, P, S, O>(
        &mut self,
        prober: &P,
        selector: &mut S,
        opener: &O,
        config: &SerialConfig,
        settle_delay: Duration,
    ) -> Result<SerialLink<W>, TransportError>
    where
        W: Write,
        P: PortProber + ?Sized,
        S: PortSelector + ?Sized,
        O: PortOpener<Port = W> + ?Sized,
    {
        self.set_state(LoopState::Connecting);

        SerialLink::connect(prober, selector, opener, config, PAYLOAD_LEN, settle_delay).map_err(
            |err| {
                self.set_state(LoopState::Stopped);
                err
            },
        )
    }

    /// Streams samples over `link` until interrupted or the link fails.
    ///
    /// The link is dropped, and its port released, before this returns.
    pub fn run<W, R>(
        &mut self,
        mut link: SerialLink<W>,
        collector: &mut Collector,
        reporter: &mut R,
    ) -> StopReason
    where
        W: Write,
        R: Reporter + ?Sized,
    {
        self.set_state(LoopState::Running);
        info!(
            port = %link.port_name(),
            interval = %humantime::format_duration(self.interval),
            "Monitoring started"
        );

        let reason = loop {
            if self.stop.load(Ordering::SeqCst) {
                break StopReason::Interrupted;
            }

            let started = Instant::now();

            let data = collector.collect();
            let packet = Packet::encode(&data);
            if let Err(err) = link.try_write(packet.wire_bytes()) {
                break StopReason::ConnectionLost(err);
            }
            reporter.report(&data);

            if let Some(remaining) = self.interval.checked_sub(started.elapsed()) {
                std::thread::sleep(remaining);
            }
        };

        drop(link);
        self.set_state(LoopState::Stopped);
        info!(?reason, "Monitoring stopped");

        reason
    }

    fn set_state(&mut self, next: LoopState) {
        debug!(from = ?self.state, to = ?next, "Sampling loop state");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::collect::gpu::NoGpu;
    use crate::collect::metric_source::Counter;
    use crate::collect::sensor::ConstantTemperature;
    use crate::collect::system_data::SystemData;
    use crate::protocol::packet::DecodedPacket;
    use crate::transport::link::tests::{com_config, two_ports, MockOpener, MockPort};
    use crate::transport::selection::Selection;

    fn counting_collector(ticks: Rc<Cell<usize>>) -> Collector {
        Collector::new(
            Box::new(move |counter: Counter| {
                if counter == Counter::CpuUsage {
                    ticks.set(ticks.get() + 1);
                }
                match counter {
                    Counter::CpuUsage => 120.0,
                    Counter::MemoryUsage => 45.6,
                    _ => 2.5 * 1_048_576.0,
                }
            }),
            Box::new(ConstantTemperature(50.0)),
            Box::new(NoGpu),
        )
    }

    fn connected(opener: &MockOpener, stop: Arc<AtomicBool>) -> (SamplingLoop, SerialLink<MockPort>) {
        let mut sampling_loop = SamplingLoop::new(Duration::ZERO, stop);
        let mut selector = |_: &[String]| Selection::Index(1);
        let link = sampling_loop
            .connect(&two_ports, &mut selector, opener, &com_config(), Duration::ZERO)
            .unwrap();
        (sampling_loop, link)
    }

    #[test]
    fn test_connect_failure_stops_before_sampling() {
        let mut sampling_loop = SamplingLoop::new(Duration::ZERO, Arc::new(AtomicBool::new(false)));
        assert_eq!(sampling_loop.state(), LoopState::Idle);

        let opener = MockOpener::default();
        let mut selector = |_: &[String]| Selection::Index(3);
        let result = sampling_loop.connect(
            &two_ports,
            &mut selector,
            &opener,
            &com_config(),
            Duration::ZERO,
        );

        assert!(matches!(result, Err(TransportError::InvalidSelection { .. })));
        assert_eq!(sampling_loop.state(), LoopState::Stopped);
        assert!(opener.opened.borrow().is_empty());
    }

    #[test]
    fn test_streams_until_interrupted() {
        let opener = MockOpener::default();
        let stop = Arc::new(AtomicBool::new(false));
        let (mut sampling_loop, link) = connected(&opener, stop.clone());

        let ticks = Rc::new(Cell::new(0));
        let mut collector = counting_collector(ticks.clone());
        let mut reported = 0;
        let mut reporter = |_: &SystemData| {
            reported += 1;
            if reported == 3 {
                stop.store(true, Ordering::SeqCst);
            }
        };

        let reason = sampling_loop.run(link, &mut collector, &mut reporter);

        assert!(matches!(reason, StopReason::Interrupted));
        assert_eq!(sampling_loop.state(), LoopState::Stopped);
        assert_eq!(ticks.get(), 3);
        assert!(opener.released.get());

        assert_eq!(opener.opened.borrow()[0].1.write_timeout(), Duration::from_millis(210));

        let frames = opener.frames.borrow();
        assert_eq!(frames.len(), 3);
        for frame in frames.iter() {
            assert_eq!(frame.len(), PAYLOAD_LEN);
            let decoded = DecodedPacket::decode(frame).unwrap();
            assert_eq!(decoded.cpu_usage, 99);
            assert_eq!(decoded.ram_usage, 45);
            assert_eq!(decoded.gpu_usage, 0);
            assert_eq!(decoded.disk_read, 2);
            assert_eq!(decoded.net_down, 2);
        }
    }

    #[test]
    fn test_short_write_stops_and_releases() {
        let opener = MockOpener {
            accept: Some(PAYLOAD_LEN - 1),
            ..Default::default()
        };
        let (mut sampling_loop, link) = connected(&opener, Arc::new(AtomicBool::new(false)));

        let ticks = Rc::new(Cell::new(0));
        let mut collector = counting_collector(ticks.clone());
        let mut reported = 0;
        let mut reporter = |_: &SystemData| reported += 1;

        let reason = sampling_loop.run(link, &mut collector, &mut reporter);

        match reason {
            StopReason::ConnectionLost(TransportError::TransportWriteFailure {
                written,
                expected,
                ..
            }) => {
                assert_eq!(written, PAYLOAD_LEN - 1);
                assert_eq!(expected, PAYLOAD_LEN);
            }
            other => panic!("unexpected stop reason: {other:?}"),
        }
        assert_eq!(ticks.get(), 1);
        assert_eq!(reported, 0);
        assert!(opener.released.get());
        assert_eq!(sampling_loop.state(), LoopState::Stopped);
    }

    #[test]
    fn test_interrupt_before_first_tick() {
        let opener = MockOpener::default();
        let (mut sampling_loop, link) = connected(&opener, Arc::new(AtomicBool::new(true)));

        let ticks = Rc::new(Cell::new(0));
        let mut collector = counting_collector(ticks.clone());
        let reason = sampling_loop.run(link, &mut collector, &mut |_: &SystemData| {});

        assert!(matches!(reason, StopReason::Interrupted));
        assert_eq!(ticks.get(), 0);
        assert!(opener.frames.borrow().is_empty());
        assert!(opener.released.get());
    }

    #[test]
    fn test_paces_iterations() {
        let opener = MockOpener::default();
        let stop = Arc::new(AtomicBool::new(false));
        let mut sampling_loop = SamplingLoop::new(Duration::from_millis(20), stop.clone());
        let mut selector = |_: &[String]| Selection::Index(2);
        let link = sampling_loop
            .connect(&two_ports, &mut selector, &opener, &com_config(), Duration::ZERO)
            .unwrap();

        let mut collector = counting_collector(Rc::new(Cell::new(0)));
        let mut reported = 0;
        let mut reporter = |_: &SystemData| {
            reported += 1;
            if reported == 3 {
                stop.store(true, Ordering::SeqCst);
            }
        };

        let started = Instant::now();
        sampling_loop.run(link, &mut collector, &mut reporter);

        assert!(started.elapsed() >= Duration::from_millis(40));
        assert_eq!(opener.opened.borrow()[0].0, "COM5");
    }
}
