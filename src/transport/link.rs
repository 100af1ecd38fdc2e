use std::io::{self, Write};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info, trace, warn};

use crate::config::monitor_config::SerialConfig;
use crate::transport::discovery::{discover, PortProber};
use crate::transport::error::TransportError;
use crate::transport::selection::{resolve, PortSelector};

pub const TIMEOUT_CONSTANT: Duration = Duration::from_millis(50);
pub const TIMEOUT_PER_BYTE: Duration = Duration::from_millis(10);

/// Total time allowed for transferring `len` bytes in either direction.
pub fn total_timeout(len: usize) -> Duration {
    TIMEOUT_CONSTANT + TIMEOUT_PER_BYTE * len as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    PortListed,
    Selected,
    Configured,
    Streaming,
    Failed,
}

/// Line settings: 8N1 at the given baud rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkSettings {
    pub baud_rate: u32,
    /// Largest single write, used to size the write timeout.
    pub frame_len: usize,
}

impl LinkSettings {
    pub fn write_timeout(&self) -> Duration {
        total_timeout(self.frame_len)
    }
}

/// Opens and configures a port. A port that fails configuration must be closed before returning.
pub trait PortOpener {
    type Port: Write;

    fn open(&self, name: &str, settings: &LinkSettings) -> io::Result<Self::Port>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SerialOpener;

impl PortOpener for SerialOpener {
    type Port = SerialHandle;

    fn open(&self, name: &str, settings: &LinkSettings) -> io::Result<SerialHandle> {
        let port = serialport::new(name, settings.baud_rate)
            .data_bits(DataBits::Eight)
            .stop_bits(StopBits::One)
            .parity(Parity::None)
            .flow_control(FlowControl::None)
            .timeout(settings.write_timeout())
            .open()?;

        Ok(SerialHandle {
            name: name.to_string(),
            port,
        })
    }
}

/// An open serial port. Closed on drop.
pub struct SerialHandle {
    name: String,
    port: Box<dyn SerialPort>,
}

impl Write for SerialHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl Drop for SerialHandle {
    fn drop(&mut self) {
        info!(port = %self.name, "Released serial port");
    }
}

/// The serial session to the display.
///
/// Owns the port handle for its whole life; dropping the link releases the port.
pub struct SerialLink<W> {
    port_name: String,
    handle: Option<W>,
    state: LinkState,
}

impl<W> SerialLink<W>
where
    W: Write,
{
    /// Discovers ports, lets `selector` pick one, then opens and configures it.
    ///
    /// Sleeps for `settle_delay` after a successful configuration so the device can reset.
    pub fn connect<P, S, O>(
        prober: &P,
        selector: &mut S,
        opener: &O,
        config: &SerialConfig,
        frame_len: usize,
        settle_delay: Duration,
    ) -> Result<Self, TransportError>
    where
        P: PortProber + ?Sized,
        S: PortSelector + ?Sized,
        O: PortOpener<Port = W> + ?Sized,
    {
        let mut state = LinkState::Disconnected;

        let ports = discover(prober, config);
        if ports.is_empty() {
            return Err(TransportError::NoPortsFound);
        }
        transition(&mut state, LinkState::PortListed);

        let selection = selector.select(&ports);
        let port_name = resolve(&ports, selection)?.to_string();
        transition(&mut state, LinkState::Selected);

        let settings = LinkSettings {
            baud_rate: config.baud_rate,
            frame_len,
        };
        let handle = opener.open(&port_name, &settings).map_err(|source| {
            TransportError::ConfigurationError {
                port: port_name.clone(),
                source,
            }
        })?;
        transition(&mut state, LinkState::Configured);

        info!(
            port = %port_name,
            baud_rate = settings.baud_rate,
            write_timeout = %humantime::format_duration(settings.write_timeout()),
            "Connected"
        );

        if !settle_delay.is_zero() {
            info!(delay = %humantime::format_duration(settle_delay), "Waiting for the device to settle");
            std::thread::sleep(settle_delay);
        }

        Ok(SerialLink {
            port_name,
            handle: Some(handle),
            state,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Writes one frame. A short or failed write releases the port and fails the link for good.
    pub fn try_write(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        let written = match self.handle.as_mut() {
            Some(handle) => match handle.write(frame) {
                Ok(written) => written,
                Err(err) => {
                    warn!(port = %self.port_name, ?err, "Serial write failed");
                    0
                }
            },
            None => 0,
        };

        if written != frame.len() {
            if self.handle.take().is_some() {
                warn!(port = %self.port_name, written, expected = frame.len(), "Serial link lost");
            }
            self.state = LinkState::Failed;
            return Err(TransportError::TransportWriteFailure {
                port: self.port_name.clone(),
                written,
                expected: frame.len(),
            });
        }

        trace!(port = %self.port_name, ?frame, "Frame sent");
        if self.state != LinkState::Streaming {
            transition(&mut self.state, LinkState::Streaming);
        }
        Ok(())
    }

    /// Like [`SerialLink::try_write`], reporting only liveness.
    pub fn write(&mut self, frame: &[u8]) -> bool {
        self.try_write(frame).is_ok()
    }
}

fn transition(state: &mut LinkState, next: LinkState) {
    debug!(from = ?*state, to = ?next, "Serial link state");
    *state = next;
}
