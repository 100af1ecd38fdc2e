use std::io::{self, Write};

use tracing::debug;

use crate::collect::system_data::SystemData;

/// Shows each transmitted sample to the operator.
pub trait Reporter {
    fn report(&mut self, data: &SystemData);
}

impl<F> Reporter for F
where
    F: FnMut(&SystemData),
{
    fn report(&mut self, data: &SystemData) {
        self(data)
    }
}

/// One status line, rewritten in place with a carriage return.
pub fn format_status(data: &SystemData) -> String {
    format!(
        "\rCPU: {:5.1}% ({:4.1}C) | RAM: {:5.1}% | GPU: {:5.1}% ({:4.1}C) | VRAM: {:5.1}% | \
         Disk: R:{:6.2} W:{:6.2} MB/s | Net: U:{:6.2} D:{:6.2} MB/s  ",
        data.cpu_usage,
        data.cpu_temp,
        data.ram_usage,
        data.gpu_usage,
        data.gpu_temp,
        data.vram_usage,
        data.disk_read,
        data.disk_write,
        data.net_up,
        data.net_down,
    )
}

pub struct ConsoleReporter<W> {
    output: W,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        ConsoleReporter::new(io::stdout())
    }
}

impl<W> ConsoleReporter<W>
where
    W: Write,
{
    pub fn new(output: W) -> Self {
        ConsoleReporter { output }
    }
}

impl<W> Reporter for ConsoleReporter<W>
where
    W: Write,
{
    fn report(&mut self, data: &SystemData) {
        let line = format_status(data);
        if let Err(err) = self
            .output
            .write_all(line.as_bytes())
            .and_then(|_| self.output.flush())
        {
            debug!(?err, "Failed to write status line");
        }
    }
}
