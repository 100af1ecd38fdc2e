use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use tracing::error;

use serial_display_monitoring::cli::CmdArgs;
use serial_display_monitoring::collect::collector::Collector;
use serial_display_monitoring::config::monitor_config::MonitorConfig;
use serial_display_monitoring::init::init_tracing;
use serial_display_monitoring::monitor::report::ConsoleReporter;
use serial_display_monitoring::monitor::sampling_loop::{SamplingLoop, StopReason};
use serial_display_monitoring::transport::discovery::SerialProber;
use serial_display_monitoring::transport::link::SerialOpener;
use serial_display_monitoring::transport::selection::{ConsolePrompt, FixedPort, PortSelector};

fn main() -> ExitCode {
    if let Err(err) = init_tracing() {
        eprintln!("Failed to initialize logging: {err:#}");
    }

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let args = CmdArgs::parse();
    let mut config = MonitorConfig::load(args.config.as_deref())?;
    if args.port.is_some() {
        config.serial.port = args.port;
    }

    println!("{}", "=".repeat(80));
    println!("System Monitor - Starting...");
    println!("{}", "=".repeat(80));

    let stop = Arc::new(AtomicBool::new(false));
    let mut sampling_loop = SamplingLoop::new(config.sample_interval, stop.clone());

    let mut selector: Box<dyn PortSelector> = match &config.serial.port {
        Some(name) => Box::new(FixedPort::new(name.clone())),
        None => Box::new(ConsolePrompt::stdio()),
    };
    let link = match sampling_loop.connect(
        &SerialProber::new(config.serial.baud_rate),
        selector.as_mut(),
        &SerialOpener,
        &config.serial,
        config.settle_delay,
    ) {
        Ok(link) => link,
        Err(err) => {
            println!("\nFailed to connect. Exiting...");
            return Err(err.into());
        }
    };
    println!("Connected to {}", link.port_name());

    // Installed only now so Ctrl+C at the prompt still ends the process right away.
    ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))?;

    let mut collector = Collector::for_host(&config.sensors);
    let mut reporter = ConsoleReporter::stdout();

    println!("\nMonitoring started. Press Ctrl+C to stop.\n");
    match sampling_loop.run(link, &mut collector, &mut reporter) {
        StopReason::Interrupted => {
            println!("\n\nStopping monitor...");
            Ok(())
        }
        StopReason::ConnectionLost(err) => {
            println!("\nConnection lost.");
            Err(err.into())
        }
    }
}
