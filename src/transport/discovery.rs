use std::time::Duration;

use tracing::{debug, info};

use crate::config::monitor_config::SerialConfig;

/// Tells whether a port exists and is free.
pub trait PortProber {
    fn probe(&self, name: &str) -> bool;
}

impl<F> PortProber for F
where
    F: Fn(&str) -> bool,
{
    fn probe(&self, name: &str) -> bool {
        self(name)
    }
}

/// Probes by opening the port exclusively for read and write and closing it again.
#[derive(Debug, Clone, Copy)]
pub struct SerialProber {
    baud_rate: u32,
}

impl SerialProber {
    pub fn new(baud_rate: u32) -> Self {
        SerialProber { baud_rate }
    }
}

impl PortProber for SerialProber {
    fn probe(&self, name: &str) -> bool {
        // Dropping the handle closes the port.
        serialport::new(name, self.baud_rate)
            .timeout(Duration::from_millis(50))
            .open()
            .is_ok()
    }
}

/// Candidate names in probe order: per prefix, ascending by number.
pub fn candidate_names(config: &SerialConfig) -> impl Iterator<Item = String> + '_ {
    config.port_prefixes.iter().flat_map(move |prefix| {
        (config.first_port..=config.last_port).map(move |number| format!("{prefix}{number}"))
    })
}

/// Lists every candidate port that can currently be opened.
pub fn discover<P>(prober: &P, config: &SerialConfig) -> Vec<String>
where
    P: PortProber + ?Sized,
{
    let ports: Vec<String> = candidate_names(config)
        .filter(|name| {
            let available = prober.probe(name);
            if available {
                debug!(port = %name, "Port available");
            }
            available
        })
        .collect();

    info!(?ports, "Discovered serial ports");
    ports
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(prefixes: &[&str], first_port: u32, last_port: u32) -> SerialConfig {
        SerialConfig {
            port_prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
            first_port,
            last_port,
            ..Default::default()
        }
    }

    #[test]
    fn test_candidate_names() {
        let names: Vec<String> = candidate_names(&config(&["COM"], 1, 256)).collect();
        assert_eq!(names.len(), 256);
        assert_eq!(names[0], "COM1");
        assert_eq!(names[255], "COM256");

        let names: Vec<String> =
            candidate_names(&config(&["/dev/ttyUSB", "/dev/ttyACM"], 0, 1)).collect();
        assert_eq!(
            names,
            vec!["/dev/ttyUSB0", "/dev/ttyUSB1", "/dev/ttyACM0", "/dev/ttyACM1"]
        );
    }

    #[test]
    fn test_discover_keeps_order() {
        let prober = |name: &str| name == "COM5" || name == "COM3" || name == "COM200";
        let ports = discover(&prober, &config(&["COM"], 1, 256));
        assert_eq!(ports, vec!["COM3", "COM5", "COM200"]);
    }

    #[test]
    fn test_discover_nothing() {
        let prober = |_: &str| false;
        assert!(discover(&prober, &config(&["COM"], 1, 256)).is_empty());
    }
}
