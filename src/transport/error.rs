/// Everything that ends a serial session. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("No serial ports found")]
    NoPortsFound,

    #[error("Invalid port selection {choice:?}, expected 1-{available}")]
    InvalidSelection { choice: String, available: usize },

    #[error("Failed to configure {port}: {source}")]
    ConfigurationError {
        port: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Connection lost on {port}: wrote {written} of {expected} bytes")]
    TransportWriteFailure {
        port: String,
        written: usize,
        expected: usize,
    },
}
