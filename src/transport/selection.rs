use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::transport::error::TransportError;

/// What the operator picked from the list of discovered ports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// 1-based position in the list.
    Index(i64),
    /// A port name, which must be among the discovered ones.
    Name(String),
    /// Input that is neither.
    Invalid(String),
}

/// Chooses a port. Called once per run with a non-empty list.
pub trait PortSelector {
    fn select(&mut self, ports: &[String]) -> Selection;
}

impl<F> PortSelector for F
where
    F: FnMut(&[String]) -> Selection,
{
    fn select(&mut self, ports: &[String]) -> Selection {
        self(ports)
    }
}

/// Resolves a selection against the discovered ports.
pub fn resolve(ports: &[String], selection: Selection) -> Result<&str, TransportError> {
    let invalid = |choice: String| TransportError::InvalidSelection {
        choice,
        available: ports.len(),
    };

    match selection {
        Selection::Index(index) => usize::try_from(index)
            .ok()
            .and_then(|index| index.checked_sub(1))
            .and_then(|index| ports.get(index))
            .map(String::as_str)
            .ok_or_else(|| invalid(index.to_string())),
        Selection::Name(name) => ports
            .iter()
            .find(|port| **port == name)
            .map(String::as_str)
            .ok_or_else(|| invalid(name)),
        Selection::Invalid(input) => Err(invalid(input)),
    }
}

/// Always picks the configured port.
#[derive(Debug, Clone)]
pub struct FixedPort {
    name: String,
}

impl FixedPort {
    pub fn new(name: impl Into<String>) -> Self {
        FixedPort { name: name.into() }
    }
}

impl PortSelector for FixedPort {
    fn select(&mut self, _ports: &[String]) -> Selection {
        Selection::Name(self.name.clone())
    }
}

/// Prints a numbered list and reads one line with the choice.
pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
}

impl ConsolePrompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        ConsolePrompt::new(io::stdin().lock(), io::stdout())
    }
}

impl<R, W> ConsolePrompt<R, W>
where
    R: BufRead,
    W: Write,
{
    pub fn new(input: R, output: W) -> Self {
        ConsolePrompt { input, output }
    }

    fn prompt(&mut self, ports: &[String]) -> io::Result<String> {
        writeln!(self.output, "\nAvailable serial ports:")?;
        for (i, port) in ports.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, port)?;
        }
        write!(self.output, "\nSelect port (1-{}): ", ports.len())?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line)
    }
}

impl<R, W> PortSelector for ConsolePrompt<R, W>
where
    R: BufRead,
    W: Write,
{
    fn select(&mut self, ports: &[String]) -> Selection {
        let line = match self.prompt(ports) {
            Ok(line) => line,
            Err(err) => {
                debug!(?err, "Failed to read port selection");
                return Selection::Invalid(String::new());
            }
        };

        let line = line.trim();
        match line.parse::<i64>() {
            Ok(index) => Selection::Index(index),
            Err(_) => Selection::Invalid(line.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn ports() -> Vec<String> {
        vec!["COM3".to_string(), "COM5".to_string()]
    }

    #[test]
    fn test_resolve_index() {
        let ports = ports();
        assert_eq!(resolve(&ports, Selection::Index(1)).unwrap(), "COM3");
        assert_eq!(resolve(&ports, Selection::Index(2)).unwrap(), "COM5");

        for index in [0, 3, -1, i64::MAX] {
            assert!(matches!(
                resolve(&ports, Selection::Index(index)),
                Err(TransportError::InvalidSelection { available: 2, .. })
            ));
        }
    }

    #[test]
    fn test_resolve_name() {
        let ports = ports();
        assert_eq!(resolve(&ports, Selection::Name("COM5".to_string())).unwrap(), "COM5");
        assert!(matches!(
            resolve(&ports, Selection::Name("COM7".to_string())),
            Err(TransportError::InvalidSelection { .. })
        ));
        assert!(resolve(&ports, Selection::Invalid("q".to_string())).is_err());
    }

    #[test]
    fn test_console_prompt() {
        let mut output = Vec::new();
        let selection = ConsolePrompt::new(Cursor::new("2\n"), &mut output).select(&ports());
        assert_eq!(selection, Selection::Index(2));

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("1. COM3\n2. COM5\n"));
        assert!(output.ends_with("Select port (1-2): "));
    }

    #[test]
    fn test_console_prompt_garbage_and_eof() {
        let selection = ConsolePrompt::new(Cursor::new("abc\n"), Vec::new()).select(&ports());
        assert_eq!(selection, Selection::Invalid("abc".to_string()));

        let selection = ConsolePrompt::new(Cursor::new(""), Vec::new()).select(&ports());
        assert_eq!(selection, Selection::Invalid(String::new()));
    }

    #[test]
    fn test_fixed_port() {
        assert_eq!(
            FixedPort::new("COM5").select(&ports()),
            Selection::Name("COM5".to_string())
        );
    }
}
