use std::io::ErrorKind;
use std::process::{Command, Stdio};

use tracing::{debug, warn};

/// Raw discrete-GPU statistics. VRAM figures share whatever unit the query reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpuStats {
    pub temperature_c: f32,
    pub vram_used: f32,
    pub vram_total: f32,
}

impl GpuStats {
    pub fn vram_percent(&self) -> f32 {
        if self.vram_total > 0.0 {
            self.vram_used / self.vram_total * 100.0
        } else {
            0.0
        }
    }
}

/// Blocking query for GPU statistics. `None` means unavailable.
pub trait GpuQuery {
    fn query(&mut self) -> Option<GpuStats>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoGpu;

impl GpuQuery for NoGpu {
    fn query(&mut self) -> Option<GpuStats> {
        None
    }
}

/// Runs an external tool such as `nvidia-smi` and parses its first output line.
///
/// There is no timeout: a hung tool stalls the caller.
#[derive(Debug)]
pub struct CommandGpuQuery {
    program: String,
    args: Vec<String>,
    missing: bool,
}

impl CommandGpuQuery {
    /// Returns `None` for an empty command line.
    pub fn new(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(CommandGpuQuery {
            program: program.clone(),
            args: args.to_vec(),
            missing: false,
        })
    }
}

impl GpuQuery for CommandGpuQuery {
    fn query(&mut self) -> Option<GpuStats> {
        if self.missing {
            return None;
        }

        let output = match Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
        {
            Ok(output) => output,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(program = %self.program, "GPU query tool not found, GPU stats disabled");
                self.missing = true;
                return None;
            }
            Err(err) => {
                debug!(?err, "Failed to run GPU query");
                return None;
            }
        };

        if !output.status.success() {
            debug!(status = ?output.status, "GPU query exited with failure");
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stats = stdout.lines().next().and_then(parse_stats_line);
        if stats.is_none() {
            debug!(%stdout, "Unrecognized GPU query output");
        }
        stats
    }
}

/// Parses `temperature, vram used, vram total`. Extra fields are ignored.
pub fn parse_stats_line(line: &str) -> Option<GpuStats> {
    let mut fields = line.split(',').map(|field| field.trim().parse::<f32>());

    let temperature_c = fields.next()?.ok()?;
    let vram_used = fields.next()?.ok()?;
    let vram_total = fields.next()?.ok()?;

    Some(GpuStats {
        temperature_c,
        vram_used,
        vram_total,
    })
}

pub fn build_gpu_query(command: &[String]) -> Box<dyn GpuQuery> {
    match CommandGpuQuery::new(command) {
        Some(query) => Box::new(query),
        None => Box::new(NoGpu),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nvidia_smi_line() {
        let stats = parse_stats_line("64, 2048, 8192").unwrap();
        assert_eq!(stats.temperature_c, 64.0);
        assert_eq!(stats.vram_used, 2048.0);
        assert_eq!(stats.vram_total, 8192.0);
        assert_eq!(stats.vram_percent(), 25.0);
    }

    #[test]
    fn test_parse_rejects_short_or_garbage() {
        assert!(parse_stats_line("").is_none());
        assert!(parse_stats_line("64, 2048").is_none());
        assert!(parse_stats_line("[N/A], 2048, 8192").is_none());
        assert!(parse_stats_line("64,2048,8192,extra").is_some());
    }

    #[test]
    fn test_zero_total_vram() {
        let stats = parse_stats_line("40, 100, 0").unwrap();
        assert_eq!(stats.vram_percent(), 0.0);
    }

    #[test]
    fn test_missing_tool_disables_query() {
        let command = vec!["definitely-not-a-real-gpu-tool".to_string()];
        let mut query = CommandGpuQuery::new(&command).unwrap();
        assert!(query.query().is_none());
        assert!(query.missing);
        assert!(query.query().is_none());
    }

    #[test]
    fn test_empty_command_has_no_gpu() {
        assert!(CommandGpuQuery::new(&[]).is_none());
        assert!(build_gpu_query(&[]).query().is_none());
    }
}
