use crate::render::color::Rgb565;

/// One sample of everything shown on the display.
///
/// Values are not clamped here. Rates are in MB/s, usages in percent.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SystemData {
    pub cpu_usage: f32,
    pub cpu_temp: f32,
    pub cpu_color: Rgb565,
    pub ram_usage: f32,
    /// Mirrors `vram_usage`; GPU load is not measured separately.
    pub gpu_usage: f32,
    pub gpu_temp: f32,
    pub gpu_color: Rgb565,
    pub vram_usage: f32,
    pub vram_color: Rgb565,
    pub disk_read: f32,
    pub disk_write: f32,
    pub net_up: f32,
    pub net_down: f32,
}
