//! Frame understood by the display firmware. The buffer is 22 bytes; only the first 16
//! go on the wire.
//!
//! ```text
//! 0-1   FF FF          start marker
//! 2     cpu usage      u8, <= 99
//! 3-4   cpu color      RGB565 LE
//! 5     ram usage      u8, <= 99
//! 6     gpu usage      u8, <= 99
//! 7-8   gpu color      RGB565 LE
//! 9     vram usage     u8, <= 99
//! 10-11 vram color     RGB565 LE
//! 12    disk read      MB/s, u8, <= 99
//! 13    disk write     MB/s, u8, <= 99
//! 14    net up         MB/s, u8, <= 99
//! 15    net down       MB/s, u8, <= 99
//! 16-21 reserved, zero, never sent
//! ```

use crate::collect::system_data::SystemData;
use crate::render::color::Rgb565;

pub const PACKET_LEN: usize = 22;
/// Bytes of the frame that carry data and are transmitted; the rest is reserved.
pub const PAYLOAD_LEN: usize = 16;
pub const START_MARKER: [u8; 2] = [0xFF, 0xFF];
pub const MAX_LEVEL: f32 = 99.0;

/// Clamps to [`MAX_LEVEL`] and truncates. Negative values saturate to zero.
pub fn level(value: f32) -> u8 {
    value.min(MAX_LEVEL) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet([u8; PACKET_LEN]);

impl Packet {
    pub fn encode(data: &SystemData) -> Self {
        let mut writer = PacketWriter::default();

        writer.put_bytes(&START_MARKER);
        writer.put_level(data.cpu_usage);
        writer.put_color(data.cpu_color);
        writer.put_level(data.ram_usage);
        writer.put_level(data.gpu_usage);
        writer.put_color(data.gpu_color);
        writer.put_level(data.vram_usage);
        writer.put_color(data.vram_color);
        writer.put_level(data.disk_read);
        writer.put_level(data.disk_write);
        writer.put_level(data.net_up);
        writer.put_level(data.net_down);

        debug_assert_eq!(writer.idx, PAYLOAD_LEN);
        Packet(writer.buf)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The bytes sent to the display.
    pub fn wire_bytes(&self) -> &[u8] {
        &self.0[..PAYLOAD_LEN]
    }
}

#[derive(Default)]
struct PacketWriter {
    buf: [u8; PACKET_LEN],
    idx: usize,
}

impl PacketWriter {
    fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf[self.idx..self.idx + bytes.len()].copy_from_slice(bytes);
        self.idx += bytes.len();
    }

    fn put_level(&mut self, value: f32) {
        self.put_bytes(&[level(value)]);
    }

    fn put_color(&mut self, color: Rgb565) {
        self.put_bytes(&color.to_le_bytes());
    }
}

/// Field values as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedPacket {
    pub cpu_usage: u8,
    pub cpu_color: Rgb565,
    pub ram_usage: u8,
    pub gpu_usage: u8,
    pub gpu_color: Rgb565,
    pub vram_usage: u8,
    pub vram_color: Rgb565,
    pub disk_read: u8,
    pub disk_write: u8,
    pub net_up: u8,
    pub net_down: u8,
}

impl DecodedPacket {
    /// Parses a frame. Needs at least the payload and a valid start marker.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < PAYLOAD_LEN || bytes[..2] != START_MARKER {
            return None;
        }

        let color = |at: usize| Rgb565::from_le_bytes([bytes[at], bytes[at + 1]]);

        Some(DecodedPacket {
            cpu_usage: bytes[2],
            cpu_color: color(3),
            ram_usage: bytes[5],
            gpu_usage: bytes[6],
            gpu_color: color(7),
            vram_usage: bytes[9],
            vram_color: color(10),
            disk_read: bytes[12],
            disk_write: bytes[13],
            net_up: bytes[14],
            net_down: bytes[15],
        })
    }
}
