//! Temperature to RGB565 color ramp used by the display for its gauges.

use crate::render::unit_interval::{scale_channel, NumUnitIntervalExt};

pub const MIN_TEMP: f32 = 30.0;
pub const MAX_TEMP: f32 = 90.0;

const FIRST_SEGMENT_END: f32 = 0.33;
const SECOND_SEGMENT_END: f32 = 0.66;
const LAST_SEGMENT_WIDTH: f32 = 0.34;

/// 16-bit packed color: 5 bits red, 6 bits green, 5 bits blue.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb565(pub u16);

impl Rgb565 {
    pub fn from_rgb888(r: u8, g: u8, b: u8) -> Self {
        let (r, g, b) = (r as u16, g as u16, b as u16);
        Rgb565(((r & 0xF8) << 8) | ((g & 0xFC) << 3) | (b >> 3))
    }

    pub fn red(self) -> u8 {
        (self.0 >> 11) as u8
    }

    pub fn green(self) -> u8 {
        ((self.0 >> 5) & 0x3F) as u8
    }

    pub fn blue(self) -> u8 {
        (self.0 & 0x1F) as u8
    }

    pub fn to_le_bytes(self) -> [u8; 2] {
        self.0.to_le_bytes()
    }

    pub fn from_le_bytes(bytes: [u8; 2]) -> Self {
        Rgb565(u16::from_le_bytes(bytes))
    }
}

/// Maps a temperature in Celsius onto a blue → green → yellow → red ramp.
///
/// The input is clamped to [`MIN_TEMP`, `MAX_TEMP`] first, so the function is total.
pub fn temperature_to_color(temp: f32) -> Rgb565 {
    let ratio = temp.to_unit_clamped(MIN_TEMP, MAX_TEMP);
    let r = ratio.get();

    let (red, green, blue) = if r < FIRST_SEGMENT_END {
        let t = ratio.within(0.0, FIRST_SEGMENT_END);
        (0, scale_channel(t), scale_channel(1.0 - t))
    } else if r < SECOND_SEGMENT_END {
        let t = ratio.within(FIRST_SEGMENT_END, FIRST_SEGMENT_END);
        (scale_channel(t), 255, 0)
    } else {
        let t = ratio.within(SECOND_SEGMENT_END, LAST_SEGMENT_WIDTH);
        (255, scale_channel(1.0 - t), 0)
    };

    Rgb565::from_rgb888(red, green, blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Largest per-degree change of an 8-bit channel: 255 / (0.33 * 60) ≈ 12.9, plus
    // up to 7 lost to 5-bit quantization.
    const MAX_STEP: i32 = 21;

    fn expanded(color: Rgb565) -> [i32; 3] {
        [
            (color.red() as i32) << 3,
            (color.green() as i32) << 2,
            (color.blue() as i32) << 3,
        ]
    }

    #[test]
    fn test_ramp_anchors() {
        assert_eq!(temperature_to_color(30.0), Rgb565(0x001F));
        assert_eq!(temperature_to_color(50.0), Rgb565(0x07E0));
        assert_eq!(temperature_to_color(70.0), Rgb565(0xFFC0));
        assert_eq!(temperature_to_color(90.0), Rgb565(0xF800));
    }

    #[test]
    fn test_clamping() {
        for temp in [-40.0, 0.0, 12.5, 29.99] {
            assert_eq!(temperature_to_color(temp), temperature_to_color(30.0));
        }
        for temp in [90.01, 100.0, 1000.0, f32::INFINITY] {
            assert_eq!(temperature_to_color(temp), temperature_to_color(90.0));
        }
    }

    #[test]
    fn test_nan_maps_to_hottest() {
        assert_eq!(temperature_to_color(f32::NAN), Rgb565(0xF800));
    }

    #[test]
    fn test_packed_fields_in_range() {
        let mut temp = -20.0f32;
        while temp <= 120.0 {
            let color = temperature_to_color(temp);
            assert!(color.red() <= 31);
            assert!(color.green() <= 63);
            assert!(color.blue() <= 31);
            temp += 0.25;
        }
    }

    #[test]
    fn test_adjacent_degrees_are_continuous() {
        for temp in 20..100 {
            let a = expanded(temperature_to_color(temp as f32));
            let b = expanded(temperature_to_color((temp + 1) as f32));
            for channel in 0..3 {
                let step = (a[channel] - b[channel]).abs();
                assert!(
                    step <= MAX_STEP,
                    "channel {channel} jumped by {step} between {temp} and {}",
                    temp + 1
                );
            }
        }
    }

    #[test]
    fn test_rgb565_packing() {
        let color = Rgb565::from_rgb888(0xFF, 0xFF, 0xFF);
        assert_eq!(color, Rgb565(0xFFFF));
        assert_eq!(Rgb565::from_rgb888(0x07, 0x03, 0x07), Rgb565(0));
        assert_eq!(Rgb565::from_le_bytes(Rgb565(0x1234).to_le_bytes()), Rgb565(0x1234));
        assert_eq!(Rgb565(0x1234).to_le_bytes(), [0x34, 0x12]);
    }
}
