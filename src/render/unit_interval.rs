use num_traits::ToPrimitive;

/// A value normalized into `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitInterval {
    value: f32,
}

impl UnitInterval {
    /// Clamps `value` to `[min, max]` and maps it linearly onto `[0, 1]`.
    ///
    /// `NaN` collapses onto `max`.
    pub fn new_clamped(value: f32, min: f32, max: f32) -> Self {
        assert!(max > min);

        let clamped = if value < max { value } else { max };
        let clamped = if min < clamped { clamped } else { min };
        UnitInterval {
            value: (clamped - min) / (max - min),
        }
    }

    pub fn get(&self) -> f32 {
        self.value
    }

    /// Position of this value inside the sub-range starting at `start` and `width` long,
    /// relative to that sub-range. Not clamped.
    pub fn within(&self, start: f32, width: f32) -> f32 {
        (self.value - start) / width
    }
}

pub trait NumUnitIntervalExt {
    fn to_unit_clamped(&self, min: f32, max: f32) -> UnitInterval;
}

impl<T> NumUnitIntervalExt for T
where
    T: ToPrimitive,
{
    fn to_unit_clamped(&self, min: f32, max: f32) -> UnitInterval {
        UnitInterval::new_clamped(self.to_f32().unwrap_or(f32::NAN), min, max)
    }
}

/// Scales a fraction onto a `0..=255` channel, truncating like an integer cast.
pub fn scale_channel(fraction: f32) -> u8 {
    (255.0 * fraction) as u8
}
