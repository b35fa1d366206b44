use serde::{Deserialize, Serialize};

/// How a scaled value is brought to an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Toward zero.
    #[default]
    Truncate,
    /// Half away from zero.
    Nearest,
}

/// What happens when a value falls outside the output range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Clamp to `0` or the width's maximum; NaN becomes `0`.
    #[default]
    Saturate,
    /// Refuse the value; the whole record fails to map.
    Reject,
}

/// Linear conversion law: `raw = round((physical - offset) * factor)`.
///
/// # Examples
/// ```
/// use f1can_core::mapping::Conversion;
///
/// // OBD-II engine speed is reported in quarter revolutions.
/// let rpm = Conversion::linear(0.0, 4.0);
/// assert_eq!(rpm.apply(11_000.0, 2), Some(44_000));
/// assert_eq!(rpm.apply(20_000.0, 2), Some(u16::MAX as u64));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    #[serde(default)]
    pub offset: f64,
    #[serde(default = "default_factor")]
    pub factor: f64,
    #[serde(default)]
    pub rounding: Rounding,
    #[serde(default)]
    pub overflow: OverflowPolicy,
}

fn default_factor() -> f64 {
    1.0
}

impl Default for Conversion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Conversion {
    pub const fn identity() -> Self {
        Self::linear(0.0, 1.0)
    }

    pub const fn linear(offset: f64, factor: f64) -> Self {
        Self {
            offset,
            factor,
            rounding: Rounding::Truncate,
            overflow: OverflowPolicy::Saturate,
        }
    }

    pub const fn rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = rounding;
        self
    }

    pub const fn overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    /// Convert `physical` into an unsigned integer that fits `length` bytes.
    ///
    /// Returns `None` only under [`OverflowPolicy::Reject`], when the value is
    /// NaN or outside `0..=max_raw(length)`.
    pub fn apply(&self, physical: f64, length: u8) -> Option<u64> {
        let max = max_raw(length);
        let scaled = (physical - self.offset) * self.factor;
        let rounded = match self.rounding {
            Rounding::Truncate => scaled.trunc(),
            Rounding::Nearest => scaled.round(),
        };

        let saturate = self.overflow == OverflowPolicy::Saturate;
        if rounded.is_nan() {
            return saturate.then_some(0);
        }
        if rounded < 0.0 {
            return saturate.then_some(0);
        }
        if rounded > max as f64 {
            return saturate.then_some(max);
        }
        // `as` saturates at u64::MAX for the one value equal to 2^64.
        Some((rounded as u64).min(max))
    }
}

/// Largest unsigned value representable in `length` bytes.
pub fn max_raw(length: u8) -> u64 {
    match length {
        0 => 0,
        1..=7 => (1u64 << (u32::from(length) * 8)) - 1,
        _ => u64::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::{Conversion, OverflowPolicy, Rounding, max_raw};

    #[test]
    fn identity_saturates_at_width() {
        let conv = Conversion::identity();
        assert_eq!(conv.apply(0.0, 1), Some(0));
        assert_eq!(conv.apply(255.0, 1), Some(255));
        assert_eq!(conv.apply(256.0, 1), Some(255));
        assert_eq!(conv.apply(-1.0, 1), Some(0));
        assert_eq!(conv.apply(f64::NAN, 1), Some(0));
        assert_eq!(conv.apply(f64::INFINITY, 2), Some(0xFFFF));
    }

    #[test]
    fn offset_then_factor() {
        let speed = Conversion::linear(-100.0, 10.0);
        assert_eq!(speed.apply(180.0, 2), Some(2800));
        assert_eq!(speed.apply(-100.0, 2), Some(0));
        assert_eq!(speed.apply(-150.0, 2), Some(0));
    }

    #[test]
    fn truncates_toward_zero_by_default() {
        let throttle = Conversion::linear(0.0, 255.0);
        assert_eq!(throttle.apply(0.5, 1), Some(127));
        assert_eq!(throttle.apply(1.0, 1), Some(255));
        let nearest = throttle.rounding(Rounding::Nearest);
        assert_eq!(nearest.apply(0.5, 1), Some(128));
    }

    #[test]
    fn reject_policy_refuses_out_of_range() {
        let fuel = Conversion::linear(0.0, 100.0).overflow(OverflowPolicy::Reject);
        assert_eq!(fuel.apply(110.0, 2), Some(11_000));
        assert_eq!(fuel.apply(700.0, 2), None);
        assert_eq!(fuel.apply(-0.5, 2), None);
        assert_eq!(fuel.apply(f64::NAN, 2), None);
    }

    #[test]
    fn max_raw_per_width() {
        assert_eq!(max_raw(1), 0xFF);
        assert_eq!(max_raw(2), 0xFFFF);
        assert_eq!(max_raw(4), 0xFFFF_FFFF);
        assert_eq!(max_raw(8), u64::MAX);
    }

    #[test]
    fn eight_byte_width_saturates_at_u64_max() {
        let conv = Conversion::identity();
        assert_eq!(conv.apply(1e30, 8), Some(u64::MAX));
    }
}
