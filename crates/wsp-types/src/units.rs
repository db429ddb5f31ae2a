//! Raw value conversions and wind direction codes.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Multiplier from raw temperature tenths to degrees Celsius.
pub const TEMPERATURE_SCALE: f32 = 0.1;

/// Multiplier from raw pressure tenths to hPa.
pub const PRESSURE_SCALE: f32 = 0.1;

/// Multiplier from raw wind speed tenths to m/s.
pub const WIND_SCALE: f32 = 0.1;

/// Millimetres of rain per counter tick.
pub const RAIN_SCALE: f32 = 0.3;

/// Degrees per wind direction code.
pub const DIRECTION_SCALE: f32 = 22.5;

/// Decode a sign-magnitude 16-bit value.
///
/// Bit 15 is the sign, the low 15 bits are the magnitude. Both zero
/// encodings (`0x0000`, `0x8000`) decode to 0.
///
/// ```
/// use wsp_types::units::fix_sign;
///
/// assert_eq!(fix_sign(0x00FA), 250);
/// assert_eq!(fix_sign(0x80FA), -250);
/// assert_eq!(fix_sign(0x8000), 0);
/// ```
#[must_use]
pub fn fix_sign(raw: u16) -> i32 {
    let magnitude = i32::from(raw & 0x7FFF);
    if raw & 0x8000 != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Encode a value as sign-magnitude, the inverse of [`fix_sign`].
///
/// Magnitudes above `0x7FFF` are clamped.
#[must_use]
pub fn to_sign_magnitude(value: i32) -> u16 {
    let magnitude = value.unsigned_abs().min(0x7FFF) as u16;
    if value < 0 { magnitude | 0x8000 } else { magnitude }
}

/// Convert a raw tenths value to a float.
#[must_use]
pub fn tenths(raw: i32) -> f32 {
    raw as f32 * TEMPERATURE_SCALE
}

/// Convert a rain counter to millimetres.
#[must_use]
pub fn rain_mm(ticks: u16) -> f32 {
    f32::from(ticks) * RAIN_SCALE
}

/// One of the 16 compass points reported by the wind vane.
///
/// The labels follow the station's own display, which uses `NEE`/`SEE`
/// where a compass rose would read `ENE`/`ESE`.
///
/// ```
/// use wsp_types::WindDirection;
///
/// let dir = WindDirection::from_code(3).unwrap();
/// assert_eq!(dir.label(), "NEE");
/// assert_eq!(dir.degrees(), 67.5);
/// assert!(WindDirection::from_code(0x80).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum WindDirection {
    N = 0,
    Nne = 1,
    Ne = 2,
    Nee = 3,
    E = 4,
    See = 5,
    Se = 6,
    Sse = 7,
    S = 8,
    Ssw = 9,
    Sw = 10,
    Wsw = 11,
    W = 12,
    Wnw = 13,
    Nw = 14,
    Nnw = 15,
}

const LABELS: [&str; 16] = [
    "N", "NNE", "NE", "NEE", "E", "SEE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

const DIRECTIONS: [WindDirection; 16] = [
    WindDirection::N,
    WindDirection::Nne,
    WindDirection::Ne,
    WindDirection::Nee,
    WindDirection::E,
    WindDirection::See,
    WindDirection::Se,
    WindDirection::Sse,
    WindDirection::S,
    WindDirection::Ssw,
    WindDirection::Sw,
    WindDirection::Wsw,
    WindDirection::W,
    WindDirection::Wnw,
    WindDirection::Nw,
    WindDirection::Nnw,
];

impl WindDirection {
    /// Bit set in the direction byte when the vane reading is invalid.
    pub const INVALID_BIT: u8 = 0x80;

    /// Decode a direction byte. Returns `None` when the invalid bit is set.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        if code & Self::INVALID_BIT != 0 {
            return None;
        }
        DIRECTIONS.get(usize::from(code & 0x0F)).copied()
    }

    /// The raw 0..=15 code.
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Compass label as shown on the station display.
    #[must_use]
    pub fn label(self) -> &'static str {
        LABELS[usize::from(self.code())]
    }

    /// Heading in degrees, 0 for north, clockwise.
    #[must_use]
    pub fn degrees(self) -> f32 {
        f32::from(self.code()) * DIRECTION_SCALE
    }
}

impl fmt::Display for WindDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fix_sign_examples() {
        assert_eq!(fix_sign(0x0000), 0);
        assert_eq!(fix_sign(0x8000), 0);
        assert_eq!(fix_sign(0x7FFF), 32767);
        assert_eq!(fix_sign(0xFFFF), -32767);
        assert_eq!(fix_sign(0x8001), -1);
    }

    #[test]
    fn test_rain_and_tenths() {
        assert!((rain_mm(10) - 3.0).abs() < 1e-5);
        assert!((tenths(-52) + 5.2).abs() < 1e-5);
    }

    #[test]
    fn test_wind_direction_labels_and_degrees() {
        assert_eq!(WindDirection::from_code(0), Some(WindDirection::N));
        assert_eq!(WindDirection::from_code(15), Some(WindDirection::Nnw));
        assert_eq!(WindDirection::Nnw.degrees(), 337.5);
        assert_eq!(WindDirection::See.label(), "SEE");
        assert_eq!(WindDirection::Wsw.to_string(), "WSW");
    }

    #[test]
    fn test_wind_direction_invalid_bit() {
        assert_eq!(WindDirection::from_code(0x80), None);
        assert_eq!(WindDirection::from_code(0x8F), None);
    }

    #[test]
    fn test_wind_direction_codes_match_table() {
        for (code, dir) in DIRECTIONS.iter().enumerate() {
            assert_eq!(usize::from(dir.code()), code);
        }
    }

    proptest! {
        #[test]
        fn fix_sign_sign_follows_top_bit(raw: u16) {
            let value = fix_sign(raw);
            prop_assert_eq!(value.unsigned_abs(), u32::from(raw & 0x7FFF));
            if raw & 0x8000 == 0 {
                prop_assert!(value >= 0);
            } else {
                prop_assert!(value <= 0);
            }
        }

        #[test]
        fn sign_magnitude_inverts_fix_sign(value in -32767i32..=32767) {
            prop_assert_eq!(fix_sign(to_sign_magnitude(value)), value);
        }
    }
}
