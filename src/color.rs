//! Color specifications and their conversion to 8-bit RGB.
//!
//! Every color form resolves to exactly one [`ColorTriplet`]:
//!
//! - RGB integers of any range (clamped to `0..=255`)
//! - Hex strings, `#rrggbb` or `rrggbb`, case-insensitive
//! - HSL (hue in degrees, saturation and lightness in `0..=1`)
//! - OKLCH (perceptual lightness, chroma, hue in degrees)
//! - CSS named colors (see [`crate::named`])
//!
//! Resolution never fails. Malformed hex and unknown names degrade to
//! black; [`ColorSpec::try_resolve`] and [`parse_hex`] report those cases
//! instead for callers that want to catch typos.
//!
//! # Examples
//!
//! ```
//! use uprintf::color::{ColorSpec, ColorTriplet};
//!
//! assert_eq!(ColorSpec::Hsl { hue: 120.0, saturation: 1.0, lightness: 0.5 }.resolve(),
//!            ColorTriplet::new(0, 255, 0));
//! assert_eq!(ColorSpec::Named("GOLD").resolve(), ColorTriplet::new(255, 215, 0));
//! assert_eq!(ColorSpec::Named("notacolor").resolve(), ColorTriplet::BLACK);
//!
//! let tomato: ColorTriplet = "#ff6347".parse().unwrap();
//! assert_eq!(tomato.hex(), "#ff6347");
//! ```

// r, g, b, l, c, h, a, s, m follow the color-science convention.
#![allow(clippy::many_single_char_names)]

use std::fmt;
use std::str::FromStr;

use crate::clamp::{clamp_channel, clamp_unit, unit_to_channel};
use crate::named;

/// RGB color triplet with values 0-255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorTriplet {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl ColorTriplet {
    /// Pure black, the fallback for unresolvable colors.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Create a new color triplet from RGB components.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Create a triplet from unbounded integers, clamping each to `0..=255`.
    #[must_use]
    pub const fn clamped(red: i64, green: i64, blue: i64) -> Self {
        Self::new(clamp_channel(red), clamp_channel(green), clamp_channel(blue))
    }

    /// Returns CSS-style hex format `#rrggbb`.
    #[must_use]
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    /// Returns the channels as a tuple.
    #[must_use]
    pub const fn to_tuple(self) -> (u8, u8, u8) {
        (self.red, self.green, self.blue)
    }
}

impl From<(u8, u8, u8)> for ColorTriplet {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::new(red, green, blue)
    }
}

impl From<[u8; 3]> for ColorTriplet {
    fn from([red, green, blue]: [u8; 3]) -> Self {
        Self::new(red, green, blue)
    }
}

impl fmt::Display for ColorTriplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.red, self.green, self.blue)
    }
}

/// A color in any of the supported input forms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorSpec<'a> {
    /// Integer channels, clamped on resolution.
    Rgb(i64, i64, i64),
    /// Six hex digits with an optional leading `#`.
    Hex(&'a str),
    /// Hue in degrees (any real), saturation and lightness in `0..=1`.
    Hsl { hue: f64, saturation: f64, lightness: f64 },
    /// OKLCH lightness, chroma and hue in degrees.
    Oklch { l: f64, c: f64, h: f64 },
    /// CSS color name, matched case-insensitively.
    Named(&'a str),
}

impl ColorSpec<'_> {
    /// Resolve to RGB. Malformed hex and unknown names yield black.
    #[must_use]
    pub fn resolve(&self) -> ColorTriplet {
        match *self {
            Self::Rgb(r, g, b) => ColorTriplet::clamped(r, g, b),
            Self::Hex(hex) => hex_to_rgb(hex),
            Self::Hsl {
                hue,
                saturation,
                lightness,
            } => hsl_to_rgb(hue, saturation, lightness),
            Self::Oklch { l, c, h } => oklch_to_rgb(l, c, h),
            Self::Named(name) => named::lookup(name).unwrap_or_else(|| {
                log::debug!("unknown CSS color {name:?}, using black");
                ColorTriplet::BLACK
            }),
        }
    }

    /// Resolve to RGB, reporting malformed hex and unknown names.
    ///
    /// # Errors
    ///
    /// Returns [`ColorParseError::InvalidHex`] for a [`ColorSpec::Hex`] that
    /// is not exactly six hex digits, and [`ColorParseError::UnknownColor`]
    /// for a [`ColorSpec::Named`] absent from the registry.
    pub fn try_resolve(&self) -> Result<ColorTriplet, ColorParseError> {
        match *self {
            Self::Hex(hex) => parse_hex(hex),
            Self::Named(name) => {
                named::lookup(name).ok_or_else(|| ColorParseError::UnknownColor(name.to_string()))
            }
            _ => Ok(self.resolve()),
        }
    }
}

// ============================================================================
// Hex
// ============================================================================

fn hex_digit(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

fn hex_channels(digits: &[u8]) -> Option<ColorTriplet> {
    let [r1, r0, g1, g0, b1, b0] = *digits else {
        return None;
    };
    let pair = |hi: u8, lo: u8| Some(hex_digit(hi)? * 16 + hex_digit(lo)?);
    Some(ColorTriplet::new(pair(r1, r0)?, pair(g1, g0)?, pair(b1, b0)?))
}

/// Parse a hex color leniently.
///
/// One leading `#` is skipped and the next six characters are read; any
/// trailing text is ignored. Input shorter than six digits (including the
/// empty string), or with a non-hex character among them, yields black.
/// The `fg_hex` family also accepts `None` for a missing color.
#[must_use]
pub fn hex_to_rgb(hex: &str) -> ColorTriplet {
    let digits = hex.as_bytes();
    let digits = digits.strip_prefix(b"#").unwrap_or(digits);
    digits
        .get(..6)
        .and_then(hex_channels)
        .unwrap_or_else(|| {
            log::debug!("malformed hex color {hex:?}, using black");
            ColorTriplet::BLACK
        })
}

/// Parse a hex color strictly: exactly six hex digits, optional leading `#`.
///
/// # Errors
///
/// Returns [`ColorParseError::Empty`] for an empty string and
/// [`ColorParseError::InvalidHex`] for anything else that is not six digits.
pub fn parse_hex(hex: &str) -> Result<ColorTriplet, ColorParseError> {
    if hex.is_empty() {
        return Err(ColorParseError::Empty);
    }
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    hex_channels(digits.as_bytes()).ok_or_else(|| ColorParseError::InvalidHex(hex.to_string()))
}

// ============================================================================
// HSL
// ============================================================================

/// Convert HSL to RGB.
///
/// The hue wraps into `[0, 360)`; non-finite hues are treated as 0.
/// Saturation and lightness are clamped to `[0, 1]`.
#[must_use]
pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> ColorTriplet {
    let mut h = if hue.is_finite() { hue % 360.0 } else { 0.0 };
    if h < 0.0 {
        h += 360.0;
    }
    let s = clamp_unit(saturation, 0.0, 1.0);
    let l = clamp_unit(lightness, 0.0, 1.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    // Each sector is exclusive at its upper bound.
    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    ColorTriplet::new(
        unit_to_channel(r + m),
        unit_to_channel(g + m),
        unit_to_channel(b + m),
    )
}

// ============================================================================
// OKLCH
// ============================================================================
//
// OKLCH -> OKLab -> LMS' -> LMS -> linear sRGB -> sRGB. The coefficients are
// fixed constants and must not be re-derived: the emitted sequences are
// compared byte-for-byte against reference output.

const OKLAB_TO_LMS: [[f64; 2]; 3] = [
    [0.396_337_777_4, 0.215_803_757_3],
    [-0.105_561_345_8, -0.063_854_172_8],
    [-0.089_484_177_5, -1.291_485_548_0],
];

const LMS_TO_LINEAR_SRGB: [[f64; 3]; 3] = [
    [4.076_741_662_1, -3.307_711_591_3, 0.230_969_929_2],
    [-1.268_438_004_6, 2.609_757_401_1, -0.341_319_396_5],
    [-0.004_196_086_3, 0.734_173_117_6, 0.267_654_448_2],
];

/// sRGB transfer function (gamma encoding) for one linear channel.
#[must_use]
pub fn srgb_transfer(linear: f64) -> f64 {
    if linear <= 0.003_130_8 {
        12.92 * linear
    } else {
        1.055f64.mul_add(linear.powf(1.0 / 2.4), -0.055)
    }
}

/// Convert OKLCH to RGB.
///
/// Inputs are not range-checked; out-of-gamut results are clamped per
/// channel after gamma encoding.
#[must_use]
pub fn oklch_to_rgb(l: f64, c: f64, h: f64) -> ColorTriplet {
    let h_rad = h.to_radians();
    let a = c * h_rad.cos();
    let b = c * h_rad.sin();

    let lms_prime = OKLAB_TO_LMS.map(|[ka, kb]| l + ka * a + kb * b);
    let lms = lms_prime.map(|v| v * v * v);

    let linear = LMS_TO_LINEAR_SRGB.map(|[kl, km, ks]| kl * lms[0] + km * lms[1] + ks * lms[2]);
    let [r, g, b] = linear.map(|v| unit_to_channel(srgb_transfer(v)));

    ColorTriplet::new(r, g, b)
}

// ============================================================================
// Parsing
// ============================================================================

fn parse_rgb_function(body: &str) -> Option<ColorTriplet> {
    let mut channels = body.split(',').map(|part| part.trim().parse::<u8>().ok());
    let triplet = ColorTriplet::new(channels.next()??, channels.next()??, channels.next()??);
    channels.next().is_none().then_some(triplet)
}

impl FromStr for ColorTriplet {
    type Err = ColorParseError;

    /// Parse `#rrggbb`, `rgb(r, g, b)` or a CSS color name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let color = s.trim();
        if color.is_empty() {
            return Err(ColorParseError::Empty);
        }
        if color.starts_with('#') {
            return parse_hex(color);
        }
        if let Some(body) = color
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgb_function(body).ok_or_else(|| ColorParseError::InvalidRgb(s.to_string()));
        }
        named::lookup(color)
            .or_else(|| parse_hex(color).ok())
            .ok_or_else(|| ColorParseError::UnknownColor(s.to_string()))
    }
}

/// Error type for the fallible color parsers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    Empty,
    InvalidHex(String),
    InvalidRgb(String),
    UnknownColor(String),
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty color string"),
            Self::InvalidHex(s) => write!(f, "Invalid hex color: {s}"),
            Self::InvalidRgb(s) => write!(f, "Invalid RGB color: {s}"),
            Self::UnknownColor(s) => write!(f, "Unknown color: {s}"),
        }
    }
}

impl std::error::Error for ColorParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(r: u8, g: u8, b: u8) -> ColorTriplet {
        ColorTriplet::new(r, g, b)
    }

    #[test]
    fn test_color_triplet_hex() {
        let c = ColorTriplet::new(255, 0, 128);
        assert_eq!(c.hex(), "#ff0080");
    }

    #[test]
    fn test_clamped_triplet() {
        assert_eq!(ColorTriplet::clamped(300, -10, 128), rgb(255, 0, 128));
    }

    #[test]
    fn test_hex_lenient() {
        assert_eq!(hex_to_rgb("#ff0000"), rgb(255, 0, 0));
        assert_eq!(hex_to_rgb("00ff00"), rgb(0, 255, 0));
        assert_eq!(hex_to_rgb("#0000FF"), rgb(0, 0, 255));
        assert_eq!(hex_to_rgb("#ff6347"), rgb(255, 99, 71));
        assert_eq!(hex_to_rgb("#ff6347trailing"), rgb(255, 99, 71));
    }

    #[test]
    fn test_hex_lenient_fallbacks() {
        assert_eq!(hex_to_rgb(""), ColorTriplet::BLACK);
        assert_eq!(hex_to_rgb("#fff"), ColorTriplet::BLACK);
        assert_eq!(hex_to_rgb("#"), ColorTriplet::BLACK);
        assert_eq!(hex_to_rgb("#gg0000"), ColorTriplet::BLACK);
        // Multi-byte characters must not split a slice.
        assert_eq!(hex_to_rgb("#ffé000"), ColorTriplet::BLACK);
    }

    #[test]
    fn test_parse_hex_strict() {
        assert_eq!(parse_hex("#ff6347"), Ok(rgb(255, 99, 71)));
        assert_eq!(parse_hex("FF6347"), Ok(rgb(255, 99, 71)));
        assert_eq!(parse_hex(""), Err(ColorParseError::Empty));
        assert_eq!(
            parse_hex("#fff"),
            Err(ColorParseError::InvalidHex("#fff".to_string()))
        );
        assert!(parse_hex("#ff6347ff").is_err());
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), rgb(255, 0, 0));
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), rgb(0, 255, 0));
        assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), rgb(0, 0, 255));
        assert_eq!(hsl_to_rgb(60.0, 1.0, 0.5), rgb(255, 255, 0));
        assert_eq!(hsl_to_rgb(180.0, 1.0, 0.5), rgb(0, 255, 255));
        assert_eq!(hsl_to_rgb(300.0, 1.0, 0.5), rgb(255, 0, 255));
    }

    #[test]
    fn test_hsl_extremes() {
        assert_eq!(hsl_to_rgb(0.0, 0.0, 1.0), rgb(255, 255, 255));
        assert_eq!(hsl_to_rgb(0.0, 0.0, 0.0), rgb(0, 0, 0));
        assert_eq!(hsl_to_rgb(0.0, 0.0, 0.5), rgb(128, 128, 128));
    }

    #[test]
    fn test_hsl_hue_wraps() {
        assert_eq!(hsl_to_rgb(360.0, 1.0, 0.5), hsl_to_rgb(0.0, 1.0, 0.5));
        assert_eq!(hsl_to_rgb(-120.0, 1.0, 0.5), hsl_to_rgb(240.0, 1.0, 0.5));
        assert_eq!(hsl_to_rgb(480.0, 1.0, 0.5), hsl_to_rgb(120.0, 1.0, 0.5));
        assert_eq!(hsl_to_rgb(f64::NAN, 1.0, 0.5), hsl_to_rgb(0.0, 1.0, 0.5));
    }

    #[test]
    fn test_hsl_clamps_inputs() {
        assert_eq!(hsl_to_rgb(0.0, 5.0, 0.5), rgb(255, 0, 0));
        assert_eq!(hsl_to_rgb(0.0, 1.0, 2.0), rgb(255, 255, 255));
        assert_eq!(hsl_to_rgb(0.0, 1.0, -1.0), rgb(0, 0, 0));
    }

    #[test]
    fn test_hsl_gray_for_zero_saturation() {
        for hue in [0.0, 45.0, 200.0, 359.9] {
            let c = hsl_to_rgb(hue, 0.0, 0.3);
            assert_eq!(c.red, c.green);
            assert_eq!(c.green, c.blue);
        }
    }

    #[test]
    fn test_oklch_fixed_points() {
        assert_eq!(oklch_to_rgb(0.0, 0.0, 0.0), rgb(0, 0, 0));
        assert_eq!(oklch_to_rgb(1.0, 0.0, 0.0), rgb(255, 255, 255));
        let gray = oklch_to_rgb(0.5, 0.0, 123.0);
        assert_eq!(gray.red, gray.green);
        assert_eq!(gray.green, gray.blue);
    }

    #[test]
    fn test_oklch_hue_dominance() {
        let red = oklch_to_rgb(0.63, 0.26, 29.0);
        assert!(red.red > red.green && red.red > red.blue);

        let green = oklch_to_rgb(0.52, 0.17, 142.0);
        assert!(green.green > green.red && green.green > green.blue);

        let blue = oklch_to_rgb(0.45, 0.31, 265.0);
        assert!(blue.blue > blue.red && blue.blue > blue.green);
    }

    #[test]
    fn test_oklch_out_of_gamut_clamped() {
        assert_eq!(oklch_to_rgb(2.0, 0.0, 0.0), rgb(255, 255, 255));
        assert_eq!(oklch_to_rgb(-1.0, 0.0, 0.0), rgb(0, 0, 0));
    }

    #[test]
    fn test_srgb_transfer_linear_segment() {
        assert!((srgb_transfer(0.001) - 0.012_92).abs() < 1e-12);
        assert!((srgb_transfer(1.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_spec_resolve() {
        assert_eq!(ColorSpec::Rgb(300, -10, 128).resolve(), rgb(255, 0, 128));
        assert_eq!(ColorSpec::Hex("#ff6347").resolve(), rgb(255, 99, 71));
        assert_eq!(ColorSpec::Named("tomato").resolve(), rgb(255, 99, 71));
        assert_eq!(ColorSpec::Named("notacolor").resolve(), ColorTriplet::BLACK);
        assert_eq!(ColorSpec::Hex("#fff").resolve(), ColorTriplet::BLACK);
    }

    #[test]
    fn test_spec_try_resolve() {
        assert_eq!(
            ColorSpec::Named("notacolor").try_resolve(),
            Err(ColorParseError::UnknownColor("notacolor".to_string()))
        );
        assert!(ColorSpec::Hex("#fff").try_resolve().is_err());
        assert_eq!(ColorSpec::Named("Navy").try_resolve(), Ok(rgb(0, 0, 128)));
        assert_eq!(
            ColorSpec::Oklch { l: 1.0, c: 0.0, h: 0.0 }.try_resolve(),
            Ok(rgb(255, 255, 255))
        );
    }

    #[test]
    fn test_from_str() {
        assert_eq!("#0000ff".parse::<ColorTriplet>(), Ok(rgb(0, 0, 255)));
        assert_eq!("rgb(100, 150, 200)".parse::<ColorTriplet>(), Ok(rgb(100, 150, 200)));
        assert_eq!(" CornflowerBlue ".parse::<ColorTriplet>(), Ok(rgb(100, 149, 237)));
        assert_eq!("ff8800".parse::<ColorTriplet>(), Ok(rgb(255, 136, 0)));
        assert_eq!("".parse::<ColorTriplet>(), Err(ColorParseError::Empty));
        assert!(matches!(
            "rgb(1,2)".parse::<ColorTriplet>(),
            Err(ColorParseError::InvalidRgb(_))
        ));
        assert!(matches!(
            "rgb(1,2,300)".parse::<ColorTriplet>(),
            Err(ColorParseError::InvalidRgb(_))
        ));
        assert!(matches!(
            "notacolor".parse::<ColorTriplet>(),
            Err(ColorParseError::UnknownColor(_))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(rgb(1, 2, 3).to_string(), "rgb(1, 2, 3)");
        assert_eq!(
            ColorParseError::InvalidHex("#zz".to_string()).to_string(),
            "Invalid hex color: #zz"
        );
    }
}
