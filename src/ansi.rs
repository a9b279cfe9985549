//! ANSI true-color and attribute escape sequences.
//!
//! Sequences are built into fixed [`SEQ_MAX`]-unit buffers, never on the
//! heap. A color sequence has the exact form `ESC[38;2;R;G;Bm` (foreground)
//! or `ESC[48;2;R;G;Bm` (background) with decimal channels and no leading
//! zeros; the longest one, `ESC[48;2;255;255;255m`, is 20 units.
//!
//! # Examples
//!
//! ```
//! use uprintf::ansi::{self, Attributes, Layer, Sequence};
//! use uprintf::color::ColorTriplet;
//! use uprintf::encoding::Narrow;
//!
//! assert_eq!(ansi::fg_rgb(300, -10, 128).as_str(), "\x1b[38;2;255;0;128m");
//! assert_eq!(ansi::bg_css("navy").as_str(), "\x1b[48;2;0;0;128m");
//!
//! let seq = Sequence::<Narrow>::color(Layer::Background, ColorTriplet::new(1, 2, 3));
//! assert_eq!(seq.to_string(), "\x1b[48;2;1;2;3m");
//!
//! let bold_italic = ansi::style(Attributes::BOLD | Attributes::ITALIC);
//! assert_eq!(bold_italic.as_str(), "\x1b[1;3m");
//! ```

use std::fmt;

use bitflags::bitflags;

use crate::color::{ColorSpec, ColorTriplet};
use crate::encoding::{Encoding, Narrow, Wide};

/// Capacity, in code units, of every escape-sequence buffer (terminator
/// included).
pub const SEQ_MAX: usize = 28;

/// Reset all attributes and colors.
pub const RESET: &str = "\x1b[0m";

/// Which color a sequence selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Layer {
    /// Text color (SGR 38).
    #[default]
    Foreground,
    /// Cell background (SGR 48).
    Background,
}

impl Layer {
    const fn sgr(self) -> u8 {
        match self {
            Self::Foreground => 38,
            Self::Background => 48,
        }
    }
}

bitflags! {
    /// Text attribute flags.
    ///
    /// Each flag corresponds to an ANSI SGR (Select Graphic Rendition) code.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attributes: u8 {
        /// Bold/bright text (SGR 1).
        const BOLD      = 1 << 0;
        /// Dim/faint text (SGR 2).
        const DIM       = 1 << 1;
        /// Italic text (SGR 3).
        const ITALIC    = 1 << 2;
        /// Single underline (SGR 4).
        const UNDERLINE = 1 << 3;
        /// Slow blinking text (SGR 5).
        const BLINK     = 1 << 4;
        /// Reverse video (SGR 7).
        const REVERSE   = 1 << 5;
        /// Concealed/hidden text (SGR 8).
        const CONCEAL   = 1 << 6;
        /// Strikethrough text (SGR 9).
        const STRIKE    = 1 << 7;
    }
}

impl Attributes {
    /// Map of attribute flags to their ANSI SGR codes.
    const SGR_CODES: [(Self, u8); 8] = [
        (Self::BOLD, 1),
        (Self::DIM, 2),
        (Self::ITALIC, 3),
        (Self::UNDERLINE, 4),
        (Self::BLINK, 5),
        (Self::REVERSE, 7),
        (Self::CONCEAL, 8),
        (Self::STRIKE, 9),
    ];

    /// SGR codes for the set flags, in ascending order.
    pub fn to_sgr_codes(self) -> impl Iterator<Item = u8> {
        Self::SGR_CODES
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, code)| code)
    }
}

// ============================================================================
// Writing
// ============================================================================

/// Bounded writer over a unit buffer. Keeps one slot free for the
/// terminator.
struct Cursor<'a, E: Encoding> {
    buf: &'a mut [E::Unit],
    len: usize,
}

impl<'a, E: Encoding> Cursor<'a, E> {
    fn new(buf: &'a mut [E::Unit]) -> Self {
        Self { buf, len: 0 }
    }

    fn push(&mut self, byte: u8) {
        if self.len + 1 < self.buf.len() {
            self.buf[self.len] = E::from_ascii(byte);
            self.len += 1;
        }
    }

    fn push_all(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.push(byte);
        }
    }

    fn push_decimal(&mut self, value: u8) {
        if value >= 100 {
            self.push(b'0' + value / 100);
        }
        if value >= 10 {
            self.push(b'0' + value / 10 % 10);
        }
        self.push(b'0' + value % 10);
    }

    fn finish(self) -> usize {
        if let Some(slot) = self.buf.get_mut(self.len) {
            *slot = E::NUL;
        }
        self.len
    }
}

/// Write a true-color sequence into `buf` and terminate it.
///
/// Returns the number of units written, excluding the terminator.
pub fn write_color<E: Encoding>(buf: &mut [E::Unit; SEQ_MAX], layer: Layer, rgb: ColorTriplet) -> usize {
    let mut cursor = Cursor::<E>::new(buf);
    cursor.push_all(b"\x1b[");
    cursor.push_decimal(layer.sgr());
    cursor.push_all(b";2;");
    cursor.push_decimal(rgb.red);
    cursor.push(b';');
    cursor.push_decimal(rgb.green);
    cursor.push(b';');
    cursor.push_decimal(rgb.blue);
    cursor.push(b'm');
    cursor.finish()
}

/// Write an attribute sequence such as `ESC[1;4m` into `buf`.
///
/// An empty attribute set writes the reset sequence `ESC[0m`.
pub fn write_style<E: Encoding>(buf: &mut [E::Unit; SEQ_MAX], attributes: Attributes) -> usize {
    let mut cursor = Cursor::<E>::new(buf);
    cursor.push_all(b"\x1b[");
    let mut first = true;
    for code in attributes.to_sgr_codes() {
        if !first {
            cursor.push(b';');
        }
        cursor.push_decimal(code);
        first = false;
    }
    if first {
        cursor.push(b'0');
    }
    cursor.push(b'm');
    cursor.finish()
}

// ============================================================================
// Sequence value
// ============================================================================

/// A terminated escape sequence held in a fixed buffer.
#[derive(Clone, Copy)]
pub struct Sequence<E: Encoding> {
    units: [E::Unit; SEQ_MAX],
    len: usize,
}

impl<E: Encoding> Sequence<E> {
    /// A true-color sequence for an RGB triplet.
    #[must_use]
    pub fn color(layer: Layer, rgb: ColorTriplet) -> Self {
        let mut units = [E::NUL; SEQ_MAX];
        let len = write_color::<E>(&mut units, layer, rgb);
        Self { units, len }
    }

    /// A true-color sequence for any color form; never fails.
    #[must_use]
    pub fn spec(layer: Layer, spec: &ColorSpec<'_>) -> Self {
        Self::color(layer, spec.resolve())
    }

    /// An attribute sequence.
    #[must_use]
    pub fn style(attributes: Attributes) -> Self {
        let mut units = [E::NUL; SEQ_MAX];
        let len = write_style::<E>(&mut units, attributes);
        Self { units, len }
    }

    /// The reset sequence `ESC[0m`.
    #[must_use]
    pub fn reset() -> Self {
        Self::style(Attributes::empty())
    }

    /// The sequence without its terminator.
    #[must_use]
    pub fn as_units(&self) -> &[E::Unit] {
        &self.units[..self.len]
    }

    /// The sequence including its terminator.
    #[must_use]
    pub fn as_units_with_nul(&self) -> &[E::Unit] {
        &self.units[..=self.len]
    }

    /// Length in units, excluding the terminator.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the sequence is empty. Never true for constructed sequences.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Sequence<Narrow> {
    /// The sequence as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Only ASCII is ever written.
        std::str::from_utf8(self.as_units()).unwrap_or_default()
    }
}

impl<E: Encoding> fmt::Display for Sequence<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &unit in self.as_units() {
            if let Some(byte) = E::to_ascii(unit) {
                fmt::Write::write_char(f, char::from(byte))?;
            }
        }
        Ok(())
    }
}

impl<E: Encoding> fmt::Debug for Sequence<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Sequence")
            .field(&self.to_string())
            .finish()
    }
}

impl<E: Encoding> PartialEq for Sequence<E> {
    fn eq(&self, other: &Self) -> bool {
        self.as_units() == other.as_units()
    }
}

impl<E: Encoding> Eq for Sequence<E> {}

/// A narrow attribute sequence.
#[must_use]
pub fn style(attributes: Attributes) -> Sequence<Narrow> {
    Sequence::style(attributes)
}

/// A wide attribute sequence.
#[must_use]
pub fn wstyle(attributes: Attributes) -> Sequence<Wide> {
    Sequence::style(attributes)
}

// ============================================================================
// Convenience constructors
// ============================================================================

/// Resolve a textual color that may be missing; a missing one is black.
fn text_color<'a, E: Encoding>(layer: Layer, text: Option<&'a str>, spec: fn(&'a str) -> ColorSpec<'a>) -> Sequence<E> {
    match text {
        Some(text) => Sequence::spec(layer, &spec(text)),
        None => {
            log::debug!("missing color input, using black");
            Sequence::color(layer, ColorTriplet::BLACK)
        }
    }
}

macro_rules! color_constructors {
    ($enc:ty, $layer:expr, $rgb:ident, $hex:ident, $hsl:ident, $oklch:ident, $css:ident) => {
        #[doc = concat!("Sequence for integer channels, clamped to 0-255 (`", stringify!($enc), "`).")]
        #[must_use]
        pub fn $rgb(red: i64, green: i64, blue: i64) -> Sequence<$enc> {
            Sequence::color($layer, ColorTriplet::clamped(red, green, blue))
        }

        #[doc = concat!("Sequence for a hex color; malformed or missing (`None`) input is black (`", stringify!($enc), "`).")]
        #[must_use]
        pub fn $hex<'a>(hex: impl Into<Option<&'a str>>) -> Sequence<$enc> {
            text_color($layer, hex.into(), ColorSpec::Hex)
        }

        #[doc = concat!("Sequence for an HSL color (`", stringify!($enc), "`).")]
        #[must_use]
        pub fn $hsl(hue: f64, saturation: f64, lightness: f64) -> Sequence<$enc> {
            Sequence::spec(
                $layer,
                &ColorSpec::Hsl {
                    hue,
                    saturation,
                    lightness,
                },
            )
        }

        #[doc = concat!("Sequence for an OKLCH color (`", stringify!($enc), "`).")]
        #[must_use]
        pub fn $oklch(l: f64, c: f64, h: f64) -> Sequence<$enc> {
            Sequence::spec($layer, &ColorSpec::Oklch { l, c, h })
        }

        #[doc = concat!("Sequence for a CSS color name; unknown or missing (`None`) names are black (`", stringify!($enc), "`).")]
        #[must_use]
        pub fn $css<'a>(name: impl Into<Option<&'a str>>) -> Sequence<$enc> {
            text_color($layer, name.into(), ColorSpec::Named)
        }
    };
}

color_constructors!(Narrow, Layer::Foreground, fg_rgb, fg_hex, fg_hsl, fg_oklch, fg_css);
color_constructors!(Narrow, Layer::Background, bg_rgb, bg_hex, bg_hsl, bg_oklch, bg_css);
color_constructors!(Wide, Layer::Foreground, wfg_rgb, wfg_hex, wfg_hsl, wfg_oklch, wfg_css);
color_constructors!(Wide, Layer::Background, wbg_rgb, wbg_hex, wbg_hsl, wbg_oklch, wbg_css);
