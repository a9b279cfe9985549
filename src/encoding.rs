//! Narrow and wide code-unit encodings.
//!
//! Every formatting and escape-sequence routine is written once against the
//! [`Encoding`] trait and instantiated for exactly two implementations:
//!
//! - [`Narrow`]: `u8` units holding UTF-8
//! - [`Wide`]: `u16` units holding UTF-16
//!
//! The caller always names the encoding it wants (`Formatter::<Wide>`,
//! `Sequence::<Narrow>`, or the `w`-prefixed convenience functions).
//!
//! Unit slices are treated like C strings: the first NUL unit ends them.

use std::borrow::Cow;
use std::fmt;

use crate::format::FormatError;

mod private {
    pub trait Sealed {}
    impl Sealed for super::Narrow {}
    impl Sealed for super::Wide {}
}

/// A code-unit encoding for format strings and output buffers.
///
/// This trait is sealed; [`Narrow`] and [`Wide`] are its only implementations.
pub trait Encoding: private::Sealed + Copy + Default + fmt::Debug + Send + Sync + 'static {
    /// The code unit stored in buffers of this encoding.
    type Unit: Copy + Default + Eq + Ord + fmt::Debug + Send + Sync + 'static;

    /// Human-readable name, used in log messages.
    const NAME: &'static str;

    /// The terminator unit.
    const NUL: Self::Unit;

    /// Widen an ASCII byte into a unit.
    fn from_ascii(byte: u8) -> Self::Unit;

    /// Return the unit as an ASCII byte, or `None` if it is outside ASCII.
    fn to_ascii(unit: Self::Unit) -> Option<u8>;

    /// Decode a unit slice (already cut at its terminator) into text.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidEncoding`] if the units are not valid
    /// UTF-8 / UTF-16.
    fn decode(units: &[Self::Unit]) -> Result<Cow<'_, str>, FormatError>;

    /// Encode `text`, handing each unit to `push`.
    fn encode(text: &str, push: &mut dyn FnMut(Self::Unit));

    /// Number of units `text` occupies in this encoding.
    fn encoded_len(text: &str) -> usize;
}

/// 8-bit units holding UTF-8.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Narrow;

/// 16-bit units holding UTF-16.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Wide;

impl Encoding for Narrow {
    type Unit = u8;

    const NAME: &'static str = "narrow";
    const NUL: u8 = 0;

    #[inline]
    fn from_ascii(byte: u8) -> u8 {
        byte
    }

    #[inline]
    fn to_ascii(unit: u8) -> Option<u8> {
        unit.is_ascii().then_some(unit)
    }

    fn decode(units: &[u8]) -> Result<Cow<'_, str>, FormatError> {
        std::str::from_utf8(units)
            .map(Cow::Borrowed)
            .map_err(|_| FormatError::InvalidEncoding(Self::NAME))
    }

    fn encode(text: &str, push: &mut dyn FnMut(u8)) {
        for &byte in text.as_bytes() {
            push(byte);
        }
    }

    #[inline]
    fn encoded_len(text: &str) -> usize {
        text.len()
    }
}

impl Encoding for Wide {
    type Unit = u16;

    const NAME: &'static str = "wide";
    const NUL: u16 = 0;

    #[inline]
    fn from_ascii(byte: u8) -> u16 {
        u16::from(byte)
    }

    #[inline]
    fn to_ascii(unit: u16) -> Option<u8> {
        u8::try_from(unit).ok().filter(u8::is_ascii)
    }

    fn decode(units: &[u16]) -> Result<Cow<'_, str>, FormatError> {
        String::from_utf16(units)
            .map(Cow::Owned)
            .map_err(|_| FormatError::InvalidEncoding(Self::NAME))
    }

    fn encode(text: &str, push: &mut dyn FnMut(u16)) {
        for unit in text.encode_utf16() {
            push(unit);
        }
    }

    #[inline]
    fn encoded_len(text: &str) -> usize {
        text.chars().map(char::len_utf16).sum()
    }
}

/// Cut a unit slice at its first NUL unit.
///
/// Slices without a terminator are returned whole.
#[must_use]
pub fn until_nul<U: Copy + Default + Eq>(units: &[U]) -> &[U] {
    let nul = U::default();
    units
        .iter()
        .position(|&unit| unit == nul)
        .map_or(units, |end| &units[..end])
}

/// Encode `text` as a NUL-terminated UTF-16 vector, the wide counterpart of
/// a string literal.
#[must_use]
pub fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Decode a wide buffer up to its terminator, replacing invalid sequences.
#[must_use]
pub fn from_wide(units: &[u16]) -> String {
    String::from_utf16_lossy(until_nul(units))
}
