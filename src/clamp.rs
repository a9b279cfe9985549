//! Saturating numeric helpers shared by the color converters and the
//! named-color registry.

use std::cmp::Ordering;

/// Clamp an integer channel value into `0..=255`.
///
/// Values below zero become 0, values above 255 become 255.
#[must_use]
pub const fn clamp_channel(value: i64) -> u8 {
    if value < 0 {
        0
    } else if value > 255 {
        255
    } else {
        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "value is in 0..=255")]
        let channel = value as u8;
        channel
    }
}

/// Clamp a float into `[lo, hi]`. NaN maps to `lo`.
#[must_use]
pub fn clamp_unit(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() || value < lo {
        lo
    } else if value > hi {
        hi
    } else {
        value
    }
}

/// Scale a value in `[0, 1]` to a rounded 8-bit channel.
#[must_use]
pub(crate) fn unit_to_channel(value: f64) -> u8 {
    let scaled = (clamp_unit(value, 0.0, 1.0) * 255.0).round();
    #[expect(clippy::cast_possible_truncation, reason = "scaled is in 0.0..=255.0")]
    let whole = scaled as i64;
    clamp_channel(whole)
}

/// Compare two byte strings with ASCII case folding.
///
/// `A`-`Z` fold to `a`-`z`; every other byte compares by its raw value.
/// A string that is a prefix of the other orders first.
#[must_use]
pub fn cmp_ignore_ascii_case(a: &[u8], b: &[u8]) -> Ordering {
    let folded_a = a.iter().map(u8::to_ascii_lowercase);
    let folded_b = b.iter().map(u8::to_ascii_lowercase);
    folded_a.cmp(folded_b)
}
