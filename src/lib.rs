//! # uprintf
//!
//! Bounds-safe printf-style formatting and zero-allocation ANSI true-color
//! escape sequences.
//!
//! ## Quick Start
//!
//! ```rust
//! use uprintf::prelude::*;
//!
//! let mut buf = [0u8; 16];
//! let n = snprintf(Some(&mut buf), 16, Some("%s: %5.1f"), &[Arg::from("temp"), Arg::from(21.5)]);
//! assert_eq!(n, Ok(11));
//!
//! let red = fg_rgb(300, -10, 128);
//! assert_eq!(red.as_str(), "\x1b[38;2;255;0;128m");
//! ```
//!
//! ## Core Concepts
//!
//! - **Formatter**: printf entry points that reject null inputs, zero
//!   capacities and the `%n` write-back directive, and always terminate
//!   bounded output
//! - **Encoding**: every routine exists for [`Narrow`] (UTF-8 bytes) and
//!   [`Wide`] (UTF-16 units); the caller picks one explicitly
//! - **`ColorSpec`**: RGB, hex, HSL, OKLCH or a CSS name, resolved to a
//!   [`ColorTriplet`]; resolution never fails and falls back to black
//! - **Sequence**: an `ESC[38;2;R;G;Bm` sequence in a fixed inline buffer
//!
//! ## Features
//!
//! - `write-back`: accept `%n`. Off by default.

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod ansi;
pub mod clamp;
pub mod color;
pub mod config;
pub mod encoding;
pub mod format;
pub mod logging;
pub mod named;
mod render;
pub mod scan;
pub mod terminal;

/// Re-exports for convenient usage
pub mod prelude {
    pub use crate::ansi::{
        Attributes, Layer, RESET, SEQ_MAX, Sequence, bg_css, bg_hex, bg_hsl, bg_oklch, bg_rgb, fg_css, fg_hex,
        fg_hsl, fg_oklch, fg_rgb, style, wbg_css, wbg_hex, wbg_hsl, wbg_oklch, wbg_rgb, wfg_css, wfg_hex, wfg_hsl,
        wfg_oklch, wfg_rgb, wstyle,
    };
    pub use crate::color::{ColorParseError, ColorSpec, ColorTriplet};
    pub use crate::config::Limits;
    pub use crate::encoding::{Encoding, Narrow, Wide, from_wide, wide};
    pub use crate::format::{
        Arg, FAILURE, FormatError, Formatter, Outcome, OutcomeExt, fprintf, fwprintf, printf, snprintf, snwprintf,
        sprintf, swprintf, wprintf,
    };
}

// Re-export key types at crate root
pub use ansi::{Attributes, Layer, Sequence};
pub use color::{ColorParseError, ColorSpec, ColorTriplet};
pub use config::Limits;
pub use encoding::{Encoding, Narrow, Wide};
pub use format::{
    Arg, FAILURE, FormatError, Formatter, Outcome, OutcomeExt, fprintf, fwprintf, printf, snprintf, snwprintf,
    sprintf, swprintf, wprintf,
};
pub use scan::has_write_back;
