//! Formatter configuration.
//!
//! The write-back directive is governed by a single build-time switch, the
//! `write-back` Cargo feature. Everything else is a runtime [`Limits`] value
//! handed to [`crate::format::Formatter::with_limits`].

/// Whether `%n` is accepted. Set by the `write-back` feature.
pub const WRITE_BACK_ENABLED: bool = cfg!(feature = "write-back");

/// Size in bytes assumed for buffers passed without an explicit capacity.
pub const STACK_BUF_MAX: usize = 4096;

/// Largest field width a directive may request.
pub const MAX_WIDTH: usize = 1_048_576;

/// Largest precision a directive may request.
pub const MAX_PRECISION: usize = 1_048_576;

/// Bounds applied while rendering a format string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Limits {
    max_width: usize,
    max_precision: usize,
    unbounded_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_width: MAX_WIDTH,
            max_precision: MAX_PRECISION,
            unbounded_bytes: STACK_BUF_MAX,
        }
    }
}

impl Limits {
    /// Create limits with the default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the largest accepted field width.
    #[must_use]
    pub const fn max_width(mut self, max_width: usize) -> Self {
        self.max_width = max_width;
        self
    }

    /// Set the largest accepted precision.
    #[must_use]
    pub const fn max_precision(mut self, max_precision: usize) -> Self {
        self.max_precision = max_precision;
        self
    }

    /// Set the byte budget for writes without an explicit capacity.
    #[must_use]
    pub const fn unbounded_bytes(mut self, bytes: usize) -> Self {
        self.unbounded_bytes = bytes;
        self
    }

    /// The largest accepted field width.
    #[must_use]
    pub const fn width_limit(&self) -> usize {
        self.max_width
    }

    /// The largest accepted precision.
    #[must_use]
    pub const fn precision_limit(&self) -> usize {
        self.max_precision
    }

    /// Capacity, in units of `unit_size` bytes, for writes without an
    /// explicit capacity. Never less than one unit.
    #[must_use]
    pub const fn unbounded_units(&self, unit_size: usize) -> usize {
        let units = self.unbounded_bytes / unit_size;
        if units == 0 { 1 } else { units }
    }
}
