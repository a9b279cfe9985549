//! Bounds-safe printf-style formatting.
//!
//! Every entry point validates its inputs before anything is written:
//!
//! 1. a missing format string is rejected
//! 2. for buffers, a zero capacity or a missing buffer is rejected
//! 3. a format string containing the write-back directive (`%n`) is rejected
//!    unless the `write-back` feature is enabled
//! 4. the arguments are checked against the directives by a dry run
//!
//! A rejected call performs no output. A bounded call that succeeds always
//! leaves the last unit of the buffer (and the unit after the written text)
//! set to NUL, even when the output was truncated. Truncation happens at a
//! character boundary, so the kept prefix is always valid in its encoding.
//!
//! # Example
//!
//! ```
//! use uprintf::{Arg, snprintf};
//!
//! let mut buf = [0u8; 8];
//! let n = snprintf(Some(&mut buf), 8, Some("%s=%d"), &[Arg::from("answer"), Arg::from(42)]);
//! assert_eq!(n, Ok(9));
//! assert_eq!(&buf, b"answer=\0");
//! ```

use std::fmt;
use std::io::{self, Write as _};
use std::marker::PhantomData;

#[cfg(feature = "write-back")]
use std::cell::Cell;

use crate::config::{Limits, WRITE_BACK_ENABLED};
use crate::encoding::{Encoding, Narrow, Wide, until_nul};
use crate::render::render;
use crate::scan::has_write_back;

/// The C failure sentinel.
pub const FAILURE: i32 = -1;

/// One formatting argument.
///
/// Conversions accept the argument kinds C would promote to them:
/// `%d`/`%i` take `Int`, `Uint` or `Char`; `%u %o %x %X` the same set;
/// `%c` takes `Char` or an integer code point; `%s` takes `Str` or
/// `WideStr`; `%p` takes `Ptr`; floating conversions take `Float`.
#[derive(Debug, Clone, Copy)]
pub enum Arg<'a> {
    Int(i64),
    Uint(u64),
    Float(f64),
    Char(char),
    Str(&'a str),
    /// A wide string, read up to its first NUL.
    WideStr(&'a [u16]),
    /// An address for `%p`; zero prints `(nil)`.
    Ptr(usize),
    /// Target of the `%n` directive.
    #[cfg(feature = "write-back")]
    Count(&'a Cell<i64>),
}

macro_rules! impl_from_int {
    ($variant:ident, $wide:ty: $($t:ty),*) => {
        $(
            impl From<$t> for Arg<'_> {
                fn from(value: $t) -> Self {
                    Arg::$variant(<$wide>::from(value))
                }
            }
        )*
    };
}

impl_from_int!(Int, i64: i8, i16, i32, i64);
impl_from_int!(Uint, u64: u8, u16, u32, u64);

impl From<isize> for Arg<'_> {
    fn from(value: isize) -> Self {
        // isize is at most 64 bits on supported targets.
        Arg::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<usize> for Arg<'_> {
    fn from(value: usize) -> Self {
        Arg::Uint(u64::try_from(value).unwrap_or(u64::MAX))
    }
}

impl From<f32> for Arg<'_> {
    fn from(value: f32) -> Self {
        Arg::Float(f64::from(value))
    }
}

impl From<f64> for Arg<'_> {
    fn from(value: f64) -> Self {
        Arg::Float(value)
    }
}

impl From<char> for Arg<'_> {
    fn from(value: char) -> Self {
        Arg::Char(value)
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(value: &'a str) -> Self {
        Arg::Str(value)
    }
}

impl<'a> From<&'a String> for Arg<'a> {
    fn from(value: &'a String) -> Self {
        Arg::Str(value)
    }
}

impl<'a> From<&'a [u16]> for Arg<'a> {
    fn from(value: &'a [u16]) -> Self {
        Arg::WideStr(value)
    }
}

impl<T> From<*const T> for Arg<'_> {
    fn from(value: *const T) -> Self {
        Arg::Ptr(value.addr())
    }
}

impl<T> From<*mut T> for Arg<'_> {
    fn from(value: *mut T) -> Self {
        Arg::Ptr(value.addr())
    }
}

#[cfg(feature = "write-back")]
impl<'a> From<&'a Cell<i64>> for Arg<'a> {
    fn from(value: &'a Cell<i64>) -> Self {
        Arg::Count(value)
    }
}

/// Why a formatting call was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// No format string was given.
    NullFormat,
    /// No buffer was given for a nonzero capacity.
    NullBuffer,
    /// No output stream was given.
    NullStream,
    /// The buffer capacity is zero.
    ZeroCapacity,
    /// The format string contains `%n` and write-back is disabled.
    WriteBackDirective,
    /// A directive needs argument `index` but the list is shorter.
    MissingArgument(usize),
    /// Argument `index` has the wrong kind for `conversion`.
    ArgumentMismatch { index: usize, conversion: char },
    /// The conversion character is not supported.
    UnsupportedConversion(char),
    /// A width or precision is above the configured limit.
    LimitExceeded {
        what: &'static str,
        value: usize,
        limit: usize,
    },
    /// The format string is not valid in the named encoding.
    InvalidEncoding(&'static str),
    /// The output sink refused a write.
    Write,
    /// Writing to the stream failed.
    Io { kind: io::ErrorKind, message: String },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullFormat => write!(f, "format string is null"),
            Self::NullBuffer => write!(f, "output buffer is null"),
            Self::NullStream => write!(f, "output stream is null"),
            Self::ZeroCapacity => write!(f, "output buffer has zero capacity"),
            Self::WriteBackDirective => {
                write!(f, "format string contains the %n write-back directive")
            }
            Self::MissingArgument(index) => write!(f, "missing argument {index}"),
            Self::ArgumentMismatch { index, conversion } => {
                write!(f, "argument {index} does not match %{conversion}")
            }
            Self::UnsupportedConversion(c) => write!(f, "unsupported conversion %{c}"),
            Self::LimitExceeded { what, value, limit } => {
                write!(f, "{what} {value} exceeds limit {limit}")
            }
            Self::InvalidEncoding(name) => write!(f, "format string is not valid {name} text"),
            Self::Write => write!(f, "output sink refused a write"),
            Self::Io { message, .. } => write!(f, "I/O error: {message}"),
        }
    }
}

impl std::error::Error for FormatError {}

impl From<io::Error> for FormatError {
    fn from(err: io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Logical output length in code units, or the reason for rejection.
///
/// A length larger than the buffer capacity means the output was truncated.
pub type Outcome = Result<usize, FormatError>;

/// Conversion of an [`Outcome`] to the C return convention.
pub trait OutcomeExt {
    /// The length as `i32`, or [`FAILURE`] on error or overflow.
    fn as_c_int(&self) -> i32;
}

impl OutcomeExt for Outcome {
    fn as_c_int(&self) -> i32 {
        match self {
            Ok(n) => i32::try_from(*n).unwrap_or(FAILURE),
            Err(_) => FAILURE,
        }
    }
}

/// Sink that counts nothing and keeps nothing, for validation passes.
struct Discard;

impl fmt::Write for Discard {
    fn write_str(&mut self, _: &str) -> fmt::Result {
        Ok(())
    }
}

/// Writes encoded units into a buffer, keeping the longest run of whole
/// characters that fits in `limit` units.
///
/// Once a character does not fit, nothing after it is written either, so
/// the buffer never holds half a UTF-8 sequence or a lone surrogate.
struct BoundedWriter<'b, E: Encoding> {
    buf: &'b mut [E::Unit],
    limit: usize,
    pos: usize,
    full: bool,
}

impl<'b, E: Encoding> BoundedWriter<'b, E> {
    fn new(buf: &'b mut [E::Unit], limit: usize) -> Self {
        Self {
            buf,
            limit,
            pos: 0,
            full: false,
        }
    }
}

impl<E: Encoding> fmt::Write for BoundedWriter<'_, E> {
    fn write_str(&mut self, text: &str) -> fmt::Result {
        for ch in text.chars() {
            if self.full {
                break;
            }
            let mut utf8 = [0u8; 4];
            let piece: &str = ch.encode_utf8(&mut utf8);
            if self.pos + E::encoded_len(piece) > self.limit {
                self.full = true;
                break;
            }
            let buf = &mut *self.buf;
            let pos = &mut self.pos;
            E::encode(piece, &mut |unit| {
                buf[*pos] = unit;
                *pos += 1;
            });
        }
        Ok(())
    }
}

fn log_rejection(err: &FormatError) {
    match err {
        FormatError::WriteBackDirective => {
            log::warn!("rejected format string containing the %n write-back directive");
        }
        other => log::debug!("rejected format call: {other}"),
    }
}

/// Printf-style formatter for one [`Encoding`].
///
/// The free functions ([`snprintf`], [`snwprintf`], ...) use a default
/// `Formatter`; construct one with [`Formatter::with_limits`] to tighten
/// the width and precision bounds.
#[derive(Debug, Clone, Copy)]
pub struct Formatter<E: Encoding> {
    limits: Limits,
    encoding: PhantomData<E>,
}

impl<E: Encoding> Default for Formatter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Encoding> Formatter<E> {
    /// Create a formatter with default [`Limits`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    /// Create a formatter with the given limits.
    #[must_use]
    pub const fn with_limits(limits: Limits) -> Self {
        Self {
            limits,
            encoding: PhantomData,
        }
    }

    /// The limits this formatter enforces.
    #[must_use]
    pub const fn limits(&self) -> &Limits {
        &self.limits
    }

    fn check_write_back(fmt: &[E::Unit]) -> Result<(), FormatError> {
        if !WRITE_BACK_ENABLED && has_write_back::<E>(Some(fmt)) {
            return Err(FormatError::WriteBackDirective);
        }
        Ok(())
    }

    /// Render into a string, validating everything first.
    fn render_owned(&self, fmt: &[E::Unit], args: &[Arg<'_>]) -> Result<(String, usize), FormatError> {
        Self::check_write_back(fmt)?;
        let text = E::decode(until_nul(fmt))?;
        let mut out = String::new();
        let count = render::<E, _>(&mut out, &text, args, &self.limits)?;
        Ok((out, count))
    }

    /// Format into `buf`, writing at most `capacity - 1` units plus a NUL.
    ///
    /// The effective capacity is the smaller of `capacity` and the slice
    /// length. On success the returned length is the untruncated length of
    /// the output in units; on failure the buffer is left untouched.
    ///
    /// # Errors
    ///
    /// [`FormatError::NullFormat`], [`FormatError::ZeroCapacity`],
    /// [`FormatError::NullBuffer`] and [`FormatError::WriteBackDirective`]
    /// are checked in that order, then any rendering error.
    pub fn format_to_buffer(
        &self,
        buf: Option<&mut [E::Unit]>,
        capacity: usize,
        fmt: Option<&[E::Unit]>,
        args: &[Arg<'_>],
    ) -> Outcome {
        self.bounded(buf, capacity, fmt, args).inspect_err(log_rejection)
    }

    fn bounded(
        &self,
        buf: Option<&mut [E::Unit]>,
        capacity: usize,
        fmt: Option<&[E::Unit]>,
        args: &[Arg<'_>],
    ) -> Outcome {
        let fmt = fmt.ok_or(FormatError::NullFormat)?;
        if capacity == 0 {
            return Err(FormatError::ZeroCapacity);
        }
        let buf = buf.ok_or(FormatError::NullBuffer)?;
        let capacity = capacity.min(buf.len());
        if capacity == 0 {
            return Err(FormatError::ZeroCapacity);
        }
        Self::check_write_back(fmt)?;
        let text = E::decode(until_nul(fmt))?;

        // A dry run catches argument errors before the buffer is touched.
        render::<E, _>(&mut Discard, &text, args, &self.limits)?;

        let mut writer = BoundedWriter::<E>::new(&mut *buf, capacity - 1);
        let count = render::<E, _>(&mut writer, &text, args, &self.limits)?;
        let end = writer.pos;
        buf[end] = E::NUL;
        buf[capacity - 1] = E::NUL;
        Ok(count)
    }

    /// Format into `buf` without an explicit capacity.
    ///
    /// Kept for compatibility with `sprintf`-style callers. The bound is the
    /// slice length, further capped at [`Limits::unbounded_units`]; prefer
    /// [`Formatter::format_to_buffer`].
    ///
    /// # Errors
    ///
    /// As [`Formatter::format_to_buffer`].
    pub fn format_unbounded(
        &self,
        buf: Option<&mut [E::Unit]>,
        fmt: Option<&[E::Unit]>,
        args: &[Arg<'_>],
    ) -> Outcome {
        let cap = self.limits.unbounded_units(size_of::<E::Unit>());
        let capacity = buf.as_deref().map_or(cap, |b| b.len().min(cap));
        self.format_to_buffer(buf, capacity, fmt, args)
    }

    /// Format and write the result to `stream` as UTF-8.
    ///
    /// The returned length is counted in units of `E`, not bytes written.
    ///
    /// # Errors
    ///
    /// [`FormatError::NullFormat`], [`FormatError::NullStream`], any
    /// validation or rendering error, and [`FormatError::Io`] if the write
    /// fails.
    pub fn format_to_stream<W: io::Write + ?Sized>(
        &self,
        stream: Option<&mut W>,
        fmt: Option<&[E::Unit]>,
        args: &[Arg<'_>],
    ) -> Outcome {
        self.stream(stream, fmt, args).inspect_err(log_rejection)
    }

    fn stream<W: io::Write + ?Sized>(
        &self,
        stream: Option<&mut W>,
        fmt: Option<&[E::Unit]>,
        args: &[Arg<'_>],
    ) -> Outcome {
        let fmt = fmt.ok_or(FormatError::NullFormat)?;
        let stream = stream.ok_or(FormatError::NullStream)?;
        let (text, count) = self.render_owned(fmt, args)?;
        stream.write_all(text.as_bytes())?;
        Ok(count)
    }

    /// Format and write the result to standard output.
    ///
    /// # Errors
    ///
    /// As [`Formatter::format_to_stream`].
    pub fn format_to_stdout(&self, fmt: Option<&[E::Unit]>, args: &[Arg<'_>]) -> Outcome {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        let count = self.format_to_stream(Some(&mut lock), fmt, args)?;
        lock.flush()?;
        Ok(count)
    }

    /// Format into a new `String`.
    ///
    /// # Errors
    ///
    /// [`FormatError::NullFormat`] and any validation or rendering error.
    pub fn format_to_string(&self, fmt: Option<&[E::Unit]>, args: &[Arg<'_>]) -> Result<String, FormatError> {
        fmt.ok_or(FormatError::NullFormat)
            .and_then(|fmt| self.render_owned(fmt, args))
            .map(|(text, _)| text)
            .inspect_err(log_rejection)
    }
}

// ============================================================================
// Narrow entry points
// ============================================================================

/// Write formatted text to standard output.
///
/// # Errors
///
/// See [`Formatter::format_to_stdout`].
pub fn printf(fmt: Option<&str>, args: &[Arg<'_>]) -> Outcome {
    Formatter::<Narrow>::new().format_to_stdout(fmt.map(str::as_bytes), args)
}

/// Write formatted text to `stream`.
///
/// # Errors
///
/// See [`Formatter::format_to_stream`].
pub fn fprintf<W: io::Write + ?Sized>(stream: Option<&mut W>, fmt: Option<&str>, args: &[Arg<'_>]) -> Outcome {
    Formatter::<Narrow>::new().format_to_stream(stream, fmt.map(str::as_bytes), args)
}

/// Write formatted text into at most `capacity` bytes of `buf`.
///
/// # Errors
///
/// See [`Formatter::format_to_buffer`].
pub fn snprintf(buf: Option<&mut [u8]>, capacity: usize, fmt: Option<&str>, args: &[Arg<'_>]) -> Outcome {
    Formatter::<Narrow>::new().format_to_buffer(buf, capacity, fmt.map(str::as_bytes), args)
}

/// Write formatted text into `buf` with no explicit capacity.
///
/// # Errors
///
/// See [`Formatter::format_unbounded`].
pub fn sprintf(buf: Option<&mut [u8]>, fmt: Option<&str>, args: &[Arg<'_>]) -> Outcome {
    Formatter::<Narrow>::new().format_unbounded(buf, fmt.map(str::as_bytes), args)
}

// ============================================================================
// Wide entry points
// ============================================================================

/// Wide [`printf`].
///
/// # Errors
///
/// See [`Formatter::format_to_stdout`].
pub fn wprintf(fmt: Option<&[u16]>, args: &[Arg<'_>]) -> Outcome {
    Formatter::<Wide>::new().format_to_stdout(fmt, args)
}

/// Wide [`fprintf`]. The stream receives UTF-8.
///
/// # Errors
///
/// See [`Formatter::format_to_stream`].
pub fn fwprintf<W: io::Write + ?Sized>(stream: Option<&mut W>, fmt: Option<&[u16]>, args: &[Arg<'_>]) -> Outcome {
    Formatter::<Wide>::new().format_to_stream(stream, fmt, args)
}

/// Wide [`snprintf`]; `capacity` is in UTF-16 units.
///
/// # Errors
///
/// See [`Formatter::format_to_buffer`].
pub fn snwprintf(buf: Option<&mut [u16]>, capacity: usize, fmt: Option<&[u16]>, args: &[Arg<'_>]) -> Outcome {
    Formatter::<Wide>::new().format_to_buffer(buf, capacity, fmt, args)
}

/// Wide [`sprintf`].
///
/// # Errors
///
/// See [`Formatter::format_unbounded`].
pub fn swprintf(buf: Option<&mut [u16]>, fmt: Option<&[u16]>, args: &[Arg<'_>]) -> Outcome {
    Formatter::<Wide>::new().format_unbounded(buf, fmt, args)
}
