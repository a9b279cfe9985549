//! printf directive rendering on top of `std::fmt`.
//!
//! This is the formatting primitive behind every entry point in
//! [`crate::format`]. It walks the format string, and for each directive
//! hands the value to `std::fmt` (`{:x}`, `{:.p$}`, `{:.p$e}`, ...) and then
//! applies the C conventions `std::fmt` lacks: sign and space flags, `#`
//! prefixes, integer precision, length-modifier truncation, two-digit
//! exponents, `%g` selection and `%a` hexadecimal floats.
//!
//! Output goes to any [`fmt::Write`]; the returned count is measured in
//! units of the chosen [`Encoding`], as are widths and precisions.

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use crate::config::Limits;
use crate::encoding::{Encoding, until_nul};
use crate::format::{Arg, FormatError};

/// Integer length modifier of a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Length {
    #[default]
    Int,
    Char,
    Short,
    Long,
    LongLong,
    Max,
    Size,
    PtrDiff,
    LongDouble,
}

/// A parsed `%` directive, minus its conversion character.
#[derive(Debug, Clone, Copy, Default)]
struct Spec {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
    alt: bool,
    width: usize,
    precision: Option<usize>,
    length: Length,
}

/// Render `fmt` with `args` into `out`.
///
/// Returns the number of units produced.
///
/// # Errors
///
/// Fails on a missing or mismatched argument, an unsupported conversion, a
/// width or precision above `limits`, and on `%n` when write-back is not
/// compiled in.
pub(crate) fn render<E: Encoding, W: fmt::Write>(
    out: &mut W,
    fmt: &str,
    args: &[Arg<'_>],
    limits: &Limits,
) -> Result<usize, FormatError> {
    let mut renderer = Renderer {
        out,
        fmt,
        pos: 0,
        args,
        next_arg: 0,
        count: 0,
        limits,
        encoding: PhantomData::<E>,
    };
    renderer.run()?;
    Ok(renderer.count)
}

struct Renderer<'r, 'a, E: Encoding, W: fmt::Write> {
    out: &'r mut W,
    fmt: &'r str,
    pos: usize,
    args: &'r [Arg<'a>],
    next_arg: usize,
    count: usize,
    limits: &'r Limits,
    encoding: PhantomData<E>,
}

impl<'r, 'a, E: Encoding, W: fmt::Write> Renderer<'r, 'a, E, W> {
    fn run(&mut self) -> Result<(), FormatError> {
        let fmt = self.fmt;
        while self.pos < fmt.len() {
            let rest = &fmt[self.pos..];
            match rest.find('%') {
                Some(0) => self.directive()?,
                Some(offset) => {
                    self.emit(&rest[..offset])?;
                    self.pos += offset;
                }
                None => {
                    self.emit(rest)?;
                    self.pos = fmt.len();
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    fn emit(&mut self, text: &str) -> Result<(), FormatError> {
        self.out.write_str(text).map_err(|_| FormatError::Write)?;
        self.count += E::encoded_len(text);
        Ok(())
    }

    fn pad(&mut self, fill: char, mut n: usize) -> Result<(), FormatError> {
        const SPACES: &str = "                                ";
        const ZEROS: &str = "00000000000000000000000000000000";
        let source = if fill == '0' { ZEROS } else { SPACES };
        while n > 0 {
            let chunk = n.min(source.len());
            self.emit(&source[..chunk])?;
            n -= chunk;
        }
        Ok(())
    }

    /// Emit text padded to the field width with spaces.
    fn field(&mut self, spec: &Spec, text: &str) -> Result<(), FormatError> {
        let fill = spec.width.saturating_sub(E::encoded_len(text));
        if spec.left {
            self.emit(text)?;
            self.pad(' ', fill)
        } else {
            self.pad(' ', fill)?;
            self.emit(text)
        }
    }

    /// Emit a number as sign + prefix + digits, honoring `-` and `0`.
    fn number(
        &mut self,
        spec: &Spec,
        sign: &str,
        prefix: &str,
        digits: &str,
        zero_pad: bool,
    ) -> Result<(), FormatError> {
        let len = sign.len() + prefix.len() + digits.len();
        let fill = spec.width.saturating_sub(len);
        if spec.left {
            self.emit(sign)?;
            self.emit(prefix)?;
            self.emit(digits)?;
            self.pad(' ', fill)
        } else if spec.zero && zero_pad {
            self.emit(sign)?;
            self.emit(prefix)?;
            self.pad('0', fill)?;
            self.emit(digits)
        } else {
            self.pad(' ', fill)?;
            self.emit(sign)?;
            self.emit(prefix)?;
            self.emit(digits)
        }
    }

    // ------------------------------------------------------------------
    // Parsing
    // ------------------------------------------------------------------

    fn peek(&self) -> Option<u8> {
        self.fmt.as_bytes().get(self.pos).copied()
    }

    fn take_arg(&mut self) -> Result<(usize, &'r Arg<'a>), FormatError> {
        let index = self.next_arg;
        let arg = self
            .args
            .get(index)
            .ok_or(FormatError::MissingArgument(index))?;
        self.next_arg += 1;
        Ok((index, arg))
    }

    fn star_value(&mut self) -> Result<i64, FormatError> {
        match self.take_arg()? {
            (_, Arg::Int(v)) => Ok(*v),
            (_, Arg::Uint(v)) => Ok(i64::try_from(*v).unwrap_or(i64::MAX)),
            (index, _) => Err(FormatError::ArgumentMismatch {
                index,
                conversion: '*',
            }),
        }
    }

    fn digits(&mut self, limit: usize, what: &'static str) -> Result<usize, FormatError> {
        let mut value: usize = 0;
        while let Some(byte) = self.peek().filter(u8::is_ascii_digit) {
            value = value
                .saturating_mul(10)
                .saturating_add(usize::from(byte - b'0'));
            self.pos += 1;
        }
        check_limit(value, limit, what)
    }

    fn parse_spec(&mut self) -> Result<Spec, FormatError> {
        let mut spec = Spec::default();

        while let Some(byte) = self.peek() {
            match byte {
                b'-' => spec.left = true,
                b'+' => spec.plus = true,
                b' ' => spec.space = true,
                b'0' => spec.zero = true,
                b'#' => spec.alt = true,
                _ => break,
            }
            self.pos += 1;
        }

        if self.peek() == Some(b'*') {
            self.pos += 1;
            let width = self.star_value()?;
            if width < 0 {
                spec.left = true;
            }
            let width = usize::try_from(width.unsigned_abs()).unwrap_or(usize::MAX);
            spec.width = check_limit(width, self.limits.width_limit(), "width")?;
        } else {
            spec.width = self.digits(self.limits.width_limit(), "width")?;
        }

        if self.peek() == Some(b'.') {
            self.pos += 1;
            if self.peek() == Some(b'*') {
                self.pos += 1;
                let precision = self.star_value()?;
                spec.precision = match usize::try_from(precision) {
                    Ok(p) => Some(check_limit(p, self.limits.precision_limit(), "precision")?),
                    // Negative precision counts as omitted.
                    Err(_) => None,
                };
            } else {
                spec.precision = Some(self.digits(self.limits.precision_limit(), "precision")?);
            }
        }

        spec.length = match self.peek() {
            Some(b'h') if self.fmt.as_bytes().get(self.pos + 1) == Some(&b'h') => {
                self.pos += 2;
                Length::Char
            }
            Some(b'l') if self.fmt.as_bytes().get(self.pos + 1) == Some(&b'l') => {
                self.pos += 2;
                Length::LongLong
            }
            Some(byte @ (b'h' | b'l' | b'j' | b'z' | b't' | b'L')) => {
                self.pos += 1;
                match byte {
                    b'h' => Length::Short,
                    b'l' => Length::Long,
                    b'j' => Length::Max,
                    b'z' => Length::Size,
                    b't' => Length::PtrDiff,
                    _ => Length::LongDouble,
                }
            }
            _ => Length::Int,
        };

        Ok(spec)
    }

    fn directive(&mut self) -> Result<(), FormatError> {
        let fmt = self.fmt;
        let start = self.pos;
        self.pos += 1;
        let spec = self.parse_spec()?;

        let Some(conversion) = fmt[self.pos..].chars().next() else {
            // Incomplete trailing directive: emit it as text.
            let tail = &fmt[start..];
            self.pos = fmt.len();
            return self.emit(tail);
        };
        self.pos += conversion.len_utf8();

        match conversion {
            '%' => self.emit("%"),
            'd' | 'i' => self.signed(&spec, conversion),
            'u' | 'o' | 'x' | 'X' => self.unsigned(&spec, conversion),
            'c' => self.character(&spec),
            's' => self.string(&spec),
            'p' => self.pointer(&spec),
            'f' | 'F' | 'e' | 'E' | 'g' | 'G' | 'a' | 'A' => self.float(&spec, conversion),
            'n' => self.write_back(),
            other => Err(FormatError::UnsupportedConversion(other)),
        }
    }

    // ------------------------------------------------------------------
    // Conversions
    // ------------------------------------------------------------------

    fn signed(&mut self, spec: &Spec, conversion: char) -> Result<(), FormatError> {
        let value = match self.take_arg()? {
            (_, Arg::Int(v)) => *v,
            #[expect(clippy::cast_possible_wrap, reason = "C reinterprets the bits")]
            (_, Arg::Uint(v)) => *v as i64,
            (_, Arg::Char(c)) => i64::from(u32::from(*c)),
            (index, _) => return Err(FormatError::ArgumentMismatch { index, conversion }),
        };
        let value = truncate_signed(value, spec.length);
        let sign = if value < 0 {
            "-"
        } else if spec.plus {
            "+"
        } else if spec.space {
            " "
        } else {
            ""
        };
        let digits = integer_digits(value.unsigned_abs(), conversion, spec.precision);
        self.number(spec, sign, "", &digits, spec.precision.is_none())
    }

    fn unsigned(&mut self, spec: &Spec, conversion: char) -> Result<(), FormatError> {
        let value = match self.take_arg()? {
            #[expect(clippy::cast_sign_loss, reason = "C reinterprets the bits")]
            (_, Arg::Int(v)) => *v as u64,
            (_, Arg::Uint(v)) => *v,
            (_, Arg::Char(c)) => u64::from(u32::from(*c)),
            (index, _) => return Err(FormatError::ArgumentMismatch { index, conversion }),
        };
        let value = truncate_unsigned(value, spec.length);
        let digits = integer_digits(value, conversion, spec.precision);
        let prefix = match conversion {
            'o' if spec.alt && !digits.starts_with('0') => "0",
            'x' if spec.alt && value != 0 => "0x",
            'X' if spec.alt && value != 0 => "0X",
            _ => "",
        };
        self.number(spec, "", prefix, &digits, spec.precision.is_none())
    }

    fn character(&mut self, spec: &Spec) -> Result<(), FormatError> {
        let ch = match self.take_arg()? {
            (_, Arg::Char(c)) => Some(*c),
            (_, Arg::Int(v)) => u32::try_from(*v).ok().and_then(char::from_u32),
            (_, Arg::Uint(v)) => u32::try_from(*v).ok().and_then(char::from_u32),
            _ => None,
        };
        let ch = ch.ok_or(FormatError::ArgumentMismatch {
            index: self.next_arg - 1,
            conversion: 'c',
        })?;
        let mut buf = [0u8; 4];
        self.field(spec, ch.encode_utf8(&mut buf))
    }

    fn string(&mut self, spec: &Spec) -> Result<(), FormatError> {
        let text: Cow<'_, str> = match self.take_arg()? {
            (_, Arg::Str(s)) => Cow::Borrowed(*s),
            (_, Arg::WideStr(w)) => Cow::Owned(String::from_utf16_lossy(until_nul(w))),
            (index, _) => {
                return Err(FormatError::ArgumentMismatch {
                    index,
                    conversion: 's',
                });
            }
        };
        let text = match spec.precision {
            Some(max) => truncate_units::<E>(&text, max),
            None => &text,
        };
        self.field(spec, text)
    }

    fn pointer(&mut self, spec: &Spec) -> Result<(), FormatError> {
        let address = match self.take_arg()? {
            (_, Arg::Ptr(address)) => *address,
            (index, _) => {
                return Err(FormatError::ArgumentMismatch {
                    index,
                    conversion: 'p',
                });
            }
        };
        if address == 0 {
            self.field(spec, "(nil)")
        } else {
            self.field(spec, &format!("{address:#x}"))
        }
    }

    fn float(&mut self, spec: &Spec, conversion: char) -> Result<(), FormatError> {
        let value = match self.take_arg()? {
            (_, Arg::Float(v)) => *v,
            (index, _) => return Err(FormatError::ArgumentMismatch { index, conversion }),
        };
        let sign = if value.is_sign_negative() {
            "-"
        } else if spec.plus {
            "+"
        } else if spec.space {
            " "
        } else {
            ""
        };
        let magnitude = value.abs();
        let upper = conversion.is_ascii_uppercase();

        if !magnitude.is_finite() {
            let body = match (magnitude.is_nan(), upper) {
                (true, false) => "nan",
                (true, true) => "NAN",
                (false, false) => "inf",
                (false, true) => "INF",
            };
            return self.number(spec, sign, "", body, false);
        }

        let precision = spec.precision.unwrap_or(6);
        let (prefix, body) = match conversion.to_ascii_lowercase() {
            'f' => ("", fixed(magnitude, precision, spec.alt)),
            'e' => ("", exponential(magnitude, precision, spec.alt, upper)),
            'a' => (
                if upper { "0X" } else { "0x" },
                hex_float(magnitude, spec.precision, spec.alt, upper),
            ),
            _ => ("", general(magnitude, spec.precision, spec.alt, upper)),
        };
        self.number(spec, sign, prefix, &body, true)
    }

    #[cfg(feature = "write-back")]
    fn write_back(&mut self) -> Result<(), FormatError> {
        match self.take_arg()? {
            (_, Arg::Count(cell)) => {
                cell.set(i64::try_from(self.count).unwrap_or(i64::MAX));
                Ok(())
            }
            (index, _) => Err(FormatError::ArgumentMismatch {
                index,
                conversion: 'n',
            }),
        }
    }

    #[cfg(not(feature = "write-back"))]
    fn write_back(&mut self) -> Result<(), FormatError> {
        Err(FormatError::WriteBackDirective)
    }
}

fn check_limit(value: usize, limit: usize, what: &'static str) -> Result<usize, FormatError> {
    if value > limit {
        Err(FormatError::LimitExceeded { what, value, limit })
    } else {
        Ok(value)
    }
}

#[expect(clippy::cast_possible_truncation, reason = "truncation is the point")]
fn truncate_signed(value: i64, length: Length) -> i64 {
    match length {
        Length::Int => i64::from(value as i32),
        Length::Char => i64::from(value as i8),
        Length::Short => i64::from(value as i16),
        _ => value,
    }
}

#[expect(clippy::cast_possible_truncation, reason = "truncation is the point")]
fn truncate_unsigned(value: u64, length: Length) -> u64 {
    match length {
        Length::Int => u64::from(value as u32),
        Length::Char => u64::from(value as u8),
        Length::Short => u64::from(value as u16),
        _ => value,
    }
}

fn integer_digits(magnitude: u64, conversion: char, precision: Option<usize>) -> String {
    let mut digits = match conversion {
        'o' => format!("{magnitude:o}"),
        'x' => format!("{magnitude:x}"),
        'X' => format!("{magnitude:X}"),
        _ => magnitude.to_string(),
    };
    match precision {
        // "%.0d" of zero prints nothing.
        Some(0) if magnitude == 0 => digits.clear(),
        Some(p) if digits.len() < p => {
            digits.insert_str(0, &"0".repeat(p - digits.len()));
        }
        _ => {}
    }
    digits
}

/// Longest prefix of `text` that fits in `max` units, cut at a char boundary.
fn truncate_units<E: Encoding>(text: &str, max: usize) -> &str {
    let mut used = 0;
    for (index, ch) in text.char_indices() {
        let mut buf = [0u8; 4];
        used += E::encoded_len(ch.encode_utf8(&mut buf));
        if used > max {
            return &text[..index];
        }
    }
    text
}

fn fixed(magnitude: f64, precision: usize, alt: bool) -> String {
    let mut body = format!("{magnitude:.precision$}");
    if alt && precision == 0 {
        body.push('.');
    }
    body
}

fn exponential(magnitude: f64, precision: usize, alt: bool, upper: bool) -> String {
    let formatted = format!("{magnitude:.precision$e}");
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((formatted.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let mut body = String::with_capacity(mantissa.len() + 6);
    body.push_str(mantissa);
    if alt && precision == 0 {
        body.push('.');
    }
    body.push(if upper { 'E' } else { 'e' });
    body.push(if exponent < 0 { '-' } else { '+' });
    if exponent.unsigned_abs() < 10 {
        body.push('0');
    }
    body.push_str(&exponent.unsigned_abs().to_string());
    body
}

fn decimal_exponent(magnitude: f64, precision: usize) -> i32 {
    if magnitude == 0.0 {
        return 0;
    }
    // Round first: 9.9999995 at precision 6 becomes 1.00000e+01.
    let formatted = format!("{magnitude:.precision$e}");
    formatted
        .split_once('e')
        .and_then(|(_, exponent)| exponent.parse().ok())
        .unwrap_or(0)
}

fn strip_fraction_zeros(body: &str) -> &str {
    if body.contains('.') {
        body.trim_end_matches('0').trim_end_matches('.')
    } else {
        body
    }
}

fn general(magnitude: f64, precision: Option<usize>, alt: bool, upper: bool) -> String {
    let significant = match precision {
        None => 6,
        Some(0) => 1,
        Some(p) => p,
    };
    let exponent = decimal_exponent(magnitude, significant - 1);
    let use_fixed = exponent >= -4 && i64::from(exponent) < i64::try_from(significant).unwrap_or(i64::MAX);

    if use_fixed {
        let decimals = usize::try_from(i64::try_from(significant).unwrap_or(i64::MAX) - 1 - i64::from(exponent))
            .unwrap_or(0);
        let body = fixed(magnitude, decimals, alt);
        if alt {
            body
        } else {
            strip_fraction_zeros(&body).to_string()
        }
    } else {
        let body = exponential(magnitude, significant - 1, alt, upper);
        if alt {
            return body;
        }
        let marker = if upper { 'E' } else { 'e' };
        match body.split_once(marker) {
            Some((mantissa, exponent)) => {
                format!("{}{marker}{exponent}", strip_fraction_zeros(mantissa))
            }
            None => body,
        }
    }
}

const MANTISSA_BITS: u32 = 52;
const MANTISSA_NIBBLES: usize = 13;

/// `%a` body after the `0x` prefix: `h.hhhp±d`.
///
/// Normal values lead with 1, subnormals with 0 and exponent -1022. Without
/// a precision the fraction is exact with trailing zeros removed; with one
/// it is rounded half to even, which may carry into the leading digit.
fn hex_float(magnitude: f64, precision: Option<usize>, alt: bool, upper: bool) -> String {
    let bits = magnitude.to_bits();
    let biased = (bits >> MANTISSA_BITS) & 0x7ff;
    let mut fraction = bits & ((1u64 << MANTISSA_BITS) - 1);
    let (mut lead, exponent): (u64, i64) = match (biased, fraction) {
        (0, 0) => (0, 0),
        (0, _) => (0, -1022),
        #[expect(clippy::cast_possible_wrap, reason = "biased exponent is 11 bits")]
        _ => (1, biased as i64 - 1023),
    };

    let mut digits = match precision {
        Some(p) if p < MANTISSA_NIBBLES => {
            let shift = 4 * u32::try_from(MANTISSA_NIBBLES - p).unwrap_or(MANTISSA_BITS);
            let half = 1u64 << (shift - 1);
            let rest = fraction & ((1u64 << shift) - 1);
            fraction >>= shift;
            let odd = if p == 0 { lead & 1 == 1 } else { fraction & 1 == 1 };
            if rest > half || (rest == half && odd) {
                fraction += 1;
            }
            let width = 4 * u32::try_from(p).unwrap_or(0);
            if fraction >> width != 0 {
                lead += 1;
                fraction &= (1u64 << width) - 1;
            }
            if p == 0 { String::new() } else { format!("{fraction:0p$x}") }
        }
        Some(p) => format!("{fraction:013x}{:0<pad$}", "", pad = p - MANTISSA_NIBBLES),
        None => format!("{fraction:013x}").trim_end_matches('0').to_string(),
    };
    if upper {
        digits.make_ascii_uppercase();
    }

    let mut body = lead.to_string();
    if !digits.is_empty() || alt {
        body.push('.');
    }
    body.push_str(&digits);
    body.push(if upper { 'P' } else { 'p' });
    if exponent >= 0 {
        body.push('+');
    }
    body.push_str(&exponent.to_string());
    body
}
