//! End-to-end tests for the formatted-write entry points.

#![allow(clippy::approx_constant)]

mod common;

use common::{init_test_logging, narrow_text, test_phase};
use uprintf::encoding::{from_wide, until_nul, wide};
use uprintf::{Arg, Encoding, FAILURE, FormatError, Formatter, Limits, Narrow, OutcomeExt, Wide};
use uprintf::{fprintf, fwprintf, printf, snprintf, snwprintf, sprintf, swprintf, wprintf};

fn fmt_narrow(fmt: &str, args: &[Arg<'_>]) -> String {
    let mut buf = [0u8; 256];
    let buf_len = buf.len();
    let n = snprintf(Some(&mut buf), buf_len, Some(fmt), args).expect("format succeeds");
    let text = narrow_text(&buf).to_string();
    assert_eq!(n, text.len(), "{fmt}");
    text
}

fn fmt_wide(fmt: &str, args: &[Arg<'_>]) -> String {
    let mut buf = [0u16; 256];
    let fmt = wide(fmt);
    let buf_len = buf.len();
    snwprintf(Some(&mut buf), buf_len, Some(&fmt), args).expect("format succeeds");
    from_wide(&buf)
}

#[test]
fn test_integer_conversions() {
    init_test_logging();
    let _phase = test_phase("integer conversions");
    let cases: &[(&str, Arg<'_>, &str)] = &[
        ("%d", Arg::from(42), "42"),
        ("%d", Arg::from(-7), "-7"),
        ("%i", Arg::from(123), "123"),
        ("%u", Arg::from(42u32), "42"),
        ("%o", Arg::from(255), "377"),
        ("%x", Arg::from(255), "ff"),
        ("%X", Arg::from(255), "FF"),
        ("%#x", Arg::from(255), "0xff"),
        ("%#o", Arg::from(255), "0377"),
        ("%ld", Arg::from(123_456_789i64), "123456789"),
        ("%lld", Arg::from(i64::MAX), "9223372036854775807"),
        ("%hd", Arg::from(32767i16), "32767"),
        ("%hhd", Arg::from(-1i8), "-1"),
        ("%zu", Arg::from(1024usize), "1024"),
        ("%llu", Arg::from(123_456_789u64), "123456789"),
    ];
    for (fmt, arg, expected) in cases {
        assert_eq!(fmt_narrow(fmt, &[*arg]), *expected, "{fmt}");
        assert_eq!(fmt_wide(fmt, &[*arg]), *expected, "wide {fmt}");
    }
}

#[test]
fn test_float_conversions() {
    let cases: &[(&str, f64, &str)] = &[
        ("%f", 3.14, "3.140000"),
        ("%.2f", 3.14159, "3.14"),
        ("%.2e", 3.14, "3.14e+00"),
        ("%.2E", 3.14, "3.14E+00"),
        ("%g", 3.14, "3.14"),
        ("%g", 0.00001, "1e-05"),
        ("%.2Lf", 3.14, "3.14"),
        ("%.0f", 3.7, "4"),
        ("%+.1f", 3.14, "+3.1"),
        ("%a", 1.0, "0x1p+0"),
        ("%A", -2.5, "-0X1.4P+1"),
        ("%.2a", 0.1, "0x1.9ap-4"),
    ];
    for (fmt, value, expected) in cases {
        assert_eq!(fmt_narrow(fmt, &[Arg::from(*value)]), *expected, "{fmt}");
        assert_eq!(fmt_wide(fmt, &[Arg::from(*value)]), *expected, "wide {fmt}");
    }
}

#[test]
fn test_strings_chars_and_pointers() {
    assert_eq!(fmt_narrow("%s", &[Arg::from("hello")]), "hello");
    assert_eq!(fmt_narrow("%.3s", &[Arg::from("hello")]), "hel");
    assert_eq!(fmt_narrow("%c", &[Arg::from('A')]), "A");
    assert_eq!(fmt_narrow("100%%", &[]), "100%");
    let x = 7u32;
    let pointer = fmt_narrow("%p", &[Arg::from(std::ptr::from_ref(&x))]);
    assert!(pointer.starts_with("0x"), "{pointer}");
}

#[test]
fn test_flags_width_precision() {
    assert_eq!(fmt_narrow("%-10d|", &[Arg::from(42)]), "42        |");
    assert_eq!(fmt_narrow("%010d", &[Arg::from(42)]), "0000000042");
    assert_eq!(fmt_narrow("%10d", &[Arg::from(42)]), "        42");
    assert_eq!(fmt_narrow("%*d", &[Arg::from(10), Arg::from(42)]), "        42");
    assert_eq!(fmt_narrow("%.5d", &[Arg::from(42)]), "00042");
    assert_eq!(fmt_narrow("%.*f", &[Arg::from(4), Arg::from(3.14159)]), "3.1416");
    assert_eq!(fmt_narrow("%+010.2f", &[Arg::from(3.14)]), "+000003.14");
    assert_eq!(fmt_narrow("%#012.5x", &[Arg::from(255)]), "     0x000ff");
    assert_eq!(fmt_narrow("% d", &[Arg::from(42)]), " 42");
    assert_eq!(
        fmt_narrow("%s is %d years old", &[Arg::from("Alice"), Arg::from(30)]),
        "Alice is 30 years old"
    );
}

#[test]
fn test_utf8_passthrough() {
    assert_eq!(fmt_narrow("%s", &[Arg::from("caf\u{e9}")]), "caf\u{e9}");
    assert_eq!(fmt_narrow("%s", &[Arg::from("\u{6f22}\u{5b57}")]), "\u{6f22}\u{5b57}");
}

#[test]
fn test_return_values() {
    let mut buf = [0u8; 64];
    assert_eq!(snprintf(Some(&mut buf), 64, Some("hello"), &[]).as_c_int(), 5);
    assert_eq!(snprintf(Some(&mut buf), 64, Some("%d"), &[Arg::from(42)]).as_c_int(), 2);
    assert_eq!(snprintf(Some(&mut buf), 64, Some("abc"), &[]).as_c_int(), 3);
    assert_eq!(snprintf(Some(&mut buf), 64, Some("%d"), &[Arg::from(12345)]).as_c_int(), 5);
    assert_eq!(snprintf(Some(&mut buf), 64, Some("%s"), &[Arg::from("")]).as_c_int(), 0);
}

#[test]
fn test_truncation_narrow() {
    let mut buf = [0xAAu8; 64];
    assert_eq!(snprintf(Some(&mut buf), 5, Some("%s"), &[Arg::from("hello world")]), Ok(11));
    assert_eq!(narrow_text(&buf), "hell");

    assert_eq!(snprintf(Some(&mut buf), 6, Some("%s"), &[Arg::from("hello")]), Ok(5));
    assert_eq!(narrow_text(&buf), "hello");

    assert_eq!(snprintf(Some(&mut buf), 1, Some("%s"), &[Arg::from("hello")]), Ok(5));
    assert_eq!(narrow_text(&buf), "");

    snprintf(Some(&mut buf), 5, Some("%s"), &[Arg::from("abcdefghij")]).unwrap();
    assert_eq!(buf[4], 0);
}

#[test]
fn test_truncation_stops_at_character_boundary() {
    let mut buf = [0xAAu8; 5];
    assert_eq!(snprintf(Some(&mut buf), 5, Some("caf\u{e9}!"), &[]), Ok(6));
    assert_eq!(&buf, b"caf\0\0");
    assert_eq!(narrow_text(&buf), "caf");

    let mut buf = [0xAAu8; 4];
    assert_eq!(snprintf(Some(&mut buf), 2, Some("%s"), &[Arg::from("\u{e9}")]), Ok(2));
    assert_eq!(&buf[..2], &[0, 0]);
    assert_eq!(&buf[2..], &[0xAA, 0xAA]);

    // A character that does not fit ends the output even if later ones would.
    let mut buf = [0xAAu8; 8];
    assert_eq!(snprintf(Some(&mut buf), 5, Some("ab\u{1F600}cd"), &[]), Ok(8));
    assert_eq!(narrow_text(&buf), "ab");
    assert_eq!(buf[4], 0);
}

#[test]
fn test_wide_truncation_keeps_surrogate_pairs_whole() {
    let fmt = wide("%s");
    let mut buf = [0xAAAAu16; 4];
    assert_eq!(snwprintf(Some(&mut buf), 2, Some(&fmt), &[Arg::from("\u{1F600}")]), Ok(2));
    assert_eq!(&buf[..2], &[0, 0]);
    assert!(Wide::decode(until_nul(&buf)).is_ok());

    let mut buf = [0xAAAAu16; 8];
    assert_eq!(snwprintf(Some(&mut buf), 4, Some(&fmt), &[Arg::from("x\u{1F600}")]), Ok(3));
    assert_eq!(from_wide(&buf), "x\u{1F600}");
    assert_eq!(buf[3], 0);

    assert_eq!(snwprintf(Some(&mut buf), 3, Some(&fmt), &[Arg::from("x\u{1F600}")]), Ok(3));
    assert_eq!(&buf[..3], &[u16::from(b'x'), 0, 0]);
}

#[test]
fn test_truncation_wide() {
    let mut buf = [0xAAAAu16; 64];
    let fmt = wide("%ls");
    let hello_world = wide("hello world");
    let hello = wide("hello");

    assert_eq!(snwprintf(Some(&mut buf), 5, Some(&fmt), &[Arg::from(hello_world.as_slice())]), Ok(11));
    assert_eq!(from_wide(&buf), "hell");

    assert_eq!(snwprintf(Some(&mut buf), 6, Some(&fmt), &[Arg::from(hello.as_slice())]), Ok(5));
    assert_eq!(from_wide(&buf), "hello");

    assert_eq!(snwprintf(Some(&mut buf), 1, Some(&fmt), &[Arg::from(hello.as_slice())]), Ok(5));
    assert_eq!(from_wide(&buf), "");
}

#[test]
fn test_null_and_zero_rejections() {
    init_test_logging();
    let mut nbuf = [0u8; 10];
    let mut wbuf = [0u16; 10];
    let hello = wide("hello");

    assert_eq!(snprintf(None, 10, Some("hello"), &[]).as_c_int(), FAILURE);
    assert_eq!(snprintf(Some(&mut nbuf), 0, Some("hello"), &[]).as_c_int(), FAILURE);
    assert_eq!(snprintf(Some(&mut nbuf), 10, None, &[]).as_c_int(), FAILURE);
    assert_eq!(snwprintf(None, 10, Some(&hello), &[]).as_c_int(), FAILURE);
    assert_eq!(snwprintf(Some(&mut wbuf), 0, Some(&hello), &[]).as_c_int(), FAILURE);
    assert_eq!(snwprintf(Some(&mut wbuf), 10, None, &[]).as_c_int(), FAILURE);

    assert_eq!(printf(None, &[]), Err(FormatError::NullFormat));
    assert_eq!(wprintf(None, &[]), Err(FormatError::NullFormat));
    assert_eq!(fprintf::<Vec<u8>>(None, Some("hello"), &[]), Err(FormatError::NullStream));
    assert_eq!(fprintf(Some(&mut Vec::<u8>::new()), None, &[]), Err(FormatError::NullFormat));
    assert_eq!(fwprintf::<Vec<u8>>(None, Some(&hello), &[]), Err(FormatError::NullStream));
}

#[test]
fn test_streams() {
    let mut out: Vec<u8> = Vec::new();
    assert_eq!(fprintf(Some(&mut out), Some("[%5s]"), &[Arg::from("ok")]), Ok(7));
    let fmt = wide(" %d\u{1F600}");
    assert_eq!(fwprintf(Some(&mut out), Some(&fmt), &[Arg::from(1)]), Ok(4));
    assert_eq!(String::from_utf8(out).unwrap(), "[   ok] 1\u{1F600}");
}

#[test]
fn test_stdout() {
    assert_eq!(printf(Some(""), &[]), Ok(0));
    let fmt = wide("");
    assert_eq!(wprintf(Some(&fmt), &[]), Ok(0));
}

#[test]
fn test_sprintf_compat() {
    let mut buf = [0u8; 32];
    assert_eq!(sprintf(Some(&mut buf), Some("%s-%d"), &[Arg::from("a"), Arg::from(1)]), Ok(3));
    assert_eq!(narrow_text(&buf), "a-1");

    let mut wbuf = [0u16; 32];
    let fmt = wide("%c%c");
    assert_eq!(swprintf(Some(&mut wbuf), Some(&fmt), &[Arg::from('o'), Arg::from('k')]), Ok(2));
    assert_eq!(from_wide(&wbuf), "ok");
}

#[test]
fn test_custom_limits() {
    let limits = Limits::new().max_width(10).max_precision(2);
    let narrow = Formatter::<Narrow>::with_limits(limits);
    let wide_formatter = Formatter::<Wide>::with_limits(limits);
    assert_eq!(narrow.limits(), &limits);

    assert_eq!(narrow.format_to_string(Some(b"%10d"), &[Arg::from(1)]).unwrap().len(), 10);
    assert!(narrow.format_to_string(Some(b"%11d"), &[Arg::from(1)]).is_err());
    assert!(narrow.format_to_string(Some(b"%.3f"), &[Arg::from(1.0)]).is_err());
    let fmt = wide("%.3f");
    assert!(wide_formatter.format_to_string(Some(&fmt), &[Arg::from(1.0)]).is_err());
}

#[test]
fn test_argument_errors_leave_buffer_untouched() {
    let mut buf = [0x55u8; 16];
    assert_eq!(
        snprintf(Some(&mut buf), 16, Some("%d %d"), &[Arg::from(1)]),
        Err(FormatError::MissingArgument(1))
    );
    assert_eq!(
        snprintf(Some(&mut buf), 16, Some("%s"), &[Arg::from(1)]),
        Err(FormatError::ArgumentMismatch {
            index: 0,
            conversion: 's'
        })
    );
    assert_eq!(
        snprintf(Some(&mut buf), 16, Some("%y"), &[]),
        Err(FormatError::UnsupportedConversion('y'))
    );
    assert!(buf.iter().all(|&b| b == 0x55));
}

#[test]
fn test_repeated_calls_are_identical() {
    let args = [Arg::from("x"), Arg::from(3.5), Arg::from(-2)];
    let first = fmt_narrow("%s|%8.3f|%+d", &args);
    for _ in 0..5 {
        assert_eq!(fmt_narrow("%s|%8.3f|%+d", &args), first);
    }
}
