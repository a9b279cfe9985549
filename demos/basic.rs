//! Basic usage: narrow and wide formatting plus true-color output.
//!
//! Run with: `cargo run --example basic`

use log::LevelFilter;
use uprintf::ansi::{self, Attributes, RESET};
use uprintf::encoding::{from_wide, until_nul, wide};
use uprintf::logging::ColorLogger;
use uprintf::{Arg, FormatError, printf, snprintf, snwprintf, terminal};

fn main() -> Result<(), FormatError> {
    terminal::init();
    let _ = ColorLogger::new().level(LevelFilter::Debug).init();

    printf(Some("=== Narrow ===\n"), &[])?;
    printf(Some("String:  %s\n"), &[Arg::from("hello world")])?;
    printf(Some("Integer: %d\n"), &[Arg::from(42)])?;
    printf(Some("Hex:     %#x\n"), &[Arg::from(255)])?;
    printf(Some("Float:   %.2f\n"), &[Arg::from(std::f64::consts::PI)])?;
    printf(Some("Padded:  [%20s]\n"), &[Arg::from("right-aligned")])?;
    printf(Some("Padded:  [%-20s]\n"), &[Arg::from("left-aligned")])?;
    printf(Some("Percent: 100%%\n\n"), &[])?;

    let mut nbuf = [0u8; 256];
    let nbuf_len = nbuf.len();
    snprintf(Some(&mut nbuf), nbuf_len, Some("%s is %d years old"), &[Arg::from("Alice"), Arg::from(30)])?;
    let text = until_nul(&nbuf);
    printf(Some("Buffer:  %s\n"), &[Arg::from(&*String::from_utf8_lossy(text))])?;

    let mut tiny = [0u8; 8];
    let tiny_len = tiny.len();
    let needed = snprintf(Some(&mut tiny), tiny_len, Some("%s"), &[Arg::from("truncated output")])?;
    printf(
        Some("Tiny:    needed %zu, kept \"%s\"\n\n"),
        &[Arg::from(needed), Arg::from(&*String::from_utf8_lossy(until_nul(&tiny)))],
    )?;

    printf(Some("=== Wide ===\n"), &[])?;
    let name = wide("Alice");
    let fmt = wide("%ls is %d years old");
    let mut wbuf = [0u16; 256];
    let wbuf_len = wbuf.len();
    snwprintf(Some(&mut wbuf), wbuf_len, Some(&fmt), &[Arg::from(name.as_slice()), Arg::from(30)])?;
    printf(Some("Wide:    %s\n\n"), &[Arg::from(from_wide(&wbuf).as_str())])?;

    printf(Some("=== Color ===\n"), &[])?;
    for (label, seq) in [
        ("rgb", ansi::fg_rgb(255, 99, 71)),
        ("hex", ansi::fg_hex("#1e90ff")),
        ("hsl", ansi::fg_hsl(120.0, 0.6, 0.5)),
        ("oklch", ansi::fg_oklch(0.7, 0.15, 300.0)),
        ("css", ansi::fg_css("gold")),
    ] {
        printf(Some("%s%-6s%s sample\n"), &[Arg::from(seq.as_str()), Arg::from(label), Arg::from(RESET)])?;
    }
    let bold = ansi::style(Attributes::BOLD | Attributes::UNDERLINE);
    printf(
        Some("%s%sbold underline on navy%s\n"),
        &[Arg::from(bold.as_str()), Arg::from(ansi::bg_css("navy").as_str()), Arg::from(RESET)],
    )?;

    // Rejected: logged as a warning and nothing is printed.
    if let Err(err) = printf(Some("count%n\n"), &[]) {
        printf(Some("\nRejected: %s\n"), &[Arg::from(err.to_string().as_str())])?;
    }
    Ok(())
}
