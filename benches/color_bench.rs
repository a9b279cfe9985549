//! Benchmarks for uprintf color sequences and bounded formatting.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use uprintf::ansi;
use uprintf::color::{ColorTriplet, hex_to_rgb, oklch_to_rgb};
use uprintf::encoding::wide;
use uprintf::named;
use uprintf::{Arg, snprintf, snwprintf};

fn benchmark_rgb(c: &mut Criterion) {
    c.bench_function("fg_rgb", |b| {
        b.iter(|| black_box(ansi::fg_rgb(black_box(255), black_box(99), black_box(71))));
    });

    c.bench_function("wfg_rgb", |b| {
        b.iter(|| black_box(ansi::wfg_rgb(black_box(255), black_box(99), black_box(71))));
    });
}

fn benchmark_conversions(c: &mut Criterion) {
    c.bench_function("hex_to_rgb", |b| {
        b.iter(|| black_box(hex_to_rgb(black_box("#ff6347"))));
    });

    c.bench_function("hsl_to_rgb", |b| {
        b.iter(|| black_box(ansi::fg_hsl(black_box(210.0), black_box(0.6), black_box(0.4))));
    });

    c.bench_function("oklch_to_rgb", |b| {
        b.iter(|| black_box(oklch_to_rgb(black_box(0.63), black_box(0.26), black_box(29.0))));
    });
}

fn benchmark_css_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("css_lookup");
    for name in ["aliceblue", "MediumSeaGreen", "yellowgreen", "notacolor"] {
        group.bench_with_input(BenchmarkId::from_parameter(name), name, |b, name| {
            b.iter(|| black_box(named::lookup(black_box(name))));
        });
    }
    group.finish();
}

fn benchmark_snprintf(c: &mut Criterion) {
    let red = ansi::fg_rgb(255, 0, 0);
    let mut buf = [0u8; 256];

    c.bench_function("snprintf_mixed", |b| {
        b.iter(|| {
            black_box(snprintf(
                Some(&mut buf),
                256,
                Some("%s%-8s|%08.3f|%#x%s"),
                &[
                    Arg::from(red.as_str()),
                    Arg::from("label"),
                    Arg::from(std::f64::consts::PI),
                    Arg::from(48_879),
                    Arg::from(ansi::RESET),
                ],
            ))
        });
    });

    c.bench_function("snprintf_truncated", |b| {
        let long = "x".repeat(1024);
        b.iter(|| black_box(snprintf(Some(&mut buf), 16, Some("%s"), &[Arg::from(long.as_str())])));
    });

    let fmt = wide("%s=%d");
    let mut wbuf = [0u16; 128];
    c.bench_function("snwprintf", |b| {
        b.iter(|| {
            black_box(snwprintf(
                Some(&mut wbuf),
                128,
                Some(&fmt),
                &[Arg::from("name"), Arg::from(-42)],
            ))
        });
    });
}

fn benchmark_hex_string(c: &mut Criterion) {
    let color = ColorTriplet::new(100, 149, 237);
    c.bench_function("triplet_hex", |b| b.iter(|| black_box(color.hex())));
}

criterion_group!(
    benches,
    benchmark_rgb,
    benchmark_conversions,
    benchmark_css_lookup,
    benchmark_snprintf,
    benchmark_hex_string,
);
criterion_main!(benches);
