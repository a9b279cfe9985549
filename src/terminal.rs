//! One-time console setup and the color on/off decision for log output.
//!
//! [`init`] is the setup an application performs before writing escape
//! sequences. On Windows it switches the console into virtual-terminal
//! mode; elsewhere terminals already interpret them.

use std::io::IsTerminal;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

static INIT: Once = Once::new();
static VT_ENABLED: AtomicBool = AtomicBool::new(false);

/// Prepare the console for escape sequences.
///
/// Safe to call any number of times from any thread; only the first call
/// does work. Returns whether the console interprets escape sequences.
pub fn init() -> bool {
    INIT.call_once(|| {
        let enabled = enable_virtual_terminal();
        VT_ENABLED.store(enabled, Ordering::Release);
        log::debug!("terminal init: escape sequences enabled = {enabled}");
    });
    VT_ENABLED.load(Ordering::Acquire)
}

#[cfg(windows)]
fn enable_virtual_terminal() -> bool {
    // Also turns on ENABLE_VIRTUAL_TERMINAL_PROCESSING when available.
    crossterm::ansi_support::supports_ansi()
}

#[cfg(not(windows))]
fn enable_virtual_terminal() -> bool {
    true
}

/// The environment variables that decide whether to color output.
#[derive(Debug, Default)]
struct ColorEnv {
    no_color: Option<String>,
    force_color: Option<String>,
    term: Option<String>,
}

impl ColorEnv {
    fn read() -> Self {
        Self {
            no_color: std::env::var("NO_COLOR").ok(),
            force_color: std::env::var("FORCE_COLOR").ok(),
            term: std::env::var("TERM").ok(),
        }
    }

    /// `NO_COLOR` wins, then `FORCE_COLOR`, then a `dumb` terminal, then
    /// whether the stream is a terminal at all.
    fn wants_color(&self, is_tty: bool) -> bool {
        let set = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .is_some_and(|v| !v.is_empty() && v != "0")
        };
        // https://no-color.org/ : any non-empty value disables color.
        if self.no_color.as_deref().is_some_and(|v| !v.is_empty()) {
            return false;
        }
        if set(&self.force_color) {
            return true;
        }
        if self
            .term
            .as_deref()
            .is_some_and(|term| term.trim().eq_ignore_ascii_case("dumb"))
        {
            return false;
        }
        is_tty
    }
}

/// Whether log lines written to stderr should carry color sequences.
///
/// Colors are only emitted once [`init`] reports that the console
/// interprets them.
#[must_use]
pub fn stderr_wants_color() -> bool {
    ColorEnv::read().wants_color(std::io::stderr().is_terminal()) && init()
}
