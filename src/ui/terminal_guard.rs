//! Raw-mode screen ownership for the wizard

use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

/// Holds the terminal in raw mode on the alternate screen.
///
/// The shell's screen comes back when the guard is dropped, whether the
/// wizard quit normally or bailed out with an error. Panics are covered
/// separately by [`install_panic_hook`].
pub struct TerminalGuard {
    restored: AtomicBool,
}

impl TerminalGuard {
    pub fn new() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        execute!(io::stdout(), EnterAlternateScreen)
            .context("Failed to enter alternate screen")?;
        Ok(Self::holding())
    }

    fn holding() -> Self {
        Self {
            restored: AtomicBool::new(false),
        }
    }

    /// Give the screen back. Only the first call does anything.
    pub fn restore(&self) -> bool {
        let first = !self.restored.swap(true, Ordering::SeqCst);
        if first {
            restore_terminal();
        }
        first
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Leave raw mode and the alternate screen; errors are swallowed since
/// there is nowhere left to report them
fn restore_terminal() {
    let mut out = io::stdout();
    let _ = disable_raw_mode();
    let _ = execute!(out, LeaveAlternateScreen, Show);
    let _ = out.flush();
}

/// Chain a panic hook that hands the screen back before the report prints
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        previous(info);
    }));
}
