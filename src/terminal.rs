use anyhow::Context;
use crossterm::{
    cursor,
    terminal::{self, ClearType},
    ExecutableCommand,
};
use std::io::{stdout, Stdout, Write};

/// Raw mode + alternate screen for the lifetime of the guard.
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn new() -> anyhow::Result<Self> {
        terminal::enable_raw_mode().context("enable raw mode")?;
        // Build the guard first so Drop undoes raw mode if a later step fails.
        let guard = Self { _private: () };

        let mut out = stdout();
        out.execute(terminal::EnterAlternateScreen)
            .context("enter alternate screen")?;
        out.execute(terminal::Clear(ClearType::All))
            .context("clear screen")?;
        out.execute(cursor::Hide).context("hide cursor")?;

        Ok(guard)
    }

    pub fn stdout() -> Stdout {
        stdout()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let mut out = stdout();
        // Undo sync output, autowrap and colours in case a frame was cut short.
        let _ = out.write_all(b"\x1b[?2026l\x1b[?7h\x1b[0m");
        let _ = out.flush();
        let _ = out.execute(cursor::Show);
        let _ = out.execute(terminal::LeaveAlternateScreen);
    }
}

/// Cell grid plus the window's pixel size when the terminal reports one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TermMetrics {
    pub cols: u16,
    pub rows: u16,
    pub pixel_size: Option<(u16, u16)>,
}

impl TermMetrics {
    pub fn query() -> anyhow::Result<Self> {
        let (cols, rows) = terminal::size().context("get terminal size")?;
        let pixel_size = terminal::window_size()
            .ok()
            .filter(|ws| ws.width > 0 && ws.height > 0)
            .map(|ws| (ws.width, ws.height));
        Ok(Self {
            cols,
            rows,
            pixel_size,
        })
    }
}
