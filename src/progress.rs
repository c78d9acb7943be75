//! Spinners and a log writer that prints above them.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

static MULTI_PROGRESS: OnceLock<MultiProgress> = OnceLock::new();

fn multi_progress() -> &'static MultiProgress {
    MULTI_PROGRESS.get_or_init(|| {
        let mp = MultiProgress::new();
        mp.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
        mp
    })
}

/// Start a ticking spinner showing `message`.
///
/// Call `finish_and_clear` (or `finish_with_message`) when done.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let bar = multi_progress().add(ProgressBar::new_spinner());
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.into());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// Print a line without tearing an active spinner.
pub fn println(line: impl AsRef<str>) {
    let _ = multi_progress().println(line.as_ref());
}

#[derive(Default, Clone)]
pub struct LogWriterFactory;

/// Buffers one tracing event and emits it line by line
pub struct LogWriter {
    pending: String,
}

impl LogWriter {
    fn emit_complete_lines(&mut self) {
        while let Some(end) = self.pending.find('\n') {
            let line = self.pending[..end].trim_end_matches('\r').to_string();
            println(line);
            self.pending.drain(..=end);
        }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.push_str(&String::from_utf8_lossy(buf));
        self.emit_complete_lines();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit_complete_lines();
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            println(rest.trim_end_matches('\r'));
        }
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl<'a> MakeWriter<'a> for LogWriterFactory {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            pending: String::new(),
        }
    }
}
