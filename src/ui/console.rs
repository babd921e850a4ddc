/// Terminal notification surface
///
/// Status messages are single colored lines on stderr. Alerts are framed and,
/// in interactive mode, block until the user presses Enter.
use crate::error::Notifier;
use anyhow::Context;
use colored::{Color, Colorize};
use std::io::{self, BufRead, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

const ALERT_RULE: &str = "════════════════════════════════════════";

pub struct ConsoleNotifier {
    out: Mutex<Box<dyn Write + Send>>,
    input: Mutex<Box<dyn BufRead + Send>>,
    interactive: bool,
    color: bool,
}

impl ConsoleNotifier {
    /// Notifier on the process's stderr/stdin
    pub fn new(interactive: bool) -> Self {
        Self::with_io(
            Box::new(io::stderr()),
            Box::new(io::BufReader::new(io::stdin())),
            interactive,
        )
        .with_color(cfg!(feature = "color-output"))
    }

    /// Notifier over arbitrary streams, without color
    pub fn with_io(
        out: Box<dyn Write + Send>,
        input: Box<dyn BufRead + Send>,
        interactive: bool,
    ) -> Self {
        Self {
            out: Mutex::new(out),
            input: Mutex::new(input),
            interactive,
            color: false,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.color(color).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn out(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        self.out.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Notifier for ConsoleNotifier {
    fn status(&self, message: &str) -> anyhow::Result<()> {
        let color = if message.starts_with("Warning") {
            Color::Yellow
        } else {
            Color::Red
        };
        let line = self.paint(message, color);

        let mut out = self.out();
        writeln!(out, "{}", line).context("writing status message")?;
        out.flush().context("flushing status message")?;
        Ok(())
    }

    fn alert(&self, message: &str) -> anyhow::Result<()> {
        {
            let mut out = self.out();
            writeln!(out, "{}", self.paint(ALERT_RULE, Color::Red))?;
            for line in message.lines() {
                writeln!(out, "  {}", line)?;
            }
            writeln!(out, "{}", self.paint(ALERT_RULE, Color::Red))?;
            if self.interactive {
                write!(out, "Press Enter to continue...")?;
            }
            out.flush().context("flushing alert")?;
        }

        if self.interactive {
            let mut acknowledged = String::new();
            self.input
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .read_line(&mut acknowledged)
                .context("waiting for alert acknowledgement")?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ConsoleNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleNotifier")
            .field("interactive", &self.interactive)
            .field("color", &self.color)
            .finish()
    }
}
