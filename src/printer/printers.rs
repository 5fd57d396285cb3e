// src/printer/printers.rs

//! Specialized printer struct [`ConsolePrinter`] for the operator console:
//! status lines, echoed device traffic, per-record confirmations, and the
//! final count.
//!
//! [`ConsolePrinter`]: self::ConsolePrinter

use crate::common::{Count, FPath};
use crate::debug::printers::de_err;
use crate::device::discovery::PortDescriptor;
use crate::readers::summary::SummarySession;
use crate::sinks::csvsink::StoreInit;
use crate::sinks::remote::ForwardError;

use std::io::{Error, Write};

#[doc(hidden)]
pub use ::termcolor::{Color, ColorChoice, ColorSpec, NoColor, StandardStream, WriteColor};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// globals and constants
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// [`Color`] for printing successes.
///
/// [`Color`]: https://docs.rs/termcolor/1.4.1/termcolor/enum.Color.html
pub const COLOR_OK: Color = Color::Green;

/// [`Color`] for printing failures.
pub const COLOR_ERROR: Color = Color::Red;

/// [`Color`] for printing remote forwarding activity.
pub const COLOR_REMOTE: Color = Color::Cyan;

pub const MARK_OK: &str = "✓";
pub const MARK_ERROR: &str = "✗";
pub const MARK_REMOTE: &str = "↳";

/// Width of banner rules.
pub const RULE_WIDTH: usize = 60;

/// Program title printed in the banner.
pub const TITLE: &str = "SmartAttend - Attendance Data Logger";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ConsolePrinter
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Prints operator-facing text to `W`.
///
/// Write errors are not propagated; a console that went away must not stop
/// records from being persisted.
pub struct ConsolePrinter<W: WriteColor> {
    out: W,
}

/// A `ConsolePrinter` to STDOUT.
pub type ConsolePrinterStdout = ConsolePrinter<StandardStream>;

impl ConsolePrinter<StandardStream> {
    pub fn stdout(color_choice: ColorChoice) -> ConsolePrinterStdout {
        ConsolePrinter::new(StandardStream::stdout(color_choice))
    }
}

impl<W: WriteColor> ConsolePrinter<W> {
    pub fn new(out: W) -> ConsolePrinter<W> {
        ConsolePrinter { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_result(
        &mut self,
        color: Option<Color>,
        text: &str,
    ) -> std::result::Result<(), Error> {
        if let Some(color) = color {
            self.out.set_color(ColorSpec::new().set_fg(Some(color)))?;
            self.out.write_all(text.as_bytes())?;
            self.out.reset()?;
        } else {
            self.out.write_all(text.as_bytes())?;
        }

        Ok(())
    }

    /// Write `text` in `color`, or the default color if `None`.
    fn write(
        &mut self,
        color: Option<Color>,
        text: &str,
    ) {
        if let Err(_err) = self.write_result(color, text) {
            // XXX: a truncated stdout, e.g. `attendlog | head`, lands here
            de_err!("write {} bytes error {}", text.len(), _err);
        }
    }

    /// Write `text` and a newline, then flush.
    fn line(
        &mut self,
        color: Option<Color>,
        text: &str,
    ) {
        self.write(color, text);
        self.write(None, "\n");
        if let Err(_err) = self.out.flush() {
            de_err!("flush error {}", _err);
        }
    }

    /// `<indent><mark> <text>` where only the mark is colored.
    fn marked(
        &mut self,
        indent: &str,
        color: Color,
        mark: &str,
        text: &str,
    ) {
        self.write(None, indent);
        self.write(Some(color), mark);
        self.line(None, &format!(" {}", text));
    }

    pub fn blank(&mut self) {
        self.line(None, "");
    }

    fn rule(
        &mut self,
        c: char,
    ) {
        let rule: String = std::iter::repeat(c).take(RULE_WIDTH).collect();
        self.line(None, &rule);
    }

    fn framed(
        &mut self,
        texts: &[&str],
    ) {
        self.rule('=');
        for text in texts {
            self.line(None, &format!("  {}", text));
        }
        self.rule('=');
    }

    pub fn banner(&mut self) {
        self.framed(&[TITLE]);
        self.blank();
    }

    pub fn searching(&mut self) {
        self.line(None, "Searching for device...");
    }

    pub fn found(
        &mut self,
        port: &PortDescriptor,
    ) {
        self.marked("", COLOR_OK, MARK_OK, &format!("Found device on port: {}", port.device));
    }

    /// Listing of `ports` for the operator after no device matched.
    pub fn not_found(
        &mut self,
        ports: &[PortDescriptor],
    ) {
        self.marked("", COLOR_ERROR, MARK_ERROR, "Device not found!");
        self.blank();
        self.line(None, "Available ports:");
        if ports.is_empty() {
            self.line(None, "  (none)");
        }
        for port in ports {
            self.line(None, &format!("  - {}", port));
        }
        self.blank();
        self.line(None, "Please connect the device and try again.");
    }

    pub fn ports(
        &mut self,
        ports: &[PortDescriptor],
    ) {
        for port in ports {
            self.line(None, &port.to_string());
        }
    }

    pub fn store_initialized(
        &mut self,
        init: StoreInit,
        path: &FPath,
    ) {
        match init {
            StoreInit::Created => {
                self.marked("", COLOR_OK, MARK_OK, &format!("Created new CSV file: {}", path));
            }
            StoreInit::Existing => {
                self.marked("", COLOR_OK, MARK_OK, &format!("Using existing CSV file: {}", path));
            }
        }
    }

    pub fn starting(&mut self) {
        self.blank();
        self.framed(&["Starting attendance logging...", "Press Ctrl+C to stop"]);
        self.blank();
    }

    /// The session is running; `remote_target` is `Some` if forwarding is
    /// enabled.
    pub fn connected(
        &mut self,
        store_path: &FPath,
        remote_target: Option<&str>,
    ) {
        self.marked("", COLOR_OK, MARK_OK, "Connected to device");
        self.marked("", COLOR_OK, MARK_OK, &format!("Logging to: {}", store_path));
        if let Some(target) = remote_target {
            self.marked("", COLOR_OK, MARK_OK, &format!("Remote forwarding: Enabled ({})", target));
        }
        self.blank();
        self.rule('-');
        self.blank();
    }

    /// Echo a raw line from the device.
    pub fn echo(
        &mut self,
        line: &str,
    ) {
        self.line(None, line);
    }

    pub fn saved(
        &mut self,
        total: Count,
    ) {
        self.marked("  ", COLOR_OK, MARK_OK, &format!("Saved to CSV (Total: {})", total));
    }

    pub fn save_failed(
        &mut self,
        err: &Error,
    ) {
        self.marked("", COLOR_ERROR, MARK_ERROR, &format!("Error saving to CSV: {}", err));
    }

    pub fn forwarded(&mut self) {
        self.marked("  ", COLOR_REMOTE, MARK_REMOTE, "Uploaded to spreadsheet");
    }

    pub fn forward_failed(
        &mut self,
        err: &ForwardError,
    ) {
        self.marked("  ", COLOR_ERROR, MARK_ERROR, &format!("Spreadsheet upload failed: {}", err));
    }

    /// Final count after an operator interrupt.
    pub fn stopped(
        &mut self,
        total: Count,
    ) {
        self.blank();
        self.blank();
        let msg: String = format!("Logging stopped. Total attendance recorded: {}", total);
        self.framed(&[msg.as_str()]);
    }

    /// Detailed statistics, for CLI option `--summary`.
    pub fn summary(
        &mut self,
        summary: &SummarySession,
    ) {
        self.line(None, "Summary:");
        self.line(None, &summary.to_string());
    }

    /// The device channel failed; the session has stopped.
    pub fn channel_failed(
        &mut self,
        err: &Error,
    ) {
        self.blank();
        self.marked("", COLOR_ERROR, MARK_ERROR, &format!("Device connection lost: {}", err));
    }
}
