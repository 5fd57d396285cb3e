// src/session.rs

//! Implements the [`Session`], the loop driving raw lines from the device
//! channel through the [`LineReader`], the Line Parser, and the sinks.
//!
//! A `Session` advances through [`SessionState`]s:
//!
//! ```text
//! Searching → Connected → Running → Stopped
//! ```
//!
//! `Searching` is done by the driver program with [`select_port`] before a
//! `Session` exists. A `Session` is created `Connected` with an open
//! channel. It becomes `Running` only after the persistent store is
//! initialized. It becomes `Stopped` on operator interrupt or an
//! unrecoverable channel error, at which point the channel is released.
//!
//! Single-threaded. The only blocking call is the channel `read`, bounded by
//! the channel's timeout, so an interrupt is noticed within one timeout.
//!
//! [`LineReader`]: crate::readers::linereader::LineReader
//! [`select_port`]: crate::device::discovery::select_port

use crate::common::Count;
use crate::config::Config;
use crate::data::datetime::Clock;
use crate::data::record::AttendanceRecord;
#[allow(unused_imports)]
use crate::debug::printers::{de_err, de_wrn, str_to_String_noraw};
use crate::printer::printers::ConsolePrinter;
use crate::readers::linereader::{LineReader, ResultS3LineRead};
use crate::readers::recordparser::{is_record_line, parse_record};
use crate::readers::summary::SummarySession;
use crate::sinks::csvsink::{CsvSink, StoreInit};
use crate::sinks::remote::{ForwardResult, RemoteSink};

use std::io::{Error, ErrorKind, Read, Result};
use std::sync::atomic::{AtomicBool, Ordering};

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};
use ::termcolor::WriteColor;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Lifecycle of a logging session.
///
/// A [`Session`] is only ever `Connected`, `Running`, or `Stopped`.
/// `Searching` is the driver program's phase before a `Session` exists;
/// see [`select_port`].
///
/// [`select_port`]: crate::device::discovery::select_port
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionState {
    /// The driver program is looking for the device. Never held by a
    /// `Session`.
    Searching,
    /// The channel is open; the persistent store is not yet initialized.
    Connected,
    /// Lines are being read and records persisted.
    Running,
    /// The channel has been released.
    Stopped,
}

/// Why a [`Session::run`] returned.
#[derive(Debug)]
pub enum SessionEnd {
    /// The operator interrupted the session. A clean shutdown.
    Interrupted,
    /// The persistent store could not be initialized; the session never ran.
    StoreError(Error),
    /// The device channel failed, e.g. the device was unplugged.
    ChannelError(Error),
}

impl SessionEnd {
    /// Process exit status for this ending.
    pub const fn is_success(&self) -> bool {
        matches!(self, SessionEnd::Interrupted)
    }
}

/// What [`Session::process_line`] did with one raw line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineOutcome {
    /// Empty line; ignored.
    Empty,
    /// Echoed; not a record line.
    Echoed,
    /// Record line that failed to parse; echoed only.
    Rejected,
    /// Record appended to the persistent store.
    Persisted,
    /// Record failed to append to the persistent store.
    PersistFailed,
}

/// Returned by [`Session::run`]; the channel has been released.
pub struct SessionReport<W: WriteColor> {
    pub end: SessionEnd,
    pub summary: SummarySession,
    pub printer: ConsolePrinter<W>,
}

/// One logging session over device channel `R`, printing to `W`.
pub struct Session<'a, R: Read, W: WriteColor> {
    config: &'a Config,
    state: SessionState,
    /// `None` once the channel is released
    linereader: Option<LineReader<R>>,
    clock: &'a dyn Clock,
    store: CsvSink,
    remote: RemoteSink,
    printer: ConsolePrinter<W>,
    summary: SummarySession,
}

impl<'a, R: Read, W: WriteColor> Session<'a, R, W> {
    /// Create a `Connected` session owning the opened `channel`.
    pub fn new(
        config: &'a Config,
        channel: R,
        clock: &'a dyn Clock,
        remote: RemoteSink,
        printer: ConsolePrinter<W>,
    ) -> Session<'a, R, W> {
        defñ!("store {:?}, remote {:?}", config.store_path, remote);

        Session {
            config,
            state: SessionState::Connected,
            linereader: Some(LineReader::new(channel)),
            clock,
            store: CsvSink::new(&config.store_path),
            remote,
            printer,
            summary: SummarySession::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The Session Counter; count of records persisted so far.
    pub fn count(&self) -> Count {
        self.summary.count()
    }

    pub fn summary(&self) -> &SummarySession {
        &self.summary
    }

    /// Initialize the persistent store and become `Running`.
    ///
    /// Only valid while `Connected`.
    pub fn start(&mut self) -> Result<StoreInit> {
        defn!();
        if self.state != SessionState::Connected {
            defx!("state {:?}", self.state);
            return Err(Error::new(
                ErrorKind::Other,
                format!("session cannot start from state {:?}", self.state),
            ));
        }
        let init: StoreInit = self.store.ensure_initialized()?;
        self.printer.store_initialized(init, self.store.path());
        self.printer.starting();
        let target: Option<String> = match &self.remote {
            RemoteSink::Enabled { client } => Some(client.target()),
            RemoteSink::Disabled => None,
        };
        self.printer.connected(&self.config.store_path, target.as_deref());
        self.state = SessionState::Running;
        defx!("{:?}", init);

        Ok(init)
    }

    /// Handle one decoded, trimmed raw line.
    ///
    /// Non-empty lines are echoed. Record lines are parsed; an accepted
    /// record is appended to the store and then handed to the remote sink.
    pub fn process_line(
        &mut self,
        line: &str,
    ) -> LineOutcome {
        if line.is_empty() {
            return LineOutcome::Empty;
        }
        self.printer.echo(line);
        self.summary.Session_lines_echoed += 1;
        if !is_record_line(line) {
            return LineOutcome::Echoed;
        }
        self.summary.Session_lines_tagged += 1;
        let record: AttendanceRecord = match parse_record(line, self.clock) {
            Some(record) => record,
            None => {
                self.summary.Session_records_rejected += 1;
                return LineOutcome::Rejected;
            }
        };
        defo!("record {:?}", record);

        let outcome: LineOutcome = match self.store.append(&record) {
            Ok(()) => {
                self.summary.Session_records_persisted += 1;
                self.printer.saved(self.summary.count());
                LineOutcome::Persisted
            }
            Err(err) => {
                self.summary.Session_persist_failures += 1;
                self.printer.save_failed(&err);
                LineOutcome::PersistFailed
            }
        };
        match self.remote.forward(&record) {
            ForwardResult::Forwarded => {
                self.summary.Session_records_forwarded += 1;
                self.printer.forwarded();
            }
            ForwardResult::Skipped => {}
            ForwardResult::Failed(err) => {
                self.summary.Session_forward_failures += 1;
                self.printer.forward_failed(&err);
            }
        }
        self.printer.blank();

        outcome
    }

    /// Release the channel and become `Stopped`.
    fn release(&mut self) {
        if let Some(linereader) = self.linereader.take() {
            self.summary.linereader = linereader.summary();
            defo!("release channel; {} bytes pending dropped", linereader.pending_len());
            drop(linereader);
        }
        self.state = SessionState::Stopped;
    }

    /// Read and process lines until `exit_early` is set or the channel fails.
    ///
    /// Starts the session first if still `Connected`. The channel is released
    /// on every return path.
    pub fn run(
        mut self,
        exit_early: &AtomicBool,
    ) -> SessionReport<W> {
        defn!();
        if self.state == SessionState::Connected {
            if let Err(err) = self.start() {
                self.release();
                defx!("start failed {:?}", err);
                return self.report(SessionEnd::StoreError(err));
            }
        }
        let mut linereader: LineReader<R> = match self.linereader.take() {
            Some(linereader) => linereader,
            None => {
                self.release();
                let err = Error::new(ErrorKind::NotConnected, "device channel already released");
                defx!("{:?}", err);
                return self.report(SessionEnd::ChannelError(err));
            }
        };

        let end: SessionEnd = loop {
            if exit_early.load(Ordering::SeqCst) {
                defo!("exit_early");
                break SessionEnd::Interrupted;
            }
            match linereader.read_line() {
                ResultS3LineRead::Found(line) => {
                    self.process_line(&line);
                }
                ResultS3LineRead::Done => {}
                ResultS3LineRead::Err(err) => {
                    defo!("channel error {:?}", err);
                    break SessionEnd::ChannelError(err);
                }
            }
        };
        self.linereader = Some(linereader);
        self.release();

        match &end {
            SessionEnd::Interrupted => self.printer.stopped(self.summary.count()),
            SessionEnd::ChannelError(err) => self.printer.channel_failed(err),
            // returned before the loop
            SessionEnd::StoreError(_) => {}
        }
        defx!("{:?}", end);

        self.report(end)
    }

    fn report(
        self,
        end: SessionEnd,
    ) -> SessionReport<W> {
        SessionReport {
            end,
            summary: self.summary,
            printer: self.printer,
        }
    }
}
