// src/tests/common.rs

//! Common helpers for tests: a scripted device channel, fake forwarders,
//! and a `ConsolePrinter` printing into memory.

use crate::common::FPath;
use crate::config::Config;
use crate::data::datetime::FixedClock;
use crate::data::record::RECORD_COLUMNS;
use crate::printer::printers::{ConsolePrinter, NoColor};
use crate::sinks::remote::{ForwardError, RowForwarder};

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{Error, ErrorKind, Read, Result};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One step of a [`ScriptedChannel`]; each `read` consumes one step.
#[derive(Clone, Debug)]
pub enum Step {
    /// Bytes available; a `read` with a smaller buffer leaves the remainder
    /// for the next `read`.
    Data(Vec<u8>),
    /// The read timed out.
    Timeout,
    /// The read failed.
    Fail(ErrorKind),
    /// The read returned 0 bytes.
    Closed,
}

/// An in-memory device channel.
///
/// Once the script is exhausted, every `read` sets `exit_early`, as if the
/// operator pressed Ctrl+C, and times out.
pub struct ScriptedChannel {
    steps: VecDeque<Step>,
    exit_early: Arc<AtomicBool>,
    released: Arc<AtomicBool>,
}

impl ScriptedChannel {
    pub fn new(
        steps: Vec<Step>,
        exit_early: &Arc<AtomicBool>,
        released: &Arc<AtomicBool>,
    ) -> ScriptedChannel {
        ScriptedChannel {
            steps: VecDeque::from(steps),
            exit_early: exit_early.clone(),
            released: released.clone(),
        }
    }

    /// A channel that never interrupts and whose release is not observed.
    pub fn from_steps(steps: Vec<Step>) -> ScriptedChannel {
        ScriptedChannel::new(
            steps,
            &Arc::new(AtomicBool::new(false)),
            &Arc::new(AtomicBool::new(false)),
        )
    }
}

impl Read for ScriptedChannel {
    fn read(
        &mut self,
        buf: &mut [u8],
    ) -> Result<usize> {
        match self.steps.pop_front() {
            Some(Step::Data(mut data)) => {
                let len = std::cmp::min(buf.len(), data.len());
                buf[..len].copy_from_slice(&data[..len]);
                if len < data.len() {
                    let rest = data.split_off(len);
                    self.steps.push_front(Step::Data(rest));
                }
                Ok(len)
            }
            Some(Step::Timeout) => Err(Error::new(ErrorKind::TimedOut, "scripted timeout")),
            Some(Step::Fail(kind)) => Err(Error::new(kind, "scripted failure")),
            Some(Step::Closed) => Ok(0),
            None => {
                self.exit_early.store(true, Ordering::SeqCst);
                Err(Error::new(ErrorKind::TimedOut, "scripted timeout"))
            }
        }
    }
}

impl Drop for ScriptedChannel {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

/// One `Step::Data` per line, each line ended with `"\r\n"` like the
/// device firmware does.
pub fn lines_to_steps(lines: &[&str]) -> Vec<Step> {
    lines
        .iter()
        .map(|line| Step::Data(format!("{}\r\n", line).into_bytes()))
        .collect()
}

/// 2026-02-08 10:15:00
pub fn clock_20260208_101500() -> FixedClock {
    FixedClock::from_ymd_hms(2026, 2, 8, 10, 15, 0).unwrap()
}

/// Default `Config` with the store at `store_path`.
pub fn config_with_store(store_path: &FPath) -> Config {
    Config {
        store_path: store_path.clone(),
        ..Config::default()
    }
}

pub type PrinterMem = ConsolePrinter<NoColor<Vec<u8>>>;

pub fn printer_mem() -> PrinterMem {
    ConsolePrinter::new(NoColor::new(Vec::new()))
}

/// Everything printed to a `PrinterMem`.
pub fn printed(printer: PrinterMem) -> String {
    String::from_utf8(printer.into_inner().into_inner()).unwrap()
}

/// Rows received by a [`RecordingForwarder`].
pub type Rows = Rc<RefCell<Vec<Vec<String>>>>;

/// Accepts and remembers every row.
pub struct RecordingForwarder {
    pub rows: Rows,
}

impl RowForwarder for RecordingForwarder {
    fn append_row(
        &mut self,
        row: &[&str; RECORD_COLUMNS],
    ) -> std::result::Result<(), ForwardError> {
        self.rows
            .borrow_mut()
            .push(row.iter().map(|s| String::from(*s)).collect());
        Ok(())
    }

    fn target(&self) -> String {
        String::from("recording")
    }
}

/// Fails every row, counting attempts.
pub struct FailingForwarder {
    pub attempts: Rc<RefCell<usize>>,
}

impl RowForwarder for FailingForwarder {
    fn append_row(
        &mut self,
        _row: &[&str; RECORD_COLUMNS],
    ) -> std::result::Result<(), ForwardError> {
        *self.attempts.borrow_mut() += 1;
        Err(ForwardError::Network(String::from("connection refused")))
    }

    fn target(&self) -> String {
        String::from("failing")
    }
}
