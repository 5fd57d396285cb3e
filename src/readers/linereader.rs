// src/readers/linereader.rs

//! Implements a [`LineReader`],
//! the driver of deriving raw lines from a device channel.
//!
//! A device channel is anything implementing [`Read`] that gives up after a
//! short timeout, e.g. a serial port opened by [`open_channel`].
//!
//! [`Read`]: std::io::Read
//! [`open_channel`]: crate::device::channel::open_channel

use crate::common::{Bytes, Count, NLu8, ResultS3};
#[allow(unused_imports)]
use crate::debug::printers::{buffer_to_String_noraw, de_wrn, str_to_String_noraw};

use std::fmt;
use std::io::{Error, ErrorKind, Read};

use ::bstr::ByteSlice; // provides `find_byte` and `utf8_chunks` on `&[u8]`
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LineReader
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// [`LineReader.read_line()`] results.
///
/// * `Found` is a decoded, trimmed line, possibly empty.
/// * `Done` means no complete line arrived before the channel timed out.
/// * `Err` is an unrecoverable channel error.
///
/// [`LineReader.read_line()`]: self::LineReader#method.read_line
pub type ResultS3LineRead = ResultS3<String, Error>;

/// Bytes requested per call to the underlying `read`.
pub const READ_SZ: usize = 256;

/// A line growing past this many bytes without a newline is discarded,
/// up to and including its eventual newline. It is never returned, in part
/// or in whole.
pub const LINE_SZ_MAX: usize = 4096;

/// Decode `bytes` as UTF-8, dropping any undecodable bytes.
///
/// Returns the decoded text and the count of dropped bytes.
pub fn decode_permissive(bytes: &[u8]) -> (String, usize) {
    let mut s: String = String::with_capacity(bytes.len());
    let mut dropped: usize = 0;
    for chunk in bytes.utf8_chunks() {
        s.push_str(chunk.valid());
        dropped += chunk.invalid().len();
    }

    (s, dropped)
}

/// Accumulated statistics of a [`LineReader`].
#[allow(non_snake_case)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SummaryLineReader {
    /// count of lines returned, including empty lines
    pub LineReader_lines: Count,
    /// count of bytes read from the channel
    pub LineReader_bytes: Count,
    /// count of undecodable bytes dropped
    pub LineReader_bytes_dropped: Count,
    /// count of lines discarded for exceeding [`LINE_SZ_MAX`]
    pub LineReader_lines_overlong: Count,
}

/// Reads bytes from a device channel `R` and splits them into lines.
///
/// A partial line remains buffered across timeouts until its newline
/// arrives. An overlong line is skipped entirely. A `LineReader` owns the
/// channel; dropping the `LineReader` releases it.
pub struct LineReader<R: Read> {
    /// the device channel
    reader: R,
    /// bytes read but not yet returned as a line
    pending: Bytes,
    /// scratch space for each `read`
    readbuf: [u8; READ_SZ],
    /// skipping the rest of an overlong line until its newline
    discarding: bool,
    lines: Count,
    bytes: Count,
    bytes_dropped: Count,
    lines_overlong: Count,
}

impl<R: Read> fmt::Debug for LineReader<R> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("LineReader")
            .field("pending", &self.pending.len())
            .field("discarding", &self.discarding)
            .field("lines", &self.lines)
            .field("bytes", &self.bytes)
            .field("bytes_dropped", &self.bytes_dropped)
            .finish()
    }
}

impl<R: Read> LineReader<R> {
    pub fn new(reader: R) -> LineReader<R> {
        defñ!();

        LineReader {
            reader,
            pending: Bytes::with_capacity(READ_SZ * 2),
            readbuf: [0; READ_SZ],
            discarding: false,
            lines: 0,
            bytes: 0,
            bytes_dropped: 0,
            lines_overlong: 0,
        }
    }

    /// Count of bytes buffered that are not yet part of a returned line.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Read the next line.
    ///
    /// Blocks for at most the channel's own timeout per underlying `read`.
    /// Returns `Done` on a timeout. A zero-length `read` means the channel
    /// went away and is returned as an `Err`.
    pub fn read_line(&mut self) -> ResultS3LineRead {
        loop {
            if !self.discarding || self.skip_overlong() {
                if let Some(line) = self.take_line() {
                    return ResultS3LineRead::Found(line);
                }
                if self.pending.len() >= LINE_SZ_MAX {
                    de_wrn!("no newline within {} bytes; discarding the line", LINE_SZ_MAX);
                    self.lines_overlong += 1;
                    self.pending.clear();
                    self.discarding = true;
                }
            }
            match self.reader.read(&mut self.readbuf) {
                Ok(0) => {
                    defo!("read 0 bytes; channel closed");
                    return ResultS3LineRead::Err(Error::new(
                        ErrorKind::UnexpectedEof,
                        "device channel closed",
                    ));
                }
                Ok(len) => {
                    defo!("read {} bytes {:?}", len, buffer_to_String_noraw(&self.readbuf[..len]));
                    self.bytes += len as Count;
                    self.pending.extend_from_slice(&self.readbuf[..len]);
                }
                Err(err) => match err.kind() {
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted => {
                        return ResultS3LineRead::Done;
                    }
                    _ => {
                        defo!("read error {:?}", err);
                        return ResultS3LineRead::Err(err);
                    }
                },
            }
        }
    }

    /// While discarding an overlong line, drop buffered bytes up to and
    /// including the next newline.
    /// Returns `true` once that newline was found and discarding is over.
    fn skip_overlong(&mut self) -> bool {
        match self.pending.find_byte(NLu8) {
            Some(at) => {
                defo!("overlong line ends; dropped {} bytes", at + 1);
                self.pending.drain(..=at);
                self.discarding = false;

                true
            }
            None => {
                self.pending.clear();

                false
            }
        }
    }

    /// If a newline is buffered then remove the bytes up to and including it
    /// and return them decoded and trimmed.
    fn take_line(&mut self) -> Option<String> {
        let at: usize = self.pending.find_byte(NLu8)?;
        let rest: Bytes = self.pending.split_off(at + 1);
        let bytes: Bytes = std::mem::replace(&mut self.pending, rest);

        Some(self.decode(&bytes))
    }

    fn decode(
        &mut self,
        bytes: &[u8],
    ) -> String {
        let (s, dropped) = decode_permissive(bytes);
        self.bytes_dropped += dropped as Count;
        self.lines += 1;
        let line = String::from(s.trim());
        defo!("line {:?}", str_to_String_noraw(&line));

        line
    }

    pub fn summary(&self) -> SummaryLineReader {
        SummaryLineReader {
            LineReader_lines: self.lines,
            LineReader_bytes: self.bytes,
            LineReader_bytes_dropped: self.bytes_dropped,
            LineReader_lines_overlong: self.lines_overlong,
        }
    }
}
