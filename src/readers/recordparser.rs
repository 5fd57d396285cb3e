// src/readers/recordparser.rs

//! The Line Parser: turn one raw line into an [`AttendanceRecord`].
//!
//! An accepted line has exactly [`RECORD_TOKENS`] comma-separated tokens and
//! the first token is [`RECORD_TAG`]:
//!
//! ```text
//! ATTENDANCE,DATE,TIME,Ada Lovelace,ada@example.com,+1555,MAT001
//! ```
//!
//! The second and third tokens must be present but their values are
//! ignored; the date and time come from a [`Clock`].
//!
//! [`AttendanceRecord`]: crate::data::record::AttendanceRecord
//! [`Clock`]: crate::data::datetime::Clock

use crate::data::datetime::Clock;
use crate::data::record::AttendanceRecord;
#[allow(unused_imports)]
use crate::debug::printers::str_to_String_noraw;

use std::fmt;

use ::const_format::concatcp;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// First token of every record line.
pub const RECORD_TAG: &str = "ATTENDANCE";

/// Token delimiter.
pub const RECORD_DELIMITER: char = ',';

/// Lines starting with this are handed to [`parse_record`]; all other lines
/// are only echoed.
pub const RECORD_PREFIX: &str = concatcp!(RECORD_TAG, RECORD_DELIMITER);

/// Tag, date placeholder, time placeholder, and the four record fields.
pub const RECORD_TOKENS: usize = 7;

/// Why a line was not accepted as a record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecordReject {
    /// Line split into this many tokens instead of [`RECORD_TOKENS`].
    TokenCount(usize),
    /// First token was not [`RECORD_TAG`].
    Tag,
}

impl fmt::Display for RecordReject {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        match self {
            RecordReject::TokenCount(count) => {
                write!(f, "expected {} tokens, found {}", RECORD_TOKENS, count)
            }
            RecordReject::Tag => write!(f, "first token is not {:?}", RECORD_TAG),
        }
    }
}

/// Does `line` look like a record line, i.e. should it be parsed at all?
#[inline(always)]
pub fn is_record_line(line: &str) -> bool {
    line.starts_with(RECORD_PREFIX)
}

/// Parse `line` into an `AttendanceRecord` stamped with `clock`, or say why
/// it was rejected.
///
/// The clock is read only for an accepted line.
pub fn try_parse_record(
    line: &str,
    clock: &dyn Clock,
) -> Result<AttendanceRecord, RecordReject> {
    let tokens: Vec<&str> = line
        .trim()
        .split(RECORD_DELIMITER)
        .collect();
    match tokens.as_slice() {
        [tag, _date, _time, name, email, contact, identifier] => {
            if *tag != RECORD_TAG {
                return Err(RecordReject::Tag);
            }

            Ok(AttendanceRecord::new(clock.timestamp(), name, email, contact, identifier))
        }
        _ => Err(RecordReject::TokenCount(tokens.len())),
    }
}

/// Parse `line` into an `AttendanceRecord` stamped with `clock`.
///
/// Returns `None` for any line that is not exactly a record line.
pub fn parse_record(
    line: &str,
    clock: &dyn Clock,
) -> Option<AttendanceRecord> {
    match try_parse_record(line, clock) {
        Ok(record) => Some(record),
        Err(_reject) => {
            defñ!("rejected {:?}: {}", str_to_String_noraw(line), _reject);

            None
        }
    }
}
