// src/readers/summary.rs

//! Implements `SummarySession` statistics tracking struct.

#![allow(non_snake_case)]

use crate::common::Count;
use crate::readers::linereader::SummaryLineReader;

use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Summary
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Accumulated statistics about one logging session, printed at shutdown.
///
/// `Session_records_persisted` is the Session Counter; the other fields are
/// for the operator's curiosity.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SummarySession {
    /// statistics of the `LineReader`, set once the session stops
    pub linereader: SummaryLineReader,
    /// count of non-empty lines echoed to the operator
    pub Session_lines_echoed: Count,
    /// count of lines starting with the record prefix
    pub Session_lines_tagged: Count,
    /// count of tagged lines that were not a valid record
    pub Session_records_rejected: Count,
    /// count of records appended to the persistent store
    pub Session_records_persisted: Count,
    /// count of records that failed to append to the persistent store
    pub Session_persist_failures: Count,
    /// count of records forwarded to the remote sink
    pub Session_records_forwarded: Count,
    /// count of records that failed to forward to the remote sink
    pub Session_forward_failures: Count,
}

impl SummarySession {
    /// The Session Counter.
    #[inline(always)]
    pub const fn count(&self) -> Count {
        self.Session_records_persisted
    }
}

impl fmt::Display for SummarySession {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        writeln!(f, "  bytes read        : {}", self.linereader.LineReader_bytes)?;
        writeln!(f, "  bytes dropped     : {}", self.linereader.LineReader_bytes_dropped)?;
        writeln!(f, "  lines read        : {}", self.linereader.LineReader_lines)?;
        writeln!(f, "  lines echoed      : {}", self.Session_lines_echoed)?;
        writeln!(f, "  records tagged    : {}", self.Session_lines_tagged)?;
        writeln!(f, "  records rejected  : {}", self.Session_records_rejected)?;
        writeln!(f, "  records persisted : {}", self.Session_records_persisted)?;
        writeln!(f, "  persist failures  : {}", self.Session_persist_failures)?;
        writeln!(f, "  records forwarded : {}", self.Session_records_forwarded)?;
        write!(f, "  forward failures  : {}", self.Session_forward_failures)
    }
}
