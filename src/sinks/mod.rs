// src/sinks/mod.rs

//! Destinations of accepted [`AttendanceRecord`]s.
//!
//! * A [`CsvSink`] is the persistent store; the one that counts.
//! * A [`RemoteSink`] optionally forwards each persisted record elsewhere.
//!
//! [`AttendanceRecord`]: crate::data::record::AttendanceRecord
//! [`CsvSink`]: crate::sinks::csvsink::CsvSink
//! [`RemoteSink`]: crate::sinks::remote::RemoteSink

pub mod csvsink;
pub mod remote;
#[cfg(feature = "sheets")]
pub mod sheets;
