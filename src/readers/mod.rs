// src/readers/mod.rs

//! "Readers" for _attendlib_.
//!
//! ## Overview of readers
//!
//! * A [`LineReader`] drives a device channel to derive raw lines.
//! * [`parse_record`] turns a raw line into an [`AttendanceRecord`].
//! * A [`SummarySession`] tallies what happened.
//!
//! _These are not rust "Readers"; these structs do not implement the trait
//! [`Read`]. These are "readers" in an informal sense._
//!
//! [`Read`]: std::io::Read
//! [`AttendanceRecord`]: crate::data::record::AttendanceRecord
//! [`LineReader`]: crate::readers::linereader::LineReader
//! [`parse_record`]: crate::readers::recordparser::parse_record
//! [`SummarySession`]: crate::readers::summary::SummarySession

pub mod linereader;
pub mod recordparser;
pub mod summary;
