// src/lib.rs

//! _attendlib_ is the library used by the driver program _attendlog_.
//!
//! An attendance device (a microcontroller with a card reader and keypad)
//! sends lines over a serial port. Lines of the shape
//!
//! ```text
//! ATTENDANCE,<date>,<time>,<name>,<email>,<contact>,<identifier>
//! ```
//!
//! are attendance events. Each one is stamped with the host datetime and
//! appended to a CSV file, and optionally forwarded to a spreadsheet.
//!
//! The [`Session`] drives everything. Most other modules are leaves of it:
//!
//! * [`data`] for the [`AttendanceRecord`] and the [`Clock`]
//! * [`readers`] for turning device bytes into lines and lines into records
//! * [`sinks`] for the CSV store and the remote sink
//! * [`device`] for finding and opening the serial port
//! * [`printer`] for the operator console
//!
//! [`Session`]: crate::session::Session
//! [`AttendanceRecord`]: crate::data::record::AttendanceRecord
//! [`Clock`]: crate::data::datetime::Clock

pub mod common;
pub mod config;
pub mod data;
pub mod debug;
pub mod device;
pub mod printer;
pub mod readers;
pub mod session;
pub mod sinks;
#[cfg(test)]
pub mod tests;
