// src/data/mod.rs

//! The `data` module is specialized data containers for
//! [`AttendanceRecord`]s and the datetime stamped onto them.
//!
//! ## Definitions of data
//!
//! ### Raw line
//!
//! A "raw line" is the text of one line sent by the device, decoded and
//! trimmed. It is discarded after a parse attempt. See [`LineReader`].
//!
//! ### Attendance record
//!
//! An "attendance record" is a raw line of the shape
//!
//! ```text
//! ATTENDANCE,<date>,<time>,<name>,<email>,<contact>,<identifier>
//! ```
//!
//! where `<date>` and `<time>` are placeholders replaced by the host datetime.
//! Represented by an [`AttendanceRecord`].
//!
//! [`LineReader`]: crate::readers::linereader::LineReader
//! [`AttendanceRecord`]: crate::data::record::AttendanceRecord

pub mod datetime;
pub mod record;
