// src/data/record.rs

//! Implements the [`AttendanceRecord`] struct, one attendance event.

use crate::data::datetime::Timestamp;

use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// AttendanceRecord
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Count of columns in a persisted record.
pub const RECORD_COLUMNS: usize = 6;

/// The header row of the persistent store, written once when the store is
/// created.
pub const RECORD_HEADER: [&str; RECORD_COLUMNS] = [
    "Date",
    "Time",
    "Name",
    "Email",
    "WhatsApp",
    "Matric No",
];

/// One accepted attendance event.
///
/// `date` and `time` are always from the host clock at the moment the line
/// was processed, never from the device.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttendanceRecord {
    pub date: String,
    pub time: String,
    pub name: String,
    pub email: String,
    /// WhatsApp contact number
    pub contact: String,
    /// Matriculation number
    pub identifier: String,
}

impl AttendanceRecord {
    pub fn new(
        timestamp: Timestamp,
        name: &str,
        email: &str,
        contact: &str,
        identifier: &str,
    ) -> AttendanceRecord {
        AttendanceRecord {
            date: timestamp.date,
            time: timestamp.time,
            name: String::from(name),
            email: String::from(email),
            contact: String::from(contact),
            identifier: String::from(identifier),
        }
    }

    /// The record columns in store order, matching [`RECORD_HEADER`].
    pub fn fields(&self) -> [&str; RECORD_COLUMNS] {
        [
            self.date.as_str(),
            self.time.as_str(),
            self.name.as_str(),
            self.email.as_str(),
            self.contact.as_str(),
            self.identifier.as_str(),
        ]
    }
}

impl fmt::Display for AttendanceRecord {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        write!(
            f,
            "{} {} {} <{}> {} {}",
            self.date, self.time, self.name, self.email, self.contact, self.identifier,
        )
    }
}
