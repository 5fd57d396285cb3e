// src/data/datetime.rs

//! The source of truth for the datetime stamped onto every
//! [`AttendanceRecord`].
//!
//! Any date or time sent by the device is discarded. The host clock at the
//! moment a line is processed is used instead; see [`Clock`].
//!
//! Formatting uses chrono [`strftime`] patterns [`DATE_FORMAT`] and
//! [`TIME_FORMAT`].
//!
//! [`AttendanceRecord`]: crate::data::record::AttendanceRecord
//! [`strftime`]: https://docs.rs/chrono/0.4.40/chrono/format/strftime/index.html

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

#[doc(hidden)]
pub use ::chrono::{
    DateTime,
    FixedOffset,
    Local,
    TimeZone,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DateTime typing, strings, and formatting
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A chrono [`DateTime`] type used in _attendlib_.
///
/// [`DateTime`]: https://docs.rs/chrono/0.4.40/chrono/struct.DateTime.html
pub type DateTimeL = DateTime<FixedOffset>;

/// Crate `chrono` [`strftime`] formatting pattern, passed to
/// chrono [`DateTime::format`].
///
/// [`strftime`]: https://docs.rs/chrono/0.4.40/chrono/format/strftime/index.html
#[allow(non_camel_case_types)]
pub type DateTimePattern_str = str;

/// Date column format, e.g. `2026-02-08`.
pub const DATE_FORMAT: &DateTimePattern_str = "%Y-%m-%d";

/// Time column format, e.g. `10:15:00`.
pub const TIME_FORMAT: &DateTimePattern_str = "%H:%M:%S";

/// The date and time columns of a record, already formatted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Timestamp {
    /// formatted per [`DATE_FORMAT`]
    pub date: String,
    /// formatted per [`TIME_FORMAT`]
    pub time: String,
}

impl Timestamp {
    pub fn from_datetime(dt: &DateTimeL) -> Timestamp {
        Timestamp {
            date: dt.format(DATE_FORMAT).to_string(),
            time: dt.format(TIME_FORMAT).to_string(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Clock
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The Timestamp Authority.
///
/// Every call must read the clock anew; implementations must not cache.
pub trait Clock {
    /// The current datetime.
    fn now(&self) -> DateTimeL;

    /// The current datetime as formatted record columns.
    fn timestamp(&self) -> Timestamp {
        let dt = self.now();
        defñ!("{:?}", dt);

        Timestamp::from_datetime(&dt)
    }
}

/// The host's local system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> DateTimeL {
        Local::now().fixed_offset()
    }
}

/// A clock stopped at one datetime. Useful for replaying and testing.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock {
    dt: DateTimeL,
}

impl FixedClock {
    pub fn new(dt: DateTimeL) -> FixedClock {
        FixedClock { dt }
    }

    /// Create a `FixedClock` at the passed UTC datetime.
    /// Returns `None` if the values are not a valid datetime.
    pub fn from_ymd_hms(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        min: u32,
        sec: u32,
    ) -> Option<FixedClock> {
        let utc = FixedOffset::east_opt(0)?;
        let dt = utc
            .with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()?;

        Some(FixedClock::new(dt))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTimeL {
        self.dt
    }
}
