// src/config.rs

//! The immutable [`Config`], built once at startup by the driver program
//! and passed by reference to each component.

use crate::common::FPath;

use std::time::Duration;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// defaults
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The device firmware speaks at this baud rate.
pub const BAUD_RATE_DEFAULT: u32 = 9600;

/// Per-`read` timeout of the device channel.
pub const READ_TIMEOUT_MS_DEFAULT: u64 = 1000;

/// Opening the serial port resets the device; wait this long before trusting
/// its output.
pub const SETTLE_DELAY_MS_DEFAULT: u64 = 2000;

pub const STORE_PATH_DEFAULT: &str = "attendance_log.csv";

pub const SHEET_NAME_DEFAULT: &str = "SmartAttend Attendance";

pub const CREDENTIALS_PATH_DEFAULT: &str = "credentials.json";

/// Port descriptions containing any of these are a known device.
pub const DESCRIPTION_MARKERS_DEFAULT: [&str; 2] = ["Arduino", "USB"];

/// Port device names containing any of these are a known device.
pub const DEVICE_MARKERS_DEFAULT: [&str; 1] = ["ACM"];

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Markers identifying a known device among enumerated ports.
/// Matching is a case-sensitive substring match.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeviceSignatures {
    /// matched against a port's human-readable description
    pub description_markers: Vec<String>,
    /// matched against a port's device name, e.g. `/dev/ttyACM0`
    pub device_markers: Vec<String>,
}

impl Default for DeviceSignatures {
    fn default() -> Self {
        DeviceSignatures {
            description_markers: DESCRIPTION_MARKERS_DEFAULT
                .iter()
                .map(|s| String::from(*s))
                .collect(),
            device_markers: DEVICE_MARKERS_DEFAULT
                .iter()
                .map(|s| String::from(*s))
                .collect(),
        }
    }
}

/// Settings of the optional remote spreadsheet sink.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RemoteConfig {
    pub enabled: bool,
    /// service-account credential document
    pub credentials_path: FPath,
    /// name of the target spreadsheet
    pub sheet_name: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            enabled: false,
            credentials_path: FPath::from(CREDENTIALS_PATH_DEFAULT),
            sheet_name: String::from(SHEET_NAME_DEFAULT),
        }
    }
}

/// Everything the components need to know, decided once at startup.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// use this device instead of searching for one
    pub port: Option<FPath>,
    pub signatures: DeviceSignatures,
    pub baud_rate: u32,
    pub read_timeout: Duration,
    pub settle_delay: Duration,
    /// path of the persistent store
    pub store_path: FPath,
    pub remote: RemoteConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: None,
            signatures: DeviceSignatures::default(),
            baud_rate: BAUD_RATE_DEFAULT,
            read_timeout: Duration::from_millis(READ_TIMEOUT_MS_DEFAULT),
            settle_delay: Duration::from_millis(SETTLE_DELAY_MS_DEFAULT),
            store_path: FPath::from(STORE_PATH_DEFAULT),
            remote: RemoteConfig::default(),
        }
    }
}
