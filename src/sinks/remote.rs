// src/sinks/remote.rs

//! The Remote Sink: best-effort forwarding of each persisted record to a
//! remote spreadsheet.
//!
//! Forwarding never affects the persistent store or the session. Every
//! failure is returned as a [`ForwardError`] for the caller to report, and
//! the next record is forwarded as if nothing happened.

use crate::config::Config;
use crate::data::record::{AttendanceRecord, RECORD_COLUMNS};

use std::fmt;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Why a record was not forwarded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ForwardError {
    /// Forwarding support is not available in this build.
    Unavailable(String),
    /// The credential document could not be read or was invalid.
    Credentials(String),
    /// The remote service refused the credentials.
    Auth(String),
    /// The remote service could not be reached.
    Network(String),
    /// The remote service rejected the request.
    Service(String),
}

impl fmt::Display for ForwardError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        match self {
            ForwardError::Unavailable(msg) => write!(f, "not available: {}", msg),
            ForwardError::Credentials(msg) => write!(f, "credentials: {}", msg),
            ForwardError::Auth(msg) => write!(f, "authentication failed: {}", msg),
            ForwardError::Network(msg) => write!(f, "network: {}", msg),
            ForwardError::Service(msg) => write!(f, "service: {}", msg),
        }
    }
}

impl std::error::Error for ForwardError {}

/// A client able to append one row to the remote target.
pub trait RowForwarder {
    /// Append `row` to the remote target.
    fn append_row(
        &mut self,
        row: &[&str; RECORD_COLUMNS],
    ) -> Result<(), ForwardError>;

    /// Short human-readable name of the remote target.
    fn target(&self) -> String;
}

/// Stands in for the spreadsheet client when this build lacks it.
/// Every forward fails with [`ForwardError::Unavailable`].
#[derive(Clone, Debug, Default)]
pub struct UnavailableForwarder;

/// Operator advice when forwarding is requested but not compiled in.
pub const UNAVAILABLE_ADVICE: &str =
    "spreadsheet support is not compiled in; rebuild with `cargo build --features sheets`";

impl RowForwarder for UnavailableForwarder {
    fn append_row(
        &mut self,
        _row: &[&str; RECORD_COLUMNS],
    ) -> Result<(), ForwardError> {
        Err(ForwardError::Unavailable(String::from(UNAVAILABLE_ADVICE)))
    }

    fn target(&self) -> String {
        String::from("(unavailable)")
    }
}

/// Did [`RemoteSink::forward`] do anything?
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ForwardResult {
    /// The record was appended remotely.
    Forwarded,
    /// Forwarding is disabled; nothing was attempted.
    Skipped,
    /// Forwarding was attempted and failed.
    Failed(ForwardError),
}

/// The remote forwarding capability. `Disabled` is a no-op.
pub enum RemoteSink {
    Enabled {
        client: Box<dyn RowForwarder>,
    },
    Disabled,
}

impl fmt::Debug for RemoteSink {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        match self {
            RemoteSink::Enabled { client } => write!(f, "RemoteSink::Enabled({})", client.target()),
            RemoteSink::Disabled => write!(f, "RemoteSink::Disabled"),
        }
    }
}

impl RemoteSink {
    /// Build the remote sink described by `config.remote`.
    ///
    /// No connection is made here; the client authenticates on first use.
    pub fn from_config(config: &Config) -> RemoteSink {
        defn!("({:?})", config.remote);
        if !config.remote.enabled {
            defx!("Disabled");
            return RemoteSink::Disabled;
        }
        let client: Box<dyn RowForwarder> = RemoteSink::client(config);
        defx!("Enabled {}", client.target());

        RemoteSink::Enabled { client }
    }

    #[cfg(feature = "sheets")]
    fn client(config: &Config) -> Box<dyn RowForwarder> {
        Box::new(crate::sinks::sheets::SheetsClient::new(
            &config.remote.credentials_path,
            &config.remote.sheet_name,
        ))
    }

    #[cfg(not(feature = "sheets"))]
    fn client(_config: &Config) -> Box<dyn RowForwarder> {
        Box::new(UnavailableForwarder)
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, RemoteSink::Enabled { .. })
    }

    /// Forward `record` to the remote target, if enabled.
    pub fn forward(
        &mut self,
        record: &AttendanceRecord,
    ) -> ForwardResult {
        match self {
            RemoteSink::Disabled => ForwardResult::Skipped,
            RemoteSink::Enabled { client } => match client.append_row(&record.fields()) {
                Ok(()) => ForwardResult::Forwarded,
                Err(err) => {
                    defñ!("append_row failed {:?}", err);
                    ForwardResult::Failed(err)
                }
            },
        }
    }
}
