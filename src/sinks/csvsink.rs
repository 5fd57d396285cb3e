// src/sinks/csvsink.rs

//! Implements a [`CsvSink`], the Durable Sink: the append-only CSV
//! persistent store.

use crate::common::{FPath, FileOpenOptions};
use crate::data::record::{AttendanceRecord, RECORD_HEADER};
use crate::debug::printers::de_err;

use std::fs::File;
use std::io::{Error, ErrorKind, Result};

use ::csv::{QuoteStyle, Terminator, Writer, WriterBuilder};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Outcome of [`CsvSink::ensure_initialized`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StoreInit {
    /// The store did not exist and was created with the header row.
    Created,
    /// The store already existed and was left untouched.
    Existing,
}

/// The persistent store at `path`.
///
/// The header row is written only by [`ensure_initialized`] and only when no
/// file exists at `path`. Every [`append`] opens the file in append mode,
/// writes one row, flushes, and closes it. Existing content is never
/// truncated or rewritten.
///
/// [`ensure_initialized`]: CsvSink::ensure_initialized
/// [`append`]: CsvSink::append
#[derive(Clone, Debug)]
pub struct CsvSink {
    path: FPath,
}

impl CsvSink {
    pub fn new(path: &FPath) -> CsvSink {
        CsvSink { path: path.clone() }
    }

    pub fn path(&self) -> &FPath {
        &self.path
    }

    fn writer(file: File) -> Writer<File> {
        WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::CRLF)
            .from_writer(file)
    }

    /// Create the store with the header row if no file exists at the path.
    ///
    /// Idempotent; an existing file is never modified.
    pub fn ensure_initialized(&self) -> Result<StoreInit> {
        defn!("({:?})", self.path);
        let file: File = match self.create_new() {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                defx!("return Existing");
                return Ok(StoreInit::Existing);
            }
            Err(err) => {
                defx!("error {:?}", err);
                return Err(err);
            }
        };
        self.initialize_with(file, |writer| {
            writer.write_record(RECORD_HEADER)?;
            writer.flush()?;

            Ok(())
        })
    }

    /// Write the header to the just-created `file` with `write_header`.
    ///
    /// On failure the file is removed so a later run creates it anew instead
    /// of appending to a store without a header.
    pub(crate) fn initialize_with<F>(
        &self,
        file: File,
        write_header: F,
    ) -> Result<StoreInit>
    where
        F: FnOnce(&mut Writer<File>) -> Result<()>,
    {
        let mut writer = CsvSink::writer(file);
        let result: Result<()> = write_header(&mut writer);
        drop(writer);
        if let Err(err) = result {
            defo!("header error {:?}; remove {:?}", err, self.path);
            if let Err(_err_rm) = std::fs::remove_file(&self.path) {
                de_err!("remove_file({:?}) failed {}", self.path, _err_rm);
            }
            defx!("error {:?}", err);
            return Err(err);
        }
        defx!("return Created");

        Ok(StoreInit::Created)
    }

    /// Create the file for the store; it must not already exist.
    pub(crate) fn create_new(&self) -> Result<File> {
        FileOpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
    }

    /// Append `record` as one row.
    ///
    /// A store that has gone missing since [`ensure_initialized`] is an
    /// error; it is not recreated without its header.
    ///
    /// [`ensure_initialized`]: CsvSink::ensure_initialized
    pub fn append(
        &self,
        record: &AttendanceRecord,
    ) -> Result<()> {
        defn!("({:?})", record);
        let file: File = FileOpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|err| Error::new(err.kind(), format!("{} {:?}", err, self.path)))?;
        let mut writer = CsvSink::writer(file);
        writer.write_record(record.fields())?;
        // flush here; `Writer::drop` ignores flush errors
        writer.flush()?;
        defx!();

        Ok(())
    }
}
