// src/bin/attendlog.rs

//! Driver program _attendlog_ drives the [_attendlib_].
//!
//! Processes user-passed command-line arguments into one [`Config`].
//! Then searches for the attendance device among the serial ports, opens it,
//! and runs a [`Session`] until the user presses Ctrl+C.
//!
//! `attendlog.rs` is the only place that calls `std::process::exit` or
//! returns a process exit code.
//!
//! [_attendlib_]: attendlib
//! [`Config`]: attendlib::config::Config
//! [`Session`]: attendlib::session::Session

#![allow(non_camel_case_types)]

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ::attendlib::common::{FPath, EXIT_ERR, EXIT_OK};
use ::attendlib::config::{
    Config,
    DeviceSignatures,
    RemoteConfig,
    BAUD_RATE_DEFAULT,
    CREDENTIALS_PATH_DEFAULT,
    READ_TIMEOUT_MS_DEFAULT,
    SETTLE_DELAY_MS_DEFAULT,
    SHEET_NAME_DEFAULT,
    STORE_PATH_DEFAULT,
};
use ::attendlib::data::datetime::LocalClock;
use ::attendlib::debug::printers::{e_err, e_wrn};
use ::attendlib::device::channel::{open_channel, settle, DeviceChannel};
use ::attendlib::device::discovery::{available_ports, select_port, PortDescriptor};
use ::attendlib::printer::printers::{ColorChoice, ConsolePrinterStdout};
use ::attendlib::session::{Session, SessionEnd, SessionReport, SessionState};
use ::attendlib::sinks::remote::{RemoteSink, UNAVAILABLE_ADVICE};
use ::clap::{Parser, ValueEnum};
use ::const_format::concatcp;
use ::lazy_static::lazy_static;
use ::si_trace_print::stack::stack_offset_set;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// --------------------
// command-line parsing

#[cfg(debug_assertions)]
const CLI_HELP_AFTER_NOTE_DEBUG: &str = "\nDEBUG BUILD";
#[cfg(not(debug_assertions))]
const CLI_HELP_AFTER_NOTE_DEBUG: &str = "";

#[cfg(feature = "sheets")]
const CLI_HELP_AFTER_NOTE_SHEETS: &str = "enabled";
#[cfg(not(feature = "sheets"))]
const CLI_HELP_AFTER_NOTE_SHEETS: &str = "not compiled in";

/// `--help` _afterword_ message.
const CLI_HELP_AFTER: &str = concatcp!(
    "\
Without --port, the first serial port whose description contains \"Arduino\"
or \"USB\", or whose device name contains \"ACM\", is used.

Device lines of the form
    ATTENDANCE,<date>,<time>,<name>,<email>,<contact>,<identifier>
are appended to the CSV file. The device <date> and <time> are ignored;
the host date and time are recorded instead. All other lines are only printed.

The CSV file is created with a header row if it does not exist. An existing
file is only ever appended to.

Spreadsheet forwarding (--sheets) requires a service-account credential
document and a spreadsheet shared with that service account.
Spreadsheet support: ", CLI_HELP_AFTER_NOTE_SHEETS, "

Press Ctrl+C to stop logging.

---

Version: ", env!("CARGO_PKG_VERSION"), "
MSRV: ", env!("CARGO_PKG_RUST_VERSION"), "
License: ", env!("CARGO_PKG_LICENSE"), "
Author: ", env!("CARGO_PKG_AUTHORS"), "
",
    CLI_HELP_AFTER_NOTE_DEBUG,
);

/// CLI enum that maps to [`termcolor::ColorChoice`].
///
/// [`termcolor::ColorChoice`]: https://docs.rs/termcolor/1.4.1/termcolor/enum.ColorChoice.html
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    ValueEnum, // from `clap`
)]
enum CLI_Color_Choice {
    always,
    auto,
    never,
}

/// clap command-line arguments build-time definitions.
//
// Note:
// * the `about` is taken from `Cargo.toml:[package]:description`.
#[derive(Parser, Debug)]
#[clap(
    about = env!("CARGO_PKG_DESCRIPTION"),
    author = env!("CARGO_PKG_AUTHORS"),
    name = "attendlog",
    version = concatcp!(
        "\n",
        "Version: ", env!("CARGO_PKG_VERSION"), "\n",
        "MSRV: ", env!("CARGO_PKG_RUST_VERSION"), "\n",
        "License: ", env!("CARGO_PKG_LICENSE"), "\n",
        "Spreadsheet support: ", CLI_HELP_AFTER_NOTE_SHEETS, "\n",
    ),
    after_help = CLI_HELP_AFTER,
    verbatim_doc_comment,
)]
struct CLI_Args {
    /// Serial device to use, e.g. "/dev/ttyACM0" or "COM3".
    /// If not passed then the serial ports are searched for the device.
    #[clap(
        short = 'p',
        long,
        verbatim_doc_comment,
    )]
    port: Option<String>,

    /// Serial baud rate. Must match the device firmware.
    #[clap(
        short = 'b',
        long,
        verbatim_doc_comment,
        default_value_t = BAUD_RATE_DEFAULT,
    )]
    baud: u32,

    /// CSV file to append attendance records to.
    #[clap(
        short = 'o',
        long,
        verbatim_doc_comment,
        default_value_t = String::from(STORE_PATH_DEFAULT),
    )]
    output: String,

    /// Milliseconds to wait after opening the port for the device to reset.
    #[clap(
        long = "settle-ms",
        verbatim_doc_comment,
        default_value_t = SETTLE_DELAY_MS_DEFAULT,
    )]
    settle_ms: u64,

    /// Milliseconds each serial read may block.
    /// Ctrl+C is noticed within this time.
    #[clap(
        long = "timeout-ms",
        verbatim_doc_comment,
        value_parser = clap::value_parser!(u64).range(1..),
        default_value_t = READ_TIMEOUT_MS_DEFAULT,
    )]
    timeout_ms: u64,

    /// Forward each attendance record to a spreadsheet.
    #[clap(
        long = "sheets",
        verbatim_doc_comment,
    )]
    sheets: bool,

    /// Name of the spreadsheet to forward records to.
    #[clap(
        long = "sheet-name",
        verbatim_doc_comment,
        requires = "sheets",
        default_value_t = String::from(SHEET_NAME_DEFAULT),
    )]
    sheet_name: String,

    /// Service-account credential document for spreadsheet forwarding.
    #[clap(
        long = "credentials",
        verbatim_doc_comment,
        requires = "sheets",
        default_value_t = String::from(CREDENTIALS_PATH_DEFAULT),
    )]
    credentials: String,

    /// Print the serial ports found and exit.
    #[clap(
        long = "list-ports",
        verbatim_doc_comment,
        exclusive = true,
    )]
    list_ports: bool,

    /// Choose to print using colors.
    #[clap(
        required = false,
        short = 'c',
        long = "color",
        verbatim_doc_comment,
        value_enum,
        default_value_t = CLI_Color_Choice::auto,
    )]
    color_choice: CLI_Color_Choice,

    /// Print a summary of the session statistics after stopping.
    #[clap(
        short,
        long,
        verbatim_doc_comment,
    )]
    summary: bool,
}

/// Process user-passed command-line arguments.
///
/// Returns the `Config`, the color choice, `--list-ports`, and `--summary`.
fn cli_process_args() -> (Config, ColorChoice, bool, bool) {
    let args = CLI_Args::parse();
    defo!("args {:?}", args);

    let color_choice: ColorChoice = match args.color_choice {
        CLI_Color_Choice::always => ColorChoice::Always,
        CLI_Color_Choice::auto => ColorChoice::Auto,
        CLI_Color_Choice::never => ColorChoice::Never,
    };

    let config = Config {
        port: args.port.map(FPath::from),
        signatures: DeviceSignatures::default(),
        baud_rate: args.baud,
        read_timeout: Duration::from_millis(args.timeout_ms),
        settle_delay: Duration::from_millis(args.settle_ms),
        store_path: FPath::from(args.output),
        remote: RemoteConfig {
            enabled: args.sheets,
            credentials_path: FPath::from(args.credentials),
            sheet_name: args.sheet_name,
        },
    };
    defo!("config {:?}", config);

    (config, color_choice, args.list_ports, args.summary)
}

// --------------------
// signal handling

lazy_static! {
    /// flag to signal the session loop to return ASAP.
    /// Set by the `ctrlc::set_handler` signal handler.
    static ref EXIT_EARLY: AtomicBool = {
        defñ!("lazy_static! EXIT_EARLY");

        AtomicBool::new(false)
    };
}

/// set a process signal handler
fn set_signal_handler() -> anyhow::Result<(), ctrlc::Error> {
    defn!();

    ctrlc::set_handler(move || {
        defñ!("signal received");
        EXIT_EARLY.store(true, Ordering::SeqCst);
    })?;

    defx!();

    Ok(())
}

// --------------------
// Searching and Connected

/// Enumerate serial ports, printing an error on failure.
fn ports_or_empty() -> Vec<PortDescriptor> {
    match available_ports() {
        Ok(ports) => ports,
        Err(err) => {
            e_err!("unable to enumerate serial ports: {}", err);
            Vec::with_capacity(0)
        }
    }
}

/// `Searching`: the device path passed by the user, or the first port that
/// matches the device signatures.
fn search(
    config: &Config,
    printer: &mut ConsolePrinterStdout,
) -> Option<FPath> {
    defn!();
    if let Some(port) = &config.port {
        defx!("user passed {:?}", port);
        return Some(port.clone());
    }
    printer.searching();
    let ports: Vec<PortDescriptor> = ports_or_empty();
    match select_port(&ports, &config.signatures) {
        Some(port) => {
            printer.found(port);
            defx!("found {:?}", port);

            Some(port.device.clone())
        }
        None => {
            printer.not_found(&ports);
            defx!("not found");

            None
        }
    }
}

/// `Connected`: open the device and let it settle.
fn connect(
    device: &str,
    config: &Config,
) -> anyhow::Result<DeviceChannel> {
    let channel: DeviceChannel = open_channel(device, config)
        .map_err(|err| anyhow::anyhow!("unable to open {:?}: {}", device, err))?;
    settle(config);

    Ok(channel)
}

/// Process exit code from one of the `EXIT_` values.
fn exitcode(code: i32) -> ExitCode {
    ExitCode::from(code as u8)
}

/// Process the user-passed command-line arguments.
/// Find the device, then run the logging session.
/// Determine a process return code.
pub fn main() -> ExitCode {
    if cfg!(debug_assertions) {
        stack_offset_set(Some(0));
    }
    defn!();

    let (config, color_choice, list_ports, summary) = cli_process_args();

    if list_ports {
        let ports: Vec<PortDescriptor> = match available_ports() {
            Ok(ports) => ports,
            Err(err) => {
                e_err!("unable to enumerate serial ports: {}", err);
                defx!("exit {}", EXIT_ERR);
                return exitcode(EXIT_ERR);
            }
        };
        let mut printer = ConsolePrinterStdout::stdout(color_choice);
        printer.ports(&ports);
        defx!("list ports");
        return exitcode(EXIT_OK);
    }

    let mut printer = ConsolePrinterStdout::stdout(color_choice);
    printer.banner();

    defo!("{:?}", SessionState::Searching);
    let device: FPath = match search(&config, &mut printer) {
        Some(device) => device,
        None => {
            defx!("exit {}", EXIT_ERR);
            return exitcode(EXIT_ERR);
        }
    };

    if let Err(err) = set_signal_handler() {
        e_err!("unable to set the signal handler: {}", err);
        defx!("exit {}", EXIT_ERR);
        return exitcode(EXIT_ERR);
    }

    let channel: DeviceChannel = match connect(&device, &config) {
        Ok(channel) => channel,
        Err(err) => {
            e_err!("{}", err);
            defx!("exit {}", EXIT_ERR);
            return exitcode(EXIT_ERR);
        }
    };
    defo!("{:?} {:?}", SessionState::Connected, device);

    let remote = RemoteSink::from_config(&config);
    if remote.is_enabled() && cfg!(not(feature = "sheets")) {
        e_wrn!("{}", UNAVAILABLE_ADVICE);
    }
    let clock = LocalClock;
    let session = Session::new(&config, channel, &clock, remote, printer);
    let SessionReport {
        end,
        summary: summary_session,
        printer: mut printer,
    } = session.run(&EXIT_EARLY);

    if summary {
        printer.summary(&summary_session);
    }
    let code: i32 = match &end {
        SessionEnd::Interrupted => EXIT_OK,
        SessionEnd::StoreError(err) => {
            e_err!("unable to initialize CSV file {:?}: {}", config.store_path, err);
            EXIT_ERR
        }
        SessionEnd::ChannelError(_err) => {
            // already reported by the session
            defo!("device channel {:?}: {}", device, _err);
            EXIT_ERR
        }
    };
    defx!("exit {}", code);

    exitcode(code)
}
