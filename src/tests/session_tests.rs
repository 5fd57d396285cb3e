// src/tests/session_tests.rs

//! tests for `session.rs`

use crate::common::{Count, FPath};
use crate::config::Config;
use crate::data::datetime::FixedClock;
use crate::debug::helpers::{create_temp_dir, read_file, temp_dir_fpath};
use crate::printer::printers::NoColor;
use crate::readers::summary::SummarySession;
use crate::session::{LineOutcome, Session, SessionEnd, SessionState};
use crate::sinks::csvsink::StoreInit;
use crate::sinks::remote::RemoteSink;
use crate::tests::common::{
    clock_20260208_101500,
    config_with_store,
    lines_to_steps,
    printed,
    printer_mem,
    FailingForwarder,
    RecordingForwarder,
    ScriptedChannel,
    Step,
};

use std::cell::RefCell;
use std::io::ErrorKind;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ::test_case::test_case;

const HEADER: &str = "Date,Time,Name,Email,WhatsApp,Matric No\r\n";

const LINE_ADA: &str = "ATTENDANCE,DATE,TIME,Ada Lovelace,ada@example.com,+1555,MAT001";
const LINE_GRACE: &str = "ATTENDANCE,DATE,TIME,Grace Hopper,grace@navy.mil,+1556,MAT002";
const LINE_ALAN: &str = "ATTENDANCE,DATE,TIME,Alan Turing,alan@bletchley.uk,+1557,MAT003";

const ROW_ADA: &str = "2026-02-08,10:15:00,Ada Lovelace,ada@example.com,+1555,MAT001\r\n";

/// Everything a finished `run` left behind.
struct RunResult {
    end: SessionEnd,
    summary: SummarySession,
    output: String,
    released: bool,
}

fn run_session(
    config: &Config,
    steps: Vec<Step>,
    remote: RemoteSink,
) -> RunResult {
    let clock: FixedClock = clock_20260208_101500();
    let exit_early = Arc::new(AtomicBool::new(false));
    let released = Arc::new(AtomicBool::new(false));
    let channel = ScriptedChannel::new(steps, &exit_early, &released);
    let session = Session::new(config, channel, &clock, remote, printer_mem());
    assert_eq!(session.state(), SessionState::Connected);
    let report = session.run(&exit_early);

    RunResult {
        end: report.end,
        summary: report.summary,
        output: printed(report.printer),
        released: released.load(Ordering::SeqCst),
    }
}

#[test]
fn test_run_three_records_then_interrupt() {
    let dir = create_temp_dir();
    let path: FPath = temp_dir_fpath(&dir, "attendance_log.csv");
    let config = config_with_store(&path);
    let steps = lines_to_steps(&["Scan your card", LINE_ADA, LINE_GRACE, "", LINE_ALAN]);
    let result = run_session(&config, steps, RemoteSink::Disabled);

    assert!(matches!(result.end, SessionEnd::Interrupted), "{:?}", result.end);
    assert!(result.end.is_success());
    assert!(result.released, "channel not released");
    assert_eq!(result.summary.count(), 3);
    assert_eq!(result.summary.Session_lines_echoed, 4);
    assert_eq!(result.summary.Session_lines_tagged, 3);
    assert_eq!(result.summary.linereader.LineReader_lines, 5);

    let content = read_file(&path);
    assert_eq!(content.lines().count(), 4, "{:?}", content);
    assert!(content.starts_with(HEADER));
    assert!(content.contains(ROW_ADA));

    let output = result.output;
    assert!(output.contains("Created new CSV file: "), "{}", output);
    assert!(output.contains("Scan your card"), "{}", output);
    assert!(output.contains("✓ Saved to CSV (Total: 1)"), "{}", output);
    assert!(output.contains("✓ Saved to CSV (Total: 3)"), "{}", output);
    assert!(output.contains("Logging stopped. Total attendance recorded: 3"), "{}", output);
}

#[test]
fn test_run_existing_store_is_appended() {
    let dir = create_temp_dir();
    let path: FPath = temp_dir_fpath(&dir, "attendance_log.csv");
    let config = config_with_store(&path);
    let result1 = run_session(&config, lines_to_steps(&[LINE_ADA]), RemoteSink::Disabled);
    assert_eq!(result1.summary.count(), 1);
    let result2 = run_session(&config, lines_to_steps(&[LINE_GRACE]), RemoteSink::Disabled);
    // the Session Counter starts at 0 for every session
    assert_eq!(result2.summary.count(), 1);
    assert!(result2.output.contains("Using existing CSV file: "), "{}", result2.output);

    let content = read_file(&path);
    assert_eq!(content.matches("Date,Time").count(), 1, "{:?}", content);
    assert_eq!(content.lines().count(), 3, "{:?}", content);
}

#[test_case("HELLO WORLD"; "not tagged")]
#[test_case("ATTENDANCE,x,y,OnlyOneField"; "4 tokens")]
#[test_case("ATTENDANCE,a,b,c,d,e,f,g"; "8 tokens")]
fn test_run_non_records_leave_store_unchanged(line: &str) {
    let dir = create_temp_dir();
    let path: FPath = temp_dir_fpath(&dir, "attendance_log.csv");
    let config = config_with_store(&path);
    let result = run_session(&config, lines_to_steps(&[line]), RemoteSink::Disabled);

    assert_eq!(result.summary.count(), 0);
    assert_eq!(read_file(&path), HEADER);
    assert!(result.output.contains(line), "{}", result.output);
    assert!(!result.output.contains("Saved to CSV"), "{}", result.output);
}

#[test]
fn test_run_channel_error() {
    let dir = create_temp_dir();
    let path: FPath = temp_dir_fpath(&dir, "attendance_log.csv");
    let config = config_with_store(&path);
    let mut steps = lines_to_steps(&[LINE_ADA]);
    steps.push(Step::Fail(ErrorKind::BrokenPipe));
    let result = run_session(&config, steps, RemoteSink::Disabled);

    match &result.end {
        SessionEnd::ChannelError(err) => assert_eq!(err.kind(), ErrorKind::BrokenPipe),
        end => panic!("expected ChannelError, got {:?}", end),
    }
    assert!(!result.end.is_success());
    assert!(result.released);
    assert_eq!(result.summary.count(), 1);
    assert!(read_file(&path).contains(ROW_ADA));
    assert_eq!(
        result.output.matches("✗ Device connection lost: scripted failure\n").count(),
        1,
        "{}",
        result.output
    );
    assert!(!result.output.contains("Logging stopped"), "{}", result.output);
}

#[test]
fn test_run_channel_closed() {
    let dir = create_temp_dir();
    let path: FPath = temp_dir_fpath(&dir, "attendance_log.csv");
    let config = config_with_store(&path);
    let result = run_session(&config, vec![Step::Closed], RemoteSink::Disabled);

    match &result.end {
        SessionEnd::ChannelError(err) => assert_eq!(err.kind(), ErrorKind::UnexpectedEof),
        end => panic!("expected ChannelError, got {:?}", end),
    }
    assert!(result.released);
}

#[test]
fn test_run_store_error_never_runs() {
    let dir = create_temp_dir();
    let path: FPath = temp_dir_fpath(&dir, "missing/attendance_log.csv");
    let config = config_with_store(&path);
    let result = run_session(&config, lines_to_steps(&[LINE_ADA]), RemoteSink::Disabled);

    match &result.end {
        SessionEnd::StoreError(err) => assert_eq!(err.kind(), ErrorKind::NotFound),
        end => panic!("expected StoreError, got {:?}", end),
    }
    assert!(result.released);
    assert_eq!(result.summary.count(), 0);
    assert_eq!(result.summary.linereader.LineReader_bytes, 0);
    // reported once, by the driver program
    assert!(!result.output.contains("Device connection lost"), "{}", result.output);
    assert!(!result.output.contains("Starting attendance logging"), "{}", result.output);
}

#[test]
fn test_run_remote_failure_does_not_affect_store() {
    let lines = [LINE_ADA, "noise", LINE_GRACE, LINE_ALAN];

    let dir1 = create_temp_dir();
    let path1: FPath = temp_dir_fpath(&dir1, "attendance_log.csv");
    let config1 = config_with_store(&path1);
    let result1 = run_session(&config1, lines_to_steps(&lines), RemoteSink::Disabled);

    let dir2 = create_temp_dir();
    let path2: FPath = temp_dir_fpath(&dir2, "attendance_log.csv");
    let config2 = config_with_store(&path2);
    let attempts = Rc::new(RefCell::new(0));
    let remote = RemoteSink::Enabled {
        client: Box::new(FailingForwarder { attempts: attempts.clone() }),
    };
    let result2 = run_session(&config2, lines_to_steps(&lines), remote);

    assert!(matches!(result2.end, SessionEnd::Interrupted), "{:?}", result2.end);
    assert_eq!(read_file(&path1), read_file(&path2));
    assert_eq!(result1.summary.count(), result2.summary.count());
    assert_eq!(result2.summary.count(), 3);
    assert_eq!(*attempts.borrow(), 3);
    assert_eq!(result2.summary.Session_forward_failures, 3);
    assert!(result2.output.contains("Spreadsheet upload failed: "), "{}", result2.output);
    assert!(result2.output.contains("Remote forwarding: Enabled (failing)"), "{}", result2.output);
}

#[test]
fn test_run_remote_forwards_each_persisted_record() {
    let dir = create_temp_dir();
    let path: FPath = temp_dir_fpath(&dir, "attendance_log.csv");
    let config = config_with_store(&path);
    let rows = Rc::new(RefCell::new(Vec::new()));
    let remote = RemoteSink::Enabled {
        client: Box::new(RecordingForwarder { rows: rows.clone() }),
    };
    let result = run_session(&config, lines_to_steps(&[LINE_ADA, "HELLO WORLD", LINE_GRACE]), remote);

    assert_eq!(result.summary.Session_records_forwarded, 2);
    let rows = rows.borrow();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][2], "Ada Lovelace");
    assert_eq!(rows[1][5], "MAT002");
    assert_eq!(result.output.matches("↳ Uploaded to spreadsheet").count(), 2, "{}", result.output);
}

#[test]
fn test_run_already_interrupted() {
    let dir = create_temp_dir();
    let path: FPath = temp_dir_fpath(&dir, "attendance_log.csv");
    let config = config_with_store(&path);
    let clock: FixedClock = clock_20260208_101500();
    let exit_early = Arc::new(AtomicBool::new(true));
    let released = Arc::new(AtomicBool::new(false));
    let channel = ScriptedChannel::new(lines_to_steps(&[LINE_ADA]), &exit_early, &released);
    let session = Session::new(&config, channel, &clock, RemoteSink::Disabled, printer_mem());
    let report = session.run(&exit_early);

    assert!(matches!(report.end, SessionEnd::Interrupted));
    assert_eq!(report.summary.count(), 0);
    assert!(released.load(Ordering::SeqCst));
    // the store is initialized before the interrupt is noticed
    assert_eq!(read_file(&path), HEADER);
}

fn session_started<'a>(
    config: &'a Config,
    clock: &'a FixedClock,
) -> Session<'a, ScriptedChannel, NoColor<Vec<u8>>> {
    let channel = ScriptedChannel::from_steps(vec![]);
    let mut session = Session::new(config, channel, clock, RemoteSink::Disabled, printer_mem());
    assert_eq!(session.start().unwrap(), StoreInit::Created);
    assert_eq!(session.state(), SessionState::Running);

    session
}

#[test]
fn test_start_twice_is_error() {
    let dir = create_temp_dir();
    let path: FPath = temp_dir_fpath(&dir, "attendance_log.csv");
    let config = config_with_store(&path);
    let clock: FixedClock = clock_20260208_101500();
    let mut session = session_started(&config, &clock);
    assert!(session.start().is_err());
    assert_eq!(session.state(), SessionState::Running);
}

#[test_case("", LineOutcome::Empty; "empty")]
#[test_case("Scan your card", LineOutcome::Echoed; "echoed")]
#[test_case("ATTENDANCE,x,y,OnlyOneField", LineOutcome::Rejected; "rejected")]
#[test_case(LINE_ADA, LineOutcome::Persisted; "persisted")]
fn test_process_line(
    line: &str,
    expect: LineOutcome,
) {
    let dir = create_temp_dir();
    let path: FPath = temp_dir_fpath(&dir, "attendance_log.csv");
    let config = config_with_store(&path);
    let clock: FixedClock = clock_20260208_101500();
    let mut session = session_started(&config, &clock);
    assert_eq!(session.process_line(line), expect);
    let expect_count: Count = match expect {
        LineOutcome::Persisted => 1,
        _ => 0,
    };
    assert_eq!(session.count(), expect_count);
}

#[test]
fn test_process_line_persist_failure_continues() {
    let dir = create_temp_dir();
    let path: FPath = temp_dir_fpath(&dir, "attendance_log.csv");
    let config = config_with_store(&path);
    let clock: FixedClock = clock_20260208_101500();
    let mut session = session_started(&config, &clock);
    assert_eq!(session.process_line(LINE_ADA), LineOutcome::Persisted);
    std::fs::remove_file(&path).unwrap();

    assert_eq!(session.process_line(LINE_GRACE), LineOutcome::PersistFailed);
    assert_eq!(session.count(), 1);
    assert_eq!(session.summary().Session_persist_failures, 1);
    assert_eq!(session.state(), SessionState::Running);
    // later lines are still handled
    assert_eq!(session.process_line("still here"), LineOutcome::Echoed);
}

#[test]
fn test_run_overlong_record_is_not_persisted() {
    let dir = create_temp_dir();
    let path: FPath = temp_dir_fpath(&dir, "attendance_log.csv");
    let config = config_with_store(&path);
    let identifier: String = "X".repeat(5000);
    let line_long = format!("ATTENDANCE,D,T,Ada,ada@example.com,+1555,{}", identifier);
    let result = run_session(&config, lines_to_steps(&[line_long.as_str(), LINE_GRACE]), RemoteSink::Disabled);

    assert!(matches!(result.end, SessionEnd::Interrupted), "{:?}", result.end);
    assert_eq!(result.summary.count(), 1);
    assert_eq!(result.summary.linereader.LineReader_lines_overlong, 1);
    assert_eq!(result.summary.Session_lines_echoed, 1);
    let content = read_file(&path);
    assert_eq!(content.lines().count(), 2, "{:?}", content);
    assert!(!content.contains("Ada"), "{:?}", content);
    assert!(content.contains("Grace Hopper"), "{:?}", content);
    assert!(!result.output.contains("XXXX"), "{}", result.output);
}

#[test]
fn test_session_states_exclude_searching() {
    let dir = create_temp_dir();
    let path: FPath = temp_dir_fpath(&dir, "attendance_log.csv");
    let config = config_with_store(&path);
    let clock: FixedClock = clock_20260208_101500();
    let channel = ScriptedChannel::from_steps(vec![]);
    let mut session = Session::new(&config, channel, &clock, RemoteSink::Disabled, printer_mem());
    assert_eq!(session.state(), SessionState::Connected);
    session.start().unwrap();
    assert_eq!(session.state(), SessionState::Running);
    assert_ne!(session.state(), SessionState::Searching);
}
