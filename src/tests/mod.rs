// src/tests/mod.rs

//! Tests for _attendlib_.
//!
//! Tests are placed at `src/tests/`, inside the `attendlib`, for
//! crate-internal visibility. The driver program is exercised from the
//! top-level `tests/` directory.

pub mod common;
pub mod session_tests;
