// src/debug/mod.rs

//! Printer macros and helper functions for diagnostics and testing.

#[cfg(test)]
pub mod helpers;
pub mod printers;
