// src/printer/mod.rs

//! Printing for the operator console.

pub mod printers;
