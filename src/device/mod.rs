// src/device/mod.rs

//! Finding and opening the serial device that sends attendance lines.

pub mod channel;
pub mod discovery;
