// src/device/channel.rs

//! Open the device channel.

use crate::config::Config;

use std::io::Result;
use std::thread;

use ::serialport::SerialPort;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// An open serial port. Implements [`Read`] with the configured timeout.
///
/// The port is closed when dropped.
///
/// [`Read`]: std::io::Read
pub type DeviceChannel = Box<dyn SerialPort>;

/// Open serial port `device` at the configured baud rate and read timeout.
pub fn open_channel(
    device: &str,
    config: &Config,
) -> Result<DeviceChannel> {
    defn!("({:?}, baud {}, timeout {:?})", device, config.baud_rate, config.read_timeout);
    let channel: DeviceChannel = ::serialport::new(device, config.baud_rate)
        .timeout(config.read_timeout)
        .open()?;
    defx!();

    Ok(channel)
}

/// Wait for the device to finish its reset after the port was opened.
pub fn settle(config: &Config) {
    defñ!("sleep {:?}", config.settle_delay);
    thread::sleep(config.settle_delay);
}
