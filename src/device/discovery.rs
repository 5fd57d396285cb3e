// src/device/discovery.rs

//! Find the attendance device among the host's serial ports.

use crate::common::FPath;
use crate::config::DeviceSignatures;

use std::fmt;
use std::io::Result;

use ::serialport::{SerialPortInfo, SerialPortType};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Description used when the operating system offers none.
pub const DESCRIPTION_NONE: &str = "n/a";

/// One enumerated serial port.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PortDescriptor {
    /// device name or path, e.g. `/dev/ttyACM0` or `COM3`
    pub device: FPath,
    /// human-readable description, e.g. `Arduino Uno`
    pub description: String,
}

impl PortDescriptor {
    pub fn new(
        device: &str,
        description: &str,
    ) -> PortDescriptor {
        PortDescriptor {
            device: FPath::from(device),
            description: String::from(description),
        }
    }

    /// Does this port match any of the `signatures`?
    pub fn matches(
        &self,
        signatures: &DeviceSignatures,
    ) -> bool {
        signatures
            .description_markers
            .iter()
            .any(|marker| self.description.contains(marker.as_str()))
            || signatures
                .device_markers
                .iter()
                .any(|marker| self.device.contains(marker.as_str()))
    }
}

impl fmt::Display for PortDescriptor {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        write!(f, "{}: {}", self.device, self.description)
    }
}

impl From<&SerialPortInfo> for PortDescriptor {
    fn from(info: &SerialPortInfo) -> Self {
        let description: String = match &info.port_type {
            SerialPortType::UsbPort(usb) => {
                match (&usb.product, &usb.manufacturer) {
                    (Some(product), _) => product.clone(),
                    (None, Some(manufacturer)) => format!("{} USB device", manufacturer),
                    (None, None) => format!("USB VID:PID={:04X}:{:04X}", usb.vid, usb.pid),
                }
            }
            SerialPortType::PciPort => String::from("PCI serial port"),
            SerialPortType::BluetoothPort => String::from("Bluetooth serial port"),
            SerialPortType::Unknown => String::from(DESCRIPTION_NONE),
        };

        PortDescriptor::new(&info.port_name, &description)
    }
}

/// Enumerate the host's serial ports.
pub fn available_ports() -> Result<Vec<PortDescriptor>> {
    defn!();
    let infos: Vec<SerialPortInfo> = ::serialport::available_ports()?;
    let ports: Vec<PortDescriptor> = infos
        .iter()
        .map(PortDescriptor::from)
        .collect();
    defx!("found {} ports", ports.len());

    Ok(ports)
}

/// Select the first port in `ports` matching `signatures`.
pub fn select_port<'a>(
    ports: &'a [PortDescriptor],
    signatures: &DeviceSignatures,
) -> Option<&'a PortDescriptor> {
    let found = ports
        .iter()
        .find(|port| port.matches(signatures));
    defñ!("{:?}", found);

    found
}
