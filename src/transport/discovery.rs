//! Serial port discovery
//!
//! Finds the device the receiving firmware is attached to:
//!
//! ```text
//! PortFinder<Scanning> ──select──► PortFinder<Selected> ──open──► Box<dyn SerialPort>
//! ```
//!
//! No candidates is an error, a single candidate is taken as is, and several
//! candidates are offered to the operator on the terminal.

use crate::error::PadError;
use serialport::{SerialPort, SerialPortType};
use statum::{machine, state};
use std::fmt;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing::{debug, info, warn};

const WRITE_TIMEOUT: Duration = Duration::from_millis(500);

/// A serial device that could host the receiver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortCandidate {
    pub path: String,
    pub description: String,
}

impl PortCandidate {
    pub fn new(path: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for PortCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path, self.description)
    }
}

/// The port picked during discovery
#[derive(Debug, Clone)]
pub struct PortChoice {
    pub path: String,
}

#[state]
#[derive(Debug, Clone)]
pub enum DiscoveryState {
    Scanning,
    Selected(PortChoice),
}

#[machine]
#[derive(Debug)]
pub struct PortFinder<S: DiscoveryState> {
    candidates: Vec<PortCandidate>,
    baud_rate: u32,
}

impl<S: DiscoveryState> PortFinder<S> {
    pub fn candidates(&self) -> &[PortCandidate] {
        &self.candidates
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }
}

impl PortFinder<Scanning> {
    /// Enumerates the serial ports of this machine
    pub fn scan(baud_rate: u32) -> Result<Self, PadError> {
        let candidates = available_ports()?;
        info!("Found {} serial port(s)", candidates.len());
        Ok(Self::from_candidates(candidates, baud_rate))
    }

    pub fn from_candidates(candidates: Vec<PortCandidate>, baud_rate: u32) -> Self {
        for candidate in &candidates {
            debug!("Serial port candidate: {}", candidate);
        }
        Self::new(candidates, baud_rate)
    }

    /// Picks a port, asking the operator on the terminal when there is more than one
    pub fn select(self) -> Result<PortFinder<Selected>, PadError> {
        self.select_with(|candidates| {
            let stdin = io::stdin();
            prompt_selection(candidates, &mut stdin.lock(), &mut io::stderr())
        })
    }

    /// Like [`PortFinder::select`] with a custom chooser, which is only
    /// consulted for two or more candidates and returns an index into them.
    pub fn select_with<F>(self, choose: F) -> Result<PortFinder<Selected>, PadError>
    where
        F: FnOnce(&[PortCandidate]) -> Result<usize, PadError>,
    {
        let path = match self.candidates.as_slice() {
            [] => {
                warn!("No serial ports available");
                return Err(PadError::NoDevice);
            }
            [only] => {
                info!("Using the only available serial port {}", only);
                only.path.clone()
            }
            candidates => {
                let index = choose(candidates)?;
                let picked = candidates.get(index).ok_or_else(|| {
                    PadError::InvalidSelection(format!(
                        "index {} out of {} ports",
                        index,
                        candidates.len()
                    ))
                })?;
                info!("Operator selected serial port {}", picked);
                picked.path.clone()
            }
        };

        Ok(self.transition_with(PortChoice { path }))
    }
}

impl PortFinder<Selected> {
    pub fn path(&self) -> &str {
        self.get_state_data()
            .map(|choice| choice.path.as_str())
            .unwrap_or_default()
    }

    pub fn open(self) -> Result<Box<dyn SerialPort>, PadError> {
        open_port(self.path(), self.baud_rate)
    }
}

/// Lists the serial ports of this machine
pub fn available_ports() -> Result<Vec<PortCandidate>, PadError> {
    let ports = serialport::available_ports().map_err(PadError::PortEnumeration)?;
    Ok(ports
        .into_iter()
        .map(|port| {
            let description = describe(&port.port_type);
            PortCandidate::new(port.port_name, description)
        })
        .collect())
}

/// Opens `path` for writing packets
pub fn open_port(path: &str, baud_rate: u32) -> Result<Box<dyn SerialPort>, PadError> {
    info!("Opening serial port {} at {} baud", path, baud_rate);
    serialport::new(path, baud_rate)
        .timeout(WRITE_TIMEOUT)
        .open()
        .map_err(|source| PadError::PortOpen {
            path: path.to_string(),
            source,
        })
}

/// Prints a numbered list of `candidates` and reads the operator's choice.
/// Accepts a 1-based number or a device path and asks again on anything
/// else; end of input aborts.
pub fn prompt_selection<R: BufRead, W: Write>(
    candidates: &[PortCandidate],
    input: &mut R,
    output: &mut W,
) -> Result<usize, PadError> {
    let prompt_err = |e: io::Error| PadError::InvalidSelection(e.to_string());

    writeln!(output, "Please select the serial port to use:").map_err(prompt_err)?;
    for (idx, candidate) in candidates.iter().enumerate() {
        writeln!(output, "  [{}] {}", idx + 1, candidate).map_err(prompt_err)?;
    }

    loop {
        write!(output, "> ").map_err(prompt_err)?;
        output.flush().map_err(prompt_err)?;

        let mut line = String::new();
        if input.read_line(&mut line).map_err(prompt_err)? == 0 {
            return Err(PadError::InvalidSelection("no port selected".to_string()));
        }
        let answer = line.trim();

        if let Ok(number) = answer.parse::<usize>() {
            if (1..=candidates.len()).contains(&number) {
                return Ok(number - 1);
            }
        } else if let Some(idx) = candidates.iter().position(|c| c.path == answer) {
            return Ok(idx);
        }

        writeln!(
            output,
            "'{}' is not a valid choice, enter a number between 1 and {}",
            answer,
            candidates.len()
        )
        .map_err(prompt_err)?;
    }
}

fn describe(port_type: &SerialPortType) -> String {
    match port_type {
        SerialPortType::UsbPort(usb) => {
            let product = usb.product.as_deref().unwrap_or("USB serial device");
            format!("{} {:04x}:{:04x}", product, usb.vid, usb.pid)
        }
        SerialPortType::PciPort => "PCI serial port".to_string(),
        SerialPortType::BluetoothPort => "Bluetooth serial port".to_string(),
        SerialPortType::Unknown => "unknown".to_string(),
    }
}
