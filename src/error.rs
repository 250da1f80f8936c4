//! Error definitions shared by the controller, transport and script layers

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by padlink
#[derive(Debug, Error)]
pub enum PadError {
    /// Writing a packet to the byte sink failed (device unplugged, port closed)
    #[error("Transport error: {0}")]
    Transport(#[source] io::Error),

    /// Discovery found no serial device to talk to
    #[error("No serial devices available")]
    NoDevice,

    #[error("Failed to enumerate serial ports: {0}")]
    PortEnumeration(#[source] serialport::Error),

    #[error("Failed to open serial port {path}: {source}")]
    PortOpen {
        path: String,
        #[source]
        source: serialport::Error,
    },

    /// The operator picked something that is not in the port list
    #[error("Invalid port selection: {0}")]
    InvalidSelection(String),

    #[error("Unknown button: {0}")]
    UnknownButton(String),

    #[error("Unknown d-pad direction: {0}")]
    UnknownDirection(String),

    #[error("Malformed packet: {0}")]
    MalformedPacket(String),

    #[error("Invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("Cannot access config file {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A sequence script could not be read or does not describe a valid sequence
    #[error("Script error: {0}")]
    Script(String),
}
