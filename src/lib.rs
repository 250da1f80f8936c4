//! padlink drives a serial-attached gamepad emulator.
//!
//! Every change of the emulated pad is written as a 7-byte packet to a
//! microcontroller, which replays it as a USB gamepad report. Scripts of
//! clicks and waits automate menu navigation without a human at the pad.

pub mod config;
pub mod controller;
pub mod error;
pub mod sequence;
pub mod transport;

pub use config::Config;
pub use controller::{Button, Controller, ControllerState, DPad, Packet};
pub use error::PadError;
pub use sequence::{Sequence, Step};
pub use transport::ByteSink;
