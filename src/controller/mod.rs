//! Controller subsystem: emulated pad state and its wire encoding
//!
//! Layered bottom-up:
//!
//! 1. [`input`] - Button and d-pad vocabulary with wire values
//! 2. [`packet`] - Controller state and the 7-byte packet codec
//! 3. [`controller`] - State machine writing one packet per mutation
//!
//! # Architecture
//!
//! ```text
//! press/release/click ──► ControllerState ──► Packet ──► settle pause ──► ByteSink
//! ```
//!
//! Everything runs on the caller's thread; an operation returns only after
//! its packet has been written.

pub mod controller;
pub mod input;
pub mod packet;

pub use controller::{Controller, DEFAULT_SETTLE_INTERVAL};
pub use input::{Button, DPad};
pub use packet::{ControllerState, Packet, PACKET_LEN, STICK_CENTER};
