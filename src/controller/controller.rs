//! Controller state machine
//!
//! Holds the button mask and d-pad position of the emulated pad and turns
//! every mutation into exactly one packet on the byte sink. Each write is
//! preceded by a blocking settle pause so the receiver samples whole packets.

use super::input::{Button, DPad};
use super::packet::{ControllerState, Packet};
use crate::error::PadError;
use crate::transport::ByteSink;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info};

/// Pause before each write, tuned for the receiving firmware's polling rate
pub const DEFAULT_SETTLE_INTERVAL: Duration = Duration::from_millis(70);

/// Emulated pad bound to an exclusively owned byte sink
///
/// ```
/// use padlink::controller::{Button, Controller};
/// use padlink::transport::RecordingSink;
/// use std::time::Duration;
///
/// let mut pad = Controller::with_settle_interval(RecordingSink::new(), Duration::ZERO);
/// pad.click(Button::A).unwrap();
/// assert_eq!(pad.sink().len(), 2);
/// ```
#[derive(Debug)]
pub struct Controller<S: ByteSink> {
    sink: S,
    state: ControllerState,
    settle_interval: Duration,
    packets_sent: u64,
}

impl<S: ByteSink> Controller<S> {
    pub fn new(sink: S) -> Self {
        Self::with_settle_interval(sink, DEFAULT_SETTLE_INTERVAL)
    }

    pub fn with_settle_interval(sink: S, settle_interval: Duration) -> Self {
        info!(
            "Creating controller with settle interval {:?}",
            settle_interval
        );
        Self {
            sink,
            state: ControllerState::default(),
            settle_interval,
            packets_sent: 0,
        }
    }

    /// Holds `button` down. Pressing a held button still transmits.
    pub fn press(&mut self, button: Button) -> Result<(), PadError> {
        debug!("Press {}", button);
        self.state.press(button);
        self.transmit()
    }

    /// Lets go of `button`. Other bits are untouched even if `button` was not held.
    pub fn release(&mut self, button: Button) -> Result<(), PadError> {
        debug!("Release {}", button);
        self.state.release(button);
        self.transmit()
    }

    /// Press followed by release: two packets
    pub fn click(&mut self, button: Button) -> Result<(), PadError> {
        self.press(button)?;
        self.release(button)
    }

    /// The direction is not validated; passing `DPad::Release` behaves like
    /// [`Controller::release_dpad`].
    pub fn press_dpad(&mut self, direction: DPad) -> Result<(), PadError> {
        debug!("Press d-pad {}", direction);
        self.state.dpad = direction;
        self.transmit()
    }

    pub fn release_dpad(&mut self) -> Result<(), PadError> {
        debug!("Release d-pad");
        self.state.dpad = DPad::Release;
        self.transmit()
    }

    pub fn click_dpad(&mut self, direction: DPad) -> Result<(), PadError> {
        self.press_dpad(direction)?;
        self.release_dpad()
    }

    /// Drops every button and the d-pad regardless of the current state,
    /// then transmits once.
    pub fn release_all(&mut self) -> Result<(), PadError> {
        debug!("Release all inputs");
        self.state.reset();
        self.transmit()
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn settle_interval(&self) -> Duration {
        self.settle_interval
    }

    pub fn packets_sent(&self) -> u64 {
        self.packets_sent
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Gives the sink back; closing it is up to the caller
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn transmit(&mut self) -> Result<(), PadError> {
        let packet = Packet::encode(&self.state);
        thread::sleep(self.settle_interval);

        match self.sink.send(packet.as_ref()) {
            Ok(()) => {
                self.packets_sent += 1;
                debug!("Sent packet #{}: {}", self.packets_sent, packet);
                Ok(())
            }
            Err(e) => {
                error!("Failed to send packet {}: {}", packet, e);
                Err(PadError::Transport(e))
            }
        }
    }
}
