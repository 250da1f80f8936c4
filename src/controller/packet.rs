//! Controller state and its 7-byte wire packet
//!
//! ```text
//! offset  0        1        2     3    4    5    6
//!         btn lo   btn hi   dpad  LX   LY   RX   RY
//! ```
//!
//! The analog sticks are never driven and always report the centre value.

use super::input::{Button, DPad};
use crate::error::PadError;
use std::fmt;

/// Size of one packet on the wire
pub const PACKET_LEN: usize = 7;

/// Centre position of an analog stick axis
pub const STICK_CENTER: u8 = 128;

/// Aggregate state of the emulated pad: the held buttons and the d-pad position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    pub buttons: u16,
    pub dpad: DPad,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            buttons: 0,
            dpad: DPad::Release,
        }
    }
}

impl ControllerState {
    pub fn press(&mut self, button: Button) {
        self.buttons |= button.mask();
    }

    /// Clears the button's bit. Releasing a button that is not held is a no-op.
    pub fn release(&mut self, button: Button) {
        self.buttons &= !button.mask();
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.buttons & button.mask() != 0
    }

    /// Buttons currently held, in mask order
    pub fn pressed(&self) -> Vec<Button> {
        Button::ALL
            .into_iter()
            .filter(|button| self.is_pressed(*button))
            .collect()
    }

    /// Back to nothing held and the d-pad released
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn to_packet(&self) -> Packet {
        Packet::encode(self)
    }
}

/// One serialized snapshot of [`ControllerState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet([u8; PACKET_LEN]);

impl Packet {
    pub fn encode(state: &ControllerState) -> Self {
        let [low, high] = state.buttons.to_le_bytes();
        Self([
            low,
            high,
            state.dpad.value(),
            STICK_CENTER,
            STICK_CENTER,
            STICK_CENTER,
            STICK_CENTER,
        ])
    }

    /// Parses raw bytes back into a state. Used to describe packets in dry runs
    /// and logs; the receiving device never answers with packets.
    pub fn decode(bytes: &[u8]) -> Result<ControllerState, PadError> {
        let bytes: [u8; PACKET_LEN] = bytes.try_into().map_err(|_| {
            PadError::MalformedPacket(format!(
                "expected {} bytes, got {}",
                PACKET_LEN,
                bytes.len()
            ))
        })?;

        let buttons = u16::from_le_bytes([bytes[0], bytes[1]]);
        let unknown_bits = buttons & !known_button_bits();
        if unknown_bits != 0 {
            return Err(PadError::MalformedPacket(format!(
                "unknown button bits {unknown_bits:#06x}"
            )));
        }

        let dpad = DPad::from_value(bytes[2]).ok_or_else(|| {
            PadError::MalformedPacket(format!("d-pad value {} out of range", bytes[2]))
        })?;

        Ok(ControllerState { buttons, dpad })
    }

    pub fn as_bytes(&self) -> &[u8; PACKET_LEN] {
        &self.0
    }

    pub fn buttons(&self) -> u16 {
        u16::from_le_bytes([self.0[0], self.0[1]])
    }

    pub fn dpad_value(&self) -> u8 {
        self.0[2]
    }
}

impl AsRef<[u8]> for Packet {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, byte) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

fn known_button_bits() -> u16 {
    Button::ALL.iter().fold(0, |acc, button| acc | button.mask())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_packet() {
        let packet = ControllerState::default().to_packet();
        assert_eq!(packet.as_bytes(), &[0x00, 0x00, 0x08, 128, 128, 128, 128]);
    }

    #[test]
    fn test_buttons_split_into_low_and_high_byte() {
        let mut state = ControllerState::default();
        state.press(Button::A);
        state.press(Button::Home);
        let packet = state.to_packet();
        assert_eq!(packet.as_bytes()[0], 0x04);
        assert_eq!(packet.as_bytes()[1], 0x10);
        assert_eq!(packet.buttons(), 0x1004);
    }

    #[test]
    fn test_dpad_byte() {
        let state = ControllerState {
            buttons: 0,
            dpad: DPad::DownLeft,
        };
        assert_eq!(state.to_packet().dpad_value(), 5);
    }

    #[test]
    fn test_release_of_unpressed_button_keeps_other_bits() {
        let mut state = ControllerState::default();
        state.press(Button::X);
        state.release(Button::A);
        assert_eq!(state.buttons, Button::X.mask());
        state.release(Button::A);
        assert_eq!(state.buttons, Button::X.mask());
    }

    #[test]
    fn test_pressed_lists_held_buttons() {
        let mut state = ControllerState::default();
        state.press(Button::ZR);
        state.press(Button::B);
        assert_eq!(state.pressed(), vec![Button::B, Button::ZR]);
        state.reset();
        assert!(state.pressed().is_empty());
        assert_eq!(state.dpad, DPad::Release);
    }

    #[test]
    fn test_decode_valid_packet() {
        let state = Packet::decode(&[0x0C, 0x00, 0x02, 128, 128, 128, 128]).unwrap();
        assert!(state.is_pressed(Button::A));
        assert!(state.is_pressed(Button::X));
        assert_eq!(state.dpad, DPad::Right);
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(matches!(
            Packet::decode(&[0x00, 0x00, 0x08]),
            Err(PadError::MalformedPacket(_))
        ));
        assert!(matches!(
            Packet::decode(&[0x00, 0x00, 0x09, 128, 128, 128, 128]),
            Err(PadError::MalformedPacket(_))
        ));
        assert!(matches!(
            Packet::decode(&[0x00, 0x80, 0x08, 128, 128, 128, 128]),
            Err(PadError::MalformedPacket(_))
        ));
    }

    #[test]
    fn test_display_is_hex() {
        let mut state = ControllerState::default();
        state.press(Button::A);
        assert_eq!(state.to_packet().to_string(), "04 00 08 80 80 80 80");
    }
}
