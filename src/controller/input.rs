//! Input vocabulary: the fixed button and d-pad symbols and their wire values.

use crate::error::PadError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Buttons of the emulated pad. Every button owns exactly one bit of the
/// 16-bit button mask, so any combination can be held at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Button {
    Y,
    B,
    A,
    X,
    L,
    R,
    ZL,
    ZR,
    Minus,
    Plus,
    LClick,
    RClick,
    Home,
    Share,
}

impl Button {
    pub const ALL: [Button; 14] = [
        Button::Y,
        Button::B,
        Button::A,
        Button::X,
        Button::L,
        Button::R,
        Button::ZL,
        Button::ZR,
        Button::Minus,
        Button::Plus,
        Button::LClick,
        Button::RClick,
        Button::Home,
        Button::Share,
    ];

    /// Bit of this button inside the button mask
    pub const fn mask(self) -> u16 {
        match self {
            Button::Y => 0x0001,
            Button::B => 0x0002,
            Button::A => 0x0004,
            Button::X => 0x0008,
            Button::L => 0x0010,
            Button::R => 0x0020,
            Button::ZL => 0x0040,
            Button::ZR => 0x0080,
            Button::Minus => 0x0100,
            Button::Plus => 0x0200,
            Button::LClick => 0x0400,
            Button::RClick => 0x0800,
            Button::Home => 0x1000,
            Button::Share => 0x2000,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Button::Y => "y",
            Button::B => "b",
            Button::A => "a",
            Button::X => "x",
            Button::L => "l",
            Button::R => "r",
            Button::ZL => "zl",
            Button::ZR => "zr",
            Button::Minus => "minus",
            Button::Plus => "plus",
            Button::LClick => "l_click",
            Button::RClick => "r_click",
            Button::Home => "home",
            Button::Share => "share",
        }
    }
}

impl From<Button> for u16 {
    fn from(button: Button) -> Self {
        button.mask()
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Button {
    type Err = PadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Button::ALL
            .into_iter()
            .find(|button| button.name() == wanted)
            .ok_or_else(|| PadError::UnknownButton(s.to_string()))
    }
}

impl TryFrom<String> for Button {
    type Error = PadError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// D-pad position. Unlike buttons the directions are mutually exclusive;
/// `Release` means no direction is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum DPad {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
    #[default]
    Release,
}

impl DPad {
    /// Clockwise starting at `Up`, followed by `Release`
    pub const ALL: [DPad; 9] = [
        DPad::Up,
        DPad::UpRight,
        DPad::Right,
        DPad::DownRight,
        DPad::Down,
        DPad::DownLeft,
        DPad::Left,
        DPad::UpLeft,
        DPad::Release,
    ];

    /// Wire value of the direction (0-7 clockwise from up, 8 = released)
    pub const fn value(self) -> u8 {
        match self {
            DPad::Up => 0x00,
            DPad::UpRight => 0x01,
            DPad::Right => 0x02,
            DPad::DownRight => 0x03,
            DPad::Down => 0x04,
            DPad::DownLeft => 0x05,
            DPad::Left => 0x06,
            DPad::UpLeft => 0x07,
            DPad::Release => 0x08,
        }
    }

    pub fn from_value(value: u8) -> Option<DPad> {
        DPad::ALL.into_iter().find(|dpad| dpad.value() == value)
    }

    pub const fn name(self) -> &'static str {
        match self {
            DPad::Up => "up",
            DPad::UpRight => "up_right",
            DPad::Right => "right",
            DPad::DownRight => "down_right",
            DPad::Down => "down",
            DPad::DownLeft => "down_left",
            DPad::Left => "left",
            DPad::UpLeft => "up_left",
            DPad::Release => "release",
        }
    }
}

impl From<DPad> for u8 {
    fn from(dpad: DPad) -> Self {
        dpad.value()
    }
}

impl fmt::Display for DPad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DPad {
    type Err = PadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        DPad::ALL
            .into_iter()
            .find(|dpad| dpad.name() == wanted)
            .ok_or_else(|| PadError::UnknownDirection(s.to_string()))
    }
}

impl TryFrom<String> for DPad {
    type Error = PadError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// "L-Click", "l click" and "L_CLICK" all name the same symbol
fn normalize(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_button_owns_a_single_distinct_bit() {
        let mut seen = 0u16;
        for button in Button::ALL {
            let mask = button.mask();
            assert_eq!(mask.count_ones(), 1, "{button} must be a single bit");
            assert_eq!(seen & mask, 0, "{button} shares a bit with another button");
            seen |= mask;
        }
        assert_eq!(seen, 0x3FFF);
    }

    #[test]
    fn test_face_button_masks() {
        assert_eq!(Button::Y.mask(), 0x0001);
        assert_eq!(Button::B.mask(), 0x0002);
        assert_eq!(Button::A.mask(), 0x0004);
        assert_eq!(Button::X.mask(), 0x0008);
        assert_eq!(Button::Home.mask(), 0x1000);
        assert_eq!(Button::Share.mask(), 0x2000);
        assert_eq!(u16::from(Button::Plus), 0x0200);
    }

    #[test]
    fn test_dpad_values_are_clockwise_from_up() {
        for (expected, dpad) in DPad::ALL.into_iter().enumerate() {
            assert_eq!(dpad.value() as usize, expected);
        }
        assert_eq!(DPad::Right.value(), 2);
        assert_eq!(DPad::default(), DPad::Release);
        assert_eq!(u8::from(DPad::Release), 8);
    }

    #[test]
    fn test_dpad_from_value() {
        assert_eq!(DPad::from_value(6), Some(DPad::Left));
        assert_eq!(DPad::from_value(8), Some(DPad::Release));
        assert_eq!(DPad::from_value(9), None);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("a".parse::<Button>().unwrap(), Button::A);
        assert_eq!("ZL".parse::<Button>().unwrap(), Button::ZL);
        assert_eq!("L-Click".parse::<Button>().unwrap(), Button::LClick);
        assert_eq!(" r_click ".parse::<Button>().unwrap(), Button::RClick);
        assert_eq!("up right".parse::<DPad>().unwrap(), DPad::UpRight);
        assert_eq!("RELEASE".parse::<DPad>().unwrap(), DPad::Release);
    }

    #[test]
    fn test_parse_unknown_names() {
        assert!(matches!(
            "start".parse::<Button>(),
            Err(PadError::UnknownButton(name)) if name == "start"
        ));
        assert!(matches!(
            "north".parse::<DPad>(),
            Err(PadError::UnknownDirection(_))
        ));
    }

    #[test]
    fn test_names_round_trip_through_display() {
        for button in Button::ALL {
            assert_eq!(button.to_string().parse::<Button>().unwrap(), button);
        }
        for dpad in DPad::ALL {
            assert_eq!(dpad.to_string().parse::<DPad>().unwrap(), dpad);
        }
    }
}
