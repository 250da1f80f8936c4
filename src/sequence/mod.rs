//! Scripted input sequences
//!
//! A [`Sequence`] is an ordered list of controller actions and explicit
//! waits. Sequences are either built in code (see [`Sequence::wake`]) or
//! loaded from TOML scripts (see [`script`]).

pub mod script;

use crate::config::WakeConfig;
use crate::controller::{Button, Controller, DPad};
use crate::error::PadError;
use crate::transport::ByteSink;
use std::fmt;
use std::path::Path;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Largest repeat count a script step or the command line may ask for
pub const MAX_REPEAT: u32 = 10_000;

/// Checks a repeat count against `1..=MAX_REPEAT`
pub fn check_repeat(times: u32) -> Result<usize, PadError> {
    if times == 0 {
        return Err(PadError::Script("repeat must be at least 1".to_string()));
    }
    if times > MAX_REPEAT {
        return Err(PadError::Script(format!(
            "repeat {} exceeds the limit of {}",
            times, MAX_REPEAT
        )));
    }
    Ok(times as usize)
}

/// One action of a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Click(Button),
    Press(Button),
    Release(Button),
    ClickDPad(DPad),
    PressDPad(DPad),
    ReleaseDPad,
    ReleaseAll,
    Wait(Duration),
}

impl Step {
    /// Packets this step puts on the wire
    pub fn packet_count(&self) -> usize {
        match self {
            Step::Click(_) | Step::ClickDPad(_) => 2,
            Step::Wait(_) => 0,
            _ => 1,
        }
    }

    pub fn apply<S: ByteSink>(&self, controller: &mut Controller<S>) -> Result<(), PadError> {
        match *self {
            Step::Click(button) => controller.click(button),
            Step::Press(button) => controller.press(button),
            Step::Release(button) => controller.release(button),
            Step::ClickDPad(direction) => controller.click_dpad(direction),
            Step::PressDPad(direction) => controller.press_dpad(direction),
            Step::ReleaseDPad => controller.release_dpad(),
            Step::ReleaseAll => controller.release_all(),
            Step::Wait(duration) => {
                thread::sleep(duration);
                Ok(())
            }
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Click(button) => write!(f, "click {button}"),
            Step::Press(button) => write!(f, "press {button}"),
            Step::Release(button) => write!(f, "release {button}"),
            Step::ClickDPad(direction) => write!(f, "click d-pad {direction}"),
            Step::PressDPad(direction) => write!(f, "press d-pad {direction}"),
            Step::ReleaseDPad => write!(f, "release d-pad"),
            Step::ReleaseAll => write!(f, "release all"),
            Step::Wait(duration) => write!(f, "wait {}ms", duration.as_millis()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub name: String,
    pub steps: Vec<Step>,
}

impl Sequence {
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    /// `step` repeated `times` times
    pub fn repeated(name: impl Into<String>, step: Step, times: u32) -> Result<Self, PadError> {
        let count = check_repeat(times)?;
        Ok(Self::new(name, vec![step; count]))
    }

    /// Wakes the console and confirms the controller pairing screen:
    /// tap L several times, pause, click A, pause, click A, pause.
    pub fn wake(config: &WakeConfig) -> Self {
        let taps = config.shoulder_taps.min(MAX_REPEAT) as usize;
        let mut steps = vec![Step::Click(Button::L); taps];
        steps.extend([
            Step::Wait(Duration::from_millis(config.first_pause_ms)),
            Step::Click(Button::A),
            Step::Wait(Duration::from_millis(config.second_pause_ms)),
            Step::Click(Button::A),
            Step::Wait(Duration::from_millis(config.final_pause_ms)),
        ]);
        Self::new("wake", steps)
    }

    pub fn load(path: &Path) -> Result<Self, PadError> {
        script::load(path)
    }

    pub fn packet_count(&self) -> usize {
        self.steps.iter().map(Step::packet_count).sum()
    }

    /// Sum of explicit waits, settle pauses not included
    pub fn wait_time(&self) -> Duration {
        self.steps
            .iter()
            .filter_map(|step| match step {
                Step::Wait(duration) => Some(*duration),
                _ => None,
            })
            .sum()
    }

    /// Runs every step in order on `controller`. Stops at the first transport
    /// error and returns it; the remaining steps are skipped.
    pub fn run<S: ByteSink>(&self, controller: &mut Controller<S>) -> Result<(), PadError> {
        info!(
            "Running sequence '{}' ({} steps, {} packets)",
            self.name,
            self.steps.len(),
            self.packet_count()
        );
        for (idx, step) in self.steps.iter().enumerate() {
            debug!("[{}] step {}/{}: {}", self.name, idx + 1, self.steps.len(), step);
            step.apply(controller)?;
        }
        info!("Sequence '{}' finished", self.name);
        Ok(())
    }
}
