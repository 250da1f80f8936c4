//! TOML sequence scripts
//!
//! ```toml
//! name = "wake"
//!
//! [[step]]
//! action = "click"
//! button = "l"
//! repeat = 4
//!
//! [[step]]
//! action = "wait"
//! ms = 500
//!
//! [[step]]
//! action = "click_dpad"
//! direction = "right"
//! ```
//!
//! Button and direction names are matched case-insensitively. `repeat`
//! defaults to 1, must not exceed
//! [`MAX_REPEAT`](super::MAX_REPEAT) and is accepted on every
//! action except `wait`. Unknown keys are rejected.

use super::{check_repeat, Sequence, Step};
use crate::controller::{Button, DPad};
use crate::error::PadError;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct ScriptFile {
    name: Option<String>,
    #[serde(rename = "step", default)]
    steps: Vec<ScriptStep>,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
enum ScriptStep {
    Click {
        button: Button,
        #[serde(default = "one")]
        repeat: u32,
    },
    Press {
        button: Button,
        #[serde(default = "one")]
        repeat: u32,
    },
    Release {
        button: Button,
        #[serde(default = "one")]
        repeat: u32,
    },
    ClickDpad {
        direction: DPad,
        #[serde(default = "one")]
        repeat: u32,
    },
    PressDpad {
        direction: DPad,
        #[serde(default = "one")]
        repeat: u32,
    },
    ReleaseDpad {
        #[serde(default = "one")]
        repeat: u32,
    },
    ReleaseAll {
        #[serde(default = "one")]
        repeat: u32,
    },
    Wait {
        ms: u64,
    },
}

fn one() -> u32 {
    1
}

impl ScriptStep {
    fn expand(self, index: usize) -> Result<Vec<Step>, PadError> {
        let (step, repeat) = match self {
            ScriptStep::Click { button, repeat } => (Step::Click(button), repeat),
            ScriptStep::Press { button, repeat } => (Step::Press(button), repeat),
            ScriptStep::Release { button, repeat } => (Step::Release(button), repeat),
            ScriptStep::ClickDpad { direction, repeat } => (Step::ClickDPad(direction), repeat),
            ScriptStep::PressDpad { direction, repeat } => (Step::PressDPad(direction), repeat),
            ScriptStep::ReleaseDpad { repeat } => (Step::ReleaseDPad, repeat),
            ScriptStep::ReleaseAll { repeat } => (Step::ReleaseAll, repeat),
            ScriptStep::Wait { ms } => (Step::Wait(Duration::from_millis(ms)), 1),
        };
        let count = check_repeat(repeat).map_err(|e| match e {
            PadError::Script(msg) => PadError::Script(format!("step {}: {}", index + 1, msg)),
            other => other,
        })?;
        Ok(vec![step; count])
    }
}

/// Parses a script. `fallback_name` is used when the script has no `name`.
pub fn parse(content: &str, fallback_name: &str) -> Result<Sequence, PadError> {
    let file: ScriptFile =
        toml::from_str(content).map_err(|e| PadError::Script(e.to_string()))?;

    if file.steps.is_empty() {
        return Err(PadError::Script("script contains no steps".to_string()));
    }

    let mut steps = Vec::new();
    for (index, step) in file.steps.into_iter().enumerate() {
        steps.extend(step.expand(index)?);
    }

    let name = file.name.unwrap_or_else(|| fallback_name.to_string());
    debug!("Parsed script '{}' into {} steps", name, steps.len());
    Ok(Sequence::new(name, steps))
}

pub fn load(path: &Path) -> Result<Sequence, PadError> {
    let content = fs::read_to_string(path)
        .map_err(|e| PadError::Script(format!("cannot read {}: {}", path.display(), e)))?;
    let fallback = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "script".to_string());

    let sequence = parse(&content, &fallback).map_err(|e| match e {
        PadError::Script(msg) => PadError::Script(format!("{}: {}", path.display(), msg)),
        other => other,
    })?;
    info!("Loaded script '{}' from {}", sequence.name, path.display());
    Ok(sequence)
}
