/// Presentation snapshots handed to hosts. Pure data; hosts decide how to
/// draw them.

use serde::Serialize;

pub const FOOTER: &str = "Powered by CRAPCHA technology";
pub const DEFAULT_FAIL_MESSAGE: &str = "System integrity compromised. Restarting.";

/// What one mounted challenge currently looks like.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum ChallengeView {
    Checkbox {
        checked: bool,
        label: &'static str,
    },
    TextMatch {
        target: String,
        draft: String,
    },
    ImageGrid {
        keywords: Vec<String>,
        selected: Vec<usize>,
    },
    Slider {
        position: f64,
        dragging: bool,
        hint_visible: bool,
    },
    MathPuzzle {
        equation: &'static str,
        feedback: Option<String>,
        pending: bool,
        draft: String,
        /// `None` while free-form entry is still offered.
        options: Option<Vec<i64>>,
    },
    IdenticalImages {
        tiles: usize,
    },
    VagueInstruction {
        /// `None` while the instruction is still being generated.
        instruction: Option<String>,
        tiles: usize,
        image_seed: u32,
    },
    EvasiveButton {
        offset_x: f64,
        offset_y: f64,
    },
}

/// The whole screen for the current game state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum ScreenView {
    Start {
        title: &'static str,
        blurb: &'static str,
    },
    Loading {
        message: &'static str,
    },
    Playing {
        level: u32,
        title: String,
        instruction: Option<String>,
        /// Fraction of the sequence reached, counting the current level.
        progress: f64,
        challenge: ChallengeView,
    },
    Verifying {
        message: &'static str,
    },
    FinalFail {
        headline: &'static str,
        message: String,
    },
    FinalSuccess {
        headline: &'static str,
        note: &'static str,
        code: String,
    },
    /// The controller reached a state it cannot draw.
    Error {
        message: String,
    },
}

impl ScreenView {
    pub fn start() -> Self {
        Self::Start {
            title: "Human Verification Required",
            blurb: "Please complete the following challenges to prove you are not a robot.",
        }
    }

    pub fn loading() -> Self {
        Self::Loading {
            message: "Initializing verification module...",
        }
    }

    pub fn verifying() -> Self {
        Self::Verifying {
            message: "Verified.",
        }
    }

    /// Falls back to [`DEFAULT_FAIL_MESSAGE`] when the taunt is blank.
    pub fn final_fail(message: Option<&str>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_FAIL_MESSAGE);
        Self::FinalFail {
            headline: "ROBOT DETECTED",
            message: message.to_string(),
        }
    }

    pub fn final_success(code: &str) -> Self {
        Self::FinalSuccess {
            headline: "Verification Complete",
            note: "Don't forget to write down your service ticket for the off-site location.",
            code: code.to_string(),
        }
    }

    pub fn footer(&self) -> &'static str {
        FOOTER
    }
}
