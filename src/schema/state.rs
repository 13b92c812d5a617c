use serde::{Deserialize, Serialize};

/// Top-level phase of a verification session.
///
/// `FinalFail` and `FinalSuccess` are terminal until the session is
/// restarted, which always lands back on `Start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    Start,
    Loading,
    Playing,
    Verifying,
    FinalFail,
    FinalSuccess,
}

impl GameState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::FinalFail | Self::FinalSuccess)
    }
}

/// Per-session data owned by the progression controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub current_level_index: usize,
    pub fail_message: Option<String>,
    pub completion_code: Option<String>,
}
