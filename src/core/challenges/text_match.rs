use rand::RngCore;

use super::{Challenge, ChallengeEffect, Latch};
use crate::core::view::ChallengeView;
use crate::schema::challenge::Behavior;
use crate::schema::interaction::Interaction;

/// Target phrase used when a definition carries no text payload.
pub const DEFAULT_TARGET: &str = "human";

/// Type the displayed phrase back. One shot: a mismatch fails the level.
#[derive(Debug)]
pub struct TextMatch {
    target: String,
    draft: String,
    latch: Latch,
}

impl TextMatch {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            draft: String::new(),
            latch: Latch::default(),
        }
    }

    /// Case-insensitive comparison with surrounding whitespace ignored.
    pub fn matches(&self, input: &str) -> bool {
        input.trim().to_lowercase() == self.target.trim().to_lowercase()
    }
}

impl Challenge for TextMatch {
    fn behavior(&self) -> Behavior {
        Behavior::ExactTextMatch
    }

    fn handle(&mut self, interaction: Interaction, _rng: &mut dyn RngCore) -> Vec<ChallengeEffect> {
        if self.latch.is_resolved() {
            return Vec::new();
        }
        match interaction {
            Interaction::Type { text } => {
                self.draft = text;
                Vec::new()
            }
            Interaction::Verify => {
                let passed = self.matches(&self.draft);
                self.latch.resolve(passed)
            }
            _ => Vec::new(),
        }
    }

    fn view(&self) -> ChallengeView {
        ChallengeView::TextMatch {
            target: self.target.clone(),
            draft: self.draft.clone(),
        }
    }
}
