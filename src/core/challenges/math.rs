use rand::seq::SliceRandom;
use rand::RngCore;

use super::{Challenge, ChallengeEffect, Latch};
use crate::core::textgen::{TextRequest, EMPTY_ANSWER};
use crate::core::view::ChallengeView;
use crate::schema::challenge::Behavior;
use crate::schema::interaction::Interaction;

// The displayed equation and the accepted answer are independent constants;
// the answer is not derived from the equation.
pub const EQUATION: &str = "(x-2)²(x-3)² + (x-2)²(x-3) + (x-3)² = 0";
pub const CORRECT_ANSWER: i64 = 3;

const INITIAL_FEEDBACK: &str = "Solve for x.";
const FIRST_HINT: [i64; 4] = [2, 5, 3, -1];
const SECOND_HINT: [i64; 2] = [5, 3];
const FIRST_HINT_AT: u32 = 4;
const SECOND_HINT_AT: u32 = 6;
const GIVEAWAY_AT: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Awaiting {
    Submission,
    Choice(i64),
}

/// Solve for x. Wrong answers are mocked, never failed; the choices narrow
/// until only the answer is left.
#[derive(Debug)]
pub struct MathPuzzle {
    draft: String,
    wrong_attempts: u32,
    feedback: Option<String>,
    options: Option<Vec<i64>>,
    awaiting: Option<Awaiting>,
    latch: Latch,
}

impl Default for MathPuzzle {
    fn default() -> Self {
        Self {
            draft: String::new(),
            wrong_attempts: 0,
            feedback: Some(INITIAL_FEEDBACK.to_string()),
            options: None,
            awaiting: None,
            latch: Latch::default(),
        }
    }
}

impl MathPuzzle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wrong_attempts(&self) -> u32 {
        self.wrong_attempts
    }

    pub fn options(&self) -> Option<&[i64]> {
        self.options.as_deref()
    }

    pub fn is_waiting(&self) -> bool {
        self.awaiting.is_some()
    }

    fn submit(&mut self) -> Vec<ChallengeEffect> {
        if self.draft.trim() == CORRECT_ANSWER.to_string() {
            return self.latch.resolve(true);
        }

        let answer = match self.draft.trim() {
            "" => EMPTY_ANSWER.to_string(),
            other => other.to_string(),
        };
        self.draft.clear();
        self.awaiting = Some(Awaiting::Submission);
        vec![ChallengeEffect::Request(TextRequest::MathTaunt { answer })]
    }

    fn choose(&mut self, value: i64) -> Vec<ChallengeEffect> {
        if value == CORRECT_ANSWER {
            return self.latch.resolve(true);
        }
        let offered = self
            .options
            .as_ref()
            .is_some_and(|options| options.contains(&value));
        if !offered {
            tracing::debug!(value, "choice not on offer ignored");
            return Vec::new();
        }

        self.awaiting = Some(Awaiting::Choice(value));
        vec![ChallengeEffect::Request(TextRequest::MathTaunt {
            answer: value.to_string(),
        })]
    }

    /// Narrow the offered answers after a wrong free-form submission.
    fn escalate(&mut self, rng: &mut dyn RngCore) {
        let hint: Option<Vec<i64>> = match self.wrong_attempts {
            FIRST_HINT_AT => Some(FIRST_HINT.to_vec()),
            SECOND_HINT_AT => Some(SECOND_HINT.to_vec()),
            n if n >= GIVEAWAY_AT => Some(vec![CORRECT_ANSWER]),
            _ => None,
        };
        if let Some(mut options) = hint {
            options.shuffle(rng);
            self.options = Some(options);
        }
    }
}

impl Challenge for MathPuzzle {
    fn behavior(&self) -> Behavior {
        Behavior::MathPuzzle
    }

    fn handle(&mut self, interaction: Interaction, _rng: &mut dyn RngCore) -> Vec<ChallengeEffect> {
        if self.latch.is_resolved() || self.awaiting.is_some() {
            return Vec::new();
        }
        match interaction {
            Interaction::Type { text } => {
                self.draft = text;
                Vec::new()
            }
            Interaction::Verify => self.submit(),
            Interaction::Choose { value } => self.choose(value),
            _ => Vec::new(),
        }
    }

    fn text_ready(&mut self, text: String, rng: &mut dyn RngCore) -> Vec<ChallengeEffect> {
        let Some(awaiting) = self.awaiting.take() else {
            return Vec::new();
        };
        self.feedback = Some(text);
        match awaiting {
            Awaiting::Submission => {
                self.wrong_attempts += 1;
                self.escalate(rng);
            }
            Awaiting::Choice(value) => {
                if let Some(options) = self.options.as_mut() {
                    options.retain(|o| *o != value);
                }
            }
        }
        Vec::new()
    }

    fn view(&self) -> ChallengeView {
        ChallengeView::MathPuzzle {
            equation: EQUATION,
            feedback: self.feedback.clone(),
            pending: self.awaiting.is_some(),
            draft: self.draft.clone(),
            options: self.options.clone(),
        }
    }
}
