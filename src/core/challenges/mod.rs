//! Challenge runners: one implementation per [`Behavior`].
//!
//! A runner is mounted fresh for every level and dropped when the level is
//! left. It talks to the controller only through [`ChallengeEffect`]s: it
//! may ask for a timer, ask for generated text, and report completion at
//! most once.

mod checkbox;
mod evasive;
mod identical;
mod image_grid;
mod math;
mod slider;
mod text_match;
mod vague;

use rand::RngCore;
use std::time::Duration;

use crate::config::Pacing;
use crate::core::textgen::TextRequest;
use crate::core::view::ChallengeView;
use crate::schema::challenge::{Behavior, ChallengeDefinition};
use crate::schema::interaction::Interaction;

pub use checkbox::Checkbox;
pub use evasive::{relocate, EvasiveButton, MAX_OFFSET};
pub use identical::IdenticalImages;
pub use image_grid::ImageGrid;
pub use math::{MathPuzzle, CORRECT_ANSWER, EQUATION};
pub use slider::{drift, Slider, SUCCESS_THRESHOLD};
pub use text_match::{TextMatch, DEFAULT_TARGET};
pub use vague::VagueInstruction;

/// Number of items in every grid-shaped challenge.
pub const GRID_SIZE: usize = 9;

/// A request from a runner to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum ChallengeEffect {
    /// The challenge is resolved. Emitted at most once per runner.
    Complete(bool),
    /// Call [`Challenge::timer_elapsed`] after this delay.
    Wait(Duration),
    /// Generate text and hand it to [`Challenge::text_ready`].
    Request(TextRequest),
}

/// A live challenge.
pub trait Challenge {
    fn behavior(&self) -> Behavior;

    /// Called once, right after mounting.
    fn start(&mut self) -> Vec<ChallengeEffect> {
        Vec::new()
    }

    fn handle(&mut self, interaction: Interaction, rng: &mut dyn RngCore) -> Vec<ChallengeEffect>;

    fn timer_elapsed(&mut self) -> Vec<ChallengeEffect> {
        Vec::new()
    }

    fn text_ready(&mut self, _text: String, _rng: &mut dyn RngCore) -> Vec<ChallengeEffect> {
        Vec::new()
    }

    fn view(&self) -> ChallengeView;
}

/// Build the runner for a definition.
pub fn mount(def: &ChallengeDefinition, pacing: &Pacing) -> Box<dyn Challenge> {
    match def.behavior {
        Behavior::TrivialConfirm => Box::new(Checkbox::new(pacing.confirm())),
        Behavior::ExactTextMatch => {
            Box::new(TextMatch::new(def.target_text().unwrap_or(DEFAULT_TARGET)))
        }
        Behavior::SubsetSelection => Box::new(ImageGrid::from_payload(def.payload.as_ref())),
        Behavior::AdversarialSlider => Box::new(Slider::new()),
        Behavior::MathPuzzle => Box::new(MathPuzzle::new()),
        Behavior::AlwaysTrueTrick => Box::new(IdenticalImages::new()),
        Behavior::NonsenseInstruction => Box::new(VagueInstruction::new(def.level)),
        Behavior::EvasiveTarget => Box::new(EvasiveButton::new()),
    }
}

/// One-shot completion guard shared by the runners.
#[derive(Debug, Default)]
pub(crate) struct Latch {
    fired: bool,
}

impl Latch {
    pub(crate) fn resolve(&mut self, success: bool) -> Vec<ChallengeEffect> {
        if self.fired {
            return Vec::new();
        }
        self.fired = true;
        vec![ChallengeEffect::Complete(success)]
    }

    pub(crate) fn is_resolved(&self) -> bool {
        self.fired
    }
}
