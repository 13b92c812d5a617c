use rand::RngCore;

use super::{Challenge, ChallengeEffect, Latch, GRID_SIZE};
use crate::core::view::ChallengeView;
use crate::schema::challenge::Behavior;
use crate::schema::interaction::Interaction;

/// "Click all the differences" over nine copies of the same picture. There
/// are none, so verifying is always right.
#[derive(Debug, Default)]
pub struct IdenticalImages {
    latch: Latch,
}

impl IdenticalImages {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Challenge for IdenticalImages {
    fn behavior(&self) -> Behavior {
        Behavior::AlwaysTrueTrick
    }

    fn handle(&mut self, interaction: Interaction, _rng: &mut dyn RngCore) -> Vec<ChallengeEffect> {
        match interaction {
            Interaction::Verify => self.latch.resolve(true),
            _ => Vec::new(),
        }
    }

    fn view(&self) -> ChallengeView {
        ChallengeView::IdenticalImages { tiles: GRID_SIZE }
    }
}
