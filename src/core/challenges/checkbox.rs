use rand::RngCore;
use std::time::Duration;

use super::{Challenge, ChallengeEffect, Latch};
use crate::core::view::ChallengeView;
use crate::schema::challenge::Behavior;
use crate::schema::interaction::Interaction;

/// "I'm not a robot". Any input ticks the box, which passes after a short
/// pause.
#[derive(Debug)]
pub struct Checkbox {
    delay: Duration,
    checked: bool,
    latch: Latch,
}

impl Checkbox {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            checked: false,
            latch: Latch::default(),
        }
    }
}

impl Challenge for Checkbox {
    fn behavior(&self) -> Behavior {
        Behavior::TrivialConfirm
    }

    fn handle(&mut self, interaction: Interaction, _rng: &mut dyn RngCore) -> Vec<ChallengeEffect> {
        if self.checked {
            return Vec::new();
        }
        tracing::debug!(?interaction, "checkbox ticked");
        self.checked = true;
        vec![ChallengeEffect::Wait(self.delay)]
    }

    fn timer_elapsed(&mut self) -> Vec<ChallengeEffect> {
        if self.checked {
            self.latch.resolve(true)
        } else {
            Vec::new()
        }
    }

    fn view(&self) -> ChallengeView {
        ChallengeView::Checkbox {
            checked: self.checked,
            label: "I'm not a robot",
        }
    }
}
