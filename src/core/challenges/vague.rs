use rand::RngCore;

use super::{Challenge, ChallengeEffect, Latch, GRID_SIZE};
use crate::core::textgen::TextRequest;
use crate::core::view::ChallengeView;
use crate::schema::challenge::Behavior;
use crate::schema::interaction::Interaction;

/// Follow a generated instruction that makes no sense. Any tile is right.
#[derive(Debug)]
pub struct VagueInstruction {
    level: u32,
    instruction: Option<String>,
    latch: Latch,
}

impl VagueInstruction {
    pub fn new(level: u32) -> Self {
        Self {
            level,
            instruction: None,
            latch: Latch::default(),
        }
    }
}

impl Challenge for VagueInstruction {
    fn behavior(&self) -> Behavior {
        Behavior::NonsenseInstruction
    }

    fn start(&mut self) -> Vec<ChallengeEffect> {
        vec![ChallengeEffect::Request(TextRequest::VagueInstruction)]
    }

    fn handle(&mut self, interaction: Interaction, _rng: &mut dyn RngCore) -> Vec<ChallengeEffect> {
        match interaction {
            // Tiles are clickable even before the instruction arrives.
            Interaction::SelectItem { index } | Interaction::ToggleItem { index }
                if index < GRID_SIZE =>
            {
                self.latch.resolve(true)
            }
            _ => Vec::new(),
        }
    }

    fn text_ready(&mut self, text: String, _rng: &mut dyn RngCore) -> Vec<ChallengeEffect> {
        self.instruction = Some(text);
        Vec::new()
    }

    fn view(&self) -> ChallengeView {
        ChallengeView::VagueInstruction {
            instruction: self.instruction.clone(),
            tiles: GRID_SIZE,
            image_seed: self.level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn requests_instruction_on_start() {
        let mut c = VagueInstruction::new(7);
        assert_eq!(
            c.start(),
            vec![ChallengeEffect::Request(TextRequest::VagueInstruction)]
        );
        assert!(matches!(
            c.view(),
            ChallengeView::VagueInstruction { instruction: None, .. }
        ));
    }

    #[test]
    fn instruction_shown_once_ready() {
        let mut rng = StepRng::new(0, 0);
        let mut c = VagueInstruction::new(7);
        c.start();
        c.text_ready("Click the squares that feel warm.".to_string(), &mut rng);
        match c.view() {
            ChallengeView::VagueInstruction { instruction, .. } => {
                assert_eq!(instruction.as_deref(), Some("Click the squares that feel warm."));
            }
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn any_tile_passes() {
        for index in 0..GRID_SIZE {
            let mut rng = StepRng::new(0, 0);
            let mut c = VagueInstruction::new(7);
            assert_eq!(
                c.handle(Interaction::SelectItem { index }, &mut rng),
                vec![ChallengeEffect::Complete(true)]
            );
        }
    }

    #[test]
    fn verify_button_does_not_exist_here() {
        let mut rng = StepRng::new(0, 0);
        let mut c = VagueInstruction::new(7);
        assert!(c.handle(Interaction::Verify, &mut rng).is_empty());
        assert!(c.handle(Interaction::SelectItem { index: 9 }, &mut rng).is_empty());
    }
}
