use rand::{Rng, RngCore};

use super::{Challenge, ChallengeEffect, Latch};
use crate::core::view::ChallengeView;
use crate::schema::challenge::Behavior;
use crate::schema::interaction::Interaction;

/// The button never strays further than this from its home, per axis.
pub const MAX_OFFSET: f64 = 200.0;

/// New button offset, each axis uniform in `[-200, 200)`.
pub fn relocate(rng: &mut dyn RngCore) -> (f64, f64) {
    let x = rng.gen::<f64>() * 2.0 * MAX_OFFSET - MAX_OFFSET;
    let y = rng.gen::<f64>() * 2.0 * MAX_OFFSET - MAX_OFFSET;
    (x, y)
}

/// A verify button that jumps away whenever the pointer gets close.
#[derive(Debug, Default)]
pub struct EvasiveButton {
    offset: (f64, f64),
    latch: Latch,
}

impl EvasiveButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> (f64, f64) {
        self.offset
    }
}

impl Challenge for EvasiveButton {
    fn behavior(&self) -> Behavior {
        Behavior::EvasiveTarget
    }

    fn handle(&mut self, interaction: Interaction, rng: &mut dyn RngCore) -> Vec<ChallengeEffect> {
        match interaction {
            Interaction::Hover if !self.latch.is_resolved() => {
                self.offset = relocate(rng);
                Vec::new()
            }
            Interaction::Verify => self.latch.resolve(true),
            _ => Vec::new(),
        }
    }

    fn view(&self) -> ChallengeView {
        ChallengeView::EvasiveButton {
            offset_x: self.offset.0,
            offset_y: self.offset.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn relocation_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..1000 {
            let (x, y) = relocate(&mut rng);
            assert!((-MAX_OFFSET..MAX_OFFSET).contains(&x));
            assert!((-MAX_OFFSET..MAX_OFFSET).contains(&y));
        }
    }

    #[test]
    fn zero_source_pins_to_corner() {
        let mut rng = StepRng::new(0, 0);
        assert_eq!(relocate(&mut rng), (-MAX_OFFSET, -MAX_OFFSET));
    }

    #[test]
    fn hover_moves_and_click_passes() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut b = EvasiveButton::new();
        b.handle(Interaction::Hover, &mut rng);
        let first = b.offset();
        b.handle(Interaction::Hover, &mut rng);
        assert_ne!(b.offset(), first);
        assert_eq!(
            b.handle(Interaction::Verify, &mut rng),
            vec![ChallengeEffect::Complete(true)]
        );
    }
}
