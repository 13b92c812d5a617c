use rand::{Rng, RngCore};

use super::{Challenge, ChallengeEffect, Latch};
use crate::core::view::ChallengeView;
use crate::schema::challenge::Behavior;
use crate::schema::interaction::Interaction;

/// Releasing strictly above this position passes.
pub const SUCCESS_THRESHOLD: f64 = 95.0;

const BAND_LOW: f64 = 60.0;
const BAND_HIGH: f64 = 98.0;
const JUMP_CHANCE: f64 = 0.4;
const MAX_JUMP: f64 = 25.0;
const MAX_PULL: f64 = 15.0;

/// Perturb a raw drag position backward while it sits in the sticky band.
///
/// Inside (60, 98): with probability 0.4 jump back by up to 25, then pull
/// back by up to `15 * (98 - p) / 38`. Never moves the handle forward.
/// The result is always within `[0, 100]`.
pub fn drift(position: f64, rng: &mut dyn RngCore) -> f64 {
    let mut p = position;
    if p > BAND_LOW && p < BAND_HIGH {
        if rng.gen::<f64>() < JUMP_CHANCE {
            p -= rng.gen::<f64>() * MAX_JUMP;
        }
        let pull = (BAND_HIGH - p) / (BAND_HIGH - BAND_LOW);
        p -= rng.gen::<f64>() * MAX_PULL * pull;
    }
    p.clamp(0.0, 100.0)
}

/// Slide to verify. Let go short of the end and it snaps back to zero.
#[derive(Debug, Default)]
pub struct Slider {
    position: f64,
    dragging: bool,
    latch: Latch,
}

impl Slider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> f64 {
        self.position
    }
}

impl Challenge for Slider {
    fn behavior(&self) -> Behavior {
        Behavior::AdversarialSlider
    }

    fn handle(&mut self, interaction: Interaction, rng: &mut dyn RngCore) -> Vec<ChallengeEffect> {
        if self.latch.is_resolved() {
            return Vec::new();
        }
        match interaction {
            Interaction::Press => {
                self.dragging = true;
                Vec::new()
            }
            Interaction::Drag { position } if self.dragging && position.is_finite() => {
                self.position = drift(position, rng);
                Vec::new()
            }
            Interaction::Release => {
                self.dragging = false;
                if self.position > SUCCESS_THRESHOLD {
                    self.latch.resolve(true)
                } else {
                    self.position = 0.0;
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    fn view(&self) -> ChallengeView {
        ChallengeView::Slider {
            position: self.position,
            dragging: self.dragging,
            hint_visible: self.position <= 50.0,
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
    fn drift_stays_in_bounds_and_never_advances() {
        let mut rng = StdRng::seed_from_u64(4);
        for step in -50..=150 {
            let raw = step as f64;
            for _ in 0..20 {
                let p = drift(raw, &mut rng);
                assert!((0.0..=100.0).contains(&p), "{raw} drifted to {p}");
                assert!(p <= raw.max(0.0), "{raw} drifted forward to {p}");
            }
        }
    }

    #[test]
    fn drift_outside_band_only_clamps() {
        let mut rng = StepRng::new(u64::MAX, 0);
        assert_eq!(drift(30.0, &mut rng), 30.0);
        assert_eq!(drift(99.0, &mut rng), 99.0);
        assert_eq!(drift(130.0, &mut rng), 100.0);
        assert_eq!(drift(-5.0, &mut rng), 0.0);
    }

    #[test]
    fn zero_randomness_leaves_band_untouched() {
        // A generator yielding 0.0 always takes the jump but jumps nowhere.
        let mut rng = StepRng::new(0, 0);
        assert_eq!(drift(80.0, &mut rng), 80.0);
    }

    #[test]
    fn release_past_threshold_passes() {
        let mut rng = StepRng::new(0, 0);
        let mut s = Slider::new();
        s.handle(Interaction::Press, &mut rng);
        s.handle(Interaction::Drag { position: 99.0 }, &mut rng);
        assert_eq!(
            s.handle(Interaction::Release, &mut rng),
            vec![ChallengeEffect::Complete(true)]
        );
    }

    #[test]
    fn release_short_snaps_back_without_failing() {
        let mut rng = StepRng::new(0, 0);
        let mut s = Slider::new();
        s.handle(Interaction::Press, &mut rng);
        s.handle(Interaction::Drag { position: 90.0 }, &mut rng);
        assert_eq!(s.position(), 90.0);
        assert!(s.handle(Interaction::Release, &mut rng).is_empty());
        assert_eq!(s.position(), 0.0);
    }

    #[test]
    fn drag_without_press_is_ignored() {
        let mut rng = StepRng::new(0, 0);
        let mut s = Slider::new();
        s.handle(Interaction::Drag { position: 99.0 }, &mut rng);
        assert_eq!(s.position(), 0.0);
        s.handle(Interaction::Press, &mut rng);
        s.handle(Interaction::Drag { position: f64::NAN }, &mut rng);
        assert_eq!(s.position(), 0.0);
    }
}
