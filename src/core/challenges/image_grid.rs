use rand::RngCore;
use rustc_hash::FxHashSet;

use super::{Challenge, ChallengeEffect, Latch, GRID_SIZE};
use crate::core::view::ChallengeView;
use crate::schema::challenge::{Behavior, Payload};
use crate::schema::interaction::Interaction;

/// Pick every matching image. Passes only on the exact set.
#[derive(Debug)]
pub struct ImageGrid {
    keywords: Vec<String>,
    correct: FxHashSet<usize>,
    selected: FxHashSet<usize>,
    latch: Latch,
}

impl ImageGrid {
    pub fn new(keywords: Vec<String>, correct_indices: &[usize]) -> Self {
        Self {
            keywords,
            correct: correct_indices.iter().copied().collect(),
            selected: FxHashSet::default(),
            latch: Latch::default(),
        }
    }

    /// Without a grid payload every tile is "abstract" and the correct set
    /// is empty.
    pub fn from_payload(payload: Option<&Payload>) -> Self {
        match payload {
            Some(Payload::ImageGrid {
                keywords,
                correct_indices,
            }) => Self::new(keywords.clone(), correct_indices),
            _ => Self::new(vec!["abstract".to_string(); GRID_SIZE], &[]),
        }
    }

    fn toggle(&mut self, index: usize) {
        if index >= self.keywords.len() {
            tracing::debug!(index, "grid toggle outside the grid ignored");
            return;
        }
        if !self.selected.remove(&index) {
            self.selected.insert(index);
        }
    }
}

impl Challenge for ImageGrid {
    fn behavior(&self) -> Behavior {
        Behavior::SubsetSelection
    }

    fn handle(&mut self, interaction: Interaction, _rng: &mut dyn RngCore) -> Vec<ChallengeEffect> {
        if self.latch.is_resolved() {
            return Vec::new();
        }
        match interaction {
            Interaction::ToggleItem { index } | Interaction::SelectItem { index } => {
                self.toggle(index);
                Vec::new()
            }
            Interaction::Verify => {
                let passed = self.selected == self.correct;
                self.latch.resolve(passed)
            }
            _ => Vec::new(),
        }
    }

    fn view(&self) -> ChallengeView {
        let mut selected: Vec<usize> = self.selected.iter().copied().collect();
        selected.sort_unstable();
        ChallengeView::ImageGrid {
            keywords: self.keywords.clone(),
            selected,
        }
    }
}
