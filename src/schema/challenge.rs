use serde::{Deserialize, Serialize};

/// How a challenge behaves once mounted.
///
/// Each tag maps to exactly one runner implementation in
/// `core::challenges`. The order here is also the default play order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Behavior {
    TrivialConfirm,
    ExactTextMatch,
    SubsetSelection,
    AdversarialSlider,
    MathPuzzle,
    AlwaysTrueTrick,
    NonsenseInstruction,
    EvasiveTarget,
}

impl Behavior {
    pub const ALL: [Behavior; 8] = [
        Self::TrivialConfirm,
        Self::ExactTextMatch,
        Self::SubsetSelection,
        Self::AdversarialSlider,
        Self::MathPuzzle,
        Self::AlwaysTrueTrick,
        Self::NonsenseInstruction,
        Self::EvasiveTarget,
    ];

    /// Short identifier used in logs and the terminal player.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::TrivialConfirm => "trivial_confirm",
            Self::ExactTextMatch => "exact_text_match",
            Self::SubsetSelection => "subset_selection",
            Self::AdversarialSlider => "adversarial_slider",
            Self::MathPuzzle => "math_puzzle",
            Self::AlwaysTrueTrick => "always_true_trick",
            Self::NonsenseInstruction => "nonsense_instruction",
            Self::EvasiveTarget => "evasive_target",
        }
    }

    /// Whether a runner of this behavior can ever report failure upward.
    pub fn can_fail(&self) -> bool {
        matches!(self, Self::ExactTextMatch | Self::SubsetSelection)
    }
}

/// Variant-specific data attached to a challenge definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    /// Target phrase for `ExactTextMatch`.
    Text { text: String },
    /// Item keywords and the correct subset for `SubsetSelection`.
    ImageGrid {
        keywords: Vec<String>,
        correct_indices: Vec<usize>,
    },
}

/// One entry of the challenge sequence. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeDefinition {
    pub level: u32,
    pub title: String,
    #[serde(default)]
    pub instruction: Option<String>,
    pub behavior: Behavior,
    #[serde(default)]
    pub payload: Option<Payload>,
}

impl ChallengeDefinition {
    /// Target phrase, if this definition carries one.
    pub fn target_text(&self) -> Option<&str> {
        match &self.payload {
            Some(Payload::Text { text }) => Some(text),
            _ => None,
        }
    }
}
