/// Challenge registry: the fixed, ordered challenge sequence.

use rustc_hash::FxHashSet;
use std::path::Path;
use thiserror::Error;

use crate::core::challenges::GRID_SIZE;
use crate::schema::challenge::{Behavior, ChallengeDefinition, Payload};

const STANDARD_CHALLENGES: &str = include_str!("../../data/challenges.ron");

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("challenge list is empty")]
    Empty,
    #[error("challenge at position {position} has level {found}, expected {expected}")]
    LevelOrder {
        position: usize,
        expected: u32,
        found: u32,
    },
    #[error("level {level}: payload does not fit behavior {behavior:?}")]
    PayloadMismatch { level: u32, behavior: Behavior },
    #[error("level {level}: image grid needs {expected} keywords, found {found}", expected = GRID_SIZE)]
    GridSize { level: u32, found: usize },
    #[error("level {level}: correct index {index} is outside the grid")]
    IndexOutOfRange { level: u32, index: usize },
    #[error("level {level}: correct index {index} listed twice")]
    DuplicateIndex { level: u32, index: usize },
}

/// An ordered, validated, immutable list of challenge definitions.
#[derive(Debug, Clone)]
pub struct ChallengeRegistry {
    challenges: Vec<ChallengeDefinition>,
}

impl ChallengeRegistry {
    /// The built-in eight-level sequence.
    pub fn standard() -> Result<ChallengeRegistry, RegistryError> {
        Self::parse_ron(STANDARD_CHALLENGES)
    }

    /// Load a challenge list from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<ChallengeRegistry, RegistryError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a challenge list from a RON string.
    pub fn parse_ron(input: &str) -> Result<ChallengeRegistry, RegistryError> {
        let challenges: Vec<ChallengeDefinition> = ron::from_str(input)?;
        Self::from_definitions(challenges)
    }

    /// Validate and wrap an already-built list.
    ///
    /// Levels must run 1, 2, 3, ... in list order, and each payload must
    /// belong to its behavior.
    pub fn from_definitions(
        challenges: Vec<ChallengeDefinition>,
    ) -> Result<ChallengeRegistry, RegistryError> {
        if challenges.is_empty() {
            return Err(RegistryError::Empty);
        }

        for (position, def) in challenges.iter().enumerate() {
            let expected = position as u32 + 1;
            if def.level != expected {
                return Err(RegistryError::LevelOrder {
                    position,
                    expected,
                    found: def.level,
                });
            }
            validate_payload(def)?;
        }

        Ok(ChallengeRegistry { challenges })
    }

    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ChallengeDefinition> {
        self.challenges.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChallengeDefinition> {
        self.challenges.iter()
    }
}

fn validate_payload(def: &ChallengeDefinition) -> Result<(), RegistryError> {
    let level = def.level;
    match (&def.payload, def.behavior) {
        (None, _) => Ok(()),
        (Some(Payload::Text { .. }), Behavior::ExactTextMatch) => Ok(()),
        (
            Some(Payload::ImageGrid {
                keywords,
                correct_indices,
            }),
            Behavior::SubsetSelection,
        ) => {
            if keywords.len() != GRID_SIZE {
                return Err(RegistryError::GridSize {
                    level,
                    found: keywords.len(),
                });
            }
            let mut seen = FxHashSet::default();
            for &index in correct_indices {
                if index >= GRID_SIZE {
                    return Err(RegistryError::IndexOutOfRange { level, index });
                }
                if !seen.insert(index) {
                    return Err(RegistryError::DuplicateIndex { level, index });
                }
            }
            Ok(())
        }
        (Some(_), behavior) => Err(RegistryError::PayloadMismatch { level, behavior }),
    }
}
