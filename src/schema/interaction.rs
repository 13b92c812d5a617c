use serde::{Deserialize, Serialize};

/// A single user input routed to the live challenge.
///
/// Runners ignore interactions that make no sense for their widget, so a
/// host can forward whatever the user did without knowing which challenge
/// is mounted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Interaction {
    /// Tick the "I'm not a robot" box.
    Check,
    /// Replace the contents of the text field.
    Type { text: String },
    /// Toggle selection of a grid item.
    ToggleItem { index: usize },
    /// Press the verify/submit button.
    Verify,
    /// Grab the slider handle.
    Press,
    /// Move the slider pointer to a raw position in 0..=100.
    Drag { position: f64 },
    /// Let go of the slider (or the pointer left the track).
    Release,
    /// Pick one of the offered numeric answers.
    Choose { value: i64 },
    /// Pointer entered the vicinity of a control.
    Hover,
    /// Click a grid item.
    SelectItem { index: usize },
}

