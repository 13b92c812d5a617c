//! WASM bindings for crapcha: powers the single-page web view.
//!
//! JavaScript owns the timers and the text model. Every call that can change
//! the game returns a JSON array of effects for the page to carry out:
//! `{"effect":"schedule","ticket":3,"delay_ms":700}` means "call
//! `timer_fired(3)` in 700 ms", and
//! `{"effect":"generate","ticket":4,"request":{"kind":"taunt",...}}` means
//! "produce text and call `text_ready(4, text)`".

use wasm_bindgen::prelude::*;

use crapcha::config::Pacing;
use crapcha::core::controller::{Effect, ProgressionController, Ticket};
use crapcha::core::textgen::{self, GrammarBackend, Prompt, TextGenerator, TextRequest};
use crapcha::schema::interaction::Interaction;

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
enum EffectOut {
    Schedule { ticket: u64, delay_ms: u64 },
    Generate { ticket: u64, request: TextRequest },
}

impl From<Effect> for EffectOut {
    fn from(effect: Effect) -> Self {
        match effect {
            Effect::Schedule { ticket, delay } => EffectOut::Schedule {
                ticket: ticket.0,
                delay_ms: delay.as_millis() as u64,
            },
            Effect::Generate { ticket, request } => EffectOut::Generate {
                ticket: ticket.0,
                request,
            },
        }
    }
}

fn effects_json(effects: Vec<Effect>) -> Result<String, JsError> {
    let out: Vec<EffectOut> = effects.into_iter().map(EffectOut::from).collect();
    serde_json::to_string(&out).map_err(|e| JsError::new(&format!("Serialization error: {e}")))
}

fn parse_request(request_json: &str) -> Result<TextRequest, JsError> {
    serde_json::from_str(request_json)
        .map_err(|e| JsError::new(&format!("Invalid request JSON: {e}")))
}

// ---------------------------------------------------------------------------
// Game handle
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct CrapchaGame {
    controller: ProgressionController,
    offline: TextGenerator<GrammarBackend>,
}

#[wasm_bindgen]
impl CrapchaGame {
    /// Create a game over the built-in content. `fast` zeroes every pacing
    /// delay.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64, fast: bool) -> Result<CrapchaGame, JsError> {
        let pacing = if fast { Pacing::instant() } else { Pacing::default() };
        let controller = ProgressionController::builder()
            .pacing(pacing)
            .seed(seed)
            .build()
            .map_err(|e| JsError::new(&format!("Challenge error: {e}")))?;
        let backend = GrammarBackend::standard(seed)
            .map_err(|e| JsError::new(&format!("Grammar error: {e}")))?;

        Ok(CrapchaGame {
            controller,
            offline: TextGenerator::new(backend),
        })
    }

    pub fn start(&mut self) -> Result<String, JsError> {
        effects_json(self.controller.start())
    }

    /// Forward a widget input, e.g. `{"kind":"type","text":"I am a human"}`
    /// or `{"kind":"toggle_item","index":4}`.
    pub fn interact(&mut self, interaction_json: &str) -> Result<String, JsError> {
        let interaction: Interaction = serde_json::from_str(interaction_json)
            .map_err(|e| JsError::new(&format!("Invalid interaction JSON: {e}")))?;
        effects_json(self.controller.interact(interaction))
    }

    pub fn timer_fired(&mut self, ticket: u64) -> Result<String, JsError> {
        effects_json(self.controller.timer_fired(Ticket(ticket)))
    }

    pub fn text_ready(&mut self, ticket: u64, text: String) -> Result<String, JsError> {
        effects_json(self.controller.text_ready(Ticket(ticket), text))
    }

    pub fn restart(&mut self) -> Result<String, JsError> {
        effects_json(self.controller.restart())
    }

    /// The current screen as JSON, tagged by `"screen"`.
    pub fn view(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.controller.view())
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Current state name, e.g. `"Playing"`.
    pub fn state(&self) -> String {
        format!("{:?}", self.controller.state())
    }

    /// Answer a generate effect offline from the built-in grammar. Never
    /// fails on generation; admin codes come back normalized.
    pub fn generate(&mut self, request_json: &str) -> Result<String, JsError> {
        let request = parse_request(request_json)?;
        Ok(self.offline.fulfil(&request))
    }

    /// The prompt (text and sampling parameters) a remote model should be
    /// sent for a generate effect.
    pub fn prompt(request_json: &str) -> Result<String, JsError> {
        let request = parse_request(request_json)?;
        serde_json::to_string(&Prompt::for_request(&request))
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// The admin code `text_ready` will display for a remotely generated
    /// one. The game applies this itself; the page can use it for previews.
    pub fn normalize_admin_code(raw: &str) -> String {
        textgen::completion_code(raw)
    }

    /// Text to hand back when a remote model fails.
    pub fn fallback_text() -> String {
        textgen::FALLBACK_TEXT.to_string()
    }
}
