/// Text generation adapter: prompt building, fail-soft generation, and the
/// offline grammar backend.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::grammar::{Bindings, GrammarError, GrammarSet};

/// Returned in place of generated text whenever the backend fails.
pub const FALLBACK_TEXT: &str =
    "Error: Could not generate response. Please check your connection... or your humanity.";

/// Stand-in for an empty math submission when quoting it back to the user.
pub const EMPTY_ANSWER: &str = "nothing";

const STANDARD_GRAMMAR: &str = include_str!("../../data/taunts.ron");

#[derive(Debug, Error)]
pub enum TextGenError {
    #[error("backend failure: {0}")]
    Backend(String),
    #[error("backend returned no text")]
    Empty,
    #[error("grammar error: {0}")]
    Grammar(#[from] GrammarError),
}

/// What the game needs text for. Carries the data each prompt template
/// interpolates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextRequest {
    Taunt { level: u32, attempts: u32 },
    VagueInstruction,
    MathTaunt { answer: String },
    AdminCode,
}

impl TextRequest {
    /// Grammar rule the offline backend expands for this request.
    pub fn rule_name(&self) -> &'static str {
        match self {
            Self::Taunt { .. } => "taunt",
            Self::VagueInstruction => "vague_instruction",
            Self::MathTaunt { .. } => "math_taunt",
            Self::AdminCode => "admin_code",
        }
    }

    pub const ROOT_RULES: [&'static str; 4] =
        ["taunt", "vague_instruction", "math_taunt", "admin_code"];
}

/// Sampling parameters forwarded to backends that honour them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            top_p: 0.9,
        }
    }
}

/// A fully built prompt: the natural-language text for remote models plus
/// the structured request it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub request: TextRequest,
    pub text: String,
    pub params: GenerationParams,
}

impl Prompt {
    pub fn for_request(request: &TextRequest) -> Prompt {
        let text = match request {
            TextRequest::Taunt { level, attempts } => format!(
                "You are a sarcastic and condescending CAPTCHA system. The user has failed \
                 challenge number {level} {attempts} times. Generate a short, frustrating \
                 message (under 15 words) that questions their humanity and accuses them of \
                 being a robot."
            ),
            TextRequest::VagueInstruction => "Generate a short, single-sentence, confusing, and \
                 nonsensical CAPTCHA instruction. It should sound plausible but be impossible to \
                 solve logically. Examples: \"Select all images that contain the concept of \
                 Tuesday.\" or \"Click the squares that feel warm.\""
                .to_string(),
            TextRequest::MathTaunt { answer } => format!(
                "You are a condescending CAPTCHA system. The user provided a wrong answer \
                 \"{answer}\" for a simple math problem. Generate a short, mocking message \
                 (under 12 words) that questions their intelligence. Be sarcastic. Examples: \
                 \"Seriously? That's your answer?\", \"My calculator is laughing at you.\", \
                 \"Even a robot could solve this.\""
            ),
            TextRequest::AdminCode => "Generate a unique, official-looking service ticket that is \
                 also an \"admin r-ID/L-code\". The code should be a single-line, alphanumeric \
                 string between 15 and 25 characters. It must contain the characters for \
                 \"ADMIN\", \"RIDL\", and \"CODE\", but broken up and mixed with numbers and other \
                 letters to look like a system-generated ID. Example format: ADM7-R1DL-C0DE-9XYZ. \
                 Be creative. Only return the code itself."
                .to_string(),
        };

        Prompt {
            request: request.clone(),
            text,
            params: GenerationParams::default(),
        }
    }
}

/// Anything that can turn a prompt into text. May fail; the adapter
/// absorbs failures.
pub trait TextBackend {
    fn generate(&mut self, prompt: &Prompt) -> Result<String, TextGenError>;
}

/// Fail-soft adapter around a backend. Every call returns a string.
pub struct TextGenerator<B> {
    backend: B,
}

impl<B: TextBackend> TextGenerator<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// One attempt, no retries. Errors become [`FALLBACK_TEXT`].
    pub fn generate(&mut self, prompt: &Prompt) -> String {
        match self.backend.generate(prompt) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, request = ?prompt.request, "text generation failed");
                FALLBACK_TEXT.to_string()
            }
        }
    }

    pub fn taunt(&mut self, level: u32, attempts: u32) -> String {
        self.fulfil(&TextRequest::Taunt { level, attempts })
    }

    pub fn vague_instruction(&mut self) -> String {
        self.fulfil(&TextRequest::VagueInstruction)
    }

    pub fn math_taunt(&mut self, wrong_answer: &str) -> String {
        self.fulfil(&TextRequest::MathTaunt {
            answer: wrong_answer.to_string(),
        })
    }

    pub fn admin_code(&mut self) -> String {
        self.fulfil(&TextRequest::AdminCode)
    }

    /// Produce the final display text for a request. Admin codes are
    /// normalized; everything else is passed through verbatim.
    pub fn fulfil(&mut self, request: &TextRequest) -> String {
        let raw = self.generate(&Prompt::for_request(request));
        match request {
            TextRequest::AdminCode => completion_code(&raw),
            _ => raw,
        }
    }
}

/// Normalize a generated admin code. Never empty: input that normalizes to
/// nothing yields the normalized [`FALLBACK_TEXT`].
pub fn completion_code(raw: &str) -> String {
    let code = normalize_admin_code(raw);
    if code.is_empty() {
        tracing::warn!(raw = %raw, "admin code normalized to nothing");
        normalize_admin_code(FALLBACK_TEXT)
    } else {
        code
    }
}

/// Trim, turn spaces into dashes, drop anything outside `[A-Za-z0-9-]`,
/// uppercase.
pub fn normalize_admin_code(raw: &str) -> String {
    raw.trim()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// The embedded default taunt grammar.
pub fn standard_grammar() -> Result<GrammarSet, GrammarError> {
    GrammarSet::parse_ron(STANDARD_GRAMMAR)
}

/// Offline backend: expands the request's root rule from a grammar.
pub struct GrammarBackend {
    grammars: GrammarSet,
    rng: StdRng,
}

impl GrammarBackend {
    pub fn new(grammars: GrammarSet, seed: u64) -> Self {
        Self {
            grammars,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Backend over the embedded default grammar.
    pub fn standard(seed: u64) -> Result<Self, GrammarError> {
        Ok(Self::new(standard_grammar()?, seed))
    }

    pub fn grammars(&self) -> &GrammarSet {
        &self.grammars
    }
}

impl TextBackend for GrammarBackend {
    fn generate(&mut self, prompt: &Prompt) -> Result<String, TextGenError> {
        let mut bindings = Bindings::default();
        match &prompt.request {
            TextRequest::Taunt { level, attempts } => {
                bindings.insert("level", level.to_string());
                bindings.insert("attempts", attempts.to_string());
            }
            TextRequest::MathTaunt { answer } => {
                bindings.insert("answer", answer.clone());
            }
            TextRequest::VagueInstruction | TextRequest::AdminCode => {}
        }

        let text = self
            .grammars
            .expand(prompt.request.rule_name(), &bindings, &mut self.rng)?;
        if text.trim().is_empty() {
            return Err(TextGenError::Empty);
        }
        Ok(text)
    }
}
