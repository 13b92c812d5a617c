/// The progression controller: Start → Loading → Playing → Verifying →
/// FinalFail | FinalSuccess.
///
/// The controller never sleeps and never calls a text backend itself. Each
/// operation returns [`Effect`]s that the host carries out, reporting back
/// through [`ProgressionController::timer_fired`] and
/// [`ProgressionController::text_ready`] with the ticket it was given.
/// Tickets are invalidated on every state change, so late timers and late
/// text are dropped instead of corrupting a newer state.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHashMap;
use std::time::Duration;

use crate::config::{GameConfig, Pacing};
use crate::core::challenges::{self, Challenge, ChallengeEffect};
use crate::core::registry::{ChallengeRegistry, RegistryError};
use crate::core::textgen::{self, TextRequest};
use crate::core::view::ScreenView;
use crate::schema::challenge::{Behavior, ChallengeDefinition};
use crate::schema::interaction::Interaction;
use crate::schema::state::{GameState, Session};

/// Correlates an [`Effect`] with the host's later callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub u64);

/// Work the host must perform on the controller's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Call `timer_fired(ticket)` once `delay` has elapsed.
    Schedule { ticket: Ticket, delay: Duration },
    /// Produce text for `request` and call `text_ready(ticket, text)`.
    Generate { ticket: Ticket, request: TextRequest },
}

impl Effect {
    pub fn ticket(&self) -> Ticket {
        match self {
            Self::Schedule { ticket, .. } | Self::Generate { ticket, .. } => *ticket,
        }
    }
}

/// What an outstanding ticket will do when it comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    BeginPlay,
    Advance,
    RevealFailure,
    Taunt,
    CompletionCode,
    ChallengeTimer,
    ChallengeText,
}

impl Pending {
    fn is_timer(self) -> bool {
        matches!(
            self,
            Self::BeginPlay | Self::Advance | Self::RevealFailure | Self::ChallengeTimer
        )
    }
}

pub struct ProgressionController {
    registry: ChallengeRegistry,
    pacing: Pacing,
    rng: StdRng,
    state: GameState,
    session: Session,
    live: Option<Box<dyn Challenge>>,
    pending: FxHashMap<Ticket, Pending>,
    next_ticket: u64,
}

/// Builder for constructing a `ProgressionController`.
pub struct ProgressionControllerBuilder {
    registry: Option<ChallengeRegistry>,
    pacing: Pacing,
    seed: u64,
}

impl ProgressionController {
    pub fn builder() -> ProgressionControllerBuilder {
        ProgressionControllerBuilder {
            registry: None,
            pacing: Pacing::default(),
            seed: 0,
        }
    }

    // --- host operations ---

    /// Leave the start screen.
    pub fn start(&mut self) -> Vec<Effect> {
        if self.state != GameState::Start {
            tracing::debug!(state = ?self.state, "start ignored");
            return Vec::new();
        }
        self.enter(GameState::Loading);
        vec![self.schedule(Pending::BeginPlay, self.pacing.loading())]
    }

    /// Forward a user input to the live challenge.
    pub fn interact(&mut self, interaction: Interaction) -> Vec<Effect> {
        if self.state != GameState::Playing {
            tracing::debug!(state = ?self.state, ?interaction, "interaction outside play ignored");
            return Vec::new();
        }
        let effects = match self.live.as_mut() {
            Some(challenge) => challenge.handle(interaction, &mut self.rng),
            None => {
                tracing::warn!("playing without a live challenge");
                return Vec::new();
            }
        };
        self.apply_challenge_effects(effects)
    }

    pub fn timer_fired(&mut self, ticket: Ticket) -> Vec<Effect> {
        let Some(pending) = self.take(ticket, true) else {
            return Vec::new();
        };

        match pending {
            Pending::BeginPlay => self.mount_current(),
            Pending::Advance => {
                if self.session.current_level_index + 1 < self.registry.len() {
                    self.session.current_level_index += 1;
                    self.mount_current()
                } else {
                    tracing::info!("all challenges passed, issuing completion code");
                    vec![self.request(Pending::CompletionCode, TextRequest::AdminCode)]
                }
            }
            Pending::RevealFailure => {
                self.enter(GameState::FinalFail);
                Vec::new()
            }
            Pending::ChallengeTimer => {
                let effects = match self.live.as_mut() {
                    Some(challenge) => challenge.timer_elapsed(),
                    None => Vec::new(),
                };
                self.apply_challenge_effects(effects)
            }
            Pending::Taunt | Pending::CompletionCode | Pending::ChallengeText => Vec::new(),
        }
    }

    pub fn text_ready(&mut self, ticket: Ticket, text: String) -> Vec<Effect> {
        let Some(pending) = self.take(ticket, false) else {
            return Vec::new();
        };

        match pending {
            Pending::Taunt => {
                self.session.fail_message = Some(text);
                vec![self.schedule(Pending::RevealFailure, self.pacing.fail_reveal())]
            }
            Pending::CompletionCode => {
                self.session.completion_code = Some(textgen::completion_code(&text));
                self.enter(GameState::FinalSuccess);
                Vec::new()
            }
            Pending::ChallengeText => {
                let effects = match self.live.as_mut() {
                    Some(challenge) => challenge.text_ready(text, &mut self.rng),
                    None => Vec::new(),
                };
                self.apply_challenge_effects(effects)
            }
            Pending::BeginPlay
            | Pending::Advance
            | Pending::RevealFailure
            | Pending::ChallengeTimer => Vec::new(),
        }
    }

    /// Back to the start screen with a fresh session. Only valid from a
    /// final state.
    pub fn restart(&mut self) -> Vec<Effect> {
        if !self.state.is_terminal() {
            tracing::debug!(state = ?self.state, "restart ignored");
            return Vec::new();
        }
        self.session = Session::default();
        self.enter(GameState::Start);
        Vec::new()
    }

    // --- read access ---

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn current_level_index(&self) -> usize {
        self.session.current_level_index
    }

    pub fn current_challenge(&self) -> Option<&ChallengeDefinition> {
        self.registry.get(self.session.current_level_index)
    }

    pub fn fail_message(&self) -> Option<&str> {
        self.session.fail_message.as_deref()
    }

    pub fn completion_code(&self) -> Option<&str> {
        self.session.completion_code.as_deref()
    }

    pub fn registry(&self) -> &ChallengeRegistry {
        &self.registry
    }

    pub fn pacing(&self) -> &Pacing {
        &self.pacing
    }

    /// Behavior of the mounted challenge, if one is live.
    pub fn live_behavior(&self) -> Option<Behavior> {
        self.live.as_ref().map(|c| c.behavior())
    }

    /// Number of tickets still honoured.
    pub fn outstanding(&self) -> usize {
        self.pending.len()
    }

    pub fn is_outstanding(&self, ticket: Ticket) -> bool {
        self.pending.contains_key(&ticket)
    }

    pub fn view(&self) -> ScreenView {
        match self.state {
            GameState::Start => ScreenView::start(),
            GameState::Loading => ScreenView::loading(),
            GameState::Verifying => ScreenView::verifying(),
            GameState::Playing => match (self.current_challenge(), self.live.as_ref()) {
                (Some(def), Some(live)) => ScreenView::Playing {
                    level: def.level,
                    title: def.title.clone(),
                    instruction: def.instruction.clone(),
                    progress: (self.session.current_level_index + 1) as f64
                        / self.registry.len() as f64,
                    challenge: live.view(),
                },
                _ => ScreenView::Error {
                    message: format!(
                        "Error: no challenge mounted at level index {}.",
                        self.session.current_level_index
                    ),
                },
            },
            GameState::FinalFail => ScreenView::final_fail(self.fail_message()),
            GameState::FinalSuccess => match self.completion_code() {
                Some(code) => ScreenView::final_success(code),
                None => ScreenView::Error {
                    message: "Error: verification complete but no code was issued.".to_string(),
                },
            },
        }
    }

    // --- internals ---

    /// Switch state, dropping every outstanding ticket and, outside play,
    /// the live challenge.
    fn enter(&mut self, state: GameState) {
        tracing::info!(from = ?self.state, to = ?state, level_index = self.session.current_level_index, "state change");
        self.pending.clear();
        if state != GameState::Playing {
            self.live = None;
        }
        self.state = state;
    }

    fn mount_current(&mut self) -> Vec<Effect> {
        self.enter(GameState::Playing);
        let Some(def) = self.registry.get(self.session.current_level_index) else {
            self.live = None;
            tracing::error!(
                index = self.session.current_level_index,
                "level index outside the registry"
            );
            return Vec::new();
        };

        tracing::debug!(level = def.level, behavior = def.behavior.tag(), "mounting challenge");
        let mut challenge = challenges::mount(def, &self.pacing);
        let effects = challenge.start();
        self.live = Some(challenge);
        self.apply_challenge_effects(effects)
    }

    fn apply_challenge_effects(&mut self, effects: Vec<ChallengeEffect>) -> Vec<Effect> {
        let mut out = Vec::new();
        for effect in effects {
            match effect {
                ChallengeEffect::Wait(delay) => {
                    out.push(self.schedule(Pending::ChallengeTimer, delay))
                }
                ChallengeEffect::Request(request) => {
                    out.push(self.request(Pending::ChallengeText, request))
                }
                ChallengeEffect::Complete(success) => {
                    out.extend(self.complete_challenge(success));
                    break;
                }
            }
        }
        out
    }

    fn complete_challenge(&mut self, success: bool) -> Vec<Effect> {
        let level = self.session.current_level_index as u32 + 1;
        self.enter(GameState::Verifying);
        if success {
            tracing::info!(level, "challenge passed");
            vec![self.schedule(Pending::Advance, self.pacing.advance())]
        } else {
            tracing::info!(level, "challenge failed");
            vec![self.request(Pending::Taunt, TextRequest::Taunt { level, attempts: 1 })]
        }
    }

    fn issue(&mut self, pending: Pending) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.pending.insert(ticket, pending);
        ticket
    }

    fn schedule(&mut self, pending: Pending, delay: Duration) -> Effect {
        Effect::Schedule {
            ticket: self.issue(pending),
            delay,
        }
    }

    fn request(&mut self, pending: Pending, request: TextRequest) -> Effect {
        Effect::Generate {
            ticket: self.issue(pending),
            request,
        }
    }

    /// Redeem a ticket if it is still outstanding and of the expected kind.
    fn take(&mut self, ticket: Ticket, timer: bool) -> Option<Pending> {
        match self.pending.get(&ticket).copied() {
            None => {
                tracing::debug!(?ticket, "stale ticket ignored");
                None
            }
            Some(pending) if pending.is_timer() != timer => {
                tracing::warn!(?ticket, ?pending, "ticket redeemed through the wrong callback");
                None
            }
            Some(pending) => {
                self.pending.remove(&ticket);
                Some(pending)
            }
        }
    }
}

impl ProgressionControllerBuilder {
    pub fn registry(mut self, registry: ChallengeRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Take seed and pacing from a config. Content paths are the host's
    /// business.
    pub fn config(self, config: &GameConfig) -> Self {
        self.seed(config.seed).pacing(config.pacing)
    }

    pub fn build(self) -> Result<ProgressionController, RegistryError> {
        let registry = match self.registry {
            Some(registry) => registry,
            None => ChallengeRegistry::standard()?,
        };

        Ok(ProgressionController {
            registry,
            pacing: self.pacing,
            rng: StdRng::seed_from_u64(self.seed),
            state: GameState::Start,
            session: Session::default(),
            live: None,
            pending: FxHashMap::default(),
            next_ticket: 0,
        })
    }
}
