/// Synchronous host for the controller's effect protocol on a virtual clock.
///
/// Generation requests are answered on the spot through a [`TextGenerator`];
/// timers wait in a queue until the clock is moved past their due time.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use std::time::Duration;
use thiserror::Error;

use crate::config::{ConfigError, GameConfig};
use crate::core::controller::{Effect, ProgressionController, Ticket};
use crate::core::grammar::{GrammarError, GrammarSet};
use crate::core::registry::{ChallengeRegistry, RegistryError};
use crate::core::textgen::{standard_grammar, GrammarBackend, TextBackend, TextGenerator};
use crate::core::view::ScreenView;
use crate::schema::interaction::Interaction;
use crate::schema::state::GameState;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("challenge error: {0}")]
    Registry(#[from] RegistryError),
    #[error("grammar error: {0}")]
    Grammar(#[from] GrammarError),
}

pub struct Driver<B> {
    controller: ProgressionController,
    text: TextGenerator<B>,
    now: Duration,
    timers: BinaryHeap<Reverse<(Duration, Ticket)>>,
}

impl Driver<GrammarBackend> {
    /// Build a controller and grammar backend from a config, loading any
    /// content overrides it names. A custom grammar is layered over the
    /// embedded one.
    pub fn from_config(config: &GameConfig) -> Result<Self, SetupError> {
        let registry = match &config.challenges {
            Some(path) => ChallengeRegistry::load_from_ron(path)?,
            None => ChallengeRegistry::standard()?,
        };

        let mut grammars = standard_grammar()?;
        if let Some(path) = &config.grammar {
            grammars.merge(GrammarSet::load_from_ron(path)?);
        }

        let controller = ProgressionController::builder()
            .registry(registry)
            .config(config)
            .build()?;
        Ok(Self::new(controller, GrammarBackend::new(grammars, config.seed)))
    }
}

impl<B: TextBackend> Driver<B> {
    pub fn new(controller: ProgressionController, backend: B) -> Self {
        Self {
            controller,
            text: TextGenerator::new(backend),
            now: Duration::ZERO,
            timers: BinaryHeap::new(),
        }
    }

    pub fn start(&mut self) {
        let effects = self.controller.start();
        self.dispatch(effects);
    }

    pub fn interact(&mut self, interaction: Interaction) {
        let effects = self.controller.interact(interaction);
        self.dispatch(effects);
    }

    pub fn restart(&mut self) {
        let effects = self.controller.restart();
        self.dispatch(effects);
    }

    /// Move the clock forward, firing every timer that falls due on the way.
    pub fn advance(&mut self, elapsed: Duration) {
        let until = self.now + elapsed;
        while let Some(&Reverse((due, ticket))) = self.timers.peek() {
            if due > until {
                break;
            }
            self.timers.pop();
            self.fire(due, ticket);
        }
        self.now = until;
    }

    /// Fire timers until none are left. Returns the virtual time that passed.
    pub fn settle(&mut self) -> Duration {
        let began = self.now;
        while let Some(Reverse((due, ticket))) = self.timers.pop() {
            self.fire(due, ticket);
        }
        self.now - began
    }

    /// Time until the earliest live timer, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers
            .iter()
            .filter(|Reverse((_, ticket))| self.controller.is_outstanding(*ticket))
            .map(|Reverse((due, _))| due.saturating_sub(self.now))
            .min()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn state(&self) -> GameState {
        self.controller.state()
    }

    pub fn view(&self) -> ScreenView {
        self.controller.view()
    }

    pub fn controller(&self) -> &ProgressionController {
        &self.controller
    }

    pub fn text_generator(&self) -> &TextGenerator<B> {
        &self.text
    }

    fn fire(&mut self, due: Duration, ticket: Ticket) {
        // Dead tickets do not move the clock.
        if !self.controller.is_outstanding(ticket) {
            return;
        }
        self.now = self.now.max(due);
        let effects = self.controller.timer_fired(ticket);
        self.dispatch(effects);
    }

    fn dispatch(&mut self, effects: Vec<Effect>) {
        let mut queue = VecDeque::from(effects);
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Schedule { ticket, delay } => {
                    self.timers.push(Reverse((self.now + delay, ticket)));
                }
                Effect::Generate { ticket, request } => {
                    let text = self.text.fulfil(&request);
                    queue.extend(self.controller.text_ready(ticket, text));
                }
            }
        }
    }
}
