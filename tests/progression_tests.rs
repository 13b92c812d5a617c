/// Progression integration tests: whole runs through the driver.

use crapcha::config::{GameConfig, Pacing};
use crapcha::core::controller::{Effect, ProgressionController};
use crapcha::core::driver::Driver;
use crapcha::core::textgen::{
    normalize_admin_code, Prompt, TextBackend, TextGenError, TextRequest, FALLBACK_TEXT,
};
use crapcha::core::view::{ChallengeView, ScreenView, DEFAULT_FAIL_MESSAGE};
use crapcha::schema::challenge::{Behavior, Payload};
use crapcha::schema::interaction::Interaction;
use crapcha::schema::state::GameState;
use std::path::Path;
use std::time::Duration;

/// Canned answers per request kind; remembers everything it was asked.
struct Scripted {
    taunt: String,
    code: String,
    asked: Vec<TextRequest>,
}

impl Scripted {
    fn new(taunt: &str, code: &str) -> Self {
        Scripted {
            taunt: taunt.to_string(),
            code: code.to_string(),
            asked: Vec::new(),
        }
    }
}

impl TextBackend for Scripted {
    fn generate(&mut self, prompt: &Prompt) -> Result<String, TextGenError> {
        self.asked.push(prompt.request.clone());
        Ok(match &prompt.request {
            TextRequest::Taunt { .. } => self.taunt.clone(),
            TextRequest::AdminCode => self.code.clone(),
            TextRequest::VagueInstruction => "Click the squares that feel warm.".to_string(),
            TextRequest::MathTaunt { answer } => format!("{answer}? Really?"),
        })
    }
}

struct Offline;

impl TextBackend for Offline {
    fn generate(&mut self, _prompt: &Prompt) -> Result<String, TextGenError> {
        Err(TextGenError::Backend("network unreachable".to_string()))
    }
}

fn driver<B: TextBackend>(backend: B) -> Driver<B> {
    let controller = ProgressionController::builder()
        .pacing(Pacing::instant())
        .seed(7)
        .build()
        .unwrap();
    let mut d = Driver::new(controller, backend);
    d.start();
    d.settle();
    d
}

/// Pass whatever challenge is currently mounted.
fn solve_current<B: TextBackend>(d: &mut Driver<B>) {
    let def = d.controller().current_challenge().cloned().unwrap();
    match def.behavior {
        Behavior::TrivialConfirm => d.interact(Interaction::Check),
        Behavior::ExactTextMatch => {
            d.interact(Interaction::Type {
                text: def.target_text().unwrap().to_string(),
            });
            d.interact(Interaction::Verify);
        }
        Behavior::SubsetSelection => {
            if let Some(Payload::ImageGrid {
                correct_indices, ..
            }) = &def.payload
            {
                for &index in correct_indices {
                    d.interact(Interaction::ToggleItem { index });
                }
            }
            d.interact(Interaction::Verify);
        }
        Behavior::AdversarialSlider => {
            d.interact(Interaction::Press);
            d.interact(Interaction::Drag { position: 100.0 });
            d.interact(Interaction::Release);
        }
        Behavior::MathPuzzle => {
            d.interact(Interaction::Type {
                text: "3".to_string(),
            });
            d.interact(Interaction::Verify);
        }
        Behavior::AlwaysTrueTrick => d.interact(Interaction::Verify),
        Behavior::NonsenseInstruction => d.interact(Interaction::SelectItem { index: 0 }),
        Behavior::EvasiveTarget => {
            d.interact(Interaction::Hover);
            d.interact(Interaction::Verify);
        }
    }
    d.settle();
}

fn fail_message<B: TextBackend>(d: &Driver<B>) -> String {
    match d.view() {
        ScreenView::FinalFail { message, .. } => message,
        other => panic!("expected final fail screen, got {other:?}"),
    }
}

#[test]
fn full_run_ends_with_normalized_code() {
    let mut d = driver(Scripted::new("unused", " adm 7-r1dl!! c0de "));

    for expected in 0..8 {
        assert_eq!(d.state(), GameState::Playing);
        assert_eq!(d.controller().current_level_index(), expected);
        solve_current(&mut d);
    }

    assert_eq!(d.state(), GameState::FinalSuccess);
    assert_eq!(d.controller().completion_code(), Some("ADM-7-R1DL-C0DE"));
    match d.view() {
        ScreenView::FinalSuccess { headline, code, .. } => {
            assert_eq!(headline, "Verification Complete");
            assert_eq!(code, "ADM-7-R1DL-C0DE");
        }
        other => panic!("unexpected view {other:?}"),
    }

    let asked = &d.text_generator().backend().asked;
    assert_eq!(
        asked,
        &vec![TextRequest::VagueInstruction, TextRequest::AdminCode]
    );
}

#[test]
fn every_pass_moves_exactly_one_level() {
    let mut d = driver(Scripted::new("x", "CODE"));
    for index in 0..7 {
        solve_current(&mut d);
        assert_eq!(d.controller().current_level_index(), index + 1);
        assert!(d.controller().fail_message().is_none());
    }
}

#[test]
fn wrong_text_at_level_two_shows_taunt() {
    let mut d = driver(Scripted::new("Nice try, toaster.", "CODE"));
    solve_current(&mut d);

    d.interact(Interaction::Type {
        text: "I am a robot".to_string(),
    });
    d.interact(Interaction::Verify);
    d.settle();

    assert_eq!(d.state(), GameState::FinalFail);
    assert_eq!(fail_message(&d), "Nice try, toaster.");
    assert_eq!(
        d.text_generator().backend().asked,
        vec![TextRequest::Taunt {
            level: 2,
            attempts: 1
        }]
    );
}

#[test]
fn text_match_ignores_case_and_outer_whitespace() {
    let mut d = driver(Scripted::new("x", "CODE"));
    solve_current(&mut d);
    d.interact(Interaction::Type {
        text: "  i AM a HUMAN ".to_string(),
    });
    d.interact(Interaction::Verify);
    d.settle();
    assert_eq!(d.controller().current_level_index(), 2);
}

#[test]
fn incomplete_grid_selection_fails_level_three() {
    let mut d = driver(Scripted::new("Felines: 0. You: robot.", "CODE"));
    solve_current(&mut d);
    solve_current(&mut d);
    assert_eq!(d.controller().current_level_index(), 2);

    // Every feline except the kitten.
    for index in [0, 1, 2, 4, 6] {
        d.interact(Interaction::ToggleItem { index });
    }
    d.interact(Interaction::Verify);
    d.settle();

    assert_eq!(d.state(), GameState::FinalFail);
    assert_eq!(fail_message(&d), "Felines: 0. You: robot.");
    assert_eq!(
        d.text_generator().backend().asked,
        vec![TextRequest::Taunt {
            level: 3,
            attempts: 1
        }]
    );
}

#[test]
fn extra_grid_selection_fails_too() {
    let mut d = driver(Scripted::new("Dogs are not cats.", "CODE"));
    solve_current(&mut d);
    solve_current(&mut d);

    for index in [0, 1, 2, 3, 4, 6, 7] {
        d.interact(Interaction::ToggleItem { index });
    }
    d.interact(Interaction::Verify);
    d.settle();
    assert_eq!(d.state(), GameState::FinalFail);
}

#[test]
fn blank_taunt_shows_default_message() {
    let mut d = driver(Scripted::new("   ", "CODE"));
    solve_current(&mut d);
    d.interact(Interaction::Verify);
    d.settle();
    assert_eq!(fail_message(&d), DEFAULT_FAIL_MESSAGE);
}

#[test]
fn restart_resets_the_session() {
    let mut d = driver(Scripted::new("Robot.", "CODE"));
    solve_current(&mut d);
    d.interact(Interaction::Verify);
    d.settle();
    assert_eq!(d.state(), GameState::FinalFail);

    d.restart();
    assert_eq!(d.state(), GameState::Start);
    assert_eq!(d.controller().current_level_index(), 0);
    assert!(d.controller().fail_message().is_none());
    assert!(d.controller().completion_code().is_none());
    assert_eq!(d.view(), ScreenView::start());

    d.start();
    d.settle();
    assert_eq!(d.state(), GameState::Playing);
    assert_eq!(d.controller().live_behavior(), Some(Behavior::TrivialConfirm));
}

#[test]
fn restart_after_success_starts_over() {
    let mut d = driver(Scripted::new("x", "ADM7R1DLC0DE"));
    for _ in 0..8 {
        solve_current(&mut d);
    }
    assert_eq!(d.state(), GameState::FinalSuccess);
    d.restart();
    assert_eq!(d.state(), GameState::Start);
    assert!(d.controller().completion_code().is_none());
}

#[test]
fn old_timer_after_restart_is_ignored() {
    let mut c = ProgressionController::builder().seed(3).build().unwrap();
    let first = |effects: Vec<Effect>| effects.into_iter().next().unwrap();

    let loading = first(c.start());
    c.timer_fired(loading.ticket());
    let confirm = first(c.interact(Interaction::Check));
    let advance = first(c.timer_fired(confirm.ticket()));
    c.timer_fired(advance.ticket());
    let generate = first(c.interact(Interaction::Verify));
    let reveal = first(c.text_ready(generate.ticket(), "Robot.".to_string()));
    c.timer_fired(reveal.ticket());
    assert_eq!(c.state(), GameState::FinalFail);

    c.restart();
    let fresh = first(c.start());
    assert_eq!(c.state(), GameState::Loading);

    for old in [loading, advance, reveal] {
        assert!(c.timer_fired(old.ticket()).is_empty());
        assert_eq!(c.state(), GameState::Loading);
    }
    assert!(c.text_ready(generate.ticket(), "late".to_string()).is_empty());
    assert!(c.fail_message().is_none());

    c.timer_fired(fresh.ticket());
    assert_eq!(c.state(), GameState::Playing);
}

#[test]
fn unreachable_backend_still_completes_the_run() {
    let mut d = driver(Offline);
    for _ in 0..8 {
        solve_current(&mut d);
    }
    assert_eq!(d.state(), GameState::FinalSuccess);
    let code = d.controller().completion_code().unwrap();
    assert!(!code.is_empty());
    assert_eq!(code, normalize_admin_code(FALLBACK_TEXT));
}

#[test]
fn unreachable_backend_fails_with_fallback_taunt() {
    let mut d = driver(Offline);
    solve_current(&mut d);
    d.interact(Interaction::Verify);
    d.settle();
    assert_eq!(fail_message(&d), FALLBACK_TEXT);
}

#[test]
fn math_puzzle_cannot_be_failed() {
    let mut d = driver(Scripted::new("x", "CODE"));
    for _ in 0..4 {
        solve_current(&mut d);
    }
    assert_eq!(d.controller().live_behavior(), Some(Behavior::MathPuzzle));

    for guess in ["1", "2", "", "17", "-1", "banana", "4", "9"] {
        d.interact(Interaction::Type {
            text: guess.to_string(),
        });
        d.interact(Interaction::Verify);
        d.settle();
        assert_eq!(d.state(), GameState::Playing);
    }

    match d.view() {
        ScreenView::Playing {
            challenge: ChallengeView::MathPuzzle {
                feedback, options, ..
            },
            ..
        } => {
            assert_eq!(feedback.as_deref(), Some("9? Really?"));
            assert_eq!(options, Some(vec![3]));
        }
        other => panic!("unexpected view {other:?}"),
    }

    d.interact(Interaction::Choose { value: 3 });
    d.settle();
    assert_eq!(d.controller().current_level_index(), 5);
}

#[test]
fn early_slider_release_snaps_back_without_failing() {
    let mut d = driver(Scripted::new("x", "CODE"));
    for _ in 0..3 {
        solve_current(&mut d);
    }
    d.interact(Interaction::Press);
    d.interact(Interaction::Drag { position: 40.0 });
    d.interact(Interaction::Release);
    d.settle();

    assert_eq!(d.state(), GameState::Playing);
    match d.view() {
        ScreenView::Playing {
            challenge: ChallengeView::Slider { position, .. },
            ..
        } => assert_eq!(position, 0.0),
        other => panic!("unexpected view {other:?}"),
    }
}

#[test]
fn vague_instruction_arrives_in_view() {
    let mut d = driver(Scripted::new("x", "CODE"));
    for _ in 0..6 {
        solve_current(&mut d);
    }
    match d.view() {
        ScreenView::Playing {
            level,
            progress,
            challenge: ChallengeView::VagueInstruction { instruction, .. },
            ..
        } => {
            assert_eq!(level, 7);
            assert!((progress - 7.0 / 8.0).abs() < 1e-9);
            assert_eq!(instruction.as_deref(), Some("Click the squares that feel warm."));
        }
        other => panic!("unexpected view {other:?}"),
    }
}

#[test]
fn default_pacing_is_honoured() {
    let controller = ProgressionController::builder().seed(1).build().unwrap();
    let mut d = Driver::new(controller, Scripted::new("x", "CODE"));
    d.start();
    d.advance(Duration::from_millis(999));
    assert_eq!(d.state(), GameState::Loading);
    d.advance(Duration::from_millis(1));
    assert_eq!(d.state(), GameState::Playing);

    d.interact(Interaction::Check);
    d.advance(Duration::from_millis(500));
    assert_eq!(d.state(), GameState::Verifying);
    assert_eq!(d.view(), ScreenView::verifying());
    d.advance(Duration::from_millis(700));
    assert_eq!(d.controller().current_level_index(), 1);
    assert_eq!(d.state(), GameState::Playing);
}

#[test]
fn custom_content_from_config_files() {
    let mut config = GameConfig::load_from_ron(Path::new("tests/fixtures/fast_config.ron")).unwrap();
    config.challenges = Some("tests/fixtures/short_run.ron".into());

    let mut d = Driver::from_config(&config).unwrap();
    assert_eq!(d.controller().registry().len(), 2);
    d.start();
    d.settle();

    d.interact(Interaction::Type {
        text: " Beep Boop ".to_string(),
    });
    d.interact(Interaction::Verify);
    d.settle();
    assert_eq!(d.controller().live_behavior(), Some(Behavior::AlwaysTrueTrick));

    d.interact(Interaction::Verify);
    d.settle();
    assert_eq!(d.state(), GameState::FinalSuccess);
    assert!(!d.controller().completion_code().unwrap().is_empty());
}
