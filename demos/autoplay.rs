/// Autoplay: a scripted bot that plays the whole sequence with the
/// built-in content and prints every screen it sees.
///
/// Usage: cargo run --example autoplay -- [--seed <n>] [--fail-at <level>]

use crapcha::config::{GameConfig, Pacing};
use crapcha::core::challenges::CORRECT_ANSWER;
use crapcha::core::driver::Driver;
use crapcha::core::textgen::GrammarBackend;
use crapcha::core::view::{ChallengeView, ScreenView};
use crapcha::schema::challenge::{Behavior, Payload};
use crapcha::schema::interaction::Interaction;
use crapcha::schema::state::GameState;

const WRONG_GUESSES: [&str; 4] = ["2", "x", "", "42"];

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let mut seed: u64 = 42;
    let mut fail_at: Option<u32> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            "--fail-at" if i + 1 < args.len() => {
                i += 1;
                fail_at = args[i].parse().ok();
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let config = GameConfig {
        seed,
        pacing: Pacing::instant(),
        ..GameConfig::default()
    };
    let mut driver = match Driver::from_config(&config) {
        Ok(driver) => driver,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    driver.start();
    driver.settle();

    while driver.state() == GameState::Playing {
        let Some(def) = driver.controller().current_challenge().cloned() else {
            break;
        };
        println!("\n=== Level {}: {} ({}) ===", def.level, def.title, def.behavior.tag());

        if fail_at == Some(def.level) {
            println!("bot: giving up on purpose");
            sabotage(&mut driver);
        } else {
            solve(&mut driver, def.behavior, def.payload.as_ref(), def.target_text());
        }
        driver.settle();
    }

    match driver.view() {
        ScreenView::FinalSuccess { headline, code, .. } => {
            println!("\n{}: {}", headline, code);
        }
        ScreenView::FinalFail { headline, message } => {
            println!("\n{}: {}", headline, message);
        }
        other => println!("\nStopped at {:?}", other),
    }
}

fn solve(
    driver: &mut Driver<GrammarBackend>,
    behavior: Behavior,
    payload: Option<&Payload>,
    target: Option<&str>,
) {
    match behavior {
        Behavior::TrivialConfirm => act(driver, Interaction::Check),
        Behavior::ExactTextMatch => {
            act(
                driver,
                Interaction::Type {
                    text: target.unwrap_or_default().to_string(),
                },
            );
            act(driver, Interaction::Verify);
        }
        Behavior::SubsetSelection => {
            if let Some(Payload::ImageGrid {
                correct_indices, ..
            }) = payload
            {
                for &index in correct_indices {
                    act(driver, Interaction::ToggleItem { index });
                }
            }
            act(driver, Interaction::Verify);
        }
        Behavior::AdversarialSlider => {
            act(driver, Interaction::Press);
            // The sticky band fights back; overshooting it does not.
            for position in [40.0, 75.0, 90.0, 100.0] {
                act(driver, Interaction::Drag { position });
                if let ScreenView::Playing {
                    challenge: ChallengeView::Slider { position, .. },
                    ..
                } = driver.view()
                {
                    println!("bot: slider at {:.1}", position);
                }
            }
            act(driver, Interaction::Release);
        }
        Behavior::MathPuzzle => solve_math(driver),
        Behavior::AlwaysTrueTrick => act(driver, Interaction::Verify),
        Behavior::NonsenseInstruction => {
            if let ScreenView::Playing {
                challenge: ChallengeView::VagueInstruction { instruction, .. },
                ..
            } = driver.view()
            {
                println!("bot: instruction was {:?}", instruction.unwrap_or_default());
            }
            act(driver, Interaction::SelectItem { index: 4 });
        }
        Behavior::EvasiveTarget => {
            act(driver, Interaction::Hover);
            act(driver, Interaction::Hover);
            act(driver, Interaction::Verify);
        }
    }
}

/// Miss on purpose until multiple choice shows up, then eliminate.
fn solve_math(driver: &mut Driver<GrammarBackend>) {
    for guess in WRONG_GUESSES {
        act(
            driver,
            Interaction::Type {
                text: guess.to_string(),
            },
        );
        act(driver, Interaction::Verify);
        print_math_feedback(driver);
    }

    let options = match driver.view() {
        ScreenView::Playing {
            challenge: ChallengeView::MathPuzzle { options, .. },
            ..
        } => options.unwrap_or_default(),
        _ => Vec::new(),
    };
    for value in options.into_iter().filter(|v| *v != CORRECT_ANSWER) {
        act(driver, Interaction::Choose { value });
        print_math_feedback(driver);
    }
    act(
        driver,
        Interaction::Choose {
            value: CORRECT_ANSWER,
        },
    );
}

fn print_math_feedback(driver: &Driver<GrammarBackend>) {
    if let ScreenView::Playing {
        challenge: ChallengeView::MathPuzzle {
            feedback, options, ..
        },
        ..
    } = driver.view()
    {
        println!("puzzle: {}", feedback.unwrap_or_default());
        if let Some(options) = options {
            println!("puzzle: options {:?}", options);
        }
    }
}

/// The wrong move for whichever challenge is up. Only text and grid
/// challenges can actually be failed.
fn sabotage(driver: &mut Driver<GrammarBackend>) {
    act(
        driver,
        Interaction::Type {
            text: "definitely a robot".to_string(),
        },
    );
    act(driver, Interaction::Verify);
}

fn act(driver: &mut Driver<GrammarBackend>, interaction: Interaction) {
    println!("bot: {:?}", interaction);
    driver.interact(interaction);
}
