/// Play: interactive terminal playthrough of the challenge sequence.
///
/// Usage: play [--seed <n>] [--fast] [--config <file>] [--challenges <file>] [--grammar <file>] [-v]
///
/// Commands:
///   start            begin verification
///   check            tick the checkbox
///   type <text>      fill the text field
///   verify           press the verify button
///   toggle <i>       toggle grid tile i
///   slide <p>...     press the slider, drag through positions, release
///   choose <n>       pick a multiple-choice answer
///   hover            move the pointer over the button
///   pick <i>         click tile i
///   restart          start over from a final screen
///   status           show the current screen again
///   help             list commands
///   quit             exit

use clap::Parser;
use crapcha::config::{GameConfig, Pacing};
use crapcha::core::driver::Driver;
use crapcha::core::textgen::GrammarBackend;
use crapcha::core::view::{ChallengeView, ScreenView};
use crapcha::schema::interaction::Interaction;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "play")]
#[command(about = "Prove you are human. Good luck.")]
struct Cli {
    /// Seed for every random choice in the run
    #[arg(long)]
    seed: Option<u64>,

    /// Skip all pacing delays
    #[arg(long)]
    fast: bool,

    /// RON game config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replacement challenge list (RON)
    #[arg(long)]
    challenges: Option<PathBuf>,

    /// Extra taunt grammar rules (RON), layered over the built-in ones
    #[arg(long)]
    grammar: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let mut config = match &cli.config {
        Some(path) => match GameConfig::load_from_ron(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("ERROR: Failed to load config: {}", e);
                process::exit(1);
            }
        },
        None => GameConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if cli.challenges.is_some() {
        config.challenges = cli.challenges.clone();
    }
    if cli.grammar.is_some() {
        config.grammar = cli.grammar.clone();
    }
    if cli.fast {
        config.pacing = Pacing::instant();
    }

    let mut driver = match Driver::from_config(&config) {
        Ok(driver) => driver,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    println!(
        "Loaded {} challenges. Seed: {}",
        driver.controller().registry().len(),
        config.seed
    );
    println!("Type 'help' for commands.\n");
    render(&driver.view());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("crapcha> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd.to_lowercase(), rest.trim()),
            None => (line.to_lowercase(), ""),
        };

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye, human. Probably.");
                break;
            }
            "help" | "h" | "?" => {
                print_help();
                continue;
            }
            "status" => {
                render(&driver.view());
                continue;
            }
            "start" => driver.start(),
            "restart" => driver.restart(),
            "check" => driver.interact(Interaction::Check),
            "verify" => driver.interact(Interaction::Verify),
            "hover" => driver.interact(Interaction::Hover),
            "type" => driver.interact(Interaction::Type {
                text: rest.to_string(),
            }),
            "toggle" | "pick" => {
                let index: usize = match rest.parse() {
                    Ok(i) => i,
                    Err(_) => {
                        println!("Usage: {} <tile index 0-8>", cmd);
                        continue;
                    }
                };
                if cmd == "toggle" {
                    driver.interact(Interaction::ToggleItem { index });
                } else {
                    driver.interact(Interaction::SelectItem { index });
                }
            }
            "choose" => match rest.parse::<i64>() {
                Ok(value) => driver.interact(Interaction::Choose { value }),
                Err(_) => {
                    println!("Usage: choose <number>");
                    continue;
                }
            },
            "slide" => {
                let positions: Result<Vec<f64>, _> =
                    rest.split_whitespace().map(str::parse::<f64>).collect();
                let positions = match positions {
                    Ok(p) if !p.is_empty() => p,
                    _ => {
                        println!("Usage: slide <position 0-100>...");
                        continue;
                    }
                };
                driver.interact(Interaction::Press);
                for position in positions {
                    driver.interact(Interaction::Drag { position });
                    if let ScreenView::Playing {
                        challenge: ChallengeView::Slider { position, .. },
                        ..
                    } = driver.view()
                    {
                        println!("  slider at {:.1}", position);
                    }
                }
                driver.interact(Interaction::Release);
            }
            _ => {
                println!("Unknown command: {}. Type 'help' for commands.", cmd);
                continue;
            }
        }

        run_timers(&mut driver, cli.fast);
        render(&driver.view());
    }
}

/// Let every pending timer run, showing intermediate screens on the way.
fn run_timers(driver: &mut Driver<GrammarBackend>, fast: bool) {
    while let Some(wait) = driver.next_deadline() {
        render(&driver.view());
        if !fast {
            std::thread::sleep(wait);
        }
        driver.advance(wait);
    }
}

fn render(view: &ScreenView) {
    println!();
    match view {
        ScreenView::Start { title, blurb } => {
            println!("== {} ==", title);
            println!("{}", blurb);
            println!("(type 'start')");
        }
        ScreenView::Loading { message } | ScreenView::Verifying { message } => {
            println!("{}", message);
        }
        ScreenView::Playing {
            level,
            title,
            instruction,
            progress,
            challenge,
        } => {
            println!("[{:>3.0}%] Level {}: {}", progress * 100.0, level, title);
            if let Some(instruction) = instruction {
                println!("{}", instruction);
            }
            render_challenge(challenge);
        }
        ScreenView::FinalFail { headline, message } => {
            println!("*** {} ***", headline);
            println!("{}", message);
            println!("(type 'restart')");
        }
        ScreenView::FinalSuccess {
            headline,
            note,
            code,
        } => {
            println!("*** {} ***", headline);
            println!("Admin code: {}", code);
            println!("{}", note);
            println!("(type 'restart')");
        }
        ScreenView::Error { message } => {
            println!("{}", message);
        }
    }
    println!("-- {} --", view.footer());
}

fn render_challenge(challenge: &ChallengeView) {
    match challenge {
        ChallengeView::Checkbox { checked, label } => {
            println!("  [{}] {}", if *checked { "x" } else { " " }, label);
        }
        ChallengeView::TextMatch { target, draft } => {
            println!("  Type: \"{}\"", target);
            println!("  > {}", draft);
        }
        ChallengeView::ImageGrid { keywords, selected } => {
            for (i, keyword) in keywords.iter().enumerate() {
                let mark = if selected.contains(&i) { "*" } else { " " };
                print!("  {}{}: {:<12}", mark, i, keyword);
                if i % 3 == 2 {
                    println!();
                }
            }
            println!();
        }
        ChallengeView::Slider {
            position,
            dragging,
            hint_visible,
        } => {
            let filled = (*position / 5.0).round() as usize;
            println!("  |{:<20}| {:.1}", "=".repeat(filled.min(20)), position);
            if *hint_visible && !dragging {
                println!("  Slide all the way to the right.");
            }
        }
        ChallengeView::MathPuzzle {
            equation,
            feedback,
            pending,
            draft,
            options,
        } => {
            println!("  {}", equation);
            if *pending {
                println!("  ...");
            } else if let Some(feedback) = feedback {
                println!("  {}", feedback);
            }
            match options {
                Some(options) => {
                    let list: Vec<String> = options.iter().map(|o| o.to_string()).collect();
                    println!("  Options: {}", list.join("  "));
                }
                None => println!("  x = {}", draft),
            }
        }
        ChallengeView::IdenticalImages { tiles } => {
            println!("  {} identical pictures.", tiles);
        }
        ChallengeView::VagueInstruction {
            instruction, tiles, ..
        } => {
            match instruction {
                Some(text) => println!("  {}", text),
                None => println!("  Loading instruction..."),
            }
            println!("  {} tiles (pick <i>)", tiles);
        }
        ChallengeView::EvasiveButton { offset_x, offset_y } => {
            println!("  [Verify] drifting at ({:.0}, {:.0})", offset_x, offset_y);
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  start            begin verification");
    println!("  check            tick the checkbox");
    println!("  type <text>      fill the text field");
    println!("  verify           press the verify button");
    println!("  toggle <i>       toggle grid tile i");
    println!("  slide <p>...     press the slider, drag through positions, release");
    println!("  choose <n>       pick a multiple-choice answer");
    println!("  hover            move the pointer over the button");
    println!("  pick <i>         click tile i");
    println!("  restart          start over from a final screen");
    println!("  status           show the current screen again");
    println!("  help             list commands");
    println!("  quit             exit");
}
