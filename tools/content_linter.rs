/// Content Linter: validates challenge lists and taunt grammars.
///
/// Usage: content_linter [--challenges <file>] [--grammar <file>]
///
/// With no arguments the built-in content is checked.

use crapcha::core::grammar::{GrammarSet, TemplateSegment};
use crapcha::core::registry::ChallengeRegistry;
use crapcha::core::textgen::{standard_grammar, TextRequest};
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && (args[1] == "--help" || args[1] == "-h") {
        println!("Usage: content_linter [--challenges <file>] [--grammar <file>]");
        process::exit(0);
    }

    let mut challenges_path = None;
    let mut grammar_path = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--challenges" if i + 1 < args.len() => {
                i += 1;
                challenges_path = Some(args[i].clone());
            }
            "--grammar" if i + 1 < args.len() => {
                i += 1;
                grammar_path = Some(args[i].clone());
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Challenge list
    let registry = match &challenges_path {
        Some(path) => ChallengeRegistry::load_from_ron(Path::new(path)),
        None => ChallengeRegistry::standard(),
    };
    match registry {
        Ok(registry) => println!("Loaded {} challenges", registry.len()),
        Err(e) => errors.push(format!("Challenge list rejected: {}", e)),
    }

    // Grammar. A custom file is linted on top of the built-in rules, the
    // way the game loads it.
    let grammars = match standard_grammar() {
        Ok(mut grammars) => {
            if let Some(path) = &grammar_path {
                match GrammarSet::load_from_ron(Path::new(path)) {
                    Ok(extra) => grammars.merge(extra),
                    Err(e) => {
                        eprintln!("ERROR: Failed to load grammar file: {}", e);
                        process::exit(1);
                    }
                }
            }
            Some(grammars)
        }
        Err(e) => {
            errors.push(format!("Built-in grammar rejected: {}", e));
            None
        }
    };

    if let Some(grammars) = &grammars {
        println!("Loaded {} grammar rules", grammars.rules.len());
        let (grammar_errors, grammar_warnings) = lint_grammars(grammars);
        errors.extend(grammar_errors);
        warnings.extend(grammar_warnings);
    }

    println!("\n=== Content Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if !errors.is_empty() {
        process::exit(1);
    }
}

fn lint_grammars(grammars: &GrammarSet) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for root in TextRequest::ROOT_RULES {
        if !grammars.rules.contains_key(root) {
            errors.push(format!("Missing root rule '{}'", root));
        }
    }

    let mut names: Vec<&String> = grammars.rules.keys().collect();
    names.sort();

    for name in names {
        let rule = &grammars.rules[name];

        if rule.alternatives.is_empty() {
            errors.push(format!("Rule '{}' has no alternatives", name));
            continue;
        }
        if rule.alternatives.len() < 3 {
            warnings.push(format!(
                "Rule '{}' has only {} alternatives (minimum 3 recommended)",
                name,
                rule.alternatives.len()
            ));
        }
        if rule.alternatives.iter().all(|a| a.weight == 0) {
            errors.push(format!("Rule '{}' has no alternative with a positive weight", name));
        }

        for alt in &rule.alternatives {
            for ref_name in alt.template.rule_refs() {
                if !grammars.rules.contains_key(ref_name) {
                    errors.push(format!(
                        "Rule '{}' references non-existent rule '{}'",
                        name, ref_name
                    ));
                }
            }
            for segment in &alt.template.segments {
                if let TemplateSegment::PromptField { field } = segment {
                    if !matches!(field.as_str(), "level" | "attempts" | "answer") {
                        warnings.push(format!(
                            "Rule '{}' uses unknown field 'prompt.{}'",
                            name, field
                        ));
                    }
                }
            }
        }

        let all_self_ref = rule
            .alternatives
            .iter()
            .all(|a| a.template.rule_refs().any(|r| r == name.as_str()));
        if all_self_ref {
            errors.push(format!(
                "Rule '{}' has no non-recursive alternative (infinite recursion)",
                name
            ));
        }
    }

    (errors, warnings)
}
