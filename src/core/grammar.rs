/// Stochastic grammar runtime: templates, loading, and weighted expansion.
///
/// Drives the offline text backend: every taunt, instruction and admin code
/// the game shows without a remote model is expanded from one of these rules.

use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::RngCore;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Expansion depth at which a rule chain is considered runaway.
const MAX_DEPTH: usize = 16;

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("template parse error: {0}")]
    TemplateParse(String),
    #[error("rule not found: {0}")]
    RuleNotFound(String),
    #[error("rule '{0}' has no alternatives with positive weight")]
    EmptyRule(String),
    #[error("prompt field '{0}' is not bound")]
    UnboundField(String),
    #[error("expansion depth limit reached at rule '{0}'")]
    RecursionLimit(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// A segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TemplateSegment {
    /// Literal text, emitted as-is.
    Literal(String),
    /// Reference to another grammar rule: `{rule_name}`.
    RuleRef(String),
    /// Prompt field interpolation: `{prompt.field}`.
    PromptField { field: String },
}

/// A parsed template: a sequence of segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub segments: Vec<TemplateSegment>,
}

impl Template {
    /// Parse a template string into a sequence of segments.
    ///
    /// Syntax:
    /// - `{rule_name}` → `RuleRef`
    /// - `{prompt.field}` → `PromptField`
    /// - `{{` / `}}` → literal brace
    /// - Everything else → `Literal`
    pub fn parse(input: &str) -> Result<Template, GrammarError> {
        let mut segments = Vec::new();
        let mut literal_buf = String::new();
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal_buf.push('{');
                }
                '{' => {
                    if !literal_buf.is_empty() {
                        segments.push(TemplateSegment::Literal(std::mem::take(&mut literal_buf)));
                    }

                    let mut content = String::new();
                    let mut closed = false;
                    for inner in chars.by_ref() {
                        match inner {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => {
                                return Err(GrammarError::TemplateParse(
                                    "nested braces are not allowed".to_string(),
                                ));
                            }
                            other => content.push(other),
                        }
                    }

                    if !closed {
                        return Err(GrammarError::TemplateParse("unclosed brace".to_string()));
                    }
                    segments.push(Self::parse_segment(content.trim())?);
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal_buf.push('}');
                }
                '}' => {
                    return Err(GrammarError::TemplateParse(
                        "unmatched closing brace".to_string(),
                    ));
                }
                other => literal_buf.push(other),
            }
        }

        if !literal_buf.is_empty() {
            segments.push(TemplateSegment::Literal(literal_buf));
        }

        Ok(Template { segments })
    }

    fn parse_segment(content: &str) -> Result<TemplateSegment, GrammarError> {
        if content.is_empty() {
            return Err(GrammarError::TemplateParse("empty braces".to_string()));
        }

        if let Some(field) = content.strip_prefix("prompt.") {
            if field.is_empty() {
                return Err(GrammarError::TemplateParse(
                    "empty prompt field name".to_string(),
                ));
            }
            return Ok(TemplateSegment::PromptField {
                field: field.to_string(),
            });
        }

        Ok(TemplateSegment::RuleRef(content.to_string()))
    }

    /// Names of every rule this template refers to.
    pub fn rule_refs(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            TemplateSegment::RuleRef(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

/// A weighted text alternative within a grammar rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alternative {
    pub weight: u32,
    pub template: Template,
}

/// A single grammar rule with weighted alternatives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarRule {
    pub name: String,
    pub alternatives: Vec<Alternative>,
}

/// A set of named grammar rules.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GrammarSet {
    pub rules: HashMap<String, GrammarRule>,
}

/// Values substituted for `{prompt.field}` segments during expansion.
pub type Bindings = FxHashMap<&'static str, String>;

// The RON file lists alternatives as raw text; templates are parsed on load.

#[derive(Debug, Deserialize)]
struct RonAlternative {
    weight: u32,
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "Rule")]
struct RonRule {
    alternatives: Vec<RonAlternative>,
}

impl GrammarSet {
    /// Load a grammar set from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<GrammarSet, GrammarError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a grammar set from a RON string.
    pub fn parse_ron(input: &str) -> Result<GrammarSet, GrammarError> {
        let raw: HashMap<String, RonRule> = ron::from_str(input)?;
        let mut rules = HashMap::new();

        for (name, ron_rule) in raw {
            let alternatives = ron_rule
                .alternatives
                .into_iter()
                .map(|alt| {
                    Ok(Alternative {
                        weight: alt.weight,
                        template: Template::parse(&alt.text)?,
                    })
                })
                .collect::<Result<Vec<_>, GrammarError>>()?;
            rules.insert(name.clone(), GrammarRule { name, alternatives });
        }

        Ok(GrammarSet { rules })
    }

    /// Merge another grammar set into this one. Rules from `other`
    /// override rules in `self` with the same name.
    pub fn merge(&mut self, other: GrammarSet) {
        for (name, rule) in other.rules {
            self.rules.insert(name, rule);
        }
    }

    /// Expand `rule` into text, picking one weighted alternative per rule.
    pub fn expand(
        &self,
        rule: &str,
        bindings: &Bindings,
        rng: &mut dyn RngCore,
    ) -> Result<String, GrammarError> {
        let mut out = String::new();
        self.expand_into(rule, bindings, rng, 0, &mut out)?;
        Ok(out)
    }

    fn expand_into(
        &self,
        rule_name: &str,
        bindings: &Bindings,
        rng: &mut dyn RngCore,
        depth: usize,
        out: &mut String,
    ) -> Result<(), GrammarError> {
        if depth >= MAX_DEPTH {
            return Err(GrammarError::RecursionLimit(rule_name.to_string()));
        }

        let rule = self
            .rules
            .get(rule_name)
            .ok_or_else(|| GrammarError::RuleNotFound(rule_name.to_string()))?;

        let weights: Vec<u32> = rule.alternatives.iter().map(|a| a.weight).collect();
        let dist = WeightedIndex::new(&weights)
            .map_err(|_| GrammarError::EmptyRule(rule_name.to_string()))?;
        let chosen = &rule.alternatives[dist.sample(&mut *rng)];

        for segment in &chosen.template.segments {
            match segment {
                TemplateSegment::Literal(text) => out.push_str(text),
                TemplateSegment::RuleRef(name) => {
                    self.expand_into(name, bindings, rng, depth + 1, out)?
                }
                TemplateSegment::PromptField { field } => {
                    let value = bindings
                        .get(field.as_str())
                        .ok_or_else(|| GrammarError::UnboundField(field.clone()))?;
                    out.push_str(value);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rule(name: &str, alts: &[(u32, &str)]) -> GrammarRule {
        GrammarRule {
            name: name.to_string(),
            alternatives: alts
                .iter()
                .map(|(weight, text)| Alternative {
                    weight: *weight,
                    template: Template::parse(text).unwrap(),
                })
                .collect(),
        }
    }

    fn set(rules: Vec<GrammarRule>) -> GrammarSet {
        GrammarSet {
            rules: rules.into_iter().map(|r| (r.name.clone(), r)).collect(),
        }
    }

    #[test]
    fn parse_literal_only() {
        let t = Template::parse("Are you even trying?").unwrap();
        assert_eq!(
            t.segments,
            vec![TemplateSegment::Literal("Are you even trying?".to_string())]
        );
    }

    #[test]
    fn parse_rule_ref_and_field() {
        let t = Template::parse("Level {prompt.level}: {insult}").unwrap();
        assert_eq!(t.segments.len(), 4);
        assert_eq!(
            t.segments[1],
            TemplateSegment::PromptField {
                field: "level".to_string()
            }
        );
        assert_eq!(t.segments[3], TemplateSegment::RuleRef("insult".to_string()));
        assert_eq!(t.rule_refs().collect::<Vec<_>>(), vec!["insult"]);
    }

    #[test]
    fn parse_escaped_braces() {
        let t = Template::parse("Use {{braces}} here.").unwrap();
        assert_eq!(
            t.segments,
            vec![TemplateSegment::Literal("Use {braces} here.".to_string())]
        );
    }

    #[test]
    fn parse_errors() {
        assert!(Template::parse("Bad {} here").is_err());
        assert!(Template::parse("Bad {outer{inner}} here").is_err());
        assert!(Template::parse("Bad {unclosed here").is_err());
        assert!(Template::parse("Bad } here").is_err());
        assert!(Template::parse("Bad {prompt.} here").is_err());
    }

    #[test]
    fn expand_substitutes_fields_and_rules() {
        let gs = set(vec![
            rule("root", &[(1, "\"{prompt.answer}\"? {verdict}")]),
            rule("verdict", &[(1, "Beep boop.")]),
        ]);
        let mut bindings = Bindings::default();
        bindings.insert("answer", "7".to_string());
        let mut rng = StdRng::seed_from_u64(1);
        let text = gs.expand("root", &bindings, &mut rng).unwrap();
        assert_eq!(text, "\"7\"? Beep boop.");
    }

    #[test]
    fn zero_weight_alternative_never_chosen() {
        let gs = set(vec![rule("root", &[(0, "never"), (5, "always")])]);
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..50 {
            assert_eq!(gs.expand("root", &Bindings::default(), &mut rng).unwrap(), "always");
        }
    }

    #[test]
    fn expand_errors() {
        let gs = set(vec![
            rule("loop", &[(1, "again {loop}")]),
            rule("needs_field", &[(1, "{prompt.level}")]),
            rule("dead", &[(0, "nothing")]),
        ]);
        let mut rng = StdRng::seed_from_u64(3);
        let b = Bindings::default();
        assert!(matches!(gs.expand("missing", &b, &mut rng), Err(GrammarError::RuleNotFound(_))));
        assert!(matches!(gs.expand("loop", &b, &mut rng), Err(GrammarError::RecursionLimit(_))));
        assert!(matches!(gs.expand("needs_field", &b, &mut rng), Err(GrammarError::UnboundField(_))));
        assert!(matches!(gs.expand("dead", &b, &mut rng), Err(GrammarError::EmptyRule(_))));
    }

    #[test]
    fn parse_ron_rules() {
        let gs = GrammarSet::parse_ron(
            r#"{
                "greeting": Rule(alternatives: [
                    (weight: 2, text: "Hello, {target}."),
                    (weight: 1, text: "Hi."),
                ]),
                "target": Rule(alternatives: [(weight: 1, text: "robot")]),
            }"#,
        )
        .unwrap();
        assert_eq!(gs.rules.len(), 2);
        assert_eq!(gs.rules["greeting"].alternatives.len(), 2);
        assert_eq!(gs.rules["greeting"].alternatives[0].weight, 2);
    }

    #[test]
    fn merge_precedence() {
        let mut base = set(vec![rule("shared", &[(1, "base")]), rule("base_only", &[(1, "x")])]);
        base.merge(set(vec![rule("shared", &[(2, "override")])]));
        assert_eq!(base.rules["shared"].alternatives[0].weight, 2);
        assert!(base.rules.contains_key("base_only"));
    }
}
