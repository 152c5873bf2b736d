//! Natural-language heuristics used by the verifier.
//!
//! Rule conditions and actions are opaque text. Everything that guesses
//! structure from that text lives here: `Entity.field` references, simple
//! comparisons, the antonym and contradiction vocabularies, and detection
//! of AI-capable integrations. These are fixed-vocabulary heuristics with
//! known false negatives; they are not an expression grammar.

use crate::ast::Integration;
use std::collections::BTreeSet;

/// Value pairs treated as mutually exclusive, in either order.
pub const ANTONYMS: &[(&str, &str)] = &[
    ("true", "false"),
    ("enabled", "disabled"),
    ("active", "inactive"),
    ("visible", "hidden"),
    ("allowed", "denied"),
    ("public", "private"),
];

/// Action verbs treated as contradictory, in either order.
pub const CONTRADICTIONS: &[(&str, &str)] = &[
    ("create", "delete"),
    ("enable", "disable"),
    ("show", "hide"),
    ("allow", "deny"),
    ("approve", "reject"),
    ("activate", "deactivate"),
    ("publish", "unpublish"),
];

/// Words that mark an integration as AI-capable.
const AI_KEYWORDS: &[&str] = &[
    "ai",
    "llm",
    "gpt",
    "openai",
    "anthropic",
    "claude",
    "gemini",
    "model",
];

/// Endpoint hosts of known model providers.
const AI_HOSTS: &[&str] = &[
    "api.anthropic.com",
    "api.openai.com",
    "generativelanguage.googleapis.com",
    "api.mistral.ai",
    "api.cohere.ai",
];

/// Comparison operators recognized in plain conditions, longest first.
/// The flag marks negating operators.
const OPERATORS: &[(&str, bool)] = &[
    (" is not ", true),
    (" != ", true),
    (" == ", false),
    (" is ", false),
    (" = ", false),
];

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|w| !w.is_empty())
}

/// Upper-case the first character: `ticket` -> `Ticket`.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn is_ai_capable(integration: &Integration) -> bool {
    let mut texts = vec![integration.name.as_str()];
    if let Some(purpose) = &integration.purpose {
        texts.push(purpose);
    }
    let keyword_hit = texts.iter().any(|text| {
        words(text).any(|w| {
            let w = w.to_ascii_lowercase();
            AI_KEYWORDS.contains(&w.as_str())
        })
    });
    if keyword_hit {
        return true;
    }
    integration
        .endpoint
        .as_deref()
        .and_then(|e| url::Url::parse(e).ok())
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .is_some_and(|host| AI_HOSTS.contains(&host.as_str()))
}

/// A reference guessed from free text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reference {
    pub entity: Option<String>,
    pub field: Option<String>,
}

/// Split `entity.field` into a capitalized entity and a field. A bare word
/// is a field when it does not name a known entity.
pub fn split_reference(subject: &str, entities: &BTreeSet<&str>) -> Reference {
    let subject = subject.trim();
    match subject.split_once('.') {
        Some((entity, field)) => Reference {
            entity: Some(capitalize(entity.trim())),
            field: Some(field.trim().to_owned()).filter(|f| !f.is_empty()),
        },
        None if entities.contains(capitalize(subject).as_str()) => Reference {
            entity: Some(capitalize(subject)),
            field: None,
        },
        None if subject.is_empty() => Reference::default(),
        None => Reference {
            entity: None,
            field: Some(subject.to_owned()),
        },
    }
}

/// First word of `text` that names a known entity, exactly or once
/// capitalized.
pub fn mentioned_entity(text: &str, entities: &BTreeSet<&str>) -> Option<String> {
    words(text).find_map(|w| {
        let cap = capitalize(w);
        entities.contains(cap.as_str()).then_some(cap)
    })
}

/// A condition reduced to `subject` compared with `value`. Negated values
/// are normalized to a `not ` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub subject: String,
    pub value: String,
}

pub fn parse_comparison(condition: &str) -> Option<Comparison> {
    let condition = condition.trim();
    for (op, negating) in OPERATORS {
        if let Some((lhs, rhs)) = condition.split_once(op) {
            let value = normalize_value(rhs);
            if lhs.trim().is_empty() || value.is_empty() {
                return None;
            }
            let value = if *negating {
                negate(&value)
            } else {
                value
            };
            return Some(Comparison {
                subject: lhs.trim().to_owned(),
                value,
            });
        }
    }
    // Bare boolean subject: `Ticket.archived` or `not Ticket.archived`.
    let (subject, value) = match strip_negation(condition) {
        Some(rest) => (rest, "false"),
        None => (condition, "true"),
    };
    if subject.is_empty() || subject.contains(char::is_whitespace) {
        return None;
    }
    Some(Comparison {
        subject: subject.to_owned(),
        value: value.to_owned(),
    })
}

fn normalize_value(raw: &str) -> String {
    raw.trim().trim_matches('"').trim().to_lowercase()
}

fn strip_negation(text: &str) -> Option<&str> {
    let text = text.trim();
    text.strip_prefix("not ")
        .or_else(|| text.strip_prefix('!'))
        .map(str::trim)
}

fn negate(value: &str) -> String {
    match strip_negation(value) {
        Some(inner) => inner.to_owned(),
        None => format!("not {}", value),
    }
}

/// The antonym pair (in table order) that `a` and `b` form, if any.
pub fn antonym_pair(a: &str, b: &str) -> Option<(&'static str, &'static str)> {
    ANTONYMS
        .iter()
        .copied()
        .find(|(x, y)| (a == *x && b == *y) || (a == *y && b == *x))
}

/// True when one value is the `not`/`!` negation of the other.
pub fn is_negation_of(a: &str, b: &str) -> bool {
    strip_negation(a) == Some(b.trim()) || strip_negation(b) == Some(a.trim())
}

/// Leading verb of an action text, lowercased.
pub fn action_verb(action: &str) -> Option<String> {
    words(action).next().map(str::to_lowercase)
}

/// The contradiction pair (in table order) two verbs form, if any.
pub fn contradiction_pair(a: &str, b: &str) -> Option<(&'static str, &'static str)> {
    CONTRADICTIONS
        .iter()
        .copied()
        .find(|(x, y)| (a == *x && b == *y) || (a == *y && b == *x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Location;

    fn integration(name: &str, endpoint: Option<&str>, purpose: Option<&str>) -> Integration {
        Integration {
            name: name.into(),
            endpoint: endpoint.map(Into::into),
            purpose: purpose.map(Into::into),
            location: Location {
                file: "t".into(),
                line: 1,
            },
        }
    }

    #[test]
    fn ai_capability_by_name_purpose_or_host() {
        assert!(is_ai_capable(&integration("Claude", None, None)));
        assert!(is_ai_capable(&integration("Classifier", None, Some("LLM scoring"))));
        assert!(is_ai_capable(&integration(
            "Scorer",
            Some("https://api.openai.com/v1/chat"),
            None
        )));
        assert!(!is_ai_capable(&integration(
            "Stripe",
            Some("https://api.stripe.com"),
            Some("payments")
        )));
        // whole words only
        assert!(!is_ai_capable(&integration("Mailchimp", None, Some("email campaigns"))));
    }

    #[test]
    fn comparisons_are_normalized() {
        assert_eq!(
            parse_comparison("Ticket.status is Active"),
            Some(Comparison {
                subject: "Ticket.status".into(),
                value: "active".into()
            })
        );
        assert_eq!(
            parse_comparison("user.role != admin").unwrap().value,
            "not admin"
        );
        assert_eq!(
            parse_comparison("Post.visible is not !hidden").unwrap().value,
            "hidden"
        );
        assert_eq!(parse_comparison("not Ticket.archived").unwrap().value, "false");
        assert_eq!(parse_comparison("Ticket.archived").unwrap().value, "true");
        assert_eq!(parse_comparison("the moon is"), None);
        assert_eq!(parse_comparison("order total exceeds budget"), None);
    }

    #[test]
    fn references_capitalize_the_entity() {
        let entities: BTreeSet<&str> = ["Ticket"].into_iter().collect();
        assert_eq!(
            split_reference("ticket.body", &entities),
            Reference {
                entity: Some("Ticket".into()),
                field: Some("body".into())
            }
        );
        assert_eq!(
            split_reference("ticket", &entities),
            Reference {
                entity: Some("Ticket".into()),
                field: None
            }
        );
        assert_eq!(
            split_reference("status", &entities),
            Reference {
                entity: None,
                field: Some("status".into())
            }
        );
        assert_eq!(mentioned_entity("escalate the ticket", &entities), Some("Ticket".into()));
        assert_eq!(mentioned_entity("notify admin", &entities), None);
    }

    #[test]
    fn tables_match_in_either_direction() {
        assert_eq!(antonym_pair("inactive", "active"), Some(("active", "inactive")));
        assert_eq!(antonym_pair("active", "active"), None);
        assert_eq!(contradiction_pair("deny", "allow"), Some(("allow", "deny")));
        assert_eq!(contradiction_pair("allow", "notify"), None);
        assert!(is_negation_of("not approved", "approved"));
        assert!(is_negation_of("approved", "!approved"));
        assert!(!is_negation_of("approved", "approved"));
        assert_eq!(action_verb("Allow Post edit"), Some("allow".into()));
        assert_eq!(action_verb("  "), None);
    }
}
