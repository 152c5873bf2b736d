//! Pass 8: Naming and style lint. Every finding is informational.

use crate::ast::*;
use crate::issue::{codes, Issue};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Flows with more steps than this are flagged.
pub const LONG_FLOW_THRESHOLD: usize = 10;

static PASCAL_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-z0-9]*(?:[A-Z][a-z0-9]*)*$").unwrap());

static LOWER_CAMEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9]*(?:[A-Z][a-z0-9]*)*$").unwrap());

static SNAKE_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9]*(?:_[a-z0-9]+)*$").unwrap());

/// Name fragments that suggest a credential.
const SENSITIVE_NAMES: &[&str] = &["password", "passwd", "secret", "token", "apikey", "api_key"];

pub fn lint(spec: &Spec, issues: &mut Vec<Issue>) {
    let before = issues.len();
    let bound: HashSet<&str> = spec
        .screens
        .iter()
        .filter_map(|s| s.entity.as_deref())
        .collect();

    for entity in &spec.entities {
        lint_entity(entity, &bound, issues);
    }
    for screen in &spec.screens {
        lint_screen(screen, issues);
    }
    for flow in &spec.flows {
        lint_flow(flow, issues);
    }
    for rule in spec.rules.iter().filter(|r| r.action.is_none()) {
        issues.push(Issue::info(
            codes::LINT_RULE_WITHOUT_ACTION,
            format!("rule '{}' has no action", rule.description),
            &rule.location,
        ));
    }

    tracing::debug!(findings = issues.len() - before, "lint done");
}

fn lint_entity(entity: &Entity, bound: &HashSet<&str>, issues: &mut Vec<Issue>) {
    let loc = &entity.location;
    if !PASCAL_CASE.is_match(&entity.name) {
        issues.push(
            Issue::info(
                codes::LINT_ENTITY_NAME,
                format!("entity name '{}' should be PascalCase", entity.name),
                loc,
            )
            .with_suggestion(format!("rename to '{}'", to_pascal_case(&entity.name))),
        );
    }
    if !bound.contains(entity.name.as_str()) {
        issues.push(Issue::info(
            codes::LINT_UNUSED_ENTITY,
            format!("entity '{}' is not shown on any screen", entity.name),
            loc,
        ));
    }
    if !entity.fields.is_empty() && !entity.fields.iter().any(|f| f.modifiers.required) {
        issues.push(Issue::info(
            codes::LINT_NO_REQUIRED_FIELDS,
            format!("entity '{}' has no required fields", entity.name),
            loc,
        ));
    }

    for field in &entity.fields {
        if !LOWER_CAMEL.is_match(&field.name) && !SNAKE_CASE.is_match(&field.name) {
            issues.push(Issue::info(
                codes::LINT_FIELD_NAME,
                format!(
                    "field name '{}.{}' should be lowerCamelCase or snake_case",
                    entity.name, field.name
                ),
                &field.location,
            ));
        }
        if is_sensitive(&field.name) && field.field_type != FieldType::Text {
            issues.push(
                Issue::info(
                    codes::LINT_SENSITIVE_FIELD_TYPE,
                    format!(
                        "field '{}.{}' looks like a credential but has type '{}'",
                        entity.name,
                        field.name,
                        field.field_type.keyword()
                    ),
                    &field.location,
                )
                .with_suggestion("store credentials as text and never expose them on screens"),
            );
        }
    }
}

fn lint_screen(screen: &Screen, issues: &mut Vec<Issue>) {
    if !PASCAL_CASE.is_match(&screen.name) {
        issues.push(
            Issue::info(
                codes::LINT_SCREEN_NAME,
                format!("screen name '{}' should be PascalCase", screen.name),
                &screen.location,
            )
            .with_suggestion(format!("rename to '{}'", to_pascal_case(&screen.name))),
        );
    }
    if screen.entity.is_none() && screen.kind != ScreenKind::Dashboard {
        issues.push(Issue::info(
            codes::LINT_UNBOUND_SCREEN,
            format!("screen '{}' is not bound to an entity", screen.name),
            &screen.location,
        ));
    }
}

fn lint_flow(flow: &Flow, issues: &mut Vec<Issue>) {
    let loc = &flow.location;
    if word_count(&flow.name) < 2 {
        issues.push(Issue::info(
            codes::LINT_FLOW_NAME,
            format!(
                "flow name '{}' is a single word; describe the journey, e.g. 'Submit ticket'",
                flow.name
            ),
            loc,
        ));
    }
    if flow.steps.is_empty() {
        issues.push(Issue::info(
            codes::LINT_EMPTY_FLOW,
            format!("flow '{}' is empty", flow.name),
            loc,
        ));
    } else if flow.steps.len() > LONG_FLOW_THRESHOLD {
        issues.push(
            Issue::info(
                codes::LINT_LONG_FLOW,
                format!(
                    "flow '{}' has {} steps; consider splitting it",
                    flow.name,
                    flow.steps.len()
                ),
                loc,
            )
            .with_suggestion(format!(
                "keep flows at {} steps or fewer",
                LONG_FLOW_THRESHOLD
            )),
        );
    }
}

fn is_sensitive(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    SENSITIVE_NAMES.iter().any(|s| lower.contains(s))
}

/// Words in a name, split on spaces, separators and case changes.
fn word_count(name: &str) -> usize {
    let mut count = 0;
    let mut prev: Option<char> = None;
    for c in name.chars() {
        let boundary = match prev {
            None => c.is_alphanumeric(),
            Some(p) => {
                c.is_alphanumeric()
                    && (!p.is_alphanumeric() || (p.is_lowercase() && c.is_uppercase()))
            }
        };
        if boundary {
            count += 1;
        }
        prev = Some(c);
    }
    count
}

fn to_pascal_case(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(crate::heuristics::capitalize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn lint_src(src: &str) -> Vec<Issue> {
        let spec = parse(src, None).unwrap();
        let mut issues = Vec::new();
        lint(&spec, &mut issues);
        issues
    }

    fn codes_of(issues: &[Issue]) -> Vec<&str> {
        issues.iter().map(|i| i.code.as_str()).collect()
    }

    #[test]
    fn naming_conventions() {
        assert!(PASCAL_CASE.is_match("SupportTicket"));
        assert!(!PASCAL_CASE.is_match("support_ticket"));
        assert!(LOWER_CAMEL.is_match("createdAt"));
        assert!(SNAKE_CASE.is_match("created_at"));
        assert!(!LOWER_CAMEL.is_match("Created_At") && !SNAKE_CASE.is_match("Created_At"));
        assert_eq!(word_count("Onboarding"), 1);
        assert_eq!(word_count("SubmitTicket"), 2);
        assert_eq!(word_count("Submit a ticket"), 3);
        assert_eq!(to_pascal_case("support_ticket"), "SupportTicket");
    }

    #[test]
    fn clean_spec_has_no_findings() {
        let issues = lint_src(
            "app \"T\"\n\
entity Ticket\n  title: text, required\n  createdAt: datetime\n\
screen TicketList\n  kind: list\n  entity: Ticket\n\
screen Overview\n  kind: dashboard\n\
flow SubmitTicket\n  1. Fill the form\n\
rule \"Title required\"\n  if Ticket.title is empty → reject\n",
        );
        assert!(issues.is_empty(), "unexpected findings: {:?}", issues);
    }

    #[test]
    fn each_finding_is_info() {
        let steps: String = (1..=11).map(|n| format!("  {n}. Step {n}\n")).collect();
        let src = format!(
            "app \"T\"\n\
entity user_account\n  Password: number\n\
screen settings\n  kind: form\n\
flow Onboarding\n{steps}\
flow \"Close out\"\n\
rule \"Audit\"\n  if user_account.active\n"
        );
        let issues = lint_src(&src);
        assert_eq!(
            codes_of(&issues),
            vec![
                codes::LINT_ENTITY_NAME,
                codes::LINT_UNUSED_ENTITY,
                codes::LINT_NO_REQUIRED_FIELDS,
                codes::LINT_FIELD_NAME,
                codes::LINT_SENSITIVE_FIELD_TYPE,
                codes::LINT_SCREEN_NAME,
                codes::LINT_UNBOUND_SCREEN,
                codes::LINT_FLOW_NAME,
                codes::LINT_LONG_FLOW,
                codes::LINT_EMPTY_FLOW,
                codes::LINT_RULE_WITHOUT_ACTION,
            ]
        );
        assert!(issues
            .iter()
            .all(|i| i.severity == crate::issue::Severity::Info));
    }
}
