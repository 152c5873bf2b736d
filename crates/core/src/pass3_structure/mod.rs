//! Pass 3: Structural checks -- per-construct validity of entities,
//! screens, flows, rules, integrations and events.

mod entity;
mod flow;
mod integration;
mod rule;
mod screen;

use crate::ast::*;
use crate::heuristics;
use crate::issue::Issue;
use crate::pass1_symbols::SymbolTable;

/// Suggestion attached to every "AI usage without an AI integration" issue.
pub(crate) const AI_INTEGRATION_SUGGESTION: &str =
    "declare an AI-capable integration, e.g. `integration Claude` with `purpose: \"AI evaluation\"`";

pub fn check_structure(spec: &Spec, symbols: &SymbolTable, issues: &mut Vec<Issue>) {
    let has_ai_integration = spec.integrations.iter().any(heuristics::is_ai_capable);
    let before = issues.len();

    for e in &spec.entities {
        entity::check_entity(e, symbols, issues);
    }
    for s in &spec.screens {
        screen::check_screen(s, symbols, issues);
    }
    for f in &spec.flows {
        flow::check_flow(f, has_ai_integration, issues);
    }
    for r in &spec.rules {
        rule::check_rule(r, has_ai_integration, issues);
    }
    integration::check_integrations(&spec.integrations, issues);
    integration::check_events(&spec.events, issues);

    tracing::debug!(
        issues = issues.len() - before,
        has_ai_integration,
        "structural checks done"
    );
}
