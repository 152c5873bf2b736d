//! Pass 7: Wiring -- do the declarations connect into a usable app?
//!
//! Entities should be reachable from a screen or another construct, form
//! screens should collect every required field of their entity, and mutual
//! relationship edges are surfaced as circular relationships.

use crate::ast::*;
use crate::heuristics;
use crate::issue::{codes, Issue};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Counters reported in the verification summary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WiringCounts {
    /// Relationship and list fields examined as graph edges.
    pub relationships_checked: usize,
    /// Entity reachability checks plus required-field-on-form checks.
    pub wiring_checks: usize,
}

pub fn check_wiring(spec: &Spec, issues: &mut Vec<Issue>) -> WiringCounts {
    let mut counts = WiringCounts::default();
    let before = issues.len();

    check_unreferenced(spec, &mut counts, issues);
    for screen in &spec.screens {
        check_form_required(spec, screen, &mut counts, issues);
    }
    check_cycles(spec, &mut counts, issues);

    tracing::debug!(
        relationships = counts.relationships_checked,
        checks = counts.wiring_checks,
        issues = issues.len() - before,
        "wiring checked"
    );
    counts
}

/// First declaration of each entity name, in source order.
fn unique_entities(spec: &Spec) -> Vec<&Entity> {
    let mut seen = HashSet::new();
    spec.entities
        .iter()
        .filter(|e| seen.insert(e.name.as_str()))
        .collect()
}

fn check_unreferenced(spec: &Spec, counts: &mut WiringCounts, issues: &mut Vec<Issue>) {
    let names: BTreeSet<&str> = spec.entities.iter().map(|e| e.name.as_str()).collect();
    let mut referenced: BTreeSet<String> = BTreeSet::new();

    referenced.extend(spec.screens.iter().filter_map(|s| s.entity.clone()));
    for entity in &spec.entities {
        for field in &entity.fields {
            if let Some(target) = field.field_type.target_entity() {
                // An entity pointing at itself does not make it reachable.
                if target != entity.name {
                    referenced.insert(target.to_owned());
                }
            }
        }
    }
    for rule in &spec.rules {
        let texts = match &rule.condition {
            Some(RuleCondition::Plain { text }) => vec![text.as_str()],
            Some(RuleCondition::Ai(call)) => vec![call.input.as_str()],
            None => vec![],
        };
        for text in texts.into_iter().chain(rule.action.as_deref()) {
            if let Some(entity) = heuristics::split_reference(text, &names).entity {
                referenced.insert(entity);
            }
            referenced.extend(heuristics::mentioned_entity(text, &names));
        }
    }
    for event in &spec.events {
        for field in &event.fields {
            referenced.extend(heuristics::mentioned_entity(field, &names));
        }
    }

    for entity in unique_entities(spec) {
        counts.wiring_checks += 1;
        if !referenced.contains(&entity.name) {
            issues.push(
                Issue::info(
                    codes::WIRING_UNREFERENCED_ENTITY,
                    format!(
                        "entity '{}' is not referenced by any screen, relationship, rule or event",
                        entity.name
                    ),
                    &entity.location,
                )
                .with_suggestion(format!(
                    "add a screen with 'entity: {}' or remove the entity",
                    entity.name
                )),
            );
        }
    }
}

fn check_form_required(
    spec: &Spec,
    screen: &Screen,
    counts: &mut WiringCounts,
    issues: &mut Vec<Issue>,
) {
    if screen.kind != ScreenKind::Form || screen.fields.is_empty() {
        return;
    }
    let Some(entity) = screen.entity.as_deref().and_then(|name| spec.entity(name)) else {
        return;
    };
    let listed: HashSet<&str> = screen.fields.iter().map(String::as_str).collect();
    for field in entity.fields.iter().filter(|f| f.modifiers.required) {
        counts.wiring_checks += 1;
        if listed.contains(field.name.as_str()) {
            continue;
        }
        issues.push(
            Issue::warning(
                codes::WIRING_FORM_MISSING_REQUIRED,
                format!(
                    "form '{}' does not collect required field '{}.{}'",
                    screen.name, entity.name, field.name
                ),
                &screen.location,
            )
            .with_suggestion(format!("add '{}' to the form's fields", field.name)),
        );
    }
}

fn check_cycles(spec: &Spec, counts: &mut WiringCounts, issues: &mut Vec<Issue>) {
    let entities = unique_entities(spec);
    let mut edges: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for entity in &entities {
        for field in &entity.fields {
            if let Some(target) = field.field_type.target_entity() {
                counts.relationships_checked += 1;
                edges.entry(entity.name.as_str()).or_default().insert(target);
            }
        }
    }

    let mut reported: BTreeSet<(&str, &str)> = BTreeSet::new();
    for entity in &entities {
        for field in &entity.fields {
            let Some(target) = field.field_type.target_entity() else {
                continue;
            };
            if target == entity.name {
                continue;
            }
            let mutual = edges
                .get(target)
                .is_some_and(|back| back.contains(entity.name.as_str()));
            let pair = if entity.name.as_str() < target {
                (entity.name.as_str(), target)
            } else {
                (target, entity.name.as_str())
            };
            if mutual && reported.insert(pair) {
                issues.push(Issue::info(
                    codes::WIRING_CIRCULAR_RELATIONSHIP,
                    format!(
                        "entities '{}' and '{}' reference each other",
                        entity.name, target
                    ),
                    &field.location,
                ));
            }
        }
    }
}
