//! Pass 4: Cross-construct type consistency.
//!
//! Screen fields are checked against the bound entity's field types, and
//! rule AI-condition inputs written as `entity.field` are resolved against
//! the type environment.

use crate::ast::*;
use crate::heuristics;
use crate::issue::{codes, Issue};
use crate::pass2_types::{TypeEnvironment, TypeTag};

pub fn check_consistency(spec: &Spec, env: &TypeEnvironment, issues: &mut Vec<Issue>) {
    let before = issues.len();
    for screen in &spec.screens {
        check_form_fields(screen, env, issues);
    }
    for rule in &spec.rules {
        check_rule_input(rule, env, issues);
    }
    tracing::debug!(issues = issues.len() - before, "type consistency checked");
}

// ──────────────────────────────────────────────────────────────────────────────
// Screens
// ──────────────────────────────────────────────────────────────────────────────

fn check_form_fields(screen: &Screen, env: &TypeEnvironment, issues: &mut Vec<Issue>) {
    if screen.kind != ScreenKind::Form {
        return;
    }
    let Some(entity) = screen.entity.as_deref() else {
        return;
    };
    // Unknown entities are reported structurally.
    let Some(fields) = env.fields_of(entity) else {
        return;
    };

    for name in &screen.fields {
        match fields.get(name) {
            Some(TypeTag::ListRef { target, .. }) => {
                issues.push(
                    Issue::warning(
                        codes::TYPE_LIST_ON_FORM,
                        format!(
                            "form '{}' includes list field '{}.{}' (list of {}), which a form cannot edit directly",
                            screen.name, entity, name, target
                        ),
                        &screen.location,
                    )
                    .with_suggestion(format!(
                        "show '{}' on a list or detail screen instead",
                        name
                    )),
                );
            }
            Some(tag) if tag.is_ai_derived() => {
                issues.push(Issue::info(
                    codes::TYPE_AI_FIELD_ON_FORM,
                    format!(
                        "form '{}' includes AI-derived field '{}.{}', which is read-only",
                        screen.name, entity, name
                    ),
                    &screen.location,
                ));
            }
            _ => {}
        }
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Rule AI inputs
// ──────────────────────────────────────────────────────────────────────────────

fn check_rule_input(rule: &Rule, env: &TypeEnvironment, issues: &mut Vec<Issue>) {
    let Some(call) = rule.condition.as_ref().and_then(RuleCondition::ai_call) else {
        return;
    };
    // Bare inputs name a value in scope, not an entity field.
    let Some((entity_part, _)) = call.input.split_once('.') else {
        return;
    };
    if entity_part.trim().is_empty() {
        return;
    }
    let reference = heuristics::split_reference(&call.input, &env.entity_names());
    let Some(entity) = reference.entity else {
        return;
    };

    if !env.has_entity(&entity) {
        issues.push(Issue::error(
            codes::TYPE_UNKNOWN_RULE_ENTITY,
            format!(
                "rule '{}' passes '{}' to an AI condition, but entity '{}' is not declared",
                rule.description, call.input, entity
            ),
            &rule.location,
        ));
        return;
    }

    if let Some(field) = reference.field {
        if env.field_type(&entity, &field).is_none() {
            let known = env
                .fields_of(&entity)
                .map(|f| f.keys().cloned().collect::<Vec<_>>().join(", "))
                .unwrap_or_default();
            issues.push(
                Issue::warning(
                    codes::TYPE_UNKNOWN_RULE_FIELD,
                    format!(
                        "rule '{}' passes '{}' to an AI condition, but '{}' has no field '{}'",
                        rule.description, call.input, entity, field
                    ),
                    &rule.location,
                )
                .with_suggestion(format!("fields of {}: {}", entity, known)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::pass2_types::build_type_env;

    fn run(src: &str) -> Vec<Issue> {
        let spec = parse(src, None).unwrap();
        let env = build_type_env(&spec);
        let mut issues = Vec::new();
        check_consistency(&spec, &env, &mut issues);
        issues
    }

    const ENTITIES: &str = "app \"T\"\n\
entity Ticket\n  title: text, required\n  comments: list of Comment\n  summary: ai(\"Summarize\")\n\
entity Comment\n  body: text\n";

    #[test]
    fn list_and_ai_fields_on_forms() {
        let src = format!(
            "{ENTITIES}screen NewTicket\n  kind: form\n  entity: Ticket\n  fields: [title, comments, summary]\n\
screen Tickets\n  kind: list\n  entity: Ticket\n  fields: [comments, summary]\n"
        );
        let issues = run(&src);
        let found: Vec<_> = issues.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(found, vec![codes::TYPE_LIST_ON_FORM, codes::TYPE_AI_FIELD_ON_FORM]);
        assert!(issues[0].message.contains("Ticket.comments"));
    }

    #[test]
    fn dotted_ai_inputs_are_resolved() {
        let src = format!(
            "{ENTITIES}\
rule \"Escalate angry\"\n  if ai(ticket.title, \"Is this angry?\") → escalate\n\
rule \"Ghost input\"\n  if ai(order.total, \"Too big?\") → flag\n\
rule \"Missing field\"\n  if ai(ticket.mood, \"Sad?\") → flag\n\
rule \"Bare input\"\n  if ai(message, \"Spam?\") → block\n\
rule \"No entity\"\n  if ai(.body, \"Spam?\") → block\n"
        );
        let issues = run(&src);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].code, codes::TYPE_UNKNOWN_RULE_ENTITY);
        assert!(issues[0].message.contains("'Order'"));
        assert_eq!(issues[1].code, codes::TYPE_UNKNOWN_RULE_FIELD);
        assert_eq!(issues[1].severity, crate::issue::Severity::Warning);
    }
}
