//! Pass 5: Constraint extraction and conflict detection.
//!
//! Each rule is reduced to a handful of `Constraint` records using the
//! text heuristics in [`crate::heuristics`]. Constraints are then compared
//! pairwise: value conditions on the same entity field that are antonyms
//! or negations of each other conflict, and actions on the same entity
//! whose verbs contradict each other conflict. This is a fixed-vocabulary
//! heuristic, not a solver.

use crate::ast::*;
use crate::heuristics::{self, Reference};
use crate::issue::{codes, Issue};
use crate::pass2_types::TypeEnvironment;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Conditions accumulated on one entity field before it is flagged.
pub const OVERLOAD_THRESHOLD: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// `subject is value` style condition.
    FieldValue,
    /// AI-evaluated condition; `condition` holds the prompt.
    AiCondition,
    /// Action fired by the rule; `action` holds the leading verb.
    ActionTrigger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub entity: Option<String>,
    pub field: Option<String>,
    pub condition: Option<String>,
    pub action: Option<String>,
    /// Index of the originating rule in `Spec::rules`.
    pub rule_index: usize,
}

impl Constraint {
    fn target(&self) -> Option<String> {
        match (&self.entity, &self.field) {
            (Some(e), Some(f)) => Some(format!("{}.{}", e, f)),
            (None, Some(f)) => Some(f.clone()),
            _ => None,
        }
    }
}

pub fn extract_constraints(spec: &Spec, entities: &BTreeSet<&str>) -> Vec<Constraint> {
    let mut out = Vec::new();
    for (index, rule) in spec.rules.iter().enumerate() {
        let mut subject = Reference::default();

        match &rule.condition {
            Some(RuleCondition::Plain { text }) => {
                if let Some(cmp) = heuristics::parse_comparison(text) {
                    subject = heuristics::split_reference(&cmp.subject, entities);
                    if subject.entity.is_none() {
                        subject.entity = heuristics::mentioned_entity(text, entities);
                    }
                    out.push(Constraint {
                        kind: ConstraintKind::FieldValue,
                        entity: subject.entity.clone(),
                        field: subject.field.clone(),
                        condition: Some(cmp.value),
                        action: None,
                        rule_index: index,
                    });
                } else {
                    subject.entity = heuristics::mentioned_entity(text, entities);
                }
            }
            Some(RuleCondition::Ai(call)) => {
                subject = heuristics::split_reference(&call.input, entities);
                out.push(Constraint {
                    kind: ConstraintKind::AiCondition,
                    entity: subject.entity.clone(),
                    field: subject.field.clone(),
                    condition: Some(call.prompt.clone()),
                    action: None,
                    rule_index: index,
                });
            }
            None => {}
        }

        if let Some(action) = &rule.action {
            if let Some(verb) = heuristics::action_verb(action) {
                let entity =
                    heuristics::mentioned_entity(action, entities).or(subject.entity.clone());
                out.push(Constraint {
                    kind: ConstraintKind::ActionTrigger,
                    entity,
                    field: subject.field.clone(),
                    condition: None,
                    action: Some(verb),
                    rule_index: index,
                });
            }
        }
    }
    tracing::trace!(constraints = out.len(), "constraints extracted");
    out
}

pub fn check_constraints(spec: &Spec, env: &TypeEnvironment, issues: &mut Vec<Issue>) {
    let entities = env.entity_names();
    let constraints = extract_constraints(spec, &entities);
    let before = issues.len();

    for (i, a) in constraints.iter().enumerate() {
        for b in &constraints[i + 1..] {
            if a.rule_index == b.rule_index || a.kind != b.kind {
                continue;
            }
            let issue = match a.kind {
                ConstraintKind::FieldValue => conflicting_conditions(spec, a, b),
                ConstraintKind::ActionTrigger => contradictory_actions(spec, a, b),
                ConstraintKind::AiCondition => None,
            };
            issues.extend(issue);
        }
    }

    check_overloaded(spec, &constraints, issues);

    tracing::debug!(
        constraints = constraints.len(),
        issues = issues.len() - before,
        "constraint analysis done"
    );
}

fn conflicting_conditions(spec: &Spec, a: &Constraint, b: &Constraint) -> Option<Issue> {
    if a.field.is_none() || a.entity != b.entity || a.field != b.field {
        return None;
    }
    let (x, y) = (a.condition.as_deref()?, b.condition.as_deref()?);
    let (left, right) = match heuristics::antonym_pair(x, y) {
        Some((l, r)) => (l.to_owned(), r.to_owned()),
        None if heuristics::is_negation_of(x, y) => {
            // Positive form first.
            if x.len() <= y.len() {
                (x.to_owned(), y.to_owned())
            } else {
                (y.to_owned(), x.to_owned())
            }
        }
        None => return None,
    };
    let [first, second] = sorted_descriptions(spec, a, b);
    Some(
        Issue::warning(
            codes::CONSTRAINT_CONFLICTING_CONDITIONS,
            format!(
                "rules '{}' and '{}' test {} for conflicting values '{}' and '{}'",
                first,
                second,
                a.target()?,
                left,
                right
            ),
            later_location(spec, a, b),
        )
        .with_suggestion("merge the rules or make their conditions mutually exclusive on purpose"),
    )
}

fn contradictory_actions(spec: &Spec, a: &Constraint, b: &Constraint) -> Option<Issue> {
    let entity = a.entity.as_deref()?;
    if b.entity.as_deref() != Some(entity) {
        return None;
    }
    let (left, right) =
        heuristics::contradiction_pair(a.action.as_deref()?, b.action.as_deref()?)?;
    let [first, second] = sorted_descriptions(spec, a, b);
    Some(
        Issue::warning(
            codes::CONSTRAINT_CONTRADICTORY_ACTIONS,
            format!(
                "rules '{}' and '{}' trigger contradictory actions '{}' and '{}' on {}",
                first, second, left, right, entity
            ),
            later_location(spec, a, b),
        )
        .with_suggestion("make the conditions distinct so only one action can fire"),
    )
}

fn check_overloaded(spec: &Spec, constraints: &[Constraint], issues: &mut Vec<Issue>) {
    let mut per_target: BTreeMap<String, Vec<&Constraint>> = BTreeMap::new();
    // Actions inherit their condition's field; only conditions count.
    for c in constraints.iter().filter(|c| c.kind != ConstraintKind::ActionTrigger) {
        if let (Some(_), Some(target)) = (&c.entity, c.target()) {
            per_target.entry(target).or_default().push(c);
        }
    }
    for (target, group) in per_target {
        if group.len() <= OVERLOAD_THRESHOLD {
            continue;
        }
        let Some(rule) = group.first().and_then(|c| spec.rules.get(c.rule_index)) else {
            continue;
        };
        issues.push(
            Issue::info(
                codes::CONSTRAINT_FIELD_OVERLOADED,
                format!(
                    "{} is constrained {} times across rules; consider consolidating",
                    target,
                    group.len()
                ),
                &rule.location,
            )
            .with_suggestion("move the logic into a single rule or a computed field"),
        );
    }
}

fn sorted_descriptions<'a>(spec: &'a Spec, a: &Constraint, b: &Constraint) -> [&'a str; 2] {
    let mut names = [
        description(spec, a.rule_index),
        description(spec, b.rule_index),
    ];
    names.sort_unstable();
    names
}

fn description(spec: &Spec, index: usize) -> &str {
    spec.rules
        .get(index)
        .map(|r| r.description.as_str())
        .unwrap_or_default()
}

fn later_location<'a>(spec: &'a Spec, a: &Constraint, b: &Constraint) -> &'a Location {
    let index = a.rule_index.max(b.rule_index);
    &spec.rules[index].location
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::pass2_types::build_type_env;

    const HEADER: &str = "app \"T\"\nentity Post\n  title: text\n  visible: boolean\n  status: text\n";

    fn issues_for(rules: &str) -> Vec<Issue> {
        let spec = parse(&format!("{HEADER}{rules}"), None).unwrap();
        let env = build_type_env(&spec);
        let mut issues = Vec::new();
        check_constraints(&spec, &env, &mut issues);
        issues
    }

    #[test]
    fn extraction_kinds() {
        let spec = parse(
            &format!(
                "{HEADER}rule \"Hide drafts\"\n  if Post.status is draft → hide Post\n\
rule \"Moderate\"\n  if ai(post.title, \"Is this spam?\") → flag\n"
            ),
            None,
        )
        .unwrap();
        let entities: BTreeSet<&str> = ["Post"].into_iter().collect();
        let cs = extract_constraints(&spec, &entities);
        let kinds: Vec<_> = cs.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ConstraintKind::FieldValue,
                ConstraintKind::ActionTrigger,
                ConstraintKind::AiCondition,
                ConstraintKind::ActionTrigger,
            ]
        );
        assert_eq!(cs[0].entity.as_deref(), Some("Post"));
        assert_eq!(cs[0].field.as_deref(), Some("status"));
        assert_eq!(cs[0].condition.as_deref(), Some("draft"));
        assert_eq!(cs[1].action.as_deref(), Some("hide"));
        assert_eq!(cs[3].entity.as_deref(), Some("Post"));
        assert_eq!(cs[3].rule_index, 1);
    }

    #[test]
    fn allow_and_deny_under_the_same_condition_conflict_once() {
        let issues = issues_for(
            "rule \"Editors may edit\"\n  if Post.status is draft → allow Post edit\n\
rule \"Drafts are locked\"\n  if Post.status is draft → deny Post edit\n",
        );
        assert_eq!(issues.len(), 1);
        let issue = &issues[0];
        assert_eq!(issue.code, codes::CONSTRAINT_CONTRADICTORY_ACTIONS);
        assert_eq!(
            issue.message,
            "rules 'Drafts are locked' and 'Editors may edit' trigger contradictory actions 'allow' and 'deny' on Post"
        );
    }

    #[test]
    fn antonym_and_negated_values_conflict() {
        let issues = issues_for(
            "rule \"Show published\"\n  if Post.visible is true → notify Post\n\
rule \"Hide archived\"\n  if Post.visible is false → notify Post\n\
rule \"Status open\"\n  if Post.status is open → notify Post\n\
rule \"Status closed\"\n  if Post.status is not open → notify Post\n",
        );
        let conflicts: Vec<_> = issues
            .iter()
            .filter(|i| i.code == codes::CONSTRAINT_CONFLICTING_CONDITIONS)
            .map(|i| i.message.as_str())
            .collect();
        assert_eq!(conflicts.len(), 2);
        assert!(conflicts[0].contains("Post.visible for conflicting values 'true' and 'false'"));
        assert!(conflicts[1].contains("Post.status for conflicting values 'open' and 'not open'"));
    }

    #[test]
    fn conflicts_do_not_depend_on_rule_order() {
        let forward = issues_for(
            "rule \"A\"\n  if Post.visible is false → publish Post\n\
rule \"B\"\n  if Post.visible is true → unpublish Post\n",
        );
        let backward = issues_for(
            "rule \"B\"\n  if Post.visible is true → unpublish Post\n\
rule \"A\"\n  if Post.visible is false → publish Post\n",
        );
        let messages = |v: &[Issue]| {
            let mut m: Vec<String> = v.iter().map(|i| i.message.clone()).collect();
            m.sort();
            m
        };
        assert_eq!(forward.len(), 2);
        assert_eq!(messages(&forward), messages(&backward));
    }

    #[test]
    fn overloaded_field_is_noted() {
        let rules: String = (1..=6)
            .map(|n| format!("rule \"R{n}\"\n  if Post.status is s{n} → notify Post\n"))
            .collect();
        let issues = issues_for(&rules);
        let overloaded: Vec<_> = issues
            .iter()
            .filter(|i| i.code == codes::CONSTRAINT_FIELD_OVERLOADED)
            .collect();
        assert_eq!(overloaded.len(), 1);
        assert!(overloaded[0].message.starts_with("Post.status is constrained 6 times"));
    }
}
