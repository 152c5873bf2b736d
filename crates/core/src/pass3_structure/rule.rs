//! Rule validation.

use super::AI_INTEGRATION_SUGGESTION;
use crate::ast::*;
use crate::issue::{codes, Issue};

pub(super) fn check_rule(rule: &Rule, has_ai_integration: bool, issues: &mut Vec<Issue>) {
    let loc = &rule.location;
    let label = if rule.description.is_empty() {
        format!("rule at line {}", loc.line)
    } else {
        format!("rule '{}'", rule.description)
    };

    if rule.description.trim().is_empty() {
        issues.push(
            Issue::error(
                codes::RULE_MISSING_DESCRIPTION,
                format!("{} has no description", label),
                loc,
            )
            .with_suggestion("describe the rule: rule \"Closed tickets cannot be edited\""),
        );
    }

    if rule.condition.is_none() && rule.action.is_none() {
        issues.push(
            Issue::error(
                codes::RULE_EMPTY,
                format!("{} has neither a condition nor an action", label),
                loc,
            )
            .with_suggestion("add a line 'if <condition> → <action>'"),
        );
    }

    if let Some(call) = rule.condition.as_ref().and_then(RuleCondition::ai_call) {
        let mut missing = Vec::new();
        if call.input.trim().is_empty() {
            missing.push("input");
        }
        if call.prompt.trim().is_empty() {
            missing.push("prompt");
        }
        if !missing.is_empty() {
            issues.push(
                Issue::error(
                    codes::RULE_AI_INCOMPLETE,
                    format!(
                        "AI condition in {} is missing its {}",
                        label,
                        missing.join(" and ")
                    ),
                    loc,
                )
                .with_suggestion("write the call as ai(entity.field, \"question\")"),
            );
        }
        if !has_ai_integration {
            issues.push(
                Issue::warning(
                    codes::RULE_AI_WITHOUT_INTEGRATION,
                    format!(
                        "{} uses an AI condition but no AI-capable integration is declared",
                        label
                    ),
                    loc,
                )
                .with_suggestion(AI_INTEGRATION_SUGGESTION),
            );
        }
    }
}
