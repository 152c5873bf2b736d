//! Flow validation.

use super::AI_INTEGRATION_SUGGESTION;
use crate::ast::*;
use crate::issue::{codes, Issue};

pub(super) fn check_flow(flow: &Flow, has_ai_integration: bool, issues: &mut Vec<Issue>) {
    if flow.steps.is_empty() {
        issues.push(Issue::warning(
            codes::FLOW_NO_STEPS,
            format!("flow '{}' has no steps", flow.name),
            &flow.location,
        ));
        return;
    }

    // Steps must be numbered 1, 2, 3, ... in source order.
    if let Some((expected, step)) = flow
        .steps
        .iter()
        .enumerate()
        .map(|(i, s)| (i as u32 + 1, s))
        .find(|(expected, s)| s.order != *expected)
    {
        issues.push(
            Issue::warning(
                codes::FLOW_NON_SEQUENTIAL,
                format!(
                    "flow '{}' step {} is out of sequence: expected step {}",
                    flow.name, step.order, expected
                ),
                &step.location,
            )
            .with_suggestion("number the steps 1, 2, 3, ... in order"),
        );
    }

    for step in flow.steps.iter().filter(|s| s.ai) {
        let empty = step.action.as_deref().map_or(true, |a| a.trim().is_empty());
        if empty {
            issues.push(Issue::error(
                codes::FLOW_AI_STEP_EMPTY,
                format!(
                    "AI step {} in flow '{}' does not say what the AI should do",
                    step.order, flow.name
                ),
                &step.location,
            ));
        }
    }

    if !has_ai_integration {
        if let Some(first_ai) = flow.steps.iter().find(|s| s.ai) {
            issues.push(
                Issue::warning(
                    codes::FLOW_AI_WITHOUT_INTEGRATION,
                    format!(
                        "flow '{}' uses AI steps but no AI-capable integration is declared",
                        flow.name
                    ),
                    &first_ai.location,
                )
                .with_suggestion(AI_INTEGRATION_SUGGESTION),
            );
        }
    }
}
