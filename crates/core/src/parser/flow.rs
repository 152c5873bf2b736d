use super::Parser;
use crate::ast::{Flow, FlowStep};
use crate::error::ParseError;
use crate::lexer::Line;
use regex::Regex;
use std::sync::LazyLock;

static NUMBERED_STEP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s+(.+)$").unwrap());

impl<'a> Parser<'a> {
    pub(super) fn parse_flow(
        &self,
        head: &Line,
        rest: &str,
        body: &[Line],
    ) -> Result<Flow, ParseError> {
        let name = self.parse_name(rest, "flow", head.line)?;
        self.expect_flat_body(body, "flow")?;
        let steps = body
            .iter()
            .map(|line| self.parse_flow_step(line))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Flow {
            name,
            steps,
            location: self.loc(head.line),
        })
    }

    /// `N. <description>`; an `ai:` / `ai ` prefix marks an AI step.
    fn parse_flow_step(&self, line: &Line) -> Result<FlowStep, ParseError> {
        let caps = NUMBERED_STEP.captures(&line.content).ok_or_else(|| {
            self.err(
                line.line,
                format!("expected a numbered step 'N. description', got '{}'", line.content),
            )
        })?;
        let order = caps[1].parse::<u32>().map_err(|_| {
            self.err(line.line, format!("step number '{}' is out of range", &caps[1]))
        })?;
        let description = caps[2].trim().to_owned();
        let action = strip_ai_prefix(&description).map(str::to_owned);
        Ok(FlowStep {
            order,
            ai: action.is_some(),
            description,
            action,
            location: self.loc(line.line),
        })
    }
}

/// Text after a case-insensitive `ai:` or `ai ` prefix.
fn strip_ai_prefix(description: &str) -> Option<&str> {
    let head = description.get(..3)?;
    if head.eq_ignore_ascii_case("ai:") || head.eq_ignore_ascii_case("ai ") {
        Some(description[3..].trim())
    } else {
        None
    }
}
