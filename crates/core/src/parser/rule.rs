use super::{first_top_level_arrow, unquote, Parser};
use crate::ast::{AiCall, Rule, RuleCondition};
use crate::error::ParseError;
use crate::lexer::Line;
use regex::Regex;
use std::sync::LazyLock;

/// Separator between a rule condition and its action.
pub const ARROW: &str = "→";

/// Expected output shape recorded for AI-evaluated rule conditions.
pub const AI_CONDITION_OUTPUT: &str = "boolean";

/// `ai(<input>, "<prompt>")` anywhere in a condition.
static AI_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"ai\(\s*([^,()"]+?)\s*,\s*"((?:[^"\\]|\\.)*)"\s*\)"#).unwrap()
});

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""((?:[^"\\]|\\.)*)""#).unwrap());

impl<'a> Parser<'a> {
    pub(super) fn parse_rule(
        &self,
        head: &Line,
        rest: &str,
        body: &[Line],
    ) -> Result<Rule, ParseError> {
        // An empty or unquoted description is kept; the verifier reports it.
        let description = unquote(rest).unwrap_or(rest).trim().to_owned();
        if body.len() > 1 {
            return Err(self.err(
                body[1].line,
                "a rule takes a single 'if <condition> → <action>' line",
            ));
        }
        let (condition, action) = match body.first() {
            Some(line) => self.parse_rule_body(line)?,
            None => (None, None),
        };
        Ok(Rule {
            description,
            condition,
            action,
            location: self.loc(head.line),
        })
    }

    fn parse_rule_body(
        &self,
        line: &Line,
    ) -> Result<(Option<RuleCondition>, Option<String>), ParseError> {
        let text = line
            .content
            .strip_prefix("if ")
            .ok_or_else(|| {
                self.err(
                    line.line,
                    format!("expected 'if <condition> → <action>', got '{}'", line.content),
                )
            })?
            .trim();
        let (condition_text, action_text) = match first_top_level_arrow(text) {
            Some(i) => (text[..i].trim(), Some(text[i + ARROW.len()..].trim())),
            None => (text, None),
        };
        let condition = if condition_text.is_empty() {
            None
        } else if condition_text.contains("ai(") {
            Some(RuleCondition::Ai(parse_ai_call(condition_text)))
        } else {
            Some(RuleCondition::Plain {
                text: condition_text.to_owned(),
            })
        };
        let action = action_text.filter(|a| !a.is_empty()).map(str::to_owned);
        Ok((condition, action))
    }
}

/// Extract `(input, "prompt")` from an AI condition. A partial match keeps
/// whichever part was found so the verifier can report what is missing.
pub(crate) fn parse_ai_call(condition: &str) -> AiCall {
    if let Some(caps) = AI_CALL.captures(condition) {
        return AiCall {
            input: caps[1].trim().to_owned(),
            prompt: caps[2].to_owned(),
            expected_output: AI_CONDITION_OUTPUT.to_owned(),
        };
    }
    let start = condition.find("ai(").map_or(0, |i| i + 3);
    let inner = condition[start..].trim_end().trim_end_matches(')');
    let prompt = QUOTED
        .captures(inner)
        .map(|caps| caps[1].to_owned())
        .unwrap_or_default();
    let input = match inner.split_once(',') {
        Some((first, _)) => first.trim(),
        None if prompt.is_empty() => inner.trim(),
        None => "",
    };
    AiCall {
        input: input.trim_matches('"').to_owned(),
        prompt,
        expected_output: AI_CONDITION_OUTPUT.to_owned(),
    }
}
