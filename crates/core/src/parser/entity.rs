use super::{first_top_level_comma, is_identifier, split_top_level, unquote, Parser};
use crate::ast::{Entity, Field, FieldModifiers, FieldType};
use crate::error::ParseError;
use crate::lexer::Line;
use regex::Regex;
use std::sync::LazyLock;

static AI_PROMPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^ai\(\s*"((?:[^"\\]|\\.)*)"\s*\)$"#).unwrap());

static RELATIONSHIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*\(\s*relationship\s*\)$").unwrap()
});

static LIST_OF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^list\s+of\s+([A-Za-z_][A-Za-z0-9_]*)$").unwrap());

impl<'a> Parser<'a> {
    pub(super) fn parse_entity(
        &self,
        head: &Line,
        rest: &str,
        body: &[Line],
    ) -> Result<Entity, ParseError> {
        let name = self.parse_name(rest, "entity", head.line)?;
        self.expect_flat_body(body, "entity")?;
        let fields = body
            .iter()
            .map(|line| self.parse_field_line(line))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Entity {
            name,
            fields,
            location: self.loc(head.line),
        })
    }

    /// `name: type[, modifier, modifier...]`
    fn parse_field_line(&self, line: &Line) -> Result<Field, ParseError> {
        let (name, spec) = line
            .content
            .split_once(':')
            .ok_or_else(|| self.err(line.line, format!("expected 'name: type', got '{}'", line.content)))?;
        let name = name.trim();
        if !is_identifier(name) {
            return Err(self.err(line.line, format!("invalid field name '{}'", name)));
        }
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(self.err(line.line, format!("field '{}' is missing a type", name)));
        }

        let (type_text, modifier_text) = match first_top_level_comma(spec) {
            Some(i) => (spec[..i].trim(), spec[i + 1..].trim()),
            None => (spec, ""),
        };
        let field_type = parse_field_type(type_text);
        let modifiers = self.parse_modifiers(modifier_text, name, line.line)?;

        Ok(Field {
            name: name.to_owned(),
            field_type,
            modifiers,
            location: self.loc(line.line),
        })
    }

    fn parse_modifiers(
        &self,
        text: &str,
        field: &str,
        line: u32,
    ) -> Result<FieldModifiers, ParseError> {
        let mut m = FieldModifiers::default();
        for item in split_top_level(text) {
            match item.split_once('=') {
                None => match item {
                    "required" => m.required = true,
                    "unique" => m.unique = true,
                    "" => {
                        return Err(self.err(line, format!("empty modifier on field '{}'", field)))
                    }
                    other => {
                        return Err(self.err(
                            line,
                            format!("unknown modifier '{}' on field '{}'", other, field),
                        ))
                    }
                },
                Some((key, value)) => {
                    let value = value.trim();
                    match key.trim() {
                        "min" => m.min = Some(self.parse_bound(value, "min", field, line)?),
                        "max" => m.max = Some(self.parse_bound(value, "max", field, line)?),
                        "pattern" => {
                            m.pattern = Some(unquote(value).unwrap_or(value).to_owned());
                        }
                        "default" => {
                            m.default_value = Some(unquote(value).unwrap_or(value).to_owned());
                        }
                        other => {
                            return Err(self.err(
                                line,
                                format!("unknown modifier '{}' on field '{}'", other, field),
                            ))
                        }
                    }
                }
            }
        }
        Ok(m)
    }

    fn parse_bound(&self, value: &str, key: &str, field: &str, line: u32) -> Result<i64, ParseError> {
        value.parse::<i64>().map_err(|_| {
            self.err(
                line,
                format!(
                    "invalid integer '{}' for '{}' on field '{}'",
                    value, key, field
                ),
            )
        })
    }
}

/// Classify the type position of a field line. Never fails: text that
/// matches no known form becomes `FieldType::Unrecognized`.
pub(crate) fn parse_field_type(text: &str) -> FieldType {
    if let Some(t) = FieldType::scalar(text) {
        return t;
    }
    if let Some(inner) = text.strip_prefix("enum(").and_then(|t| t.strip_suffix(')')) {
        let values = split_top_level(inner)
            .into_iter()
            .map(|v| unquote(v).unwrap_or(v).to_owned())
            .filter(|v| !v.is_empty())
            .collect();
        return FieldType::Enum { values };
    }
    if text.starts_with("ai(") {
        return FieldType::Ai {
            prompt: ai_prompt(text),
        };
    }
    if let Some(inner) = text.strip_prefix("computed(").and_then(|t| t.strip_suffix(')')) {
        return FieldType::Computed {
            expression: inner.trim().to_owned(),
        };
    }
    if let Some(caps) = RELATIONSHIP.captures(text) {
        return FieldType::Relationship {
            entity: caps[1].to_owned(),
        };
    }
    if let Some(caps) = LIST_OF.captures(text) {
        return FieldType::List {
            entity: caps[1].to_owned(),
        };
    }
    FieldType::Unrecognized {
        raw: text.to_owned(),
    }
}

/// Prompt of an `ai("...")` type. Falls back to stripping the delimiters
/// when the quoted form is absent.
fn ai_prompt(text: &str) -> String {
    if let Some(caps) = AI_PROMPT.captures(text) {
        return caps[1].to_owned();
    }
    let inner = text.trim_start_matches("ai(").trim_end_matches(')');
    inner.trim().trim_matches('"').trim().to_owned()
}
