use super::{split_property, Parser};
use crate::ast::{DashboardWidget, Screen, ScreenKind, WidgetKind, WizardStep};
use crate::error::ParseError;
use crate::lexer::{self, Line};
use regex::Regex;
use std::sync::LazyLock;

/// `"label" (widgetKind)`
static WIDGET_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^"((?:[^"\\]|\\.)*)"\s*\(\s*([A-Za-z_][A-Za-z0-9_]*)\s*\)$"#).unwrap()
});

/// `"step name" → [field, field]`
static STEP_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"((?:[^"\\]|\\.)*)"\s*→\s*(\[.*\])$"#).unwrap());

impl<'a> Parser<'a> {
    pub(super) fn parse_screen(
        &self,
        head: &Line,
        rest: &str,
        body: &[Line],
    ) -> Result<Screen, ParseError> {
        let name = self.parse_name(rest, "screen", head.line)?;
        let mut kind = None;
        let mut entity = None;
        let mut fields = Vec::new();
        let mut filters = Vec::new();
        let mut actions = Vec::new();
        let mut primary_action = None;
        let mut steps = Vec::new();
        let mut widgets = Vec::new();

        let Some(first) = body.first() else {
            return Err(self.err(head.line, format!("screen '{}' missing 'kind'", name)));
        };
        let level = first.indent;
        let mut i = 0;
        while i < body.len() {
            let line = &body[i];
            if line.indent != level {
                return Err(self.err(
                    line.line,
                    format!("unexpected indentation in screen '{}': '{}'", name, line.content),
                ));
            }
            let (key, value) = split_property(&line.content).ok_or_else(|| {
                self.err(
                    line.line,
                    format!("expected 'property: value', got '{}'", line.content),
                )
            })?;
            // Nested blocks own every deeper line that follows the key line.
            let nested_end = lexer::block_end(body, i + 1, level);
            let nested = &body[i + 1..nested_end];
            if !nested.is_empty() && !matches!(key, "steps" | "widgets") {
                return Err(self.err(
                    nested[0].line,
                    format!("property '{}' does not take a nested block", key),
                ));
            }
            match key {
                "kind" => kind = Some(ScreenKind::from_keyword(value)),
                "entity" => entity = Some(value.to_owned()).filter(|v| !v.is_empty()),
                "action" => primary_action = Some(value.to_owned()).filter(|v| !v.is_empty()),
                "fields" => fields = self.parse_bracket_list(value, line.line)?,
                "filters" => filters = self.parse_bracket_list(value, line.line)?,
                "actions" => actions = self.parse_bracket_list(value, line.line)?,
                "steps" => {
                    self.expect_empty_value(key, value, line.line)?;
                    steps = nested
                        .iter()
                        .map(|l| self.parse_step_line(l))
                        .collect::<Result<Vec<_>, _>>()?;
                }
                "widgets" => {
                    self.expect_empty_value(key, value, line.line)?;
                    widgets = nested
                        .iter()
                        .map(|l| self.parse_widget_line(l))
                        .collect::<Result<Vec<_>, _>>()?;
                }
                other => {
                    return Err(self.err(
                        line.line,
                        format!("unknown screen property '{}'", other),
                    ))
                }
            }
            i = nested_end;
        }

        Ok(Screen {
            kind: kind.ok_or_else(|| self.err(head.line, format!("screen '{}' missing 'kind'", name)))?,
            name,
            entity,
            fields,
            filters,
            actions,
            primary_action,
            steps,
            widgets,
            location: self.loc(head.line),
        })
    }

    fn expect_empty_value(&self, key: &str, value: &str, line: u32) -> Result<(), ParseError> {
        if value.is_empty() {
            Ok(())
        } else {
            Err(self.err(
                line,
                format!("'{}:' opens a nested block and takes no inline value", key),
            ))
        }
    }

    fn parse_step_line(&self, line: &Line) -> Result<WizardStep, ParseError> {
        let caps = STEP_LINE.captures(&line.content).ok_or_else(|| {
            self.err(
                line.line,
                format!("expected '\"step name\" → [fields]', got '{}'", line.content),
            )
        })?;
        Ok(WizardStep {
            name: caps[1].to_owned(),
            fields: self.parse_bracket_list(&caps[2], line.line)?,
            location: self.loc(line.line),
        })
    }

    fn parse_widget_line(&self, line: &Line) -> Result<DashboardWidget, ParseError> {
        let caps = WIDGET_LINE.captures(&line.content).ok_or_else(|| {
            self.err(
                line.line,
                format!("expected '\"label\" (kind)', got '{}'", line.content),
            )
        })?;
        Ok(DashboardWidget {
            label: caps[1].to_owned(),
            kind: WidgetKind::from_keyword(&caps[2]),
            location: self.loc(line.line),
        })
    }
}
