use super::{is_identifier, split_property, unquote, Parser};
use crate::ast::{Event, Integration};
use crate::error::ParseError;
use crate::lexer::Line;

impl<'a> Parser<'a> {
    pub(super) fn parse_integration(
        &self,
        head: &Line,
        rest: &str,
        body: &[Line],
    ) -> Result<Integration, ParseError> {
        let name = self.parse_name(rest, "integration", head.line)?;
        self.expect_flat_body(body, "integration")?;
        let mut endpoint = None;
        let mut purpose = None;
        for line in body {
            let (key, value) = split_property(&line.content).ok_or_else(|| {
                self.err(
                    line.line,
                    format!("expected 'property: value', got '{}'", line.content),
                )
            })?;
            let value = unquote(value).unwrap_or(value).to_owned();
            match key {
                "endpoint" => endpoint = Some(value),
                "purpose" => purpose = Some(value),
                other => {
                    return Err(self.err(
                        line.line,
                        format!("unknown integration property '{}'", other),
                    ))
                }
            }
        }
        Ok(Integration {
            name,
            endpoint,
            purpose,
            location: self.loc(head.line),
        })
    }

    /// Event body: `fields: [a, b]` or one bare field name per line.
    pub(super) fn parse_event(
        &self,
        head: &Line,
        rest: &str,
        body: &[Line],
    ) -> Result<Event, ParseError> {
        let name = self.parse_name(rest, "event", head.line)?;
        self.expect_flat_body(body, "event")?;
        let mut fields = Vec::new();
        for line in body {
            match split_property(&line.content) {
                Some(("fields", value)) => {
                    fields.extend(self.parse_bracket_list(value, line.line)?);
                }
                Some((other, _)) => {
                    return Err(self.err(
                        line.line,
                        format!("unknown event property '{}'", other),
                    ))
                }
                None if is_identifier(&line.content) => fields.push(line.content.clone()),
                None => {
                    return Err(self.err(
                        line.line,
                        format!("expected a field name, got '{}'", line.content),
                    ))
                }
            }
        }
        Ok(Event {
            name,
            fields,
            location: self.loc(head.line),
        })
    }
}
