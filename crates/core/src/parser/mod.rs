/// Recursive-descent parser over tokenized lines.
/// Every construct carries its location (file, line of the declaring line).
/// No cross-reference resolution is done here -- that is the verifier's job.
use crate::ast::{Entity, Event, Flow, Integration, Location, Rule, Screen, Spec};
use crate::error::ParseError;
use crate::lexer::{self, Line};
use regex::Regex;
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::LazyLock;

mod constructs;
mod entity;
mod flow;
mod rule;
mod screen;

/// Filename used in locations when the caller supplies none.
pub const DEFAULT_FILENAME: &str = "<input>";

static APP_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^app\s+"((?:[^"\\]|\\.)*)"$"#).unwrap());

static IDENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

pub(crate) fn is_identifier(s: &str) -> bool {
    IDENT.is_match(s)
}

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

struct Parser<'a> {
    lines: &'a [Line],
    pos: usize,
    filename: String,
}

/// One successfully parsed top-level declaration.
enum Declaration {
    Entity(Entity),
    Screen(Screen),
    Flow(Flow),
    Rule(Rule),
    Integration(Integration),
    Event(Event),
}

impl<'a> Parser<'a> {
    fn new(lines: &'a [Line], filename: &str) -> Self {
        Parser {
            lines,
            pos: 0,
            filename: filename.to_owned(),
        }
    }

    fn loc(&self, line: u32) -> Location {
        Location {
            file: self.filename.clone(),
            line,
        }
    }

    fn err(&self, line: u32, msg: impl Into<String>) -> ParseError {
        ParseError::new(&self.filename, line, msg)
    }

    fn parse_file(&mut self) -> Result<Spec, Vec<ParseError>> {
        let app_name = self.parse_app_header().map_err(|e| vec![e])?;
        let mut spec = Spec {
            app_name,
            entities: Vec::new(),
            screens: Vec::new(),
            flows: Vec::new(),
            rules: Vec::new(),
            integrations: Vec::new(),
            events: Vec::new(),
        };
        let mut errors = Vec::new();

        let lines = self.lines;
        while self.pos < lines.len() {
            let head = &lines[self.pos];
            if head.indent > 0 {
                errors.push(self.err(
                    head.line,
                    format!(
                        "unexpected indented line '{}' outside of a declaration",
                        head.content
                    ),
                ));
                self.pos = lexer::block_end(lines, self.pos, 0);
                continue;
            }

            // The declaration body is every deeper-indented line that follows;
            // recovery after an error is simply moving past it.
            let end = lexer::block_end(lines, self.pos + 1, 0);
            let body = &lines[self.pos + 1..end];
            self.pos = end;

            match self.parse_declaration(head, body) {
                Ok(Declaration::Entity(e)) => spec.entities.push(e),
                Ok(Declaration::Screen(s)) => spec.screens.push(s),
                Ok(Declaration::Flow(f)) => spec.flows.push(f),
                Ok(Declaration::Rule(r)) => spec.rules.push(r),
                Ok(Declaration::Integration(i)) => spec.integrations.push(i),
                Ok(Declaration::Event(e)) => spec.events.push(e),
                Err(e) => {
                    tracing::trace!(line = e.line, "recovering after parse error");
                    errors.push(e);
                }
            }
        }

        if errors.is_empty() {
            Ok(spec)
        } else {
            Err(errors)
        }
    }

    fn parse_app_header(&mut self) -> Result<String, ParseError> {
        let Some(first) = self.lines.first() else {
            return Err(self.err(1, "expected 'app \"<name>\"' declaration, found empty input"));
        };
        match APP_HEADER.captures(&first.content) {
            Some(caps) if first.indent == 0 => {
                self.pos = 1;
                Ok(caps[1].to_owned())
            }
            _ => Err(self.err(
                first.line,
                format!(
                    "expected 'app \"<name>\"' as the first declaration, got '{}'",
                    first.content
                ),
            )),
        }
    }

    fn parse_declaration(&self, head: &Line, body: &[Line]) -> Result<Declaration, ParseError> {
        let (keyword, rest) = split_keyword(&head.content);
        tracing::trace!(keyword, line = head.line, "parsing declaration");
        match keyword {
            "entity" => self.parse_entity(head, rest, body).map(Declaration::Entity),
            "screen" => self.parse_screen(head, rest, body).map(Declaration::Screen),
            "flow" => self.parse_flow(head, rest, body).map(Declaration::Flow),
            "rule" => self.parse_rule(head, rest, body).map(Declaration::Rule),
            "integration" => self
                .parse_integration(head, rest, body)
                .map(Declaration::Integration),
            "event" => self.parse_event(head, rest, body).map(Declaration::Event),
            "app" => Err(self.err(head.line, "duplicate 'app' declaration")),
            other => Err(self.err(
                head.line,
                format!(
                    "unknown declaration '{}': expected entity, screen, flow, rule, integration or event",
                    other
                ),
            )),
        }
    }

    /// Declaration name: a bare identifier or a double-quoted string.
    fn parse_name(&self, rest: &str, kind: &str, line: u32) -> Result<String, ParseError> {
        if rest.is_empty() {
            return Err(self.err(line, format!("{} declaration is missing a name", kind)));
        }
        if let Some(inner) = unquote(rest) {
            return Ok(inner.to_owned());
        }
        if is_identifier(rest) {
            return Ok(rest.to_owned());
        }
        Err(self.err(
            line,
            format!(
                "invalid {} name '{}': use an identifier or a quoted string",
                kind, rest
            ),
        ))
    }

    /// Reject lines nested deeper than the first body level.
    fn expect_flat_body(&self, body: &[Line], kind: &str) -> Result<(), ParseError> {
        let Some(first) = body.first() else {
            return Ok(());
        };
        let level = first.indent;
        match body.iter().find(|l| l.indent != level) {
            Some(l) => Err(self.err(
                l.line,
                format!("inconsistent indentation in {} body: '{}'", kind, l.content),
            )),
            None => Ok(()),
        }
    }

    /// Bracketed list property value: `[a, b, "c d"]`.
    fn parse_bracket_list(&self, value: &str, line: u32) -> Result<Vec<String>, ParseError> {
        let inner = value
            .strip_prefix('[')
            .and_then(|v| v.strip_suffix(']'))
            .ok_or_else(|| self.err(line, format!("expected a bracketed list, got '{}'", value)))?;
        Ok(split_top_level(inner)
            .into_iter()
            .map(|item| unquote(item).unwrap_or(item).to_owned())
            .filter(|item| !item.is_empty())
            .collect())
    }
}

// ──────────────────────────────────────────────
// Line-level helpers
// ──────────────────────────────────────────────

/// Split a line into its first word and the trimmed remainder.
pub(crate) fn split_keyword(content: &str) -> (&str, &str) {
    match content.split_once(char::is_whitespace) {
        Some((kw, rest)) => (kw, rest.trim()),
        None => (content, ""),
    }
}

/// `key: value` with an identifier key. The value is trimmed.
pub(crate) fn split_property(content: &str) -> Option<(&str, &str)> {
    let (key, value) = content.split_once(':')?;
    let key = key.trim();
    if is_identifier(key) {
        Some((key, value.trim()))
    } else {
        None
    }
}

/// Contents of a double-quoted string spanning all of `s`.
pub(crate) fn unquote(s: &str) -> Option<&str> {
    let s = s.trim();
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        Some(&s[1..s.len() - 1])
    } else {
        None
    }
}

/// Index of the first comma at paren/bracket depth 0 that is not inside a
/// double-quoted string.
pub(crate) fn first_top_level_comma(s: &str) -> Option<usize> {
    first_top_level(s, ',')
}

/// Byte index of the first `→` outside parens, brackets and quotes.
pub(crate) fn first_top_level_arrow(s: &str) -> Option<usize> {
    first_top_level(s, '→')
}

fn first_top_level(s: &str, target: char) -> Option<usize> {
    let mut depth: i32 = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if in_quotes {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quotes = false;
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            c if c == target && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// Split on every top-level comma (see [`first_top_level_comma`]); items
/// are trimmed.
pub(crate) fn split_top_level(s: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut rest = s;
    while let Some(i) = first_top_level_comma(rest) {
        items.push(rest[..i].trim());
        rest = &rest[i + 1..];
    }
    if !rest.trim().is_empty() || !items.is_empty() {
        items.push(rest.trim());
    }
    items
}

// ──────────────────────────────────────────────
// Entry points
// ──────────────────────────────────────────────

/// Parse a source document into a `Spec`.
///
/// Returns every error found in one pass; a partially built spec is never
/// returned. A panic inside the parser is reported as a single internal
/// error rather than unwinding into the caller.
pub fn parse(src: &str, filename: Option<&str>) -> Result<Spec, Vec<ParseError>> {
    let filename = filename.unwrap_or(DEFAULT_FILENAME);
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let lines = lexer::tokenize(src);
        Parser::new(&lines, filename).parse_file()
    }));
    let result = outcome.unwrap_or_else(|_| Err(vec![ParseError::internal(filename)]));
    match &result {
        Ok(spec) => tracing::debug!(
            file = filename,
            entities = spec.entities.len(),
            screens = spec.screens.len(),
            flows = spec.flows.len(),
            rules = spec.rules.len(),
            "parsed spec"
        ),
        Err(errors) => tracing::debug!(file = filename, errors = errors.len(), "parse failed"),
    }
    result
}

/// Serializable parse outcome: `spec` is present only on success and
/// `errors` is non-empty only on failure.
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutput {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<Spec>,
    pub errors: Vec<ParseError>,
}

impl From<Result<Spec, Vec<ParseError>>> for ParseOutput {
    fn from(result: Result<Spec, Vec<ParseError>>) -> Self {
        match result {
            Ok(spec) => ParseOutput {
                success: true,
                spec: Some(spec),
                errors: Vec::new(),
            },
            Err(errors) => ParseOutput {
                success: false,
                spec: None,
                errors,
            },
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
