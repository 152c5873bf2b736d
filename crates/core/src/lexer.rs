//! Line tokenizer: source text -> significant lines with indent levels.
//!
//! The grammar is layout-sensitive, so the unit of tokenization is a line,
//! not a word. Blank lines and `#` comment lines are dropped here; every
//! retained line keeps its original 1-based line number for diagnostics.

/// Number of leading spaces per indentation level.
pub const INDENT_WIDTH: usize = 2;

/// One significant source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Line text with surrounding whitespace trimmed.
    pub content: String,
    /// `leading_spaces / INDENT_WIDTH`, rounded down.
    pub indent: usize,
    /// 1-based line number in the original source.
    pub line: u32,
}

/// Indent level of a raw line. Only ASCII spaces count; a tab ends the
/// indentation run.
pub fn indent_level(raw: &str) -> usize {
    let spaces = raw.chars().take_while(|c| *c == ' ').count();
    spaces / INDENT_WIDTH
}

pub fn tokenize(src: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    for (i, raw) in src.lines().enumerate() {
        let content = raw.trim();
        if content.is_empty() || content.starts_with('#') {
            continue;
        }
        lines.push(Line {
            content: content.to_owned(),
            indent: indent_level(raw),
            line: (i + 1) as u32,
        });
    }
    lines
}

/// Index one past the last line of the block that starts at `start` and
/// belongs to an owner at `owner_indent`. The block is the maximal run of
/// lines indented deeper than the owner.
pub fn block_end(lines: &[Line], start: usize, owner_indent: usize) -> usize {
    let mut end = start;
    while end < lines.len() && lines[end].indent > owner_indent {
        end += 1;
    }
    end
}
