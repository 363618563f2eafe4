//! Build-script dialect
//!
//! Scripts are plain SQL files with two line-level extensions: `--` comment
//! lines and `.read <path>` include directives. Statement text accumulates
//! across lines until a line carrying `;` arrives; the whole buffer then
//! splits on `;`, complete segments execute in order, and the text after the
//! last terminator carries into the next line. Terminators inside quoted
//! strings are not recognized; the dialect treats every `;` as a boundary.

const INCLUDE_PREFIX: &str = ".read ";

/// One classified line of a build script
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ScriptLine<'a> {
    /// Empty or whitespace-only line
    Blank,
    /// Line whose trimmed form starts with `--`
    Comment,
    /// `.read <path>` directive, quotes around the path already removed
    Include(&'a str),
    /// Anything else: part of a SQL statement, kept raw
    Sql(&'a str),
}

impl<'a> ScriptLine<'a> {
    /// Classify a raw script line. Comment and include detection work on the
    /// trimmed line; the `Sql` variant keeps the raw line so buffered
    /// statements preserve their original spacing.
    pub(crate) fn classify(raw: &'a str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return ScriptLine::Blank;
        }
        if trimmed.starts_with("--") {
            return ScriptLine::Comment;
        }
        let is_include = trimmed
            .get(..INCLUDE_PREFIX.len())
            .is_some_and(|p| p.eq_ignore_ascii_case(INCLUDE_PREFIX));
        if is_include {
            let path = trimmed[INCLUDE_PREFIX.len()..]
                .trim()
                .trim_matches('\'')
                .trim_matches('"');
            return ScriptLine::Include(path);
        }
        ScriptLine::Sql(raw)
    }
}

/// Accumulates raw SQL lines and yields complete statements
#[derive(Debug, Default)]
pub(crate) struct StatementBuffer {
    buf: String,
}

impl StatementBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a raw line. When the line carries a terminator the whole
    /// buffer splits on `;`: complete segments come back trimmed, in order,
    /// and whatever follows the last `;` stays buffered.
    pub(crate) fn push_line(&mut self, raw: &str) -> Vec<String> {
        self.buf.push_str(raw);
        self.buf.push('\n');

        if !raw.contains(';') {
            return Vec::new();
        }

        let mut parts: Vec<&str> = self.buf.split(';').collect();
        let remainder = parts.pop().unwrap_or("").to_string();
        let statements = parts
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();
        self.buf = remainder;
        statements
    }

    /// Drain the pending partial statement, if it holds anything beyond
    /// whitespace. The text comes back exactly as buffered.
    pub(crate) fn flush(&mut self) -> Option<String> {
        let pending = std::mem::take(&mut self.buf);
        if pending.trim().is_empty() {
            None
        } else {
            Some(pending)
        }
    }
}

#[cfg(test)]
#[path = "script_test.rs"]
mod tests;
