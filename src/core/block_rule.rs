use crate::core::regex_rule::Occurrences;
use crate::domain::ports::Rule;
use regex::Regex;
use std::borrow::Cow;

/// Removes (or replaces) delimited blocks whose body matches a predicate.
///
/// Blocks run from an `open` marker to its balanced `close` marker, so a
/// block that nests other blocks of the same kind is taken as a whole.
/// Outer blocks are tested first; when an outer block does not match, the
/// blocks nested inside it are still examined. An `open` marker with no
/// balancing `close` is never a match.
///
/// `contains` is tested against the whole block, markers and nested blocks
/// included; anchor it with `^` to look only at the opening marker.
///
/// Markers are plain text, so a self-closing element (`<button />`) is not
/// recognised as closing itself.
#[derive(Debug, Clone)]
pub struct BlockRule {
    name: String,
    open: String,
    close: String,
    contains: Regex,
    replacement: String,
    occurrences: Occurrences,
    trim_line: bool,
}

impl BlockRule {
    pub fn new(
        name: impl Into<String>,
        open: impl Into<String>,
        close: impl Into<String>,
        contains: Regex,
    ) -> Self {
        Self {
            name: name.into(),
            open: open.into(),
            close: close.into(),
            contains,
            replacement: String::new(),
            occurrences: Occurrences::All,
            trim_line: true,
        }
    }

    pub fn with_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = replacement.into();
        self
    }

    pub fn with_occurrences(mut self, occurrences: Occurrences) -> Self {
        self.occurrences = occurrences;
        self
    }

    /// When set, the indentation in front of a block and the line break
    /// before it are removed along with the block.
    pub fn with_trim_line(mut self, trim_line: bool) -> Self {
        self.trim_line = trim_line;
        self
    }

    /// End offset of the block opened at `start`, if it is balanced.
    fn block_end(&self, text: &str, start: usize) -> Option<usize> {
        let mut depth = 1usize;
        let mut pos = start + self.open.len();

        loop {
            let next_close = find_token(text, pos, &self.close)?;
            match find_token(text, pos, &self.open) {
                Some(next_open) if next_open < next_close => {
                    depth += 1;
                    pos = next_open + self.open.len();
                }
                _ => {
                    depth -= 1;
                    pos = next_close + self.close.len();
                    if depth == 0 {
                        return Some(pos);
                    }
                }
            }
        }
    }

    fn cut_start(&self, text: &str, floor: usize, start: usize) -> usize {
        if self.trim_line {
            line_trimmed_start(text, floor, start)
        } else {
            start
        }
    }
}

impl Rule for BlockRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply<'a>(&self, text: &'a str) -> (Cow<'a, str>, usize) {
        if self.open.is_empty() || self.close.is_empty() {
            return (Cow::Borrowed(text), 0);
        }

        let mut out = String::new();
        let mut copied = 0;
        let mut search = 0;
        let mut matches = 0;

        while let Some(start) = find_token(text, search, &self.open) {
            let Some(end) = self.block_end(text, start) else {
                tracing::debug!(rule = %self.name, offset = start, "Unbalanced block marker");
                search = start + self.open.len();
                continue;
            };

            if !self.contains.is_match(&text[start..end]) {
                search = start + self.open.len();
                continue;
            }

            let cut = self.cut_start(text, copied, start);
            out.push_str(&text[copied..cut]);
            out.push_str(&self.replacement);
            copied = end;
            search = end;
            matches += 1;

            if self.occurrences == Occurrences::First {
                break;
            }
        }

        if matches == 0 {
            return (Cow::Borrowed(text), 0);
        }

        out.push_str(&text[copied..]);
        (Cow::Owned(out), matches)
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// Next occurrence of `token` at or after `from` that is not the prefix of a
/// longer name (`<button` must not match `<buttonGroup`).
fn find_token(text: &str, from: usize, token: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let needs_boundary = token.bytes().last().is_some_and(is_word_byte);
    let mut pos = from;

    while pos <= text.len() {
        let found = pos + text[pos..].find(token)?;
        let after = found + token.len();
        if !needs_boundary || after >= bytes.len() || !is_word_byte(bytes[after]) {
            return Some(found);
        }
        pos = after;
    }
    None
}

/// Moves `start` back over the indentation of its line and the preceding
/// line break, provided the block is the first thing on the line. Never
/// moves before `floor`.
fn line_trimmed_start(text: &str, floor: usize, start: usize) -> usize {
    let bytes = text.as_bytes();
    let mut pos = start;

    while pos > floor && matches!(bytes[pos - 1], b' ' | b'\t') {
        pos -= 1;
    }

    if pos == 0 {
        return pos;
    }
    if pos > floor && bytes[pos - 1] == b'\n' {
        pos -= 1;
        if pos > floor && bytes[pos - 1] == b'\r' {
            pos -= 1;
        }
        return pos;
    }
    start
}
