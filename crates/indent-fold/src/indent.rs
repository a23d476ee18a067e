//! Indentation measurement.
//!
//! Indentation is the only structural signal the engine uses. Blank lines carry no depth of
//! their own: every scan steps across them and takes the depth of the nearest non-blank line.

use crate::document::{Direction, FoldBuffer};
use crate::error::FoldError;
use std::borrow::Cow;

/// A non-blank line and its indent depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineDepth {
    /// Line number.
    pub line: usize,
    /// Indent depth of the line.
    pub depth: usize,
}

/// Check whether a line has no visible content.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Read a line the buffer claims to have.
pub(crate) fn read_line<B: FoldBuffer + ?Sized>(
    buffer: &B,
    line: usize,
) -> Result<Cow<'_, str>, FoldError> {
    buffer.line_text(line).ok_or(FoldError::LineOutOfRange {
        line,
        line_count: buffer.line_count(),
    })
}

/// Measures indent depth with a fixed tab width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentIndex {
    tab_width: usize,
}

impl IndentIndex {
    /// Create an index counting each leading tab as `tab_width` columns.
    pub fn new(tab_width: usize) -> Self {
        Self { tab_width }
    }

    /// Tab width in columns.
    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// Indent depth of `text`: leading spaces plus leading tabs times the tab width.
    ///
    /// Other leading whitespace is skipped without adding depth. Meaningless for blank lines.
    pub fn depth_of(&self, text: &str) -> usize {
        text.chars()
            .take_while(|c| c.is_whitespace())
            .map(|c| match c {
                ' ' => 1,
                '\t' => self.tab_width,
                _ => 0,
            })
            .sum()
    }

    /// Depth of `line` if it is non-blank.
    pub fn depth_at<B: FoldBuffer + ?Sized>(
        &self,
        buffer: &B,
        line: usize,
    ) -> Result<Option<usize>, FoldError> {
        let text = read_line(buffer, line)?;
        if is_blank(&text) {
            Ok(None)
        } else {
            Ok(Some(self.depth_of(&text)))
        }
    }

    /// Effective depth at `from`: the first non-blank line reached by stepping from `from` in
    /// `direction`, `from` included.
    ///
    /// Returns `None` when the scan leaves the document without meeting a non-blank line.
    pub fn resolve_depth<B: FoldBuffer + ?Sized>(
        &self,
        buffer: &B,
        from: usize,
        direction: Direction,
    ) -> Result<Option<LineDepth>, FoldError> {
        let line_count = buffer.line_count();
        if from >= line_count {
            return Ok(None);
        }

        let mut line = from;
        loop {
            if let Some(depth) = self.depth_at(buffer, line)? {
                return Ok(Some(LineDepth { line, depth }));
            }
            line = match direction {
                Direction::Forward if line + 1 < line_count => line + 1,
                Direction::Backward if line > 0 => line - 1,
                _ => return Ok(None),
            };
        }
    }
}

impl Default for IndentIndex {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_TAB_WIDTH)
    }
}
