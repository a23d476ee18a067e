//! Single-block location: finding the header above a line and the end of its block below.

use crate::document::{Direction, FoldBuffer};
use crate::error::FoldError;
use crate::indent::{IndentIndex, LineDepth};
use crate::intervals::LineRange;

/// An indent-delimited block: a header line plus the deeper lines that follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// The header line, which stays visible when the block is folded.
    pub header: usize,
    /// Indent depth of the header.
    pub depth: usize,
    /// One past the last deeper line of the block.
    pub end: usize,
}

impl Block {
    /// Lines hidden when this block is folded: `[header + 1, end)`.
    pub fn body(&self) -> LineRange {
        LineRange::new(self.header + 1, self.end)
    }

    /// The whole block, header included.
    pub fn range(&self) -> LineRange {
        LineRange::new(self.header, self.end)
    }
}

/// Locates block boundaries by scanning indentation up and down from a line.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockLocator {
    indent: IndentIndex,
}

impl BlockLocator {
    /// Create a locator measuring indentation with `indent`.
    pub fn new(indent: IndentIndex) -> Self {
        Self { indent }
    }

    /// The indentation measure in use.
    pub fn indent(&self) -> &IndentIndex {
        &self.indent
    }

    /// Find the header of the block enclosing `line`.
    ///
    /// The reference depth is the effective depth at `line`. Walks backward, skipping blank
    /// lines, to the first line strictly shallower than that. Returns `None` if the start of
    /// the document is reached first.
    pub fn locate_start<B: FoldBuffer + ?Sized>(
        &self,
        buffer: &B,
        line: usize,
    ) -> Result<Option<LineDepth>, FoldError> {
        let Some(reference) = self.indent.resolve_depth(buffer, line, Direction::Forward)? else {
            return Ok(None);
        };

        let mut candidate = line.min(reference.line);
        while candidate > 0 {
            let Some(found) =
                self.indent
                    .resolve_depth(buffer, candidate - 1, Direction::Backward)?
            else {
                return Ok(None);
            };
            if found.depth < reference.depth {
                return Ok(Some(found));
            }
            candidate = found.line;
        }

        Ok(None)
    }

    /// Find the end of the block whose header is `start_line` at `reference_depth`.
    ///
    /// Scans forward from `start_line + 1` until a non-blank line at or above
    /// `reference_depth`. Returns the line after the last deeper line, or `None` when no
    /// deeper line follows the header.
    pub fn locate_end<B: FoldBuffer + ?Sized>(
        &self,
        buffer: &B,
        start_line: usize,
        reference_depth: usize,
    ) -> Result<Option<usize>, FoldError> {
        let line_count = buffer.line_count();
        let mut last_deeper = None;
        let mut line = start_line + 1;

        while line < line_count {
            let Some(next) = self.indent.resolve_depth(buffer, line, Direction::Forward)? else {
                break;
            };
            if next.depth <= reference_depth {
                break;
            }
            last_deeper = Some(next.line);
            line = next.line + 1;
        }

        Ok(last_deeper.map(|line| line + 1))
    }

    /// Find the block to fold for a cursor on `line`.
    ///
    /// A blank cursor line stands for the next non-blank line. If the following non-blank line
    /// is deeper, that line is the header; otherwise the header is found with
    /// [`locate_start`](Self::locate_start).
    pub fn locate_block<B: FoldBuffer + ?Sized>(
        &self,
        buffer: &B,
        line: usize,
    ) -> Result<Option<Block>, FoldError> {
        let Some(current) = self.indent.resolve_depth(buffer, line, Direction::Forward)? else {
            return Ok(None);
        };

        let next = self
            .indent
            .resolve_depth(buffer, current.line + 1, Direction::Forward)?;

        let header = match next {
            Some(next) if next.depth > current.depth => current,
            _ => match self.locate_start(buffer, current.line)? {
                Some(header) => header,
                None => return Ok(None),
            },
        };

        let end = self.locate_end(buffer, header.line, header.depth)?;
        Ok(end.map(|end| Block {
            header: header.line,
            depth: header.depth,
            end,
        }))
    }
}
