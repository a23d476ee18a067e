//! Deepest-block scan.
//!
//! One forward pass over the visible, non-blank lines of a range enumerates every indent
//! block using a stack of open headers. Folding the deepest blocks hides their bodies, so the
//! next pass over the same range sees a flatter structure; repeating the pass folds a
//! document bottom-up.

use crate::document::{Direction, FoldBuffer, Marker};
use crate::error::FoldError;
use crate::indent::{IndentIndex, LineDepth};
use crate::intervals::LineRange;
use crate::locator::{Block, BlockLocator};
use log::trace;

/// Enumerates indent blocks in a line range and selects the deepest ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeepestBlockScanner {
    indent: IndentIndex,
}

impl DeepestBlockScanner {
    /// Create a scanner measuring indentation with `indent`.
    pub fn new(indent: IndentIndex) -> Self {
        Self { indent }
    }

    /// Every block opening inside `range`, sorted by header line.
    ///
    /// Hidden lines are skipped, so a folded block shows up only as its header line. A
    /// block's end is the line after its last visible line, extended across the hidden body
    /// of that line when it is itself a folded header. A block still open where `range` stops
    /// keeps its full extent below the range.
    pub fn scan<B: FoldBuffer + ?Sized>(
        &self,
        buffer: &B,
        range: LineRange,
    ) -> Result<Vec<Block>, FoldError> {
        let range = range.clamp_to(buffer.line_count());
        let mut open: Vec<LineDepth> = Vec::new();
        let mut previous: Option<LineDepth> = None;
        let mut blocks = Vec::new();

        let mut line = range.start;
        while line < range.end {
            if buffer.has_marker(Marker::Hidden, line) {
                line = buffer
                    .marker_boundary(Marker::Hidden, line, Direction::Forward)
                    .max(line + 1);
                continue;
            }
            let Some(depth) = self.indent.depth_at(buffer, line)? else {
                line += 1;
                continue;
            };

            if let Some(prev) = previous {
                if depth > prev.depth {
                    open.push(prev);
                } else if depth < prev.depth {
                    let end = Self::end_after(buffer, prev.line);
                    while let Some(top) = open.last().copied() {
                        if top.depth < depth {
                            break;
                        }
                        open.pop();
                        Self::record(&mut blocks, top, end);
                    }
                }
            }

            previous = Some(LineDepth { line, depth });
            line += 1;
        }

        if let Some(last) = previous {
            let end = Self::end_after(buffer, last.line);
            let locator = BlockLocator::new(self.indent);
            while let Some(top) = open.pop() {
                // The range may stop inside this block; the rest of it lies past `end`.
                let end = if end < buffer.line_count() {
                    locator
                        .locate_end(buffer, top.line, top.depth)?
                        .map_or(end, |full| full.max(end))
                } else {
                    end
                };
                Self::record(&mut blocks, top, end);
            }
        }

        blocks.sort_by_key(|block| block.header);
        Ok(blocks)
    }

    /// All blocks in `range` whose header depth equals the greatest depth found.
    ///
    /// Returns `None` when the range contains no block.
    pub fn deepest<B: FoldBuffer + ?Sized>(
        &self,
        buffer: &B,
        range: LineRange,
    ) -> Result<Option<Vec<Block>>, FoldError> {
        let blocks = self.scan(buffer, range)?;
        let Some(max_depth) = blocks.iter().map(|block| block.depth).max() else {
            return Ok(None);
        };

        let deepest: Vec<Block> = blocks
            .into_iter()
            .filter(|block| block.depth == max_depth)
            .collect();
        trace!(
            "deepest blocks at depth {max_depth}: {:?}",
            deepest.iter().map(Block::range).collect::<Vec<_>>()
        );
        Ok(Some(deepest))
    }

    fn record(blocks: &mut Vec<Block>, header: LineDepth, end: usize) {
        if end - header.line > 1 {
            blocks.push(Block {
                header: header.line,
                depth: header.depth,
                end,
            });
        }
    }

    /// Line after `line`, or after the hidden run that immediately follows it.
    fn end_after<B: FoldBuffer + ?Sized>(buffer: &B, line: usize) -> usize {
        let next = line + 1;
        if buffer.has_marker(Marker::Hidden, next) {
            buffer.marker_boundary(Marker::Hidden, next, Direction::Forward)
        } else {
            next
        }
    }
}
