//! Fold state transitions over buffer markers.
//!
//! A folded block is recorded as [`Marker::Folded`] on its header and [`Marker::Hidden`] on
//! its body. Hidden is a plain presence flag, so a fold nested inside a collapsed ancestor has
//! no hidden range of its own while the ancestor is collapsed. Unfolding the ancestor clears
//! the whole revealed extent and then rebuilds the hidden body of every header that still
//! carries `Folded` inside it (reconciliation).

use crate::document::{Direction, FoldBuffer, Marker};
use crate::error::FoldError;
use crate::indent::IndentIndex;
use crate::intervals::LineRange;
use crate::locator::{Block, BlockLocator};
use log::debug;

/// A folded block as recorded in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldRegion {
    /// Visible header line.
    pub header_line: usize,
    /// One past the last hidden line.
    pub end_line: usize,
}

impl FoldRegion {
    /// Create a region for `header_line` hiding `[header_line + 1, end_line)`.
    pub fn new(header_line: usize, end_line: usize) -> Self {
        Self {
            header_line,
            end_line,
        }
    }

    /// Hidden body.
    pub fn hidden(&self) -> LineRange {
        LineRange::new(self.header_line + 1, self.end_line)
    }

    /// Check if `other`'s hidden body lies entirely within this one.
    pub fn contains(&self, other: &FoldRegion) -> bool {
        let (outer, inner) = (self.hidden(), other.hidden());
        outer.start <= inner.start && inner.end <= outer.end
    }

    /// Check if the hidden bodies share a line.
    pub fn overlaps(&self, other: &FoldRegion) -> bool {
        self.hidden().overlaps(&other.hidden())
    }

    /// Check if this region and `other` are disjoint or nested, never partially overlapping.
    pub fn is_well_nested_with(&self, other: &FoldRegion) -> bool {
        !self.overlaps(other) || self.contains(other) || other.contains(self)
    }
}

/// Applies and removes folds on a buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FoldRegistry {
    locator: BlockLocator,
}

impl FoldRegistry {
    /// Create a registry that recomputes block ends with `locator`.
    pub fn new(locator: BlockLocator) -> Self {
        Self { locator }
    }

    fn indent(&self) -> &IndentIndex {
        self.locator.indent()
    }

    /// Check whether `line` is a folded header.
    pub fn is_folded<B: FoldBuffer + ?Sized>(&self, buffer: &B, line: usize) -> bool {
        buffer.has_marker(Marker::Folded, line)
    }

    /// Fold `header`, hiding `[header + 1, end)`.
    ///
    /// Returns whether any marker changed: refused unless the body has at least one line, and
    /// a no-op when `header` is already folded over a fully hidden body.
    pub fn fold<B: FoldBuffer + ?Sized>(&self, buffer: &mut B, header: usize, end: usize) -> bool {
        if end < header + 2 || end > buffer.line_count() {
            return false;
        }

        let body = LineRange::new(header + 1, end);
        let hidden_end = buffer.marker_boundary(Marker::Hidden, body.start, Direction::Forward);
        if hidden_end >= end && self.is_folded(buffer, header) {
            debug!("line {header} already folded");
            return false;
        }

        // A previous nested fold may have left hidden lines in the body.
        buffer.remove_marker(Marker::Hidden, body);
        buffer.apply_marker(Marker::Folded, LineRange::single(header));
        buffer.apply_marker(Marker::Hidden, body);

        debug!("folded line {header}, hiding {}..{}", body.start, body.end);
        true
    }

    /// Fold a located block.
    pub fn fold_block<B: FoldBuffer + ?Sized>(&self, buffer: &mut B, block: &Block) -> bool {
        self.fold(buffer, block.header, block.end)
    }

    /// Unfold the header at `header`. Returns `Ok(false)` if it is not folded.
    ///
    /// The revealed extent is the hidden run actually following the header, not the range
    /// recorded when it was folded. Folds nested inside it are restored. A header that is
    /// itself hidden only loses its marker.
    pub fn unfold<B: FoldBuffer + ?Sized>(
        &self,
        buffer: &mut B,
        header: usize,
    ) -> Result<bool, FoldError> {
        if !self.is_folded(buffer, header) {
            return Ok(false);
        }

        buffer.remove_marker(Marker::Folded, LineRange::single(header));

        // A latent fold owns no hidden run; the ancestor's body must stay hidden.
        if buffer.has_marker(Marker::Hidden, header) {
            debug!("unfolded latent fold at line {header}");
            return Ok(true);
        }

        let start = header + 1;
        let end = buffer.marker_boundary(Marker::Hidden, start, Direction::Forward);
        let revealed = LineRange::new(start, end);
        debug!("unfolded line {header}, revealing {start}..{end}");

        if !revealed.is_empty() {
            buffer.remove_marker(Marker::Hidden, revealed);
            self.reconcile(buffer, revealed)?;
        }
        Ok(true)
    }

    /// Re-hide the bodies of folded headers inside a freshly revealed range.
    fn reconcile<B: FoldBuffer + ?Sized>(
        &self,
        buffer: &mut B,
        revealed: LineRange,
    ) -> Result<(), FoldError> {
        let mut line = revealed.start;
        while line < revealed.end {
            if buffer.has_marker(Marker::Folded, line) {
                if let Some(end) = self.nested_end(buffer, line)? {
                    buffer.apply_marker(Marker::Hidden, LineRange::new(line + 1, end));
                    debug!("restored nested fold at line {line}, hiding {}..{end}", line + 1);
                    // Folds inside this body stay latent until it is unfolded.
                    line = end;
                    continue;
                }
                debug!("folded marker on line {line} no longer heads a block");
            }
            line += 1;
        }
        Ok(())
    }

    /// Block end for a folded header, recomputed from the current content.
    fn nested_end<B: FoldBuffer + ?Sized>(
        &self,
        buffer: &B,
        header: usize,
    ) -> Result<Option<usize>, FoldError> {
        match self.indent().depth_at(buffer, header)? {
            Some(depth) => self.locator.locate_end(buffer, header, depth),
            None => Ok(None),
        }
    }

    /// Header of the visible fold hiding `line`, if `line` is hidden.
    pub fn owner_of<B: FoldBuffer + ?Sized>(&self, buffer: &B, line: usize) -> Option<usize> {
        if !buffer.has_marker(Marker::Hidden, line) {
            return None;
        }
        let run_start = buffer.marker_boundary(Marker::Hidden, line, Direction::Backward);
        let header = run_start.checked_sub(1)?;
        self.is_folded(buffer, header).then_some(header)
    }

    /// Every folded header in the buffer with its extent, sorted by header line.
    ///
    /// A visible header reports the hidden run that follows it. A header hidden inside a
    /// collapsed ancestor has no run of its own and reports the extent it will get back when
    /// the ancestor is unfolded. Headers that no longer head a block are skipped.
    pub fn regions<B: FoldBuffer + ?Sized>(&self, buffer: &B) -> Result<Vec<FoldRegion>, FoldError> {
        let mut regions = Vec::new();
        for line in 0..buffer.line_count() {
            if !self.is_folded(buffer, line) {
                continue;
            }
            let end = if buffer.has_marker(Marker::Hidden, line) {
                self.nested_end(buffer, line)?
            } else {
                Some(buffer.marker_boundary(Marker::Hidden, line + 1, Direction::Forward))
            };
            match end {
                Some(end) if end > line + 1 => regions.push(FoldRegion::new(line, end)),
                _ => {}
            }
        }
        Ok(regions)
    }
}
