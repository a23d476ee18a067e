//! Line intervals backing marker storage.
//!
//! Marker state (FOLDED headers, HIDDEN bodies) is a per-line presence flag. It is stored as a
//! sorted list of disjoint, half-open line runs so that run boundaries (the "edge of a hidden
//! body") can be found with a binary search instead of a line-by-line walk.

use std::ops::Range;

/// Half-open line range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineRange {
    /// First line in the range.
    pub start: usize,
    /// One past the last line in the range.
    pub end: usize,
}

impl LineRange {
    /// Create a line range `[start, end)`.
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Range covering a single line.
    pub const fn single(line: usize) -> Self {
        Self::new(line, line + 1)
    }

    /// Number of lines covered.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the range covers no lines.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Check if range contains a specific line
    pub fn contains(&self, line: usize) -> bool {
        self.start <= line && line < self.end
    }

    /// Check if two ranges share at least one line
    pub fn overlaps(&self, other: &LineRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Clamp the range to a document with `line_count` lines.
    pub fn clamp_to(&self, line_count: usize) -> Self {
        Self::new(self.start.min(line_count), self.end.min(line_count))
    }

    /// Iterate the line numbers in this range.
    pub fn lines(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for LineRange {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// Set of marked lines, kept as sorted, disjoint, non-adjacent runs.
///
/// Applying a range merges it with any run it touches, removing a range splits runs. Query
/// complexity is O(log n) for membership and run boundaries, O(n) for edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineIntervals {
    runs: Vec<LineRange>,
}

impl LineIntervals {
    /// Create an empty set.
    pub fn new() -> Self {
        Self { runs: Vec::new() }
    }

    /// Index of the run containing `line`, or the insertion index if none does.
    fn run_index(&self, line: usize) -> Result<usize, usize> {
        let idx = self.runs.partition_point(|r| r.end <= line);
        match self.runs.get(idx) {
            Some(run) if run.start <= line => Ok(idx),
            _ => Err(idx),
        }
    }

    /// Mark every line in `range`.
    pub fn insert(&mut self, range: LineRange) {
        if range.is_empty() {
            return;
        }

        // Runs that overlap or touch `range` collapse into one.
        let lo = self.runs.partition_point(|r| r.end < range.start);
        let hi = self.runs.partition_point(|r| r.start <= range.end);

        let mut merged = range;
        if lo < hi {
            merged.start = merged.start.min(self.runs[lo].start);
            merged.end = merged.end.max(self.runs[hi - 1].end);
        }

        self.runs.splice(lo..hi, [merged]);
    }

    /// Unmark every line in `range`. Returns `true` if any marked line was cleared.
    pub fn remove(&mut self, range: LineRange) -> bool {
        if range.is_empty() {
            return false;
        }

        let lo = self.runs.partition_point(|r| r.end <= range.start);
        let hi = self.runs.partition_point(|r| r.start < range.end);
        if lo >= hi {
            return false;
        }

        let first = self.runs[lo];
        let last = self.runs[hi - 1];
        let mut remainder = Vec::with_capacity(2);
        if first.start < range.start {
            remainder.push(LineRange::new(first.start, range.start));
        }
        if last.end > range.end {
            remainder.push(LineRange::new(range.end, last.end));
        }

        self.runs.splice(lo..hi, remainder);
        true
    }

    /// Check if `line` is marked.
    pub fn contains(&self, line: usize) -> bool {
        self.run_index(line).is_ok()
    }

    /// First unmarked line at or after `line`.
    ///
    /// Returns `line` itself when it is not marked.
    pub fn run_end(&self, line: usize) -> usize {
        match self.run_index(line) {
            Ok(idx) => self.runs[idx].end,
            Err(_) => line,
        }
    }

    /// First line of the run containing `line`, or `line` itself when it is not marked.
    pub fn run_start(&self, line: usize) -> usize {
        match self.run_index(line) {
            Ok(idx) => self.runs[idx].start,
            Err(_) => line,
        }
    }

    /// Runs overlapping `range`.
    pub fn query_range(&self, range: LineRange) -> &[LineRange] {
        if range.is_empty() {
            return &[];
        }
        let lo = self.runs.partition_point(|r| r.end <= range.start);
        let hi = self.runs.partition_point(|r| r.start < range.end);
        if lo >= hi { &[] } else { &self.runs[lo..hi] }
    }

    /// All runs, sorted by start line.
    pub fn runs(&self) -> &[LineRange] {
        &self.runs
    }

    /// Total number of marked lines.
    pub fn line_count(&self) -> usize {
        self.runs.iter().map(LineRange::len).sum()
    }

    /// Clear all runs
    pub fn clear(&mut self) {
        self.runs.clear();
    }

    /// Check if no line is marked
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Update runs when `count` lines are inserted before line `at`.
    ///
    /// Runs starting at or after `at` move down; a run spanning `at` grows to include the new
    /// lines.
    pub fn update_for_insertion(&mut self, at: usize, count: usize) {
        if count == 0 {
            return;
        }
        for run in &mut self.runs {
            if run.start >= at {
                run.start += count;
                run.end += count;
            } else if run.end > at {
                run.end += count;
            }
        }
    }

    /// Update runs when the lines in `[start, end)` are deleted.
    pub fn update_for_deletion(&mut self, start: usize, end: usize) {
        if end <= start {
            return;
        }
        let delta = end - start;
        let shift = |line: usize| {
            if line <= start {
                line
            } else if line >= end {
                line - delta
            } else {
                start
            }
        };

        let mut shifted: Vec<LineRange> = Vec::with_capacity(self.runs.len());
        for run in &self.runs {
            let run = LineRange::new(shift(run.start), shift(run.end));
            if run.is_empty() {
                continue;
            }
            // Deleting the gap between two runs makes them touch.
            match shifted.last_mut() {
                Some(prev) if prev.end >= run.start => prev.end = prev.end.max(run.end),
                _ => shifted.push(run),
            }
        }
        self.runs = shifted;
    }
}
