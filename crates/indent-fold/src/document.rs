//! Buffer interface consumed by the engine, plus an in-memory document.
//!
//! The engine never owns text. Every command borrows a [`FoldBuffer`] for the duration of the
//! call, reads lines through it, and records fold state as two per-line [`Marker`]s stored by
//! the buffer. Hosts with their own text model implement the trait; [`TextDocument`] is a
//! rope-backed implementation used by tests and simple hosts.

use crate::intervals::{LineIntervals, LineRange};
use ropey::Rope;
use std::borrow::Cow;

/// Per-line fold state flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Set on the one visible header line of a collapsed block.
    Folded,
    /// Set on every line of a collapsed block's body.
    Hidden,
}

impl Marker {
    /// Stable marker name, as hosts key their marker storage.
    pub fn name(self) -> &'static str {
        match self {
            Marker::Folded => "folded",
            Marker::Hidden => "hidden",
        }
    }
}

/// Scan direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards the end of the document.
    Forward,
    /// Towards the start of the document.
    Backward,
}

/// Line-oriented document with marker storage, as seen by the folding engine.
pub trait FoldBuffer {
    /// Number of lines in the document.
    fn line_count(&self) -> usize;

    /// Text of `line`, without its line terminator. `None` past the end of the document.
    fn line_text(&self, line: usize) -> Option<Cow<'_, str>>;

    /// Line the cursor is on.
    fn cursor_line(&self) -> usize;

    /// Move the cursor to the start of `line`.
    fn set_cursor_line(&mut self, line: usize);

    /// Current selection as a line range, if any.
    fn selection(&self) -> Option<LineRange>;

    /// Check whether `line` carries `marker`.
    fn has_marker(&self, marker: Marker, line: usize) -> bool;

    /// Set `marker` on every line in `range`.
    fn apply_marker(&mut self, marker: Marker, range: LineRange);

    /// Clear `marker` from every line in `range`.
    fn remove_marker(&mut self, marker: Marker, range: LineRange);

    /// Edge of the contiguous run of `marker` at `from`.
    ///
    /// - [`Direction::Forward`]: the first line at or after `from` that does not carry
    ///   `marker` (so `from` itself when it is unmarked).
    /// - [`Direction::Backward`]: the first line of the run containing `from` (so `from`
    ///   itself when it is unmarked).
    fn marker_boundary(&self, marker: Marker, from: usize, direction: Direction) -> usize;
}

/// Marker storage: one [`LineIntervals`] per marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerStore {
    folded: LineIntervals,
    hidden: LineIntervals,
}

impl MarkerStore {
    /// Create empty marker storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intervals for one marker.
    pub fn intervals(&self, marker: Marker) -> &LineIntervals {
        match marker {
            Marker::Folded => &self.folded,
            Marker::Hidden => &self.hidden,
        }
    }

    fn intervals_mut(&mut self, marker: Marker) -> &mut LineIntervals {
        match marker {
            Marker::Folded => &mut self.folded,
            Marker::Hidden => &mut self.hidden,
        }
    }

    /// Check whether `line` carries `marker`.
    pub fn contains(&self, marker: Marker, line: usize) -> bool {
        self.intervals(marker).contains(line)
    }

    /// Set `marker` over `range`.
    pub fn apply(&mut self, marker: Marker, range: LineRange) {
        self.intervals_mut(marker).insert(range);
    }

    /// Clear `marker` over `range`.
    pub fn remove(&mut self, marker: Marker, range: LineRange) -> bool {
        self.intervals_mut(marker).remove(range)
    }

    /// See [`FoldBuffer::marker_boundary`].
    pub fn boundary(&self, marker: Marker, from: usize, direction: Direction) -> usize {
        let intervals = self.intervals(marker);
        match direction {
            Direction::Forward => intervals.run_end(from),
            Direction::Backward => intervals.run_start(from),
        }
    }

    /// Number of lines carrying `marker`.
    pub fn marked_line_count(&self, marker: Marker) -> usize {
        self.intervals(marker).line_count()
    }

    /// Check if no line carries any marker.
    pub fn is_empty(&self) -> bool {
        self.folded.is_empty() && self.hidden.is_empty()
    }

    /// Clear every marker.
    pub fn clear(&mut self) {
        self.folded.clear();
        self.hidden.clear();
    }

    fn update_for_insertion(&mut self, at: usize, count: usize) {
        self.folded.update_for_insertion(at, count);
        self.hidden.update_for_insertion(at, count);
    }

    fn update_for_deletion(&mut self, start: usize, end: usize) {
        self.folded.update_for_deletion(start, end);
        self.hidden.update_for_deletion(start, end);
    }
}

/// In-memory document: rope text, marker storage, cursor line, and an optional selection.
///
/// Lines end at `"\n"`, `"\r\n"` or a lone `'\r'`, and the terminator is not part of the line
/// text. Other Unicode breaks (form feed, NEL, U+2028, U+2029) stay inside a line. A document
/// always has at least one (possibly empty) line.
#[derive(Debug, Clone)]
pub struct TextDocument {
    rope: Rope,
    markers: MarkerStore,
    cursor_line: usize,
    selection: Option<LineRange>,
}

impl TextDocument {
    /// Build a document from text.
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            markers: MarkerStore::new(),
            cursor_line: 0,
            selection: None,
        }
    }

    /// Build a document from individual lines.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let text = lines
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join("\n");
        Self::new(&text)
    }

    /// Full document text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Marker storage.
    pub fn markers(&self) -> &MarkerStore {
        &self.markers
    }

    /// Set or clear the selection.
    pub fn set_selection(&mut self, selection: Option<LineRange>) {
        self.selection = selection;
    }

    /// Check whether `line` is visible (not carrying [`Marker::Hidden`]).
    pub fn is_line_visible(&self, line: usize) -> bool {
        line < self.line_count() && !self.markers.contains(Marker::Hidden, line)
    }

    /// Visible line numbers, in order.
    pub fn visible_lines(&self) -> Vec<usize> {
        let mut visible = Vec::new();
        let mut line = 0;
        let count = self.line_count();
        while line < count {
            if self.markers.contains(Marker::Hidden, line) {
                line = self.markers.boundary(Marker::Hidden, line, Direction::Forward);
                continue;
            }
            visible.push(line);
            line += 1;
        }
        visible
    }

    /// Text of the visible lines joined with `'\n'`.
    pub fn visible_text(&self) -> String {
        self.visible_lines()
            .into_iter()
            .filter_map(|line| self.line_text(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn line_start_char(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            self.rope.len_chars()
        } else {
            self.rope.line_to_char(line)
        }
    }

    /// Insert `lines` before line `at` (or append when `at` is past the end).
    ///
    /// Markers below the insertion point move down; a hidden body spanning the insertion point
    /// grows to include the new lines.
    pub fn insert_lines<S: AsRef<str>>(&mut self, at: usize, lines: &[S]) {
        if lines.is_empty() {
            return;
        }
        let line_count = self.line_count();
        let mut text = lines
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join("\n");

        let at = at.min(line_count);
        if at == line_count {
            text.insert(0, '\n');
            self.rope.insert(self.rope.len_chars(), &text);
        } else {
            text.push('\n');
            let offset = self.line_start_char(at);
            self.rope.insert(offset, &text);
        }

        self.markers.update_for_insertion(at, lines.len());
        if self.cursor_line >= at {
            self.cursor_line += lines.len();
        }
    }

    /// Delete the lines in `range`. The document keeps at least one line.
    pub fn remove_lines(&mut self, range: LineRange) {
        let range = range.clamp_to(self.line_count());
        if range.is_empty() {
            return;
        }

        let line_count = self.line_count();
        let (start_char, end_char) = if range.end >= line_count && range.start > 0 {
            // Deleting through the last line: take the terminator that precedes the range.
            let start = self.line_start_char(range.start);
            let terminator = match self.rope.get_slice(start.saturating_sub(2)..start) {
                Some(slice) if slice == "\r\n" => 2,
                _ => 1,
            };
            (start - terminator, self.rope.len_chars())
        } else {
            (
                self.line_start_char(range.start),
                self.line_start_char(range.end),
            )
        };
        self.rope.remove(start_char..end_char);

        self.markers.update_for_deletion(range.start, range.end);
        let remaining = self.line_count();
        if self.cursor_line >= range.end {
            self.cursor_line -= range.len();
        } else if self.cursor_line >= range.start {
            self.cursor_line = range.start.min(remaining.saturating_sub(1));
        }
    }

    /// Replace the text of `line`. Returns `false` if the line does not exist.
    pub fn set_line_text(&mut self, line: usize, text: &str) -> bool {
        let Some(old) = self.line_text(line) else {
            return false;
        };
        let start = self.line_start_char(line);
        let end = start + old.chars().count();
        self.rope.remove(start..end);
        self.rope.insert(start, text);
        true
    }
}

impl Default for TextDocument {
    fn default() -> Self {
        Self::new("")
    }
}

fn strip_line_ending(text: Cow<'_, str>) -> Cow<'_, str> {
    let is_eol = |c: char| c == '\n' || c == '\r';
    match text {
        Cow::Borrowed(s) => Cow::Borrowed(s.trim_end_matches(is_eol)),
        Cow::Owned(mut s) => {
            let len = s.trim_end_matches(is_eol).len();
            s.truncate(len);
            Cow::Owned(s)
        }
    }
}

impl FoldBuffer for TextDocument {
    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line_text(&self, line: usize) -> Option<Cow<'_, str>> {
        if line >= self.rope.len_lines() {
            return None;
        }
        Some(strip_line_ending(Cow::from(self.rope.line(line))))
    }

    fn cursor_line(&self) -> usize {
        self.cursor_line
    }

    fn set_cursor_line(&mut self, line: usize) {
        self.cursor_line = line.min(self.line_count().saturating_sub(1));
    }

    fn selection(&self) -> Option<LineRange> {
        self.selection
    }

    fn has_marker(&self, marker: Marker, line: usize) -> bool {
        self.markers.contains(marker, line)
    }

    fn apply_marker(&mut self, marker: Marker, range: LineRange) {
        self.markers.apply(marker, range.clamp_to(self.line_count()));
    }

    fn remove_marker(&mut self, marker: Marker, range: LineRange) {
        self.markers.remove(marker, range);
    }

    fn marker_boundary(&self, marker: Marker, from: usize, direction: Direction) -> usize {
        self.markers.boundary(marker, from, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_without_terminators() {
        let doc = TextDocument::new("a\r\n  b\nc");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line_text(0).as_deref(), Some("a"));
        assert_eq!(doc.line_text(1).as_deref(), Some("  b"));
        assert_eq!(doc.line_text(2).as_deref(), Some("c"));
        assert_eq!(doc.line_text(3), None);
    }

    #[test]
    fn test_only_newline_and_carriage_return_end_lines() {
        let mut doc = TextDocument::new("a\x0cb\rc\u{2028}d\n\u{85}e");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line_text(0).as_deref(), Some("a\x0cb"));
        assert_eq!(doc.line_text(1).as_deref(), Some("c\u{2028}d"));
        assert_eq!(doc.line_text(2).as_deref(), Some("\u{85}e"));

        assert!(doc.set_line_text(0, "x\u{2029}y"));
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line_text(0).as_deref(), Some("x\u{2029}y"));
    }

    #[test]
    fn test_remove_trailing_lines_after_crlf() {
        let mut doc = TextDocument::new("a\r\nb\r\nc");
        doc.remove_lines(LineRange::new(1, 3));
        assert_eq!(doc.text(), "a");
        assert_eq!(doc.line_count(), 1);
    }

    #[test]
    fn test_trailing_newline_yields_empty_last_line() {
        let doc = TextDocument::new("a\nb\n");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line_text(2).as_deref(), Some(""));
    }

    #[test]
    fn test_marker_boundaries() {
        let mut doc = TextDocument::from_lines(&["0", "1", "2", "3", "4", "5"]);
        doc.apply_marker(Marker::Hidden, LineRange::new(2, 5));

        assert_eq!(doc.marker_boundary(Marker::Hidden, 2, Direction::Forward), 5);
        assert_eq!(doc.marker_boundary(Marker::Hidden, 4, Direction::Backward), 2);
        assert_eq!(doc.marker_boundary(Marker::Hidden, 1, Direction::Forward), 1);
        assert_eq!(doc.visible_lines(), vec![0, 1, 5]);
        assert_eq!(doc.visible_text(), "0\n1\n5");
    }

    #[test]
    fn test_apply_marker_clamps_to_document() {
        let mut doc = TextDocument::from_lines(&["a", "b"]);
        doc.apply_marker(Marker::Hidden, LineRange::new(1, 10));
        assert_eq!(doc.markers().marked_line_count(Marker::Hidden), 1);
    }

    #[test]
    fn test_insert_lines_shifts_markers() {
        let mut doc = TextDocument::from_lines(&["a", "b", "c"]);
        doc.apply_marker(Marker::Folded, LineRange::single(1));
        doc.apply_marker(Marker::Hidden, LineRange::new(2, 3));

        doc.insert_lines(0, &["x", "y"]);

        assert_eq!(doc.text(), "x\ny\na\nb\nc");
        assert!(doc.has_marker(Marker::Folded, 3));
        assert!(doc.has_marker(Marker::Hidden, 4));
        assert!(!doc.has_marker(Marker::Folded, 1));
    }

    #[test]
    fn test_insert_lines_at_end() {
        let mut doc = TextDocument::from_lines(&["a"]);
        doc.insert_lines(5, &["b"]);
        assert_eq!(doc.text(), "a\nb");
    }

    #[test]
    fn test_remove_lines_shifts_markers() {
        let mut doc = TextDocument::from_lines(&["a", "b", "c", "d"]);
        doc.apply_marker(Marker::Hidden, LineRange::new(3, 4));
        doc.set_cursor_line(3);

        doc.remove_lines(LineRange::new(0, 2));

        assert_eq!(doc.text(), "c\nd");
        assert!(doc.has_marker(Marker::Hidden, 1));
        assert_eq!(doc.cursor_line(), 1);
    }

    #[test]
    fn test_remove_trailing_lines() {
        let mut doc = TextDocument::from_lines(&["a", "b", "c"]);
        doc.remove_lines(LineRange::new(1, 3));
        assert_eq!(doc.text(), "a");
        assert_eq!(doc.line_count(), 1);
    }

    #[test]
    fn test_set_line_text() {
        let mut doc = TextDocument::from_lines(&["a", "    b", "c"]);
        assert!(doc.set_line_text(1, "b"));
        assert_eq!(doc.text(), "a\nb\nc");
        assert!(!doc.set_line_text(9, "z"));
    }
}
