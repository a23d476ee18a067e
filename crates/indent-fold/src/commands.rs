//! Command Interface Layer
//!
//! The five folding operations, dispatched through a table keyed by [`FoldCommandKind`].
//!
//! # Overview
//!
//! A [`FoldEngine`] is created per open document and holds only the [`FoldConfig`]. Each
//! command borrows the document as a [`FoldBuffer`], computes ranges from indentation, and
//! records the result as markers on the buffer:
//!
//! - **toggle fold**: unfold a folded header, or fold the block at/around the cursor
//! - **fold below**: fold the block at the cursor and everything inside it, bottom-up
//! - **fold all**: fold the whole document bottom-up
//! - **fold deepest**: fold every block at the greatest nesting depth, once
//! - **unfold all**: clear all fold state
//!
//! Every command returns [`CommandResult::NoTargetFound`] rather than an error when there is
//! nothing to do.
//!
//! # Example
//!
//! ```rust
//! use indent_fold::{FoldCommand, FoldCommandKind, FoldEngine, FoldBuffer, TextDocument};
//!
//! let mut doc = TextDocument::from_lines(&[
//!     "def f():",
//!     "    if x:",
//!     "        y()",
//!     "        z()",
//!     "    return",
//! ]);
//! let engine = FoldEngine::default();
//!
//! doc.set_cursor_line(1);
//! let result = engine
//!     .execute(&mut doc, FoldCommand::new(FoldCommandKind::ToggleFold))
//!     .unwrap();
//!
//! assert!(result.changed());
//! assert_eq!(doc.visible_lines(), vec![0, 1, 4]);
//! ```

use crate::config::FoldConfig;
use crate::document::{Direction, FoldBuffer, Marker};
use crate::error::FoldError;
use crate::indent::IndentIndex;
use crate::intervals::LineRange;
use crate::locator::BlockLocator;
use crate::registry::FoldRegistry;
use crate::scanner::DeepestBlockScanner;
use log::debug;
use std::fmt;
use std::str::FromStr;

/// The five folding operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoldCommandKind {
    /// Unfold the folded header at the cursor, or fold the block containing it.
    ToggleFold,
    /// Fold the block at the cursor and every block nested in it.
    FoldBelow,
    /// Fold every block in the document.
    FoldAll,
    /// Fold the blocks at the greatest nesting depth.
    FoldDeepest,
    /// Clear all fold state.
    UnfoldAll,
}

impl FoldCommandKind {
    /// Every command kind, in dispatch-table order.
    pub const ALL: [FoldCommandKind; 5] = [
        FoldCommandKind::ToggleFold,
        FoldCommandKind::FoldBelow,
        FoldCommandKind::FoldAll,
        FoldCommandKind::FoldDeepest,
        FoldCommandKind::UnfoldAll,
    ];

    /// Stable name hosts bind actions to.
    pub fn name(self) -> &'static str {
        match self {
            FoldCommandKind::ToggleFold => "fold",
            FoldCommandKind::FoldBelow => "fold_below",
            FoldCommandKind::FoldAll => "fold_all",
            FoldCommandKind::FoldDeepest => "fold_deepest",
            FoldCommandKind::UnfoldAll => "unfold_all",
        }
    }
}

impl fmt::Display for FoldCommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FoldCommandKind {
    type Err = FoldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| FoldError::UnknownCommand(s.to_string()))
    }
}

/// A command plus an optional explicit line range.
///
/// Without a range, commands use the buffer's cursor (toggle fold, fold below), the
/// selection (fold deepest), or the whole document. With a range, toggle fold uses its first
/// line and the other commands are limited to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldCommand {
    /// Which operation to run.
    pub kind: FoldCommandKind,
    /// Explicit half-open line range.
    pub range: Option<LineRange>,
}

impl FoldCommand {
    /// Command acting on the cursor, selection, or whole document.
    pub fn new(kind: FoldCommandKind) -> Self {
        Self { kind, range: None }
    }

    /// Command acting on an explicit line range.
    pub fn with_range(kind: FoldCommandKind, range: LineRange) -> Self {
        Self {
            kind,
            range: Some(range),
        }
    }
}

impl From<FoldCommandKind> for FoldCommand {
    fn from(kind: FoldCommandKind) -> Self {
        Self::new(kind)
    }
}

/// Command execution result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    /// Fold state changed.
    Changed,
    /// Nothing to fold or unfold; the buffer is unchanged.
    NoTargetFound,
}

impl CommandResult {
    fn from_changed(changed: bool) -> Self {
        if changed {
            CommandResult::Changed
        } else {
            CommandResult::NoTargetFound
        }
    }

    /// Whether the command changed anything.
    pub fn changed(self) -> bool {
        self == CommandResult::Changed
    }
}

type CommandHandler =
    fn(&FoldEngine, &mut dyn FoldBuffer, Option<LineRange>) -> Result<CommandResult, FoldError>;

/// Handlers indexed by `FoldCommandKind as usize`.
const DISPATCH_TABLE: [(FoldCommandKind, CommandHandler); 5] = [
    (FoldCommandKind::ToggleFold, dispatch_toggle_fold),
    (FoldCommandKind::FoldBelow, dispatch_fold_below),
    (FoldCommandKind::FoldAll, dispatch_fold_all),
    (FoldCommandKind::FoldDeepest, dispatch_fold_deepest),
    (FoldCommandKind::UnfoldAll, dispatch_unfold_all),
];

fn dispatch_toggle_fold(
    engine: &FoldEngine,
    buffer: &mut dyn FoldBuffer,
    range: Option<LineRange>,
) -> Result<CommandResult, FoldError> {
    engine.toggle_fold(buffer, range)
}

fn dispatch_fold_below(
    engine: &FoldEngine,
    buffer: &mut dyn FoldBuffer,
    range: Option<LineRange>,
) -> Result<CommandResult, FoldError> {
    engine.fold_below(buffer, range)
}

fn dispatch_fold_all(
    engine: &FoldEngine,
    buffer: &mut dyn FoldBuffer,
    range: Option<LineRange>,
) -> Result<CommandResult, FoldError> {
    engine.fold_all(buffer, range)
}

fn dispatch_fold_deepest(
    engine: &FoldEngine,
    buffer: &mut dyn FoldBuffer,
    range: Option<LineRange>,
) -> Result<CommandResult, FoldError> {
    engine.fold_deepest(buffer, range)
}

fn dispatch_unfold_all(
    engine: &FoldEngine,
    buffer: &mut dyn FoldBuffer,
    range: Option<LineRange>,
) -> Result<CommandResult, FoldError> {
    engine.unfold_all(buffer, range)
}

/// Folding engine for one open document.
///
/// Holds only configuration; the document is passed to every call, so one engine can be
/// shared by reference across commands.
///
/// # Example
///
/// ```rust
/// use indent_fold::{FoldCommandKind, FoldConfig, FoldEngine, TextDocument};
///
/// let engine = FoldEngine::new(FoldConfig::new(2).unwrap()).unwrap();
/// let mut doc = TextDocument::from_lines(&["a:", "  b:", "    c", "  d", "e"]);
///
/// assert!(engine.execute(&mut doc, FoldCommandKind::FoldAll.into()).unwrap().changed());
/// assert_eq!(doc.visible_text(), "a:\ne");
///
/// engine.execute(&mut doc, FoldCommandKind::UnfoldAll.into()).unwrap();
/// assert_eq!(doc.visible_lines().len(), 5);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FoldEngine {
    config: FoldConfig,
    locator: BlockLocator,
    registry: FoldRegistry,
    scanner: DeepestBlockScanner,
}

impl FoldEngine {
    /// Create an engine from a validated configuration.
    pub fn new(config: FoldConfig) -> Result<Self, FoldError> {
        config.validate()?;
        let indent = IndentIndex::new(config.tab_width);
        let locator = BlockLocator::new(indent);
        Ok(Self {
            config,
            locator,
            registry: FoldRegistry::new(locator),
            scanner: DeepestBlockScanner::new(indent),
        })
    }

    /// Create an engine with the given tab width.
    pub fn with_tab_width(tab_width: usize) -> Result<Self, FoldError> {
        Self::new(FoldConfig::new(tab_width)?)
    }

    /// Engine configuration.
    pub fn config(&self) -> &FoldConfig {
        &self.config
    }

    /// Block locator used by the commands.
    pub fn locator(&self) -> &BlockLocator {
        &self.locator
    }

    /// Fold registry used by the commands.
    pub fn registry(&self) -> &FoldRegistry {
        &self.registry
    }

    /// Deepest-block scanner used by the commands.
    pub fn scanner(&self) -> &DeepestBlockScanner {
        &self.scanner
    }

    /// Execute command
    pub fn execute(
        &self,
        buffer: &mut dyn FoldBuffer,
        command: FoldCommand,
    ) -> Result<CommandResult, FoldError> {
        let (kind, handler) = DISPATCH_TABLE[command.kind as usize];
        debug_assert_eq!(kind, command.kind);

        let result = handler(self, buffer, command.range)?;
        debug!("{} {:?}: {:?}", command.kind, command.range, result);
        Ok(result)
    }

    /// Execute commands in order, stopping at the first error.
    pub fn execute_batch(
        &self,
        buffer: &mut dyn FoldBuffer,
        commands: impl IntoIterator<Item = FoldCommand>,
    ) -> Result<Vec<CommandResult>, FoldError> {
        commands
            .into_iter()
            .map(|command| self.execute(buffer, command))
            .collect()
    }

    /// Unfold the folded header at the cursor (or `range.start`), or fold the block that
    /// contains it.
    ///
    /// When folding from inside a block's body the cursor moves up to the header.
    pub fn toggle_fold<B: FoldBuffer + ?Sized>(
        &self,
        buffer: &mut B,
        range: Option<LineRange>,
    ) -> Result<CommandResult, FoldError> {
        let line = match range {
            Some(range) => Self::validate_range(buffer, range)?.start,
            None => buffer.cursor_line(),
        };

        if self.registry.is_folded(buffer, line) {
            let changed = self.registry.unfold(buffer, line)?;
            return Ok(CommandResult::from_changed(changed));
        }

        let Some(block) = self.locator.locate_block(buffer, line)? else {
            debug!("nothing to fold at line {line}");
            return Ok(CommandResult::NoTargetFound);
        };

        let changed = self.registry.fold_block(buffer, &block);
        if changed && range.is_none() {
            Self::move_cursor_to_header(buffer, block.header);
        }
        Ok(CommandResult::from_changed(changed))
    }

    /// Fold the block at the cursor together with every block nested in it, deepest first.
    ///
    /// With an explicit range, folds everything inside the range instead.
    pub fn fold_below<B: FoldBuffer + ?Sized>(
        &self,
        buffer: &mut B,
        range: Option<LineRange>,
    ) -> Result<CommandResult, FoldError> {
        if let Some(range) = range {
            let scope = Self::validate_range(buffer, range)?;
            return self.fold_repeatedly(buffer, scope);
        }

        let line = buffer.cursor_line();
        let Some(block) = self.locator.locate_block(buffer, line)? else {
            debug!("no block below line {line}");
            return Ok(CommandResult::NoTargetFound);
        };

        let result = self.fold_repeatedly(buffer, block.range())?;
        if result.changed() {
            Self::move_cursor_to_header(buffer, block.header);
        }
        Ok(result)
    }

    /// Fold every block in the document (or `range`), deepest first.
    pub fn fold_all<B: FoldBuffer + ?Sized>(
        &self,
        buffer: &mut B,
        range: Option<LineRange>,
    ) -> Result<CommandResult, FoldError> {
        let scope = match range {
            Some(range) => Self::validate_range(buffer, range)?,
            None => Self::whole_document(buffer),
        };
        self.fold_repeatedly(buffer, scope)
    }

    /// Fold every block at the greatest depth found in `range`, the selection, or the whole
    /// document, in that order of preference.
    pub fn fold_deepest<B: FoldBuffer + ?Sized>(
        &self,
        buffer: &mut B,
        range: Option<LineRange>,
    ) -> Result<CommandResult, FoldError> {
        let scope = match range.or_else(|| buffer.selection()) {
            Some(range) => Self::validate_range(buffer, range)?,
            None => Self::whole_document(buffer),
        };
        let changed = self.fold_deepest_in(buffer, scope)?;
        Ok(CommandResult::from_changed(changed))
    }

    /// Clear both markers over the whole document (or `range`). Nested folds are not
    /// restored.
    ///
    /// A range is widened to whole folds: a hidden body it cuts into is cleared together with
    /// its header, so no hidden line is left without one.
    pub fn unfold_all<B: FoldBuffer + ?Sized>(
        &self,
        buffer: &mut B,
        range: Option<LineRange>,
    ) -> Result<CommandResult, FoldError> {
        let scope = match range {
            Some(range) => Self::widen_to_folds(buffer, Self::validate_range(buffer, range)?),
            None => Self::whole_document(buffer),
        };

        let marked = scope.lines().any(|line| {
            buffer.has_marker(Marker::Folded, line) || buffer.has_marker(Marker::Hidden, line)
        });
        if !marked {
            return Ok(CommandResult::NoTargetFound);
        }

        buffer.remove_marker(Marker::Folded, scope);
        buffer.remove_marker(Marker::Hidden, scope);
        Ok(CommandResult::Changed)
    }

    /// Fold the deepest blocks in `scope` until none remain.
    ///
    /// Each pass hides at least one visible line, so the loop terminates.
    fn fold_repeatedly<B: FoldBuffer + ?Sized>(
        &self,
        buffer: &mut B,
        scope: LineRange,
    ) -> Result<CommandResult, FoldError> {
        let mut changed = false;
        let mut passes = 0usize;
        while self.fold_deepest_in(buffer, scope)? {
            changed = true;
            passes += 1;
        }
        debug!("folded {}..{} in {passes} passes", scope.start, scope.end);
        Ok(CommandResult::from_changed(changed))
    }

    fn fold_deepest_in<B: FoldBuffer + ?Sized>(
        &self,
        buffer: &mut B,
        scope: LineRange,
    ) -> Result<bool, FoldError> {
        let Some(blocks) = self.scanner.deepest(buffer, scope)? else {
            return Ok(false);
        };

        let mut changed = false;
        for block in &blocks {
            changed |= self.registry.fold_block(buffer, block);
        }
        Ok(changed)
    }

    /// Extend `scope` over every hidden run crossing its edges, plus the header of a run it
    /// starts inside.
    fn widen_to_folds<B: FoldBuffer + ?Sized>(buffer: &B, scope: LineRange) -> LineRange {
        if scope.is_empty() {
            return scope;
        }

        let mut start = scope.start;
        if buffer.has_marker(Marker::Hidden, start) {
            let run_start = buffer.marker_boundary(Marker::Hidden, start, Direction::Backward);
            start = run_start.saturating_sub(1);
        }

        let mut end = scope.end;
        let last = end - 1;
        let owns_next = buffer.has_marker(Marker::Hidden, last)
            || buffer.has_marker(Marker::Folded, last);
        if owns_next && buffer.has_marker(Marker::Hidden, end) {
            end = buffer.marker_boundary(Marker::Hidden, end, Direction::Forward);
        }

        if (start, end) != (scope.start, scope.end) {
            debug!(
                "widened {}..{} to {start}..{end} to cover whole folds",
                scope.start, scope.end
            );
        }
        LineRange::new(start, end)
    }

    fn move_cursor_to_header<B: FoldBuffer + ?Sized>(buffer: &mut B, header: usize) {
        if header < buffer.cursor_line() {
            buffer.set_cursor_line(header);
        }
    }

    fn whole_document<B: FoldBuffer + ?Sized>(buffer: &B) -> LineRange {
        LineRange::new(0, buffer.line_count())
    }

    fn validate_range<B: FoldBuffer + ?Sized>(
        buffer: &B,
        range: LineRange,
    ) -> Result<LineRange, FoldError> {
        if range.start > range.end {
            return Err(FoldError::InvalidRange {
                start: range.start,
                end: range.end,
            });
        }
        let line_count = buffer.line_count();
        if range.start >= line_count && line_count > 0 {
            return Err(FoldError::LineOutOfRange {
                line: range.start,
                line_count,
            });
        }
        Ok(range.clamp_to(line_count))
    }
}
