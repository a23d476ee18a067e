#![warn(missing_docs)]
//! Indent Fold - Indentation-Based Structural Folding Engine
//!
//! # Overview
//!
//! `indent-fold` decides which line ranges of a document form nested blocks, using leading
//! whitespace as the only signal, and folds them: a folded block collapses to its header line
//! and can later be restored, together with any blocks that were folded inside it.
//!
//! The engine is headless. It does not own text or render anything; a host exposes its
//! document through the [`FoldBuffer`] trait (line access, cursor, selection, and storage for
//! two per-line markers) and the engine reads and marks it. [`TextDocument`] is a ready-made
//! rope-backed buffer.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  FoldEngine (enum-keyed command dispatch)   │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  FoldRegistry        DeepestBlockScanner    │  ← Fold state / global scan
//! ├─────────────────────────────────────────────┤
//! │  BlockLocator                               │  ← Single-block boundaries
//! ├─────────────────────────────────────────────┤
//! │  IndentIndex                                │  ← Indent depth, blank skipping
//! ├─────────────────────────────────────────────┤
//! │  FoldBuffer (host) / TextDocument           │  ← Lines + marker storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use indent_fold::{FoldCommand, FoldCommandKind, FoldEngine, FoldBuffer, Marker, TextDocument};
//!
//! let mut doc = TextDocument::new("def f():\n    if x:\n        y()\n        z()\n    return");
//! let engine = FoldEngine::default();
//!
//! // Fold the deepest blocks: only `if x:` qualifies.
//! engine
//!     .execute(&mut doc, FoldCommand::new(FoldCommandKind::FoldDeepest))
//!     .unwrap();
//! assert!(doc.has_marker(Marker::Folded, 1));
//! assert_eq!(doc.visible_text(), "def f():\n    if x:\n    return");
//!
//! // Toggle on the folded header unfolds it again.
//! doc.set_cursor_line(1);
//! engine
//!     .execute(&mut doc, FoldCommand::new(FoldCommandKind::ToggleFold))
//!     .unwrap();
//! assert!(doc.markers().is_empty());
//! ```
//!
//! # Module Description
//!
//! - [`indent`] - indent depth and blank-line skipping
//! - [`locator`] - block start/end location around a line
//! - [`registry`] - fold/unfold transitions and nested-fold reconciliation
//! - [`scanner`] - deepest-block scan
//! - [`commands`] - the five commands and the engine
//! - [`document`] - buffer interface and in-memory document
//! - [`intervals`] - line interval sets backing marker storage
//! - [`config`] - engine configuration

pub mod commands;
pub mod config;
pub mod document;
mod error;
pub mod indent;
pub mod intervals;
pub mod locator;
pub mod registry;
pub mod scanner;

pub use commands::{CommandResult, FoldCommand, FoldCommandKind, FoldEngine};
pub use config::{DEFAULT_TAB_WIDTH, FoldConfig};
pub use document::{Direction, FoldBuffer, Marker, MarkerStore, TextDocument};
pub use error::FoldError;
pub use indent::{IndentIndex, LineDepth, is_blank};
pub use intervals::{LineIntervals, LineRange};
pub use locator::{Block, BlockLocator};
pub use registry::{FoldRegion, FoldRegistry};
pub use scanner::DeepestBlockScanner;
