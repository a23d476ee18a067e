use indent_fold::{
    CommandResult, FoldBuffer, FoldCommand, FoldCommandKind, FoldEngine, FoldRegion, LineRange,
    Marker, TextDocument,
};
use pretty_assertions::assert_eq;

fn class_body() -> TextDocument {
    TextDocument::from_lines(&[
        "class A:",         // 0  depth 0
        "    def f():",     // 1  depth 4
        "        if x:",    // 2  depth 8
        "            y",    // 3  depth 12
        "        z",        // 4  depth 8
        "    def g():",     // 5  depth 4
        "        w",        // 6  depth 8
        "b",                // 7  depth 0
    ])
}

fn toggle_at(engine: &FoldEngine, doc: &mut TextDocument, line: usize) -> bool {
    engine
        .execute(
            doc,
            FoldCommand::with_range(FoldCommandKind::ToggleFold, LineRange::single(line)),
        )
        .unwrap()
        .changed()
}

fn hidden_runs(doc: &TextDocument) -> Vec<(usize, usize)> {
    doc.markers()
        .intervals(Marker::Hidden)
        .runs()
        .iter()
        .map(|run| (run.start, run.end))
        .collect()
}

fn folded_headers(doc: &TextDocument) -> Vec<usize> {
    (0..doc.line_count())
        .filter(|&line| doc.has_marker(Marker::Folded, line))
        .collect()
}

#[test]
fn test_unfolding_outer_restores_inner_exactly() {
    let mut doc = class_body();
    let engine = FoldEngine::default();

    assert!(toggle_at(&engine, &mut doc, 1));
    let inner_hidden = hidden_runs(&doc);
    assert_eq!(inner_hidden, vec![(2, 5)]);

    assert!(toggle_at(&engine, &mut doc, 0));
    assert_eq!(hidden_runs(&doc), vec![(1, 7)]);
    assert_eq!(folded_headers(&doc), vec![0, 1]);

    assert!(toggle_at(&engine, &mut doc, 0));
    assert_eq!(folded_headers(&doc), vec![1]);
    assert_eq!(hidden_runs(&doc), inner_hidden);
}

#[test]
fn test_three_levels_unwind_one_at_a_time() {
    let mut doc = class_body();
    let engine = FoldEngine::default();

    toggle_at(&engine, &mut doc, 2);
    toggle_at(&engine, &mut doc, 1);
    toggle_at(&engine, &mut doc, 0);
    assert_eq!(doc.visible_lines(), vec![0, 7]);

    toggle_at(&engine, &mut doc, 0);
    assert_eq!(doc.visible_lines(), vec![0, 1, 5, 6, 7]);

    toggle_at(&engine, &mut doc, 1);
    assert_eq!(doc.visible_lines(), vec![0, 1, 2, 4, 5, 6, 7]);

    toggle_at(&engine, &mut doc, 2);
    assert!(doc.markers().is_empty());
}

#[test]
fn test_owner_of_reports_outermost_visible_fold() {
    let mut doc = class_body();
    let engine = FoldEngine::default();

    toggle_at(&engine, &mut doc, 1);
    assert_eq!(engine.registry().owner_of(&doc, 3), Some(1));

    toggle_at(&engine, &mut doc, 0);
    assert_eq!(engine.registry().owner_of(&doc, 3), Some(0));
    assert_eq!(engine.registry().owner_of(&doc, 7), None);
    assert_eq!(
        engine.registry().regions(&doc).unwrap(),
        vec![FoldRegion::new(0, 7), FoldRegion::new(1, 5)]
    );
}

#[test]
fn test_toggle_on_hidden_folded_header_keeps_ancestor_collapsed() {
    let mut doc = class_body();
    let engine = FoldEngine::default();

    toggle_at(&engine, &mut doc, 1);
    toggle_at(&engine, &mut doc, 0);

    assert!(toggle_at(&engine, &mut doc, 1));
    assert_eq!(doc.visible_lines(), vec![0, 7]);
    assert_eq!(folded_headers(&doc), vec![0]);

    toggle_at(&engine, &mut doc, 0);
    assert!(doc.markers().is_empty());
}

#[test]
fn test_reconciliation_follows_lines_inserted_while_folded() {
    let mut doc = class_body();
    let engine = FoldEngine::default();

    toggle_at(&engine, &mut doc, 2);
    toggle_at(&engine, &mut doc, 1);
    toggle_at(&engine, &mut doc, 0);

    // A new line at depth 12 lands inside every collapsed body.
    doc.insert_lines(3, &["            extra"]);
    assert_eq!(hidden_runs(&doc), vec![(1, 8)]);

    toggle_at(&engine, &mut doc, 0);
    assert_eq!(hidden_runs(&doc), vec![(2, 6)]);

    toggle_at(&engine, &mut doc, 1);
    assert_eq!(hidden_runs(&doc), vec![(3, 5)]);
    assert_eq!(doc.visible_text(), "class A:\n    def f():\n        if x:\n        z\n    def g():\n        w\nb");
}

#[test]
fn test_stale_folded_marker_is_tolerated_after_edit() {
    let mut doc = class_body();
    let engine = FoldEngine::default();

    toggle_at(&engine, &mut doc, 2);
    toggle_at(&engine, &mut doc, 0);

    // `if x:` no longer has a deeper line under it.
    assert!(doc.set_line_text(3, "        y"));

    assert!(toggle_at(&engine, &mut doc, 0));
    assert_eq!(doc.visible_lines(), (0..8).collect::<Vec<_>>());
    assert!(engine.registry().regions(&doc).unwrap().is_empty());

    // The leftover marker still toggles off cleanly.
    assert!(toggle_at(&engine, &mut doc, 2));
    assert!(doc.markers().is_empty());
}

#[test]
fn test_unfold_uses_hidden_run_shortened_by_deletion() {
    let mut doc = class_body();
    let engine = FoldEngine::default();

    toggle_at(&engine, &mut doc, 1);
    doc.remove_lines(LineRange::new(3, 4));
    assert_eq!(hidden_runs(&doc), vec![(2, 4)]);
    assert_eq!(doc.visible_lines(), vec![0, 1, 4, 5, 6]);

    assert!(toggle_at(&engine, &mut doc, 1));
    assert!(doc.markers().is_empty());
}

#[test]
fn test_unfold_all_does_not_reconcile() {
    let mut doc = class_body();
    let engine = FoldEngine::default();

    toggle_at(&engine, &mut doc, 2);
    toggle_at(&engine, &mut doc, 0);

    engine
        .execute(&mut doc, FoldCommand::new(FoldCommandKind::UnfoldAll))
        .unwrap();

    assert!(doc.markers().is_empty());
    assert_eq!(doc.visible_lines().len(), doc.line_count());
}

#[test]
fn test_unfold_all_in_range_leaves_other_folds() {
    let mut doc = class_body();
    let engine = FoldEngine::default();

    toggle_at(&engine, &mut doc, 2);
    toggle_at(&engine, &mut doc, 5);

    let result = engine
        .execute(
            &mut doc,
            FoldCommand::with_range(FoldCommandKind::UnfoldAll, LineRange::new(5, 8)),
        )
        .unwrap();

    assert!(result.changed());
    assert_eq!(folded_headers(&doc), vec![2]);
    assert_eq!(hidden_runs(&doc), vec![(3, 4)]);
}

#[test]
fn test_unfold_all_range_ending_on_header_clears_its_body() {
    let mut doc = class_body();
    let engine = FoldEngine::default();

    toggle_at(&engine, &mut doc, 1);

    let result = engine
        .execute(
            &mut doc,
            FoldCommand::with_range(FoldCommandKind::UnfoldAll, LineRange::new(0, 2)),
        )
        .unwrap();

    assert!(result.changed());
    assert!(doc.markers().is_empty());
    assert_eq!(doc.visible_lines(), (0..8).collect::<Vec<_>>());
}

#[test]
fn test_unfold_all_range_inside_body_clears_its_header() {
    let mut doc = class_body();
    let engine = FoldEngine::default();

    toggle_at(&engine, &mut doc, 2);
    toggle_at(&engine, &mut doc, 0);

    let result = engine
        .execute(
            &mut doc,
            FoldCommand::with_range(FoldCommandKind::UnfoldAll, LineRange::new(3, 4)),
        )
        .unwrap();

    // The cut run is `class A:`'s whole body, so that fold and the one nested in it go.
    assert!(result.changed());
    assert!(doc.markers().is_empty());
}

#[test]
fn test_refolding_an_existing_fold_reports_no_change() {
    let mut doc = class_body();
    let engine = FoldEngine::default();

    toggle_at(&engine, &mut doc, 1);
    let before = doc.markers().clone();

    // Line 4 is hidden inside `def f():`, which is already folded.
    let result = engine
        .execute(
            &mut doc,
            FoldCommand::with_range(FoldCommandKind::ToggleFold, LineRange::single(4)),
        )
        .unwrap();

    assert_eq!(result, CommandResult::NoTargetFound);
    assert_eq!(doc.markers(), &before);
}
