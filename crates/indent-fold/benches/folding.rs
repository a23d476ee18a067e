use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use indent_fold::{
    FoldBuffer, FoldCommand, FoldCommandKind, FoldEngine, LineRange, Marker, TextDocument,
};

/// Source-like text: repeating functions with three levels of nested blocks.
fn nested_text(line_count: usize) -> String {
    const PATTERN: [&str; 8] = [
        "def handler():",
        "    if request.ok:",
        "        for item in items:",
        "            process(item)",
        "            log(item)",
        "        respond()",
        "    return None",
        "",
    ];

    let mut out = String::with_capacity(line_count * 24);
    for i in 0..line_count {
        out.push_str(PATTERN[i % PATTERN.len()]);
        out.push('\n');
    }
    // Remove the final '\n' to avoid creating an extra trailing empty line.
    out.pop();
    out
}

fn bench_fold_all(c: &mut Criterion) {
    let doc = TextDocument::new(&nested_text(20_000));
    let engine = FoldEngine::default();

    c.bench_function("fold_all/20k_lines", |b| {
        b.iter_batched(
            || doc.clone(),
            |mut doc| {
                engine
                    .execute(&mut doc, FoldCommand::new(FoldCommandKind::FoldAll))
                    .unwrap();
                black_box(doc.visible_lines().len());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_fold_deepest(c: &mut Criterion) {
    let doc = TextDocument::new(&nested_text(20_000));
    let engine = FoldEngine::default();

    c.bench_function("fold_deepest/20k_lines", |b| {
        b.iter_batched(
            || doc.clone(),
            |mut doc| {
                engine
                    .execute(&mut doc, FoldCommand::new(FoldCommandKind::FoldDeepest))
                    .unwrap();
                black_box(doc.markers().is_empty());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_unfold_with_reconciliation(c: &mut Criterion) {
    let mut folded = TextDocument::new(&nested_text(20_000));
    let engine = FoldEngine::default();
    engine
        .execute(&mut folded, FoldCommand::new(FoldCommandKind::FoldAll))
        .unwrap();

    // Unfolding every top-level header restores the nested folds beneath it.
    let headers: Vec<usize> = folded
        .visible_lines()
        .into_iter()
        .filter(|&line| folded.has_marker(Marker::Folded, line))
        .collect();

    c.bench_function("unfold_reconcile/2.5k_headers", |b| {
        b.iter_batched(
            || folded.clone(),
            |mut doc| {
                for &line in &headers {
                    engine
                        .execute(
                            &mut doc,
                            FoldCommand::with_range(
                                FoldCommandKind::ToggleFold,
                                LineRange::single(line),
                            ),
                        )
                        .unwrap();
                }
                black_box(doc.line_count());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_toggle_in_middle(c: &mut Criterion) {
    let mut doc = TextDocument::new(&nested_text(50_000));
    let engine = FoldEngine::default();

    // Pick a line well into the file to avoid warming only the top-of-document paths.
    doc.set_cursor_line(25_003);

    c.bench_function("toggle_fold/50k_lines", |b| {
        b.iter(|| {
            let result = engine
                .execute(&mut doc, FoldCommand::new(FoldCommandKind::ToggleFold))
                .unwrap();
            black_box(result);
        })
    });
}

criterion_group!(
    benches,
    bench_fold_all,
    bench_fold_deepest,
    bench_unfold_with_reconciliation,
    bench_toggle_in_middle
);
criterion_main!(benches);
