use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;
use textfield_core::{
    FieldConfig, MemoryClipboard, MonospaceMetrics, RowIndex, TextField, WrapEngine, WrapMode,
};

fn large_text(line_count: usize) -> String {
    let mut out = String::with_capacity(line_count * 96);
    for i in 0..line_count {
        out.push_str(&format!(
            "{i:06} the quick brown fox jumps over the lazy dog while the field wraps it into rows\n"
        ));
    }
    out.pop();
    out
}

fn loaded_field(text: &str) -> TextField<'static> {
    let mut field = TextField::new(
        FieldConfig::multi_line(),
        MonospaceMetrics::unit(),
        MemoryClipboard::new(),
    )
    .unwrap();
    field.set_viewport(40.0, 30.0);
    field.set_text(text);
    field
}

fn bench_full_layout(c: &mut Criterion) {
    let text = large_text(10_000);
    let metrics = MonospaceMetrics::unit();
    let engine = WrapEngine::new(WrapMode::Word, 40.0, 4.0);
    c.bench_function("layout/word_wrap_10k_lines", |b| {
        b.iter(|| {
            let rows = engine.layout(black_box(&text), &metrics);
            black_box(rows.len());
        })
    });
}

fn bench_incremental_reflow(c: &mut Criterion) {
    let before = large_text(10_000);
    let metrics = MonospaceMetrics::unit();
    let engine = WrapEngine::new(WrapMode::Word, 40.0, 4.0);
    let rows = RowIndex::from_rows(engine.layout(&before, &metrics));

    let offset = before.len() / 2;
    let mut after = before.clone();
    after.insert_str(offset, "inserted words ");

    c.bench_function("reflow/single_edit_10k_lines", |b| {
        b.iter_batched(
            || rows.clone(),
            |mut rows| {
                engine.reflow_edit(&after, &mut rows, offset, 0, 15, &metrics);
                black_box(rows.len());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_typing_in_middle(c: &mut Criterion) {
    let text = large_text(2_000);
    c.bench_function("typing_middle/100_keystrokes", |b| {
        b.iter_batched(
            || {
                let mut field = loaded_field(&text);
                field.set_cursor(text.len() / 2);
                field
            },
            |mut field| {
                for i in 0..100u64 {
                    field.insert_text("x", Duration::from_millis(i * 30));
                }
                black_box(field.len());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_undo_burst(c: &mut Criterion) {
    let text = large_text(2_000);
    c.bench_function("undo/redo_200_steps", |b| {
        b.iter_batched(
            || {
                let mut field = loaded_field(&text);
                for i in 0..200u64 {
                    field.set_cursor((i as usize * 97) % text.len());
                    field.insert_text("edit", Duration::from_millis(i * 1000));
                }
                field
            },
            |mut field| {
                while field.undo() {}
                while field.redo() {}
                black_box(field.len());
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    benches,
    bench_full_layout,
    bench_incremental_reflow,
    bench_typing_in_middle,
    bench_undo_burst
);
criterion_main!(benches);
