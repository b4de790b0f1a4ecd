use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;
use textslot_engine::editing::{Editor, EditorOptions};
use textslot_engine::models::{ComponentLiteral, ContentType, SlotId, SlotLiteral};

fn generate_document(paragraphs: usize) -> ComponentLiteral {
    let mut slot = SlotLiteral::new([ContentType::BlockComponent]);
    for i in 0..paragraphs {
        slot = slot.with_component(
            ComponentLiteral::new("ParagraphComponent").with_slot(
                SlotLiteral::new([ContentType::Text, ContentType::InlineComponent])
                    .with_text(format!("Paragraph {i} with a little text to edit.")),
            ),
        );
    }
    ComponentLiteral::new("RootComponent").with_slot(slot)
}

fn last_paragraph_slot(editor: &Editor) -> SlotId {
    let doc = editor.document();
    let root_slot = doc.component(doc.root().unwrap()).slots()[0];
    let len = doc.slot(root_slot).len();
    let paragraph = doc
        .slot(root_slot)
        .get_content_at_index(len - 1)
        .and_then(|item| item.component())
        .unwrap();
    doc.component(paragraph).slots()[0]
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");
    group.sample_size(20);

    let literal = generate_document(200);
    group.bench_function("load_200_paragraphs", |b| {
        b.iter(|| {
            let mut editor = Editor::with_bundled(EditorOptions::default());
            editor.load(black_box(&literal)).unwrap();
            black_box(editor);
        });
    });

    group.finish();
}

fn bench_typing(c: &mut Criterion) {
    let mut group = c.benchmark_group("typing");
    group.sample_size(20);

    let literal = generate_document(200);
    group.bench_function("insert_100_chars", |b| {
        b.iter(|| {
            let mut editor = Editor::with_bundled(EditorOptions::default());
            editor.load(&literal).unwrap();
            let slot = last_paragraph_slot(&editor);
            editor.set_location(slot, 10);
            for _ in 0..100 {
                editor.keyboard().insert(black_box('x'));
            }
            black_box(editor);
        });
    });

    group.bench_function("backspace_100_chars", |b| {
        b.iter(|| {
            let mut editor = Editor::with_bundled(EditorOptions::default());
            editor.load(&literal).unwrap();
            let slot = last_paragraph_slot(&editor);
            let len = editor.document().slot(slot).len();
            editor.set_location(slot, len);
            for _ in 0..len {
                editor.keyboard().delete(true);
            }
            black_box(editor);
        });
    });

    group.finish();
}

fn bench_format_and_undo(c: &mut Criterion) {
    let mut group = c.benchmark_group("format_and_undo");
    group.sample_size(20);

    let literal = generate_document(200);
    group.bench_function("bold_then_undo", |b| {
        b.iter(|| {
            let mut editor = Editor::with_bundled(EditorOptions::default());
            editor.load(&literal).unwrap();
            let bold = editor.formatter("bold").unwrap();
            let slot = last_paragraph_slot(&editor);
            editor.select((slot, 2), (slot, 20));
            editor.commander().apply_format(&bold, json!(true));
            editor.undo();
            black_box(editor);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_load, bench_typing, bench_format_and_undo);
criterion_main!(benches);
