//! Components bundled with the engine.
//!
//! They double as reference implementations of the listener contract:
//! paragraphs and lists take over Enter to split themselves.

use serde_json::{Value, json};

use crate::editing::builder::{ComponentBuilder, ComponentFactory, ComponentInit, ComponentList};
use crate::editing::editor::Editor;
use crate::editing::events::{ContextMenuItem, EnterEventData, Event};
use crate::models::{ComponentId, ContentItem, ContentType, SlotId};

pub const ROOT: &str = "RootComponent";
pub const PARAGRAPH: &str = "ParagraphComponent";
pub const LIST: &str = "ListComponent";
pub const BLOCKQUOTE: &str = "BlockquoteComponent";
pub const IMAGE: &str = "ImageComponent";

const INLINE_SCHEMA: [ContentType; 2] = [ContentType::Text, ContentType::InlineComponent];
const BLOCK_SCHEMA: [ContentType; 1] = [ContentType::BlockComponent];
const LIST_ITEM_SCHEMA: [ContentType; 3] = [
    ContentType::Text,
    ContentType::InlineComponent,
    ContentType::BlockComponent,
];

/// Every bundled component, registered by name
pub fn bundled() -> ComponentList {
    let mut list = ComponentList::new();
    list.register(RootComponent)
        .register(ParagraphComponent)
        .register(ListComponent)
        .register(BlockquoteComponent)
        .register(ImageComponent);
    list
}

/// Use the translated slots, or a single fresh slot with `schema`
fn slots_or_new(builder: &mut ComponentBuilder<'_>, slots: Vec<SlotId>, schema: &[ContentType]) {
    if slots.is_empty() {
        builder.new_slot(schema.to_vec());
    } else {
        builder.use_slots(slots);
    }
}

fn component_at(editor: &Editor, slot: SlotId, index: usize) -> Option<ComponentId> {
    editor
        .document()
        .slot(slot)
        .get_content_at_index(index)
        .and_then(|item| item.component())
}

pub struct RootComponent;

impl ComponentFactory for RootComponent {
    fn name(&self) -> &str {
        ROOT
    }

    fn content_type(&self) -> ContentType {
        ContentType::BlockComponent
    }

    fn setup(&self, builder: &mut ComponentBuilder<'_>, init: ComponentInit) {
        slots_or_new(builder, init.slots, &BLOCK_SCHEMA);
        builder.use_state(init.state);
    }
}

/// A single inline slot. Enter splits the paragraph at the caret.
pub struct ParagraphComponent;

impl ComponentFactory for ParagraphComponent {
    fn name(&self) -> &str {
        PARAGRAPH
    }

    fn content_type(&self) -> ContentType {
        ContentType::BlockComponent
    }

    fn setup(&self, builder: &mut ComponentBuilder<'_>, init: ComponentInit) {
        slots_or_new(builder, init.slots, &INLINE_SCHEMA);
        builder.use_state(init.state);
        let id = builder.id();
        builder.on_enter(move |editor, event| split_paragraph(editor, id, event));
    }
}

/// Move the text after the caret into a new paragraph right after `paragraph`.
///
/// Inside a blockquote, Enter on a trailing empty paragraph that follows
/// another empty one removes both and continues after the blockquote.
fn split_paragraph(editor: &mut Editor, paragraph: ComponentId, event: &mut Event<EnterEventData>) {
    let Some(parent_slot) = editor.document().parent_slot(paragraph) else {
        return;
    };
    let Some(index) = editor.document().slot(parent_slot).index_of(paragraph) else {
        return;
    };
    let current = event.target();
    let next = editor
        .document_mut()
        .cut(current, event.data.index..);
    let Some(fresh) = editor.create_component(PARAGRAPH, ComponentInit::with_slots(vec![next]))
    else {
        return;
    };
    let item = ContentItem::Component(editor.component_ref(fresh));
    event.prevent_default();

    let doc = editor.document();
    let previous_is_empty = index > 0
        && component_at(editor, parent_slot, index - 1).is_some_and(|before| {
            doc.component(before).name() == PARAGRAPH
                && doc
                    .component(before)
                    .slots()
                    .first()
                    .is_some_and(|slot| doc.slot(*slot).is_empty())
        });
    let quote = doc
        .parent_component(parent_slot)
        .filter(|component| doc.component(*component).name() == BLOCKQUOTE);
    let host = quote.and_then(|quote| doc.parent_slot(quote).map(|host| (quote, host)));
    let breaks_out = index + 1 == doc.slot(parent_slot).len()
        && previous_is_empty
        && doc.slot(current).is_empty()
        && doc.slot(next).is_empty();

    match host {
        Some((quote, host)) if breaks_out => {
            log::debug!("paragraph enter leaves blockquote {quote:?}");
            let doc = editor.document_mut();
            doc.retain(parent_slot, index - 1);
            doc.delete(parent_slot, 2);
            let at = doc.slot(host).index_of(quote).unwrap_or(0) + 1;
            doc.retain(host, at);
            doc.insert(host, item);
        }
        _ => {
            let doc = editor.document_mut();
            doc.retain(parent_slot, index + 1);
            doc.insert(parent_slot, item);
        }
    }
    editor.set_location(next, 0);
}

/// Items are slots; state `{"type": "ul" | "ol"}`.
///
/// Enter splits the current item, or on a trailing empty item leaves the list
/// into a new paragraph.
pub struct ListComponent;

impl ComponentFactory for ListComponent {
    fn name(&self) -> &str {
        LIST
    }

    fn content_type(&self) -> ContentType {
        ContentType::BlockComponent
    }

    fn setup(&self, builder: &mut ComponentBuilder<'_>, init: ComponentInit) {
        slots_or_new(builder, init.slots, &LIST_ITEM_SCHEMA);
        let state = match init.state {
            Value::Null => json!({"type": "ul"}),
            state => state,
        };
        builder.use_state(state);
        let id = builder.id();
        builder.on_enter(move |editor, event| split_list(editor, id, event));
        builder.on_context_menu(move |editor, _| {
            let ordered = editor.document().component(id).state()["type"] == json!("ol");
            let (label, next) = if ordered {
                ("Bulleted list", "ul")
            } else {
                ("Numbered list", "ol")
            };
            vec![ContextMenuItem::new(label, move |editor: &mut Editor| {
                editor.update_state(id, json!({"type": next}));
            })]
        });
    }
}

fn split_list(editor: &mut Editor, list: ComponentId, event: &mut Event<EnterEventData>) {
    let target = event.target();
    let slots = editor.document().component(list).slots().to_vec();
    event.prevent_default();

    if editor.document().slot(target).is_empty() && slots.last() == Some(&target) {
        let Some(parent_slot) = editor.document().parent_slot(list) else {
            return;
        };
        let Some(paragraph) = editor.create_component(PARAGRAPH, ComponentInit::default()) else {
            return;
        };
        let item = ContentItem::Component(editor.component_ref(paragraph));
        let doc = editor.document_mut();
        let index = doc.slot(parent_slot).index_of(list).unwrap_or(0);
        if slots.len() > 1 {
            doc.remove_slot(list, target);
        }
        doc.retain(parent_slot, index + 1);
        doc.insert(parent_slot, item);
        if let Some(first) = doc.component(paragraph).slots().first().copied() {
            editor.set_location(first, 0);
        }
        return;
    }

    let doc = editor.document_mut();
    let next = doc.cut(target, event.data.index..);
    let position = doc.slot_position(target).unwrap_or(slots.len());
    doc.insert_slot(list, position + 1, next);
    editor.set_location(next, 0);
}

/// A slot of blocks
pub struct BlockquoteComponent;

impl ComponentFactory for BlockquoteComponent {
    fn name(&self) -> &str {
        BLOCKQUOTE
    }

    fn content_type(&self) -> ContentType {
        ContentType::BlockComponent
    }

    fn setup(&self, builder: &mut ComponentBuilder<'_>, init: ComponentInit) {
        slots_or_new(builder, init.slots, &BLOCK_SCHEMA);
        builder.use_state(init.state);
    }
}

/// Inline and slot-less; state carries `src` and optional size
pub struct ImageComponent;

impl ComponentFactory for ImageComponent {
    fn name(&self) -> &str {
        IMAGE
    }

    fn content_type(&self) -> ContentType {
        ContentType::InlineComponent
    }

    fn setup(&self, builder: &mut ComponentBuilder<'_>, init: ComponentInit) {
        builder.use_state(init.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::editor::EditorOptions;
    use crate::editing::selection::Location;
    use crate::models::{ComponentLiteral, SlotLiteral};
    use pretty_assertions::assert_eq;

    fn paragraph(text: &str) -> ComponentLiteral {
        ComponentLiteral::new(PARAGRAPH).with_slot(SlotLiteral::new(INLINE_SCHEMA).with_text(text))
    }

    fn load(blocks: Vec<ComponentLiteral>) -> Editor {
        let mut slot = SlotLiteral::new(BLOCK_SCHEMA);
        for block in blocks {
            slot = slot.with_component(block);
        }
        let mut editor = Editor::with_bundled(EditorOptions::default());
        editor
            .load(&ComponentLiteral::new(ROOT).with_slot(slot))
            .unwrap();
        editor
    }

    fn root_slot(editor: &Editor) -> SlotId {
        editor.document().component(editor.root().unwrap()).slots()[0]
    }

    fn texts(editor: &Editor, slot: SlotId) -> Vec<String> {
        let doc = editor.document();
        doc.slot(slot)
            .components()
            .flat_map(|component| doc.component(component).slots().to_vec())
            .map(|slot| doc.slot(slot).text())
            .collect()
    }

    // ============ Paragraph tests ============

    #[test]
    fn test_paragraph_enter_splits() {
        let mut editor = load(vec![paragraph("hello")]);
        let first = editor.selection().start_slot().unwrap();
        editor.set_location(first, 2);

        // handled by the paragraph, so no line break is inserted
        assert!(!editor.keyboard().enter());

        let root = root_slot(&editor);
        assert_eq!(texts(&editor, root), vec!["he", "llo"]);
        let second = component_at(&editor, root, 1).unwrap();
        let second_slot = editor.document().component(second).slots()[0];
        assert_eq!(editor.selection().start(), Some(Location::new(second_slot, 0)));
    }

    #[test]
    fn test_paragraph_enter_leaves_blockquote() {
        let quote = ComponentLiteral::new(BLOCKQUOTE).with_slot(
            SlotLiteral::new(BLOCK_SCHEMA)
                .with_component(paragraph("quoted"))
                .with_component(paragraph(""))
                .with_component(paragraph("")),
        );
        let mut editor = load(vec![quote]);
        let root = root_slot(&editor);
        let quote = component_at(&editor, root, 0).unwrap();
        let quote_slot = editor.document().component(quote).slots()[0];
        let last = component_at(&editor, quote_slot, 2).unwrap();
        let last_slot = editor.document().component(last).slots()[0];
        editor.set_location(last_slot, 0);

        editor.keyboard().enter();

        assert_eq!(texts(&editor, quote_slot), vec!["quoted"]);
        assert_eq!(editor.document().slot(root).len(), 2);
        let after = component_at(&editor, root, 1).unwrap();
        assert_eq!(editor.document().component(after).name(), PARAGRAPH);
    }

    // ============ List tests ============

    #[test]
    fn test_list_enter_splits_item() {
        let list = ComponentLiteral::new(LIST)
            .with_slot(SlotLiteral::new(LIST_ITEM_SCHEMA).with_text("onetwo"));
        let mut editor = load(vec![list]);
        let item = editor.selection().start_slot().unwrap();
        editor.set_location(item, 3);

        editor.keyboard().enter();

        let list = editor.document().parent_component(item).unwrap();
        let slots = editor.document().component(list).slots().to_vec();
        assert_eq!(slots.len(), 2);
        assert_eq!(editor.document().slot(slots[0]).text(), "one");
        assert_eq!(editor.document().slot(slots[1]).text(), "two");
        assert_eq!(editor.selection().start(), Some(Location::new(slots[1], 0)));
    }

    #[test]
    fn test_list_enter_on_empty_last_item_exits() {
        let list = ComponentLiteral::new(LIST)
            .with_slot(SlotLiteral::new(LIST_ITEM_SCHEMA).with_text("one"))
            .with_slot(SlotLiteral::new(LIST_ITEM_SCHEMA));
        let mut editor = load(vec![list]);
        let root = root_slot(&editor);
        let list = component_at(&editor, root, 0).unwrap();
        let last = editor.document().component(list).slots()[1];
        editor.set_location(last, 0);

        editor.keyboard().enter();

        assert_eq!(editor.document().component(list).slots().len(), 1);
        let paragraph = component_at(&editor, root, 1).unwrap();
        assert_eq!(editor.document().component(paragraph).name(), PARAGRAPH);
        let slot = editor.document().component(paragraph).slots()[0];
        assert_eq!(editor.selection().start(), Some(Location::new(slot, 0)));
    }

    #[test]
    fn test_list_context_menu_toggles_type() {
        let list = ComponentLiteral::new(LIST).with_slot(SlotLiteral::new(LIST_ITEM_SCHEMA).with_text("a"));
        let mut editor = load(vec![list]);
        let item = editor.selection().start_slot().unwrap();
        let list = editor.document().parent_component(item).unwrap();

        let items = editor.context_menu();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "Numbered list");

        let on_click = items[0].on_click.clone();
        on_click(&mut editor);
        assert_eq!(editor.document().component(list).state()["type"], json!("ol"));
        assert!(editor.undo());
        assert_eq!(editor.document().component(list).state()["type"], json!("ul"));
    }
}
