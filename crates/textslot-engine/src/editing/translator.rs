//! Conversion between literals and live document nodes.

use std::ops::RangeBounds;

use crate::editing::builder::ComponentInit;
use crate::editing::document::Document;
use crate::editing::editor::Editor;
use crate::models::{
    ComponentId, ComponentLiteral, ComponentRef, ContentItem, ContentLiteral, FormatRange, Slot,
    SlotId, SlotLiteral,
};

/// Builds detached slots and components from literals
pub struct Translator<'a> {
    editor: &'a mut Editor,
}

impl<'a> Translator<'a> {
    pub(crate) fn new(editor: &'a mut Editor) -> Self {
        Self { editor }
    }

    /// Create a detached slot holding the literal's content and formats.
    ///
    /// Unknown components and formatters are skipped with a warning; content
    /// the schema rejects is dropped.
    pub fn create_slot(&mut self, literal: &SlotLiteral) -> SlotId {
        let slot = self.editor.doc.create_slot(literal.schema.clone());
        for content in &literal.content {
            let item = match content {
                ContentLiteral::Text(text) => ContentItem::from(text.as_str()),
                ContentLiteral::Component(component) => {
                    let Some(id) = self.create_component(component) else {
                        continue;
                    };
                    ContentItem::Component(self.editor.doc.component_ref(id))
                }
            };
            if !self.editor.doc.insert(slot, item) {
                log::warn!("slot schema {:?} rejected literal content", literal.schema);
            }
        }

        for (name, ranges) in &literal.formats {
            let Some(formatter) = self.editor.formatter(name) else {
                log::warn!("unknown formatter {name} skipped");
                continue;
            };
            let len = self.editor.doc.slot(slot).len();
            for range in ranges {
                if range.start_index > range.end_index || range.end_index > len {
                    log::warn!(
                        "format range {}..{} of {name} outside slot of length {len} skipped",
                        range.start_index,
                        range.end_index
                    );
                    continue;
                }
                self.editor.doc.retain(slot, range.start_index);
                self.editor.doc.retain_format(
                    slot,
                    range.end_index,
                    &formatter,
                    Some(range.value.clone()),
                );
            }
        }
        self.editor.doc.retain(slot, 0);
        slot
    }

    /// Create a detached component, `None` when its name is not registered
    pub fn create_component(&mut self, literal: &ComponentLiteral) -> Option<ComponentId> {
        let slots = literal
            .slots
            .iter()
            .map(|slot| self.create_slot(slot))
            .collect();
        self.editor
            .create_component(&literal.name, ComponentInit::new(literal.state.clone(), slots))
    }
}

impl Document {
    pub fn slot_literal(&self, slot: SlotId) -> SlotLiteral {
        self.literal_of(self.slot(slot))
    }

    /// Literal of part of a slot, with format ranges rebased to the part
    pub fn slot_literal_range(&self, slot: SlotId, range: impl RangeBounds<usize>) -> SlotLiteral {
        let mut copy = self.slot(slot).clone();
        let piece = copy.cut(range);
        self.literal_of(&piece)
    }

    pub fn component_literal(&self, component: ComponentId) -> ComponentLiteral {
        let node = self.component(component);
        ComponentLiteral {
            name: node.name().to_string(),
            state: node.state().clone(),
            slots: node
                .slots()
                .iter()
                .map(|slot| self.slot_literal(*slot))
                .collect(),
        }
    }

    fn literal_of(&self, slot: &Slot) -> SlotLiteral {
        let mut literal = SlotLiteral::new(slot.schema().to_vec());
        for item in slot.content() {
            literal.content.push(match item {
                ContentItem::Text(text) => ContentLiteral::Text(text.clone()),
                ContentItem::Component(ComponentRef { id, .. }) => {
                    ContentLiteral::Component(self.component_literal(*id))
                }
            });
        }
        for item in slot.get_formats() {
            literal
                .formats
                .entry(item.formatter.name().to_string())
                .or_default()
                .push(FormatRange::new(item.start_index, item.end_index, item.value));
        }
        literal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::editor::EditorOptions;
    use crate::models::ContentType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn editor() -> Editor {
        Editor::with_bundled(EditorOptions::default())
    }

    // ============ Slot literal tests ============

    #[test]
    fn test_create_slot_applies_formats() {
        let mut editor = editor();
        let literal = SlotLiteral::new([ContentType::Text])
            .with_text("hello")
            .with_format("bold", FormatRange::new(1, 4, json!(true)));

        let slot = editor.translator().create_slot(&literal);

        assert_eq!(editor.document().slot(slot).text(), "hello");
        assert_eq!(editor.document().slot_literal(slot), literal);
    }

    #[test]
    fn test_unknown_formatter_is_skipped() {
        let mut editor = editor();
        let literal = SlotLiteral::new([ContentType::Text])
            .with_text("hi")
            .with_format("strike", FormatRange::new(0, 2, json!(true)));

        let slot = editor.translator().create_slot(&literal);

        assert!(editor.document().slot(slot).get_formats().is_empty());
    }

    #[test]
    fn test_out_of_bounds_ranges_are_skipped() {
        let mut editor = editor();
        let literal = SlotLiteral::new([ContentType::Text])
            .with_text("hello")
            .with_format("bold", FormatRange::new(7, 9, json!(true)))
            .with_format("bold", FormatRange::new(3, 12, json!(true)))
            .with_format("italic", FormatRange::new(0, 2, json!(true)));

        let slot = editor.translator().create_slot(&literal);

        let formats = editor.document().slot(slot).get_formats();
        assert_eq!(formats.len(), 1);
        assert_eq!(formats[0].formatter.name(), "italic");
        assert_eq!((formats[0].start_index, formats[0].end_index), (0, 2));
    }

    #[test]
    fn test_rejected_content_is_dropped() {
        let mut editor = editor();
        let literal = SlotLiteral::new([ContentType::BlockComponent]).with_text("loose text");

        let slot = editor.translator().create_slot(&literal);

        assert!(editor.document().slot(slot).is_empty());
    }

    #[test]
    fn test_slot_literal_range_rebases_formats() {
        let mut editor = editor();
        let literal = SlotLiteral::new([ContentType::Text])
            .with_text("abcdef")
            .with_format("italic", FormatRange::new(2, 5, json!(true)));
        let slot = editor.translator().create_slot(&literal);

        let part = editor.document().slot_literal_range(slot, 3..6);

        assert_eq!(
            part,
            SlotLiteral::new([ContentType::Text])
                .with_text("def")
                .with_format("italic", FormatRange::new(0, 2, json!(true)))
        );
        assert_eq!(editor.document().slot(slot).text(), "abcdef");
    }

    // ============ Component literal tests ============

    #[test]
    fn test_component_round_trip() {
        let mut editor = editor();
        let literal = ComponentLiteral::new("ListComponent")
            .with_state(json!({"type": "ol"}))
            .with_slot(SlotLiteral::new([ContentType::Text, ContentType::InlineComponent]).with_text("one"))
            .with_slot(
                SlotLiteral::new([ContentType::Text, ContentType::InlineComponent])
                    .with_text("two")
                    .with_component(ComponentLiteral::new("ImageComponent").with_state(json!({"src": "a.png"}))),
            );

        let id = editor.translator().create_component(&literal).unwrap();

        assert_eq!(editor.document().component_literal(id), literal);
    }

    #[test]
    fn test_unknown_component_is_none() {
        let mut editor = editor();
        let literal = ComponentLiteral::new("VideoComponent");

        assert_eq!(editor.translator().create_component(&literal), None);
    }
}
