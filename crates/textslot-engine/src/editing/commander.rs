//! Formatting, clipboard and structural commands over the selection.

use crate::editing::editor::Editor;
use crate::editing::events::{Event, PasteEventData};
use crate::editing::keyboard;
use crate::editing::selection::Location;
use crate::models::{
    ComponentId, ContentItem, ContentLiteral, ContentType, FormatValue, Formatter, SlotId,
    SlotLiteral,
};

/// Zero-width character anchoring a format typed at a collapsed caret
pub const PLACEHOLDER: char = '\u{200b}';

/// Host clipboard written by [`Commander::copy`]
pub trait Clipboard {
    fn write(&mut self, literal: &SlotLiteral, text: &str);
}

pub struct Commander<'a> {
    editor: &'a mut Editor,
}

impl<'a> Commander<'a> {
    pub(crate) fn new(editor: &'a mut Editor) -> Self {
        Self { editor }
    }

    /// Write the selected content to the clipboard.
    ///
    /// Copies the span of the common ancestor slot that covers both
    /// endpoints. Returns `false` when nothing is selected or no clipboard is
    /// installed.
    pub fn copy(&mut self) -> bool {
        copy(self.editor)
    }

    /// Copy, then delete the selection
    pub fn cut(&mut self) -> bool {
        if self.editor.selection.is_collapsed() {
            return false;
        }
        if !copy(self.editor) {
            return false;
        }
        self.editor.transact(|editor| keyboard::delete(editor, false))
    }

    /// Insert the items of the detached `paste_slot` at the caret.
    ///
    /// The common ancestor component receives a cancelable paste event first.
    pub fn paste(&mut self, paste_slot: SlotId, text: &str) -> bool {
        let text = text.to_string();
        self.editor
            .transact(|editor| paste(editor, paste_slot, text))
    }

    /// Paste plain text as one text run
    pub fn paste_text(&mut self, text: &str) -> bool {
        let literal = SlotLiteral::new([ContentType::Text]).with_text(text);
        let slot = self.editor.translator().create_slot(&literal);
        self.paste(slot, text)
    }

    pub fn apply_format(&mut self, formatter: &Formatter, value: FormatValue) -> bool {
        let formatter = formatter.clone();
        self.editor
            .transact(|editor| format(editor, &formatter, Some(value)))
    }

    pub fn unapply_format(&mut self, formatter: &Formatter) -> bool {
        let formatter = formatter.clone();
        self.editor
            .transact(|editor| format(editor, &formatter, None))
    }

    /// Clear every format in the selected blocks except `ignore`.
    ///
    /// Block formats are cleared only from slots the selection covers
    /// entirely, a trailing `\n` aside.
    pub fn clean_formats(&mut self, ignore: &[Formatter]) {
        let ignore = ignore.to_vec();
        self.editor
            .transact(|editor| clean_formats(editor, &ignore));
    }

    /// Insert `component` just before `reference` in the reference's parent slot
    pub fn insert_before(&mut self, component: ComponentId, reference: ComponentId) -> bool {
        self.editor
            .transact(|editor| insert_next_to(editor, component, reference, 0))
    }

    /// Insert `component` just after `reference` in the reference's parent slot
    pub fn insert_after(&mut self, component: ComponentId, reference: ComponentId) -> bool {
        self.editor
            .transact(|editor| insert_next_to(editor, component, reference, 1))
    }

    /// Put `target` where `source` is and remove `source`
    pub fn replace(&mut self, source: ComponentId, target: ComponentId) -> bool {
        self.editor.transact(|editor| {
            insert_next_to(editor, target, source, 0) && remove(editor, source)
        })
    }

    /// Detach `component` from its parent slot
    pub fn remove(&mut self, component: ComponentId) -> bool {
        self.editor.transact(|editor| remove(editor, component))
    }
}

fn copy(editor: &mut Editor) -> bool {
    let (Some(start), Some(end)) = (editor.selection.start(), editor.selection.end()) else {
        return false;
    };
    if editor.selection.is_collapsed() {
        return false;
    }
    let Some(common) = editor.selection.common_ancestor_slot(&editor.doc) else {
        return false;
    };
    let from = index_in(editor, common, start, false);
    let to = index_in(editor, common, end, true);
    let literal = editor.doc.slot_literal_range(common, from..to);
    let text = plain_text(&literal);
    let Some(clipboard) = editor.clipboard.as_mut() else {
        log::debug!("copy without a clipboard");
        return false;
    };
    clipboard.write(&literal, &text);
    true
}

/// Offset in `ancestor` of the item holding `location`; `after` selects the
/// position just past that item.
fn index_in(editor: &Editor, ancestor: SlotId, location: Location, after: bool) -> usize {
    let doc = &editor.doc;
    if location.slot == ancestor {
        return location.offset;
    }
    let mut slot = location.slot;
    while let Some(component) = doc.parent_component(slot) {
        let Some(parent) = doc.parent_slot(component) else {
            break;
        };
        if parent == ancestor {
            let index = doc.slot(parent).index_of(component).unwrap_or(0);
            return if after { index + 1 } else { index };
        }
        slot = parent;
    }
    location.offset
}

fn plain_text(literal: &SlotLiteral) -> String {
    let mut text = String::new();
    for content in &literal.content {
        match content {
            ContentLiteral::Text(run) => text.push_str(run),
            ContentLiteral::Component(component) => {
                for slot in &component.slots {
                    text.push_str(&plain_text(slot));
                }
            }
        }
    }
    text
}

fn paste(editor: &mut Editor, paste_slot: SlotId, text: String) -> bool {
    if !editor.selection.is_selected() {
        return false;
    }
    if !editor.selection.is_collapsed() && !keyboard::delete(editor, false) {
        return false;
    }
    let Some(start) = editor.selection.start() else {
        return false;
    };
    let mut event = Event::new(
        start.slot,
        PasteEventData {
            index: start.offset,
            data: paste_slot,
            text,
        },
    );
    if let Some(component) = editor.selection.common_ancestor_component(&editor.doc) {
        editor.invoke(component, &mut event);
    }
    if event.is_default_prevented() {
        return false;
    }

    let contents = editor.doc.slot(paste_slot).slice_content(..);
    // components leave the fragment as they are inserted
    for item in contents {
        if !keyboard::insert(editor, item) {
            log::debug!("pasted content rejected at {:?}", editor.selection.start());
        }
    }
    true
}

fn format(editor: &mut Editor, formatter: &Formatter, value: Option<FormatValue>) -> bool {
    let Some(start) = editor.selection.start() else {
        return false;
    };

    if editor.selection.is_collapsed() {
        let slot = start.slot;
        if formatter.is_block() || editor.doc.slot(slot).is_empty() {
            let len = editor.doc.slot(slot).len();
            editor.doc.retain(slot, 0);
            return editor.doc.retain_format(slot, len, formatter, value);
        }
        return match value {
            Some(value) => {
                if !keyboard::insert(editor, ContentItem::from(PLACEHOLDER)) {
                    return false;
                }
                let Some(caret) = editor.selection.start() else {
                    return false;
                };
                editor.doc.retain(caret.slot, caret.offset - 1);
                editor
                    .doc
                    .retain_format(caret.slot, caret.offset, formatter, Some(value))
            }
            None => {
                let previous = start
                    .offset
                    .checked_sub(1)
                    .and_then(|i| editor.doc.slot(slot).get_content_at_index(i));
                if previous == Some(ContentItem::from(PLACEHOLDER)) {
                    editor.doc.retain(slot, start.offset - 1);
                    return editor.doc.retain_format(slot, start.offset, formatter, None);
                }
                if !keyboard::insert(editor, ContentItem::from(PLACEHOLDER)) {
                    return false;
                }
                let Some(caret) = editor.selection.start() else {
                    return false;
                };
                editor.doc.retain(caret.slot, caret.offset - 1);
                editor.doc.retain_format(caret.slot, caret.offset, formatter, None)
            }
        };
    }

    if formatter.is_block() {
        for block in editor.selection.get_blocks(&editor.doc) {
            editor.doc.retain(block.slot, 0);
            editor
                .doc
                .retain_format(block.slot, block.end_index, formatter, value.clone());
        }
        return true;
    }
    for scope in editor.selection.get_selected_scopes(&editor.doc) {
        format_span(editor, scope.slot, scope.start_index, scope.end_index, formatter, &value);
    }
    true
}

/// Inline-format `[start, end)` of `slot` and every slot of the components it covers
fn format_span(
    editor: &mut Editor,
    slot: SlotId,
    start: usize,
    end: usize,
    formatter: &Formatter,
    value: &Option<FormatValue>,
) {
    if editor.doc.slot(slot).accepts(ContentType::Text) {
        editor.doc.retain(slot, start);
        editor.doc.retain_format(slot, end, formatter, value.clone());
    }
    let covered: Vec<ComponentId> = editor
        .doc
        .slot(slot)
        .slice_content(start..end)
        .iter()
        .filter_map(ContentItem::component)
        .collect();
    for component in covered {
        for child in editor.doc.component(component).slots().to_vec() {
            let len = editor.doc.slot(child).len();
            format_span(editor, child, 0, len, formatter, value);
        }
    }
}

fn clean_formats(editor: &mut Editor, ignore: &[Formatter]) {
    let (Some(start), Some(end)) = (editor.selection.start(), editor.selection.end()) else {
        return;
    };
    for mut scope in editor.selection.get_blocks(&editor.doc) {
        if scope.slot == start.slot && scope.start_index <= start.offset {
            scope.start_index = start.offset;
        }
        if scope.slot == end.slot && scope.end_index >= end.offset {
            scope.end_index = end.offset;
        }
        let slot = scope.slot;
        let len = editor.doc.slot(slot).len();
        let whole_slot = scope.start_index == 0
            && (scope.end_index == len
                || (len > 0
                    && scope.end_index == len - 1
                    && editor.doc.slot(slot).get_content_at_index(len - 1)
                        == Some(ContentItem::from('\n'))));

        for item in editor.doc.slot(slot).get_formats() {
            if (item.formatter.is_block() && !whole_slot) || ignore.contains(&item.formatter) {
                continue;
            }
            editor.doc.retain(slot, scope.start_index);
            editor
                .doc
                .retain_format(slot, scope.end_index, &item.formatter, None);
        }
    }
}

fn insert_next_to(
    editor: &mut Editor,
    component: ComponentId,
    reference: ComponentId,
    shift: usize,
) -> bool {
    let Some(parent) = editor.doc.parent_slot(reference) else {
        return false;
    };
    let Some(index) = editor.doc.slot(parent).index_of(reference) else {
        panic!("component {reference:?} is not a child of its parent slot {parent:?}");
    };
    editor.doc.retain(parent, index + shift);
    let item = ContentItem::Component(editor.doc.component_ref(component));
    editor.doc.insert(parent, item)
}

fn remove(editor: &mut Editor, component: ComponentId) -> bool {
    if editor.doc.parent_slot(component).is_none() {
        return false;
    }
    editor.doc.remove_component(component);
    true
}
