//! Keyboard-level edit commands: insert, enter and delete.
//!
//! Each public command runs as one transaction. Listeners fired along the way
//! run synchronously and may restructure the tree, so the algorithms below
//! re-read parent links after every dispatch instead of caching them.

use crate::editing::editor::Editor;
use crate::editing::events::{
    DeleteEventData, EnterEventData, Event, InsertEventData, InsertedEventData,
};
use crate::editing::selection::{Location, find_last_location, next_location, previous_location};
use crate::models::{ComponentId, ContentItem, ContentType, SlotId};

pub struct Keyboard<'a> {
    editor: &'a mut Editor,
}

impl<'a> Keyboard<'a> {
    pub(crate) fn new(editor: &'a mut Editor) -> Self {
        Self { editor }
    }

    /// Insert at the caret, replacing a non-collapsed selection first.
    ///
    /// When the caret slot rejects the content, the next sibling slot and then
    /// the parent slot (just after the owning component) are tried in turn.
    pub fn insert(&mut self, content: impl Into<ContentItem>) -> bool {
        let content = content.into();
        self.editor.transact(|editor| insert(editor, content))
    }

    /// Break the line at the caret. Returns `false` when a listener handled it.
    pub fn enter(&mut self) -> bool {
        self.editor.transact(enter)
    }

    /// Delete the selection, or one unit before (`delete_before`) or after the caret
    pub fn delete(&mut self, delete_before: bool) -> bool {
        self.editor
            .transact(|editor| delete(editor, delete_before))
    }
}

/// Where the upward prune walk ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PruneOutcome {
    /// The empty subtree was removed; the caret belongs at this location
    Pruned { slot: SlotId, offset: usize },
    /// A listener refused a removal at this location
    Blocked { slot: SlotId, offset: usize },
}

#[derive(Debug, Clone, Copy)]
struct DeleteScope {
    slot: SlotId,
    start_index: usize,
    end_index: usize,
    is_start: bool,
    is_end: bool,
}

pub(crate) fn insert(editor: &mut Editor, content: ContentItem) -> bool {
    if !editor.selection.is_selected() {
        return false;
    }
    if !editor.selection.is_collapsed() && !delete(editor, false) {
        return false;
    }
    let Some(start) = editor.selection.start() else {
        return false;
    };

    let Some(slot) = insert_at(editor, start.slot, start.offset, content.clone(), true) else {
        log::debug!("insert rejected at {start:?}");
        return false;
    };
    let index = editor.doc.slot(slot).index();
    editor.selection.set_location(slot, index);
    if let Some(owner) = editor.doc.parent_component(slot) {
        let mut event = Event::new(slot, InsertedEventData { index, content });
        editor.invoke(owner, &mut event);
    }
    true
}

pub(crate) fn enter(editor: &mut Editor) -> bool {
    if !editor.selection.is_selected() {
        return false;
    }
    if !editor.selection.is_collapsed() && !delete(editor, false) {
        return false;
    }
    let Some(start) = editor.selection.start() else {
        return false;
    };
    if let Some(owner) = editor.doc.parent_component(start.slot) {
        let mut event = Event::new(start.slot, EnterEventData { index: start.offset });
        editor.invoke(owner, &mut event);
        if event.is_default_prevented() {
            log::debug!("enter handled by {owner:?}");
            return false;
        }
    }
    insert(editor, ContentItem::from('\n'))
}

pub(crate) fn delete(editor: &mut Editor, delete_before: bool) -> bool {
    let Some(cached) = editor.selection.start() else {
        return false;
    };
    if editor.selection.is_collapsed() {
        if delete_before {
            if let Some(previous) = editor.selection.get_previous_location(&editor.doc) {
                editor
                    .selection
                    .set_start(&editor.doc, previous.slot, previous.offset);
            }
        } else if let Some(next) = editor.selection.get_next_location(&editor.doc) {
            editor.selection.set_end(&editor.doc, next.slot, next.offset);
        }
    }

    if editor.selection.is_collapsed() {
        if editor.doc.slot(cached.slot).is_empty() {
            return try_clean_doc(editor);
        }
        return false;
    }

    let (Some(start), Some(end)) = (editor.selection.start(), editor.selection.end()) else {
        return false;
    };

    if start.slot == end.slot {
        let slot = start.slot;
        let count = end.offset - start.offset;
        let event = fire_delete(
            editor,
            slot,
            DeleteEventData {
                index: end.offset,
                count,
                is_move: false,
                is_start: true,
                is_end: true,
            },
        );
        if event.is_default_prevented() {
            editor.selection.set_location(cached.slot, cached.offset);
            return false;
        }
        editor.doc.retain(slot, start.offset);
        editor.doc.delete(slot, count);
        editor.selection.set_location(slot, start.offset);
        return true;
    }

    // move the end slot's tail out of the way
    let end_slot = end.slot;
    let mut tail = None;
    let end_len = editor.doc.slot(end_slot).len();
    if end_len > 0 {
        let event = fire_delete(
            editor,
            end_slot,
            DeleteEventData {
                index: end_len,
                count: end_len - end.offset,
                is_move: true,
                is_start: false,
                is_end: true,
            },
        );
        if !event.is_default_prevented() {
            tail = Some(editor.doc.cut(end_slot, end.offset..));
        }
    }

    let mut scopes: Vec<DeleteScope> = editor
        .selection
        .get_selected_scopes(&editor.doc)
        .into_iter()
        .map(|scope| DeleteScope {
            slot: scope.slot,
            start_index: scope.start_index,
            end_index: scope.end_index,
            is_start: false,
            is_end: false,
        })
        .collect();
    if let Some(first) = scopes.first_mut()
        && first.slot == start.slot
    {
        first.is_start = true;
    }
    if end.offset == 0 {
        scopes.push(DeleteScope {
            slot: end_slot,
            start_index: 0,
            end_index: editor.doc.slot(end_slot).len(),
            is_start: false,
            is_end: true,
        });
    } else if let Some(last) = scopes.last_mut() {
        last.is_end = true;
    }

    let common = editor.selection.common_ancestor_slot(&editor.doc);

    while let Some(scope) = scopes.pop() {
        let slot = scope.slot;
        let count = scope.end_index - scope.start_index;
        let event = fire_delete(
            editor,
            slot,
            DeleteEventData {
                index: scope.end_index,
                count,
                is_move: false,
                is_start: scope.is_start,
                is_end: scope.is_end,
            },
        );
        if event.is_default_prevented() {
            // later scopes stay deleted; the tail follows the kept range
            splice_tail(editor, tail, slot, scope.end_index);
            restore_location(editor, cached, slot, scope.end_index);
            log::debug!("delete stopped by a listener at {slot:?}");
            return false;
        }
        editor.doc.retain(slot, scope.start_index);
        editor.doc.delete(slot, count);
        if scope.is_start {
            break;
        }

        let Some(owner) = editor.doc.parent_component(slot) else {
            continue;
        };
        let slots = editor.doc.component(owner).slots();
        let emptied = slots.is_empty()
            || (slots.len() == 1 && slots[0] == slot && editor.doc.slot(slot).is_empty());
        if emptied
            && let PruneOutcome::Blocked { slot, offset } = delete_tree(editor, owner, slot, common)
        {
            splice_tail(editor, tail, slot, offset);
            restore_location(editor, cached, slot, offset);
            log::debug!("delete stopped while pruning at {slot:?}");
            return false;
        }
    }

    splice_tail(editor, tail, start.slot, start.offset);
    editor.selection.set_location(start.slot, start.offset);
    true
}

/// Move the carried end-slot tail to `(slot, offset)` and recycle its fragment
fn splice_tail(editor: &mut Editor, tail: Option<SlotId>, slot: SlotId, offset: usize) {
    let Some(tail) = tail else {
        return;
    };
    editor.doc.retain(slot, offset);
    add_content(editor, tail, slot);
    editor.doc.release_slot(tail);
}

/// Put the caret back where the delete started, or at the stopping point when
/// that slot was pruned from the tree.
fn restore_location(editor: &mut Editor, cached: Location, slot: SlotId, offset: usize) {
    let cached_len = editor.doc.slot(cached.slot).len();
    if editor.doc.slot_path(cached.slot).is_some() && cached.offset <= cached_len {
        editor.selection.set_location(cached.slot, cached.offset);
    } else {
        editor.selection.set_location(slot, offset);
    }
}

fn fire_delete(editor: &mut Editor, slot: SlotId, data: DeleteEventData) -> Event<DeleteEventData> {
    let mut event = Event::new(slot, data);
    if let Some(owner) = editor.doc.parent_component(slot) {
        editor.invoke(owner, &mut event);
    }
    event
}

/// Try `content` at `(target, index)`, falling back to the next sibling slot
/// and then to the parent slot after the owning component.
///
/// Returns the slot that accepted the content.
pub(crate) fn insert_at(
    editor: &mut Editor,
    target: SlotId,
    index: usize,
    content: ContentItem,
    expand: bool,
) -> Option<SlotId> {
    let (mut target, mut index) = (target, index);
    loop {
        let owner = editor.doc.parent_component(target)?;
        let mut event = Event::new(
            target,
            InsertEventData {
                index,
                content: content.clone(),
            },
        );
        editor.invoke(owner, &mut event);
        if event.is_default_prevented() {
            return None;
        }

        editor.doc.retain(target, index);
        let inserted = if expand {
            editor.doc.write(target, content.clone())
        } else {
            editor.doc.insert(target, content.clone())
        };
        if inserted {
            return Some(target);
        }

        let slots = editor.doc.component(owner).slots();
        let position = slots.iter().position(|slot| *slot == target)?;
        if let Some(next) = slots.get(position + 1) {
            target = *next;
            index = 0;
            continue;
        }
        let parent_slot = editor.doc.parent_slot(owner)?;
        index = editor.doc.slot(parent_slot).index_of(owner)? + 1;
        target = parent_slot;
    }
}

/// Remove `component` (whose slot `current` just became empty) and walk
/// upward removing ancestors left empty, stopping at `stop` or at a slot that
/// still has content. The root component is never removed.
pub(crate) fn delete_tree(
    editor: &mut Editor,
    component: ComponentId,
    current: SlotId,
    stop: Option<SlotId>,
) -> PruneOutcome {
    let (mut component, mut current) = (component, current);
    loop {
        let Some(parent_slot) = editor.doc.parent_slot(component) else {
            let offset = editor.doc.slot(current).index();
            return PruneOutcome::Pruned {
                slot: current,
                offset,
            };
        };
        let Some(index) = editor.doc.slot(parent_slot).index_of(component) else {
            panic!("component {component:?} is not a child of its parent slot {parent_slot:?}");
        };

        let event = fire_delete(
            editor,
            parent_slot,
            DeleteEventData {
                index: index + 1,
                count: 1,
                is_move: false,
                is_start: false,
                is_end: true,
            },
        );
        if event.is_default_prevented() {
            let offset = editor.doc.slot(current).index();
            return PruneOutcome::Blocked {
                slot: current,
                offset,
            };
        }

        editor.doc.retain(parent_slot, index);
        editor.doc.delete(parent_slot, 1);
        if Some(parent_slot) == stop || !editor.doc.slot(parent_slot).is_empty() {
            return PruneOutcome::Pruned {
                slot: parent_slot,
                offset: index,
            };
        }

        let Some(parent_component) = editor.doc.parent_component(parent_slot) else {
            return PruneOutcome::Pruned {
                slot: parent_slot,
                offset: 0,
            };
        };
        let slots = editor.doc.component(parent_component).slots().to_vec();
        if slots.len() > 1 {
            let position = slots
                .iter()
                .position(|slot| *slot == parent_slot)
                .unwrap_or(0);
            editor.doc.remove_slot(parent_component, parent_slot);
            if position == 0 {
                if let Some(host) = editor.doc.parent_slot(parent_component) {
                    let offset = editor.doc.slot(host).index_of(parent_component).unwrap_or(0);
                    return PruneOutcome::Pruned { slot: host, offset };
                }
                let location = find_last_location(&editor.doc, slots[1]);
                return PruneOutcome::Pruned {
                    slot: location.slot,
                    offset: location.offset,
                };
            }
            let location = find_last_location(&editor.doc, slots[position - 1]);
            return PruneOutcome::Pruned {
                slot: location.slot,
                offset: location.offset,
            };
        }

        current = parent_slot;
        component = parent_component;
    }
}

/// Collapsed delete inside an empty slot: remove empty single-slot ancestors
/// until one of them leaves content behind.
///
/// Returns `true` when it stopped at a slot that still has content. Reaching
/// the root clears the root slot, places the caret there and returns `false`.
fn try_clean_doc(editor: &mut Editor) -> bool {
    let Some(mut slot) = editor.selection.start_slot() else {
        return false;
    };
    loop {
        let Some(component) = editor.doc.parent_component(slot) else {
            return false;
        };
        if editor.doc.component(component).slots().len() > 1 {
            return false;
        }
        let Some(parent_slot) = editor.doc.parent_slot(component) else {
            editor.doc.cut(slot, ..);
            editor.selection.set_location(slot, 0);
            log::debug!("document emptied down to the root slot");
            return false;
        };

        let index = editor.doc.slot(parent_slot).index_of(component).unwrap_or(0);
        editor.doc.remove_component(component);
        if !editor.doc.slot(parent_slot).is_empty() {
            let doc = &editor.doc;
            let location = if doc.slot(parent_slot).accepts(ContentType::Text) {
                None
            } else if index > 0 {
                previous_location(doc, parent_slot, index)
            } else {
                next_location(doc, parent_slot, index)
            };
            match location {
                Some(location) => editor.selection.set_location(location.slot, location.offset),
                None => editor.selection.set_location(parent_slot, index),
            }
            return true;
        }
        slot = parent_slot;
    }
}

/// Move `source`'s content item by item to the cursor of `target`, keeping
/// inline formats. Falls back like [`insert_at`] when `target` rejects an item.
pub(crate) fn add_content(editor: &mut Editor, source: SlotId, target: SlotId) -> bool {
    if editor.doc.slot(source).is_empty() && !editor.doc.slot(target).is_empty() {
        return true;
    }
    let mut target = target;
    while let Some(first) = editor
        .doc
        .slot(source)
        .slice_content(..)
        .into_iter()
        .next()
    {
        let len = first.len();
        let piece = editor.doc.cut(source, 0..len);
        let formats = editor.doc.slot(piece).get_formats();
        editor.doc.retain(piece, 0);
        editor.doc.delete(piece, len);
        editor.doc.release_slot(piece);
        let index = editor.doc.slot(target).index();
        let Some(accepted) = insert_at(editor, target, index, first, false) else {
            return false;
        };
        target = accepted;
        let end = editor.doc.slot(target).index();
        let start = end - len;
        for format in formats.iter().filter(|f| !f.formatter.is_block()) {
            editor.doc.retain(target, start + format.start_index);
            editor.doc.retain_format(
                target,
                start + format.end_index,
                &format.formatter,
                Some(format.value.clone()),
            );
        }
        editor.doc.retain(target, end);
    }
    true
}
