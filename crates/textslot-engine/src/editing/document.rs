use std::ops::{Bound, RangeBounds};

use serde_json::Value;

use crate::editing::changes::{ChangeRecord, Operation};
use crate::models::{
    Component, ComponentId, ComponentRef, ContentItem, ContentType, FormatItem, FormatValue,
    Formatter, Slot, SlotId,
};

/// Arena holding the document tree.
///
/// Slots and components are addressed by copyable ids. Ownership runs
/// parent to child through the id lists (`Component::slots`, the component
/// items in `Slot` content); the `parent` back-links are only used for
/// navigation. Removing a node detaches it but keeps it in the arena, so a
/// later undo re-attaches the very same id. Scratch fragments that never
/// joined the tree are recycled through a free list instead.
///
/// Every mutation made through the `Document` on a node reachable from the
/// root is recorded as a [`ChangeRecord`] and marks the owning component
/// dirty. Detached fragments mutate silently.
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    free_slots: Vec<SlotId>,
    components: Vec<Component>,
    root: Option<ComponentId>,
    changes: Vec<ChangeRecord>,
    recording: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_slots: Vec::new(),
            components: Vec::new(),
            root: None,
            changes: Vec::new(),
            recording: true,
        }
    }

    pub fn root(&self) -> Option<ComponentId> {
        self.root
    }

    pub fn set_root(&mut self, component: ComponentId) {
        let node = &self.components[component.0];
        assert!(
            node.parent.is_none(),
            "root component {component:?} is still attached to {:?}",
            node.parent
        );
        self.root = Some(component);
        self.changes.clear();
    }

    pub fn slot(&self, id: SlotId) -> &Slot {
        &self.slots[id.0]
    }

    pub fn component(&self, id: ComponentId) -> &Component {
        &self.components[id.0]
    }

    pub fn component_ref(&self, id: ComponentId) -> ComponentRef {
        ComponentRef {
            id,
            content_type: self.components[id.0].content_type(),
        }
    }

    /// Reset the change marker of `component` after it has been rendered
    pub fn rendered(&mut self, component: ComponentId) {
        self.components[component.0].marker.rendered();
    }

    pub fn parent_component(&self, slot: SlotId) -> Option<ComponentId> {
        self.slots[slot.0].parent
    }

    pub fn parent_slot(&self, component: ComponentId) -> Option<SlotId> {
        self.components[component.0].parent
    }

    /// Position of `slot` within its owning component
    pub fn slot_position(&self, slot: SlotId) -> Option<usize> {
        let parent = self.slots[slot.0].parent?;
        self.components[parent.0]
            .slots
            .iter()
            .position(|s| *s == slot)
    }

    pub fn create_slot(&mut self, schema: impl Into<Vec<ContentType>>) -> SlotId {
        self.adopt_slot(Slot::new(schema))
    }

    /// Move a standalone slot into the arena
    pub fn adopt_slot(&mut self, mut slot: Slot) -> SlotId {
        let id = self.free_slots.pop().unwrap_or(SlotId(self.slots.len()));
        slot.parent = None;
        for component in slot.components() {
            self.components[component.0].parent = Some(id);
        }
        if id.0 == self.slots.len() {
            self.slots.push(slot);
        } else {
            self.slots[id.0] = slot;
        }
        id
    }

    /// Hand an emptied scratch slot (a [`Document::cut`] fragment whose
    /// content has been moved on) back to the arena for reuse.
    ///
    /// The id must not be used afterwards. Attached or non-empty slots are
    /// ignored.
    pub(crate) fn release_slot(&mut self, slot: SlotId) {
        let node = &self.slots[slot.0];
        if node.parent.is_some() || !node.is_empty() || self.free_slots.contains(&slot) {
            return;
        }
        log::trace!("recycle fragment slot {slot:?}");
        self.free_slots.push(slot);
    }

    /// Number of slots allocated in the arena, recycled ones included
    pub fn slot_capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn create_component(
        &mut self,
        name: &str,
        content_type: ContentType,
        state: Value,
    ) -> ComponentId {
        let id = ComponentId(self.components.len());
        self.components
            .push(Component::new(name, content_type, state));
        id
    }

    /// Hand freshly built slots to a component under construction
    pub(crate) fn attach_slots(&mut self, component: ComponentId, slots: Vec<SlotId>) {
        for slot in &slots {
            let node = &mut self.slots[slot.0];
            assert!(
                node.parent.is_none() || node.parent == Some(component),
                "slot {slot:?} already belongs to {:?}",
                node.parent
            );
            node.parent = Some(component);
        }
        self.components[component.0].slots = slots;
    }

    // ============ Slot mutations ============

    /// Move the cursor of `slot`
    pub fn retain(&mut self, slot: SlotId, index: usize) -> bool {
        self.slots[slot.0].retain(index)
    }

    /// Apply or clear `formatter` between the cursor and `index`
    pub fn retain_format(
        &mut self,
        slot: SlotId,
        index: usize,
        formatter: &Formatter,
        value: Option<FormatValue>,
    ) -> bool {
        let node = &self.slots[slot.0];
        if index > node.len() {
            return false;
        }
        let (start, end) = if formatter.is_block() {
            (0, node.len())
        } else {
            (node.index().min(index), node.index().max(index))
        };

        let mut unapply = vec![
            Operation::retain(start),
            Operation::retain_format(end, formatter, None),
        ];
        if formatter.is_block() {
            if let Some(old) = node.block_value(formatter) {
                unapply[1] = Operation::retain_format(end, formatter, Some(old.clone()));
            }
        } else {
            for range in node.get_format_ranges_by_formatter(formatter, start..end) {
                unapply.push(Operation::retain(range.start_index));
                unapply.push(Operation::retain_format(
                    range.end_index,
                    formatter,
                    Some(range.value),
                ));
            }
        }
        let apply = vec![
            Operation::retain(start),
            Operation::retain_format(end, formatter, value.clone()),
        ];

        self.slots[slot.0].retain_format(index, formatter, value);
        self.record_slot(slot, apply, unapply);
        true
    }

    /// Insert at the cursor without extending format runs
    pub fn insert(&mut self, slot: SlotId, item: impl Into<ContentItem>) -> bool {
        self.insert_item(slot, item.into(), false)
    }

    /// Insert at the cursor; text inherits the format runs it continues
    pub fn write(&mut self, slot: SlotId, item: impl Into<ContentItem>) -> bool {
        self.insert_item(slot, item.into(), true)
    }

    fn insert_item(&mut self, slot: SlotId, item: ContentItem, expand: bool) -> bool {
        let node = &self.slots[slot.0];
        if !node.accepts(item.content_type()) || item.is_empty() {
            return false;
        }

        if let ContentItem::Component(component) = &item {
            assert!(
                Some(component.id) != self.root,
                "the root component cannot be inserted into a slot"
            );
            // a component lives in one slot at a time
            if let Some(previous) = self.components[component.id.0].parent {
                let cursor = self.slots[slot.0].index();
                let position = self.slots[previous.0].index_of(component.id);
                self.detach_component(component.id);
                let cursor = match position {
                    Some(position) if previous == slot && position < cursor => cursor - 1,
                    _ => cursor,
                };
                self.slots[slot.0].retain(cursor);
            }
        }

        let index = self.slots[slot.0].index();
        let len = item.len();
        let node = &mut self.slots[slot.0];
        let inserted = if expand {
            node.write(item.clone())
        } else {
            node.insert(item.clone())
        };
        if !inserted {
            return false;
        }
        if let ContentItem::Component(component) = &item {
            self.components[component.id.0].parent = Some(slot);
        }

        let formats = formats_within(&self.slots[slot.0], index, index + len);
        self.record_slot(
            slot,
            vec![
                Operation::retain(index),
                Operation::Insert {
                    content: item,
                    formats,
                },
            ],
            vec![Operation::retain(index), Operation::Delete { count: len }],
        );
        true
    }

    /// Remove `count` units forward from the cursor; the cursor stays put
    pub fn delete(&mut self, slot: SlotId, count: usize) -> bool {
        let index = self.slots[slot.0].index();
        let end = (index + count).min(self.slots[slot.0].len());
        if end == index {
            return false;
        }
        let fragment = self.remove_range(slot, index, end);
        for component in fragment.components() {
            self.components[component.0].parent = None;
        }
        true
    }

    /// Remove `range` from `slot` into a new detached slot and return its id.
    ///
    /// Components inside the range move with it. `cut(slot, ..)` empties the
    /// slot.
    pub fn cut(&mut self, slot: SlotId, range: impl RangeBounds<usize>) -> SlotId {
        let len = self.slots[slot.0].len();
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s + 1,
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&e) => e + 1,
            Bound::Excluded(&e) => e,
            Bound::Unbounded => len,
        };
        let end = end.min(len);
        let start = start.min(end);
        let fragment = self.remove_range(slot, start, end);
        self.adopt_slot(fragment)
    }

    fn remove_range(&mut self, slot: SlotId, start: usize, end: usize) -> Slot {
        let fragment = self.slots[slot.0].cut(start..end);
        if start < end {
            let mut unapply = vec![Operation::retain(start)];
            unapply.extend(insert_ops(&fragment));
            self.record_slot(
                slot,
                vec![
                    Operation::retain(start),
                    Operation::Delete { count: end - start },
                ],
                unapply,
            );
        }
        fragment
    }

    /// Remove `component` from the slot holding it. Detached components are left alone.
    ///
    /// # Panics
    ///
    /// When the component's parent slot does not actually contain it.
    pub fn remove_component(&mut self, component: ComponentId) {
        if self.components[component.0].parent.is_some() {
            self.detach_component(component);
        }
    }

    fn detach_component(&mut self, component: ComponentId) {
        let Some(parent) = self.components[component.0].parent else {
            return;
        };
        let Some(index) = self.slots[parent.0].index_of(component) else {
            panic!("component {component:?} is not a child of its parent slot {parent:?}");
        };
        self.slots[parent.0].retain(index);
        self.delete(parent, 1);
    }

    // ============ Component mutations ============

    /// Insert `slot` into `component` at `index`
    pub fn insert_slot(&mut self, component: ComponentId, index: usize, slot: SlotId) {
        assert!(
            self.slots[slot.0].parent.is_none(),
            "slot {slot:?} is still attached to {:?}",
            self.slots[slot.0].parent
        );
        let index = index.min(self.components[component.0].slots.len());
        self.components[component.0].slots.insert(index, slot);
        self.slots[slot.0].parent = Some(component);
        self.record_component(
            component,
            vec![Operation::InsertSlot { index, slot }],
            vec![Operation::RemoveSlot { index, slot }],
        );
    }

    /// # Panics
    ///
    /// When `slot` is not one of `component`'s slots.
    pub fn remove_slot(&mut self, component: ComponentId, slot: SlotId) {
        let Some(index) = self.components[component.0]
            .slots
            .iter()
            .position(|s| *s == slot)
        else {
            panic!("slot {slot:?} is not a child of component {component:?}");
        };
        self.components[component.0].slots.remove(index);
        self.slots[slot.0].parent = None;
        self.record_component(
            component,
            vec![Operation::RemoveSlot { index, slot }],
            vec![Operation::InsertSlot { index, slot }],
        );
    }

    pub fn set_state(&mut self, component: ComponentId, state: Value) {
        let old = std::mem::replace(&mut self.components[component.0].state, state.clone());
        self.record_component(
            component,
            vec![Operation::Apply { state }],
            vec![Operation::Apply { state: old }],
        );
    }

    // ============ Paths ============

    /// Route from the root to `slot`, `None` when the slot is detached
    pub fn slot_path(&self, slot: SlotId) -> Option<Vec<usize>> {
        let parent = self.slots[slot.0].parent?;
        let mut path = self.component_path(parent)?;
        path.push(self.slot_position(slot)?);
        Some(path)
    }

    /// Route from the root to `component`, `None` when it is detached
    pub fn component_path(&self, component: ComponentId) -> Option<Vec<usize>> {
        if Some(component) == self.root {
            return Some(Vec::new());
        }
        let parent = self.components[component.0].parent?;
        let mut path = self.slot_path(parent)?;
        path.push(self.slots[parent.0].index_of(component)?);
        Some(path)
    }

    pub fn resolve_slot(&self, path: &[usize]) -> Option<SlotId> {
        if path.len() % 2 == 0 {
            return None;
        }
        let (last, rest) = path.split_last()?;
        let component = self.resolve_component(rest)?;
        self.components[component.0].slots.get(*last).copied()
    }

    pub fn resolve_component(&self, path: &[usize]) -> Option<ComponentId> {
        let mut component = self.root?;
        for pair in path.chunks(2) {
            let [slot_index, content_index] = pair else {
                return None;
            };
            let slot = *self.components[component.0].slots.get(*slot_index)?;
            component = self.slots[slot.0]
                .get_content_at_index(*content_index)?
                .component()?;
        }
        Some(component)
    }

    // ============ Change recording ============

    /// Drain the records collected since the last call
    pub fn take_changes(&mut self) -> Vec<ChangeRecord> {
        std::mem::take(&mut self.changes)
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Replay `ops` at `path` without recording them.
    ///
    /// Used by undo (with a record's `unapply`) and redo (with its `apply`).
    pub fn replay(&mut self, path: &[usize], ops: &[Operation]) {
        let recording = std::mem::replace(&mut self.recording, false);
        if path.len() % 2 == 1 {
            match self.resolve_slot(path) {
                Some(slot) => self.replay_slot(slot, ops),
                None => log::warn!("cannot resolve slot path {path:?} while replaying"),
            }
        } else {
            match self.resolve_component(path) {
                Some(component) => self.replay_component(component, ops),
                None => log::warn!("cannot resolve component path {path:?} while replaying"),
            }
        }
        self.recording = recording;
    }

    fn replay_slot(&mut self, slot: SlotId, ops: &[Operation]) {
        for op in ops {
            match op {
                Operation::Retain {
                    index,
                    format: None,
                } => {
                    self.retain(slot, *index);
                }
                Operation::Retain {
                    index,
                    format: Some(format),
                } => {
                    self.retain_format(slot, *index, &format.formatter, format.value.clone());
                }
                Operation::Insert { content, formats } => {
                    let at = self.slots[slot.0].index();
                    self.insert(slot, content.clone());
                    for format in formats {
                        self.retain(slot, at + format.start_index);
                        self.retain_format(
                            slot,
                            at + format.end_index,
                            &format.formatter,
                            Some(format.value.clone()),
                        );
                    }
                    self.retain(slot, at + content.len());
                }
                Operation::Delete { count } => {
                    self.delete(slot, *count);
                }
                other => log::warn!("component operation {other:?} replayed on slot {slot:?}"),
            }
        }
    }

    fn replay_component(&mut self, component: ComponentId, ops: &[Operation]) {
        for op in ops {
            match op {
                Operation::Apply { state } => self.set_state(component, state.clone()),
                Operation::InsertSlot { index, slot } => self.insert_slot(component, *index, *slot),
                Operation::RemoveSlot { slot, .. } => self.remove_slot(component, *slot),
                other => {
                    log::warn!("slot operation {other:?} replayed on component {component:?}")
                }
            }
        }
    }

    fn record_slot(&mut self, slot: SlotId, apply: Vec<Operation>, unapply: Vec<Operation>) {
        let Some(owner) = self.slots[slot.0].parent else {
            return;
        };
        let Some(path) = self.slot_path(slot) else {
            return;
        };
        self.mark_dirty(owner);
        self.push_record(path, apply, unapply);
    }

    fn record_component(
        &mut self,
        component: ComponentId,
        apply: Vec<Operation>,
        unapply: Vec<Operation>,
    ) {
        let Some(path) = self.component_path(component) else {
            return;
        };
        self.mark_dirty(component);
        self.push_record(path, apply, unapply);
    }

    fn push_record(&mut self, path: Vec<usize>, apply: Vec<Operation>, unapply: Vec<Operation>) {
        if !self.recording {
            return;
        }
        log::trace!("record {path:?}: {apply:?}");
        self.changes.push(ChangeRecord {
            path,
            apply,
            unapply,
        });
    }

    fn mark_dirty(&mut self, component: ComponentId) {
        self.components[component.0].marker.mark_dirty();
        let mut current = self.components[component.0].parent;
        while let Some(slot) = current {
            let Some(owner) = self.slots[slot.0].parent else {
                break;
            };
            self.components[owner.0].marker.mark_changed();
            current = self.components[owner.0].parent;
        }
    }
}

/// Inline formats over `[start, end)`, re-based to `start`
fn formats_within(slot: &Slot, start: usize, end: usize) -> Vec<FormatItem> {
    slot.get_formats()
        .into_iter()
        .filter(|f| !f.formatter.is_block() && f.start_index < end && f.end_index > start)
        .map(|f| FormatItem {
            start_index: f.start_index.max(start) - start,
            end_index: f.end_index.min(end) - start,
            ..f
        })
        .collect()
}

/// Inserts that rebuild `fragment`'s content and inline formats item by item
fn insert_ops(fragment: &Slot) -> Vec<Operation> {
    let mut offset = 0;
    fragment
        .slice_content(..)
        .into_iter()
        .map(|content| {
            let len = content.len();
            let formats = formats_within(fragment, offset, offset + len);
            offset += len;
            Operation::Insert { content, formats }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    /// root -> [root slot] -> paragraph -> [text slot]
    fn tree() -> (Document, ComponentId, SlotId, ComponentId, SlotId) {
        let mut doc = Document::new();
        let root = doc.create_component("RootComponent", ContentType::BlockComponent, Value::Null);
        let root_slot = doc.create_slot([ContentType::BlockComponent]);
        doc.attach_slots(root, vec![root_slot]);
        doc.set_root(root);

        let paragraph =
            doc.create_component("ParagraphComponent", ContentType::BlockComponent, Value::Null);
        let text = doc.create_slot([ContentType::Text, ContentType::InlineComponent]);
        doc.attach_slots(paragraph, vec![text]);
        doc.insert(root_slot, doc.component_ref(paragraph));
        doc.take_changes();
        (doc, root, root_slot, paragraph, text)
    }

    fn undo(doc: &mut Document, records: &[ChangeRecord]) {
        for record in records.iter().rev() {
            doc.replay(&record.path, &record.unapply);
        }
    }

    fn redo(doc: &mut Document, records: &[ChangeRecord]) {
        for record in records {
            doc.replay(&record.path, &record.apply);
        }
    }

    // ============ Path tests ============

    #[test]
    fn test_paths_alternate_slot_and_content_indexes() {
        let (doc, root, root_slot, paragraph, text) = tree();

        assert_eq!(doc.component_path(root), Some(vec![]));
        assert_eq!(doc.slot_path(root_slot), Some(vec![0]));
        assert_eq!(doc.component_path(paragraph), Some(vec![0, 0]));
        assert_eq!(doc.slot_path(text), Some(vec![0, 0, 0]));

        assert_eq!(doc.resolve_slot(&[0, 0, 0]), Some(text));
        assert_eq!(doc.resolve_component(&[0, 0]), Some(paragraph));
        assert_eq!(doc.resolve_slot(&[0, 1, 0]), None);
    }

    #[test]
    fn test_detached_nodes_have_no_path() {
        let (mut doc, _, _, paragraph, text) = tree();
        doc.remove_component(paragraph);

        assert_eq!(doc.component(paragraph).parent(), None);
        assert_eq!(doc.slot_path(text), None);
    }

    // ============ Recording tests ============

    #[test]
    fn test_only_reachable_mutations_are_recorded() {
        let (mut doc, _, _, _, text) = tree();
        let loose = doc.create_slot([ContentType::Text]);
        doc.insert(loose, "ignored");
        assert!(!doc.has_changes());

        doc.insert(text, "kept");
        let changes = doc.take_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, vec![0, 0, 0]);
    }

    #[test]
    fn test_mutation_marks_owner_dirty_and_ancestors_changed() {
        let (mut doc, root, _, paragraph, text) = tree();
        doc.rendered(root);
        doc.rendered(paragraph);

        doc.insert(text, "x");

        assert!(doc.component(paragraph).marker().is_dirty());
        assert!(!doc.component(root).marker().is_dirty());
        assert!(doc.component(root).marker().is_changed());
    }

    #[test]
    fn test_undo_redo_of_delete_restores_formats() {
        let (mut doc, _, _, _, text) = tree();
        let bold = Formatter::inline("bold");
        doc.insert(text, "hello world");
        doc.retain(text, 0);
        doc.retain_format(text, 5, &bold, Some(json!(true)));
        doc.take_changes();

        doc.retain(text, 3);
        doc.delete(text, 5);
        let records = doc.take_changes();
        assert_eq!(doc.slot(text).text(), "helrld");

        undo(&mut doc, &records);
        assert_eq!(doc.slot(text).text(), "hello world");
        assert_eq!(
            doc.slot(text).get_format_ranges_by_formatter(&bold, ..),
            vec![crate::models::FormatRange::new(0, 5, json!(true))]
        );
        assert!(!doc.has_changes());

        redo(&mut doc, &records);
        assert_eq!(doc.slot(text).text(), "helrld");
    }

    #[test]
    fn test_undo_of_format_restores_previous_ranges() {
        let (mut doc, _, _, _, text) = tree();
        let color = Formatter::inline("color");
        doc.insert(text, "abcdef");
        doc.retain(text, 0);
        doc.retain_format(text, 4, &color, Some(json!("red")));
        doc.take_changes();

        doc.retain(text, 2);
        doc.retain_format(text, 6, &color, Some(json!("blue")));
        let records = doc.take_changes();
        undo(&mut doc, &records);

        assert_eq!(
            doc.slot(text).get_format_ranges_by_formatter(&color, ..),
            vec![crate::models::FormatRange::new(0, 4, json!("red"))]
        );
    }

    #[test]
    fn test_undo_reattaches_removed_component() {
        let (mut doc, _, root_slot, paragraph, text) = tree();
        doc.remove_component(paragraph);
        let records = doc.take_changes();
        assert!(doc.slot(root_slot).is_empty());

        undo(&mut doc, &records);
        assert_eq!(doc.slot(root_slot).index_of(paragraph), Some(0));
        assert_eq!(doc.component(paragraph).parent(), Some(root_slot));
        assert_eq!(doc.slot_path(text), Some(vec![0, 0, 0]));
    }

    #[test]
    fn test_slot_and_state_changes_are_invertible() {
        let (mut doc, _, _, paragraph, text) = tree();
        let extra = doc.create_slot([ContentType::Text]);
        doc.insert_slot(paragraph, 1, extra);
        doc.set_state(paragraph, json!({"level": 2}));
        doc.remove_slot(paragraph, text);
        let records = doc.take_changes();
        assert_eq!(doc.component(paragraph).slots(), &[extra]);

        undo(&mut doc, &records);
        assert_eq!(doc.component(paragraph).slots(), &[text]);
        assert_eq!(doc.component(paragraph).state(), &Value::Null);
        assert_eq!(doc.slot(extra).parent(), None);
    }

    // ============ Structure tests ============

    #[test]
    fn test_cut_reparents_components_into_fragment() {
        let (mut doc, _, _, _, text) = tree();
        let image = doc.create_component("ImageComponent", ContentType::InlineComponent, Value::Null);
        doc.insert(text, "ab");
        doc.insert(text, doc.component_ref(image));
        doc.insert(text, "cd");

        let fragment = doc.cut(text, 1..4);

        assert_eq!(doc.slot(text).text(), "ad");
        assert_eq!(doc.slot(fragment).text(), "bc");
        assert_eq!(doc.component(image).parent(), Some(fragment));
        assert_eq!(doc.slot(fragment).parent(), None);
    }

    #[test]
    fn test_inserting_attached_component_moves_it() {
        let (mut doc, _, _, _, text) = tree();
        let image = doc.create_component("ImageComponent", ContentType::InlineComponent, Value::Null);
        doc.insert(text, "abc");
        doc.retain(text, 1);
        doc.insert(text, doc.component_ref(image));

        doc.retain(text, 4);
        doc.insert(text, doc.component_ref(image));

        assert_eq!(doc.slot(text).text(), "abc");
        assert_eq!(doc.slot(text).index_of(image), Some(3));
        assert_eq!(doc.slot(text).len(), 4);
    }

    #[test]
    #[should_panic(expected = "is not a child of its parent slot")]
    fn test_removing_component_from_wrong_parent_panics() {
        let (mut doc, _, _, _, text) = tree();
        let image = doc.create_component("ImageComponent", ContentType::InlineComponent, Value::Null);
        doc.components[image.0].parent = Some(text);
        doc.remove_component(image);
    }

    // ============ Arena tests ============

    #[test]
    fn test_released_fragment_is_reused() {
        let (mut doc, _, _, _, text) = tree();
        doc.insert(text, "abc");
        let fragment = doc.cut(text, 1..2);
        let capacity = doc.slot_capacity();

        doc.retain(fragment, 0);
        doc.delete(fragment, 1);
        doc.release_slot(fragment);
        let reused = doc.cut(text, 0..1);

        assert_eq!(reused, fragment);
        assert_eq!(doc.slot_capacity(), capacity);
        assert_eq!(doc.slot(reused).text(), "a");
    }

    #[test]
    fn test_release_ignores_attached_and_non_empty_slots() {
        let (mut doc, _, root_slot, _, text) = tree();
        doc.insert(text, "abc");
        let fragment = doc.cut(text, 1..2);

        doc.release_slot(root_slot);
        doc.release_slot(fragment);
        let fresh = doc.create_slot([ContentType::Text]);

        assert_ne!(fresh, root_slot);
        assert_ne!(fresh, fragment);
        assert_eq!(doc.slot(fragment).text(), "b");
    }
}
