//! Selection over the document tree.
//!
//! A selection holds two [`Location`]s. Locations are ordered by their tree
//! key: the slot's path from the root followed by the offset, compared
//! lexicographically with a shorter prefix first. With that order a caret in
//! a parent slot at offset `i` sits before everything inside the component at
//! `i`, and offset `i + 1` sits after it.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::editing::document::Document;
use crate::models::{ComponentId, ContentType, SlotId};

/// A caret position: an offset inside a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    pub slot: SlotId,
    pub offset: usize,
}

impl Location {
    pub fn new(slot: SlotId, offset: usize) -> Self {
        Self { slot, offset }
    }
}

/// Both endpoints of a selection, as captured by history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectionRange {
    pub start: Location,
    pub end: Location,
}

/// A `[start_index, end_index)` span within one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectedScope {
    pub slot: SlotId,
    pub start_index: usize,
    pub end_index: usize,
}

impl SelectedScope {
    pub fn new(slot: SlotId, start_index: usize, end_index: usize) -> Self {
        Self {
            slot,
            start_index,
            end_index,
        }
    }

    fn whole(doc: &Document, slot: SlotId) -> Self {
        Self::new(slot, 0, doc.slot(slot).len())
    }
}

/// Hook that may replace the geometric scope decomposition, e.g. with a
/// rectangular cell selection. The first middleware returning `Some` wins.
pub trait SelectionMiddleware {
    fn get_selected_scopes(
        &self,
        doc: &Document,
        selection: &Selection,
    ) -> Option<Vec<SelectedScope>>;
}

#[derive(Clone, Default)]
pub struct Selection {
    start: Option<Location>,
    end: Option<Location>,
    middlewares: Vec<Rc<dyn SelectionMiddleware>>,
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    pub fn is_collapsed(&self) -> bool {
        self.is_selected() && self.start == self.end
    }

    pub fn start(&self) -> Option<Location> {
        self.start
    }

    pub fn end(&self) -> Option<Location> {
        self.end
    }

    pub fn start_slot(&self) -> Option<SlotId> {
        self.start.map(|l| l.slot)
    }

    pub fn start_offset(&self) -> Option<usize> {
        self.start.map(|l| l.offset)
    }

    pub fn end_slot(&self) -> Option<SlotId> {
        self.end.map(|l| l.slot)
    }

    pub fn end_offset(&self) -> Option<usize> {
        self.end.map(|l| l.offset)
    }

    pub fn range(&self) -> Option<SelectionRange> {
        Some(SelectionRange {
            start: self.start?,
            end: self.end?,
        })
    }

    pub fn restore(&mut self, range: Option<SelectionRange>) {
        self.start = range.map(|r| r.start);
        self.end = range.map(|r| r.end);
    }

    pub fn add_middleware(&mut self, middleware: Rc<dyn SelectionMiddleware>) {
        self.middlewares.push(middleware);
    }

    pub fn set_start(&mut self, doc: &Document, slot: SlotId, offset: usize) {
        self.start = Some(Location::new(slot, offset));
        if self.end.is_none() {
            self.end = self.start;
        }
        self.normalize(doc);
    }

    pub fn set_end(&mut self, doc: &Document, slot: SlotId, offset: usize) {
        self.end = Some(Location::new(slot, offset));
        if self.start.is_none() {
            self.start = self.end;
        }
        self.normalize(doc);
    }

    /// Collapse both endpoints onto one location
    pub fn set_location(&mut self, slot: SlotId, offset: usize) {
        self.start = Some(Location::new(slot, offset));
        self.end = self.start;
    }

    /// Collapse onto the start, or onto the end with `to_end`
    pub fn collapse(&mut self, to_end: bool) {
        if to_end {
            self.start = self.end;
        } else {
            self.end = self.start;
        }
    }

    pub fn unselect(&mut self) {
        self.start = None;
        self.end = None;
    }

    fn normalize(&mut self, doc: &Document) {
        if let (Some(start), Some(end)) = (self.start, self.end)
            && compare_locations(doc, start, end) == Ordering::Greater
        {
            self.start = Some(end);
            self.end = Some(start);
        }
    }

    /// Lowest slot containing both endpoints.
    ///
    /// `None` either when nothing is selected or when the endpoints sit in
    /// different slots of the root component, whose common ancestor lies
    /// above any slot.
    pub fn common_ancestor_slot(&self, doc: &Document) -> Option<SlotId> {
        let start = slot_chain(doc, self.start?.slot);
        let end = slot_chain(doc, self.end?.slot);
        start.into_iter().find(|slot| end.contains(slot))
    }

    /// Lowest component containing both endpoints
    pub fn common_ancestor_component(&self, doc: &Document) -> Option<ComponentId> {
        let start = component_chain(doc, self.start?.slot);
        let end = component_chain(doc, self.end?.slot);
        start.into_iter().find(|component| end.contains(component))
    }

    /// Decompose the selection into per-slot spans in document order.
    ///
    /// Selection middlewares are consulted first. The geometric decomposition
    /// yields nothing for a collapsed selection, skips empty partial spans at
    /// either end and keeps whole intermediate slots even when they are empty.
    pub fn get_selected_scopes(&self, doc: &Document) -> Vec<SelectedScope> {
        for middleware in &self.middlewares {
            if let Some(scopes) = middleware.get_selected_scopes(doc, self) {
                return scopes;
            }
        }
        self.geometric_scopes(doc)
    }

    fn geometric_scopes(&self, doc: &Document) -> Vec<SelectedScope> {
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return Vec::new();
        };
        if start == end {
            return Vec::new();
        }
        if start.slot == end.slot {
            return vec![SelectedScope::new(start.slot, start.offset, end.offset)];
        }

        let common = self.common_ancestor_slot(doc);
        let mut scopes = Vec::new();

        let mut top_start = None;
        if Some(start.slot) != common {
            push_partial(&mut scopes, start.slot, start.offset, doc.slot(start.slot).len());
            let mut current = start.slot;
            while let Some(component) = doc.parent_component(current) {
                let parent_slot = doc.parent_slot(component);
                if parent_slot == common {
                    top_start = Some((component, current));
                    break;
                }
                let slots = doc.component(component).slots();
                let position = doc.slot_position(current).unwrap_or(slots.len());
                for slot in slots.iter().skip(position + 1) {
                    scopes.push(SelectedScope::whole(doc, *slot));
                }
                let Some(parent_slot) = parent_slot else {
                    break;
                };
                let index = doc.slot(parent_slot).index_of(component).unwrap_or(0);
                push_partial(&mut scopes, parent_slot, index + 1, doc.slot(parent_slot).len());
                current = parent_slot;
            }
        }

        // end branch, innermost first
        let mut tail = Vec::new();
        let mut top_end = None;
        if Some(end.slot) != common {
            push_partial(&mut tail, end.slot, 0, end.offset);
            let mut current = end.slot;
            while let Some(component) = doc.parent_component(current) {
                let parent_slot = doc.parent_slot(component);
                if parent_slot == common {
                    top_end = Some((component, current));
                    break;
                }
                let slots = doc.component(component).slots();
                let position = doc.slot_position(current).unwrap_or(0);
                for slot in slots[..position].iter().rev() {
                    tail.push(SelectedScope::whole(doc, *slot));
                }
                let Some(parent_slot) = parent_slot else {
                    break;
                };
                let index = doc.slot(parent_slot).index_of(component).unwrap_or(0);
                push_partial(&mut tail, parent_slot, 0, index);
                current = parent_slot;
            }
        }

        match (top_start, top_end) {
            (Some((a, from)), Some((b, to))) if a == b => {
                let slots = doc.component(a).slots();
                let first = doc.slot_position(from).unwrap_or(0) + 1;
                let last = doc.slot_position(to).unwrap_or(0);
                for slot in slots.iter().take(last).skip(first) {
                    scopes.push(SelectedScope::whole(doc, *slot));
                }
            }
            _ => {
                if let Some((component, from)) = top_start {
                    let position = doc.slot_position(from).unwrap_or(0);
                    for slot in doc.component(component).slots().iter().skip(position + 1) {
                        scopes.push(SelectedScope::whole(doc, *slot));
                    }
                }
                if let Some(common) = common {
                    let from = match top_start {
                        Some((component, _)) => {
                            doc.slot(common).index_of(component).unwrap_or(0) + 1
                        }
                        None => start.offset,
                    };
                    let to = match top_end {
                        Some((component, _)) => doc.slot(common).index_of(component).unwrap_or(0),
                        None => end.offset,
                    };
                    push_partial(&mut scopes, common, from, to);
                }
                if let Some((component, to)) = top_end {
                    let position = doc.slot_position(to).unwrap_or(0);
                    for slot in doc.component(component).slots().iter().take(position) {
                        scopes.push(SelectedScope::whole(doc, *slot));
                    }
                }
            }
        }

        scopes.extend(tail.into_iter().rev());
        scopes
    }

    /// Whole slots touched by the selection, for block formatting.
    ///
    /// Block components inside a scope are replaced by their own slots; a
    /// collapsed selection yields the caret's slot.
    pub fn get_blocks(&self, doc: &Document) -> Vec<SelectedScope> {
        let Some(start) = self.start else {
            return Vec::new();
        };
        if self.is_collapsed() {
            return vec![SelectedScope::whole(doc, start.slot)];
        }
        let mut blocks = Vec::new();
        for scope in self.get_selected_scopes(doc) {
            collect_blocks(doc, scope.slot, scope.start_index, scope.end_index, &mut blocks);
        }
        blocks
    }

    pub fn get_previous_location(&self, doc: &Document) -> Option<Location> {
        let start = self.start?;
        previous_location(doc, start.slot, start.offset)
    }

    pub fn get_next_location(&self, doc: &Document) -> Option<Location> {
        let end = self.end?;
        next_location(doc, end.slot, end.offset)
    }
}

fn push_partial(scopes: &mut Vec<SelectedScope>, slot: SlotId, start: usize, end: usize) {
    if start < end {
        scopes.push(SelectedScope::new(slot, start, end));
    }
}

fn collect_blocks(
    doc: &Document,
    slot: SlotId,
    start: usize,
    end: usize,
    blocks: &mut Vec<SelectedScope>,
) {
    let items = doc.slot(slot).slice_content(start..end);
    let mut holds_inline = items.is_empty();
    for item in items {
        match item.component() {
            Some(component)
                if doc.component(component).content_type() == ContentType::BlockComponent
                    && !doc.component(component).slots().is_empty() =>
            {
                for child in doc.component(component).slots() {
                    collect_blocks(doc, *child, 0, doc.slot(*child).len(), blocks);
                }
            }
            _ => holds_inline = true,
        }
    }
    if holds_inline && !blocks.iter().any(|b| b.slot == slot) {
        blocks.push(SelectedScope::whole(doc, slot));
    }
}

/// `slot` followed by every enclosing slot up to the root
fn slot_chain(doc: &Document, slot: SlotId) -> Vec<SlotId> {
    let mut chain = vec![slot];
    let mut current = slot;
    while let Some(parent) = doc
        .parent_component(current)
        .and_then(|component| doc.parent_slot(component))
    {
        chain.push(parent);
        current = parent;
    }
    chain
}

/// Every component enclosing `slot`, innermost first
fn component_chain(doc: &Document, slot: SlotId) -> Vec<ComponentId> {
    let mut chain = Vec::new();
    let mut current = doc.parent_component(slot);
    while let Some(component) = current {
        chain.push(component);
        current = doc
            .parent_slot(component)
            .and_then(|slot| doc.parent_component(slot));
    }
    chain
}

/// Document order of two locations. Detached locations compare equal.
pub fn compare_locations(doc: &Document, a: Location, b: Location) -> Ordering {
    match (doc.slot_path(a.slot), doc.slot_path(b.slot)) {
        (Some(mut left), Some(mut right)) => {
            left.push(a.offset);
            right.push(b.offset);
            left.cmp(&right)
        }
        _ => Ordering::Equal,
    }
}

/// Deepest leading caret position inside `slot`
pub fn find_first_location(doc: &Document, slot: SlotId) -> Location {
    if let Some(component) = doc
        .slot(slot)
        .get_content_at_index(0)
        .and_then(|item| item.component())
        && let Some(first) = doc.component(component).slots().first()
    {
        return find_first_location(doc, *first);
    }
    Location::new(slot, 0)
}

/// Deepest trailing caret position inside `slot`
pub fn find_last_location(doc: &Document, slot: SlotId) -> Location {
    let len = doc.slot(slot).len();
    if len > 0
        && let Some(component) = doc
            .slot(slot)
            .get_content_at_index(len - 1)
            .and_then(|item| item.component())
        && let Some(last) = doc.component(component).slots().last()
    {
        return find_last_location(doc, *last);
    }
    Location::new(slot, len)
}

/// Caret position one step before `(slot, offset)` in document order
pub fn previous_location(doc: &Document, slot: SlotId, offset: usize) -> Option<Location> {
    let (mut slot, mut offset) = (slot, offset);
    loop {
        if offset > 0 {
            let item = doc.slot(slot).get_content_at_index(offset - 1)?;
            if let Some(component) = item.component()
                && let Some(last) = doc.component(component).slots().last()
            {
                return Some(find_last_location(doc, *last));
            }
            return Some(Location::new(slot, offset - 1));
        }

        let component = doc.parent_component(slot)?;
        let position = doc.slot_position(slot)?;
        if position > 0 {
            let previous = doc.component(component).slots()[position - 1];
            return Some(find_last_location(doc, previous));
        }
        let parent_slot = doc.parent_slot(component)?;
        let index = doc.slot(parent_slot).index_of(component)?;
        if doc.slot(parent_slot).accepts(ContentType::Text) {
            return Some(Location::new(parent_slot, index));
        }
        slot = parent_slot;
        offset = index;
    }
}

/// Caret position one step after `(slot, offset)` in document order
pub fn next_location(doc: &Document, slot: SlotId, offset: usize) -> Option<Location> {
    let (mut slot, mut offset) = (slot, offset);
    loop {
        if offset < doc.slot(slot).len() {
            let item = doc.slot(slot).get_content_at_index(offset)?;
            if let Some(component) = item.component()
                && let Some(first) = doc.component(component).slots().first()
            {
                return Some(find_first_location(doc, *first));
            }
            return Some(Location::new(slot, offset + 1));
        }

        let component = doc.parent_component(slot)?;
        let position = doc.slot_position(slot)?;
        if let Some(next) = doc.component(component).slots().get(position + 1) {
            return Some(find_first_location(doc, *next));
        }
        let parent_slot = doc.parent_slot(component)?;
        let index = doc.slot(parent_slot).index_of(component)? + 1;
        if doc.slot(parent_slot).accepts(ContentType::Text) {
            return Some(Location::new(parent_slot, index));
        }
        slot = parent_slot;
        offset = index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    const TEXT: [ContentType; 2] = [ContentType::Text, ContentType::InlineComponent];

    struct Tree {
        doc: Document,
        root_slot: SlotId,
        p1: SlotId,
        list: ComponentId,
        items: [SlotId; 2],
        p2: SlotId,
    }

    fn block(doc: &mut Document, parent: SlotId, name: &str, texts: &[&str]) -> (ComponentId, Vec<SlotId>) {
        let component = doc.create_component(name, ContentType::BlockComponent, Value::Null);
        let slots: Vec<SlotId> = texts
            .iter()
            .map(|text| {
                let slot = doc.create_slot(TEXT);
                doc.insert(slot, *text);
                slot
            })
            .collect();
        doc.attach_slots(component, slots.clone());
        doc.insert(parent, doc.component_ref(component));
        (component, slots)
    }

    /// root slot: [P1 "hello"] [List "ab" | "cd"] [P2 "world"]
    fn tree() -> Tree {
        let mut doc = Document::new();
        let root = doc.create_component("RootComponent", ContentType::BlockComponent, Value::Null);
        let root_slot = doc.create_slot([ContentType::BlockComponent]);
        doc.attach_slots(root, vec![root_slot]);
        doc.set_root(root);

        let (_, p1) = block(&mut doc, root_slot, "ParagraphComponent", &["hello"]);
        let (list, items) = block(&mut doc, root_slot, "ListComponent", &["ab", "cd"]);
        let (_, p2) = block(&mut doc, root_slot, "ParagraphComponent", &["world"]);
        Tree {
            doc,
            root_slot,
            p1: p1[0],
            list,
            items: [items[0], items[1]],
            p2: p2[0],
        }
    }

    fn select(tree: &Tree, start: (SlotId, usize), end: (SlotId, usize)) -> Selection {
        let mut selection = Selection::new();
        selection.set_start(&tree.doc, start.0, start.1);
        selection.set_end(&tree.doc, end.0, end.1);
        selection
    }

    // ============ Ordering tests ============

    #[test]
    fn test_endpoints_are_swapped_into_document_order() {
        let tree = tree();
        let selection = select(&tree, (tree.p2, 2), (tree.p1, 1));

        assert_eq!(selection.start(), Some(Location::new(tree.p1, 1)));
        assert_eq!(selection.end(), Some(Location::new(tree.p2, 2)));
        assert_eq!(
            selection.get_selected_scopes(&tree.doc),
            select(&tree, (tree.p1, 1), (tree.p2, 2)).get_selected_scopes(&tree.doc)
        );
    }

    #[test]
    fn test_parent_offset_orders_around_component() {
        let tree = tree();
        let before = Location::new(tree.root_slot, 1);
        let inside = Location::new(tree.items[0], 0);
        let after = Location::new(tree.root_slot, 2);

        assert_eq!(compare_locations(&tree.doc, before, inside), Ordering::Less);
        assert_eq!(compare_locations(&tree.doc, inside, after), Ordering::Less);
    }

    // ============ Scope tests ============

    #[test]
    fn test_collapsed_selection_has_no_scopes() {
        let tree = tree();
        let selection = select(&tree, (tree.p1, 2), (tree.p1, 2));
        assert!(selection.is_collapsed());
        assert_eq!(selection.get_selected_scopes(&tree.doc), vec![]);
    }

    #[test]
    fn test_scopes_across_blocks() {
        let tree = tree();
        let selection = select(&tree, (tree.p1, 2), (tree.p2, 3));

        assert_eq!(
            selection.get_selected_scopes(&tree.doc),
            vec![
                SelectedScope::new(tree.p1, 2, 5),
                SelectedScope::new(tree.root_slot, 1, 2),
                SelectedScope::new(tree.p2, 0, 3),
            ]
        );
    }

    #[test]
    fn test_scopes_between_slots_of_one_component() {
        let tree = tree();
        let selection = select(&tree, (tree.items[0], 1), (tree.items[1], 1));

        assert_eq!(
            selection.get_selected_scopes(&tree.doc),
            vec![
                SelectedScope::new(tree.items[0], 1, 2),
                SelectedScope::new(tree.items[1], 0, 1),
            ]
        );
        assert_eq!(selection.common_ancestor_component(&tree.doc), Some(tree.list));
        assert_eq!(selection.common_ancestor_slot(&tree.doc), Some(tree.root_slot));
    }

    #[test]
    fn test_scopes_into_nested_slot_include_later_siblings() {
        let tree = tree();
        let selection = select(&tree, (tree.items[0], 1), (tree.p2, 2));

        assert_eq!(
            selection.get_selected_scopes(&tree.doc),
            vec![
                SelectedScope::new(tree.items[0], 1, 2),
                SelectedScope::new(tree.items[1], 0, 2),
                SelectedScope::new(tree.p2, 0, 2),
            ]
        );
    }

    #[test]
    fn test_scopes_skip_empty_partial_ends() {
        let tree = tree();
        let selection = select(&tree, (tree.p1, 5), (tree.p2, 0));

        assert_eq!(
            selection.get_selected_scopes(&tree.doc),
            vec![SelectedScope::new(tree.root_slot, 1, 2)]
        );
    }

    #[test]
    fn test_start_in_common_slot() {
        let tree = tree();
        let selection = select(&tree, (tree.root_slot, 0), (tree.p2, 1));

        assert_eq!(
            selection.get_selected_scopes(&tree.doc),
            vec![
                SelectedScope::new(tree.root_slot, 0, 2),
                SelectedScope::new(tree.p2, 0, 1),
            ]
        );
    }

    struct Fixed(Vec<SelectedScope>);

    impl SelectionMiddleware for Fixed {
        fn get_selected_scopes(&self, _: &Document, _: &Selection) -> Option<Vec<SelectedScope>> {
            Some(self.0.clone())
        }
    }

    #[test]
    fn test_middleware_overrides_scopes() {
        let tree = tree();
        let mut selection = select(&tree, (tree.p1, 0), (tree.p2, 1));
        let cells = vec![SelectedScope::new(tree.items[1], 0, 2)];
        selection.add_middleware(Rc::new(Fixed(cells.clone())));

        assert_eq!(selection.get_selected_scopes(&tree.doc), cells);
    }

    // ============ Block tests ============

    #[test]
    fn test_blocks_expand_to_whole_slots() {
        let tree = tree();
        let selection = select(&tree, (tree.p1, 2), (tree.p2, 3));

        assert_eq!(
            selection.get_blocks(&tree.doc),
            vec![
                SelectedScope::new(tree.p1, 0, 5),
                SelectedScope::new(tree.items[0], 0, 2),
                SelectedScope::new(tree.items[1], 0, 2),
                SelectedScope::new(tree.p2, 0, 5),
            ]
        );
    }

    #[test]
    fn test_collapsed_blocks_is_caret_slot() {
        let tree = tree();
        let selection = select(&tree, (tree.p2, 1), (tree.p2, 1));
        assert_eq!(selection.get_blocks(&tree.doc), vec![SelectedScope::new(tree.p2, 0, 5)]);
    }

    // ============ Navigation tests ============

    #[test]
    fn test_previous_location_crosses_into_previous_block() {
        let tree = tree();
        assert_eq!(
            previous_location(&tree.doc, tree.p2, 0),
            Some(Location::new(tree.items[1], 2))
        );
        assert_eq!(
            previous_location(&tree.doc, tree.items[1], 0),
            Some(Location::new(tree.items[0], 2))
        );
        assert_eq!(
            previous_location(&tree.doc, tree.p1, 3),
            Some(Location::new(tree.p1, 2))
        );
    }

    #[test]
    fn test_next_location_crosses_into_next_block() {
        let tree = tree();
        assert_eq!(
            next_location(&tree.doc, tree.p1, 5),
            Some(Location::new(tree.items[0], 0))
        );
        assert_eq!(
            next_location(&tree.doc, tree.items[0], 2),
            Some(Location::new(tree.items[1], 0))
        );
    }

    #[test]
    fn test_document_boundaries_have_no_neighbour() {
        let tree = tree();
        assert_eq!(previous_location(&tree.doc, tree.p1, 0), None);
        assert_eq!(next_location(&tree.doc, tree.p2, 5), None);
    }

    #[test]
    fn test_find_first_and_last_location_descend() {
        let tree = tree();
        assert_eq!(find_first_location(&tree.doc, tree.root_slot), Location::new(tree.p1, 0));
        assert_eq!(find_last_location(&tree.doc, tree.root_slot), Location::new(tree.p2, 5));
    }
}
