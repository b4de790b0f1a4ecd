use std::ops::{Bound, RangeBounds};

use crate::models::content::{ComponentId, ContentItem, ContentType, byte_index};
use crate::models::format::{FormatItem, FormatMap, FormatRange, FormatValue, Formatter};

/// Ordered content container with its format ranges.
///
/// A slot is driven like an op-stream: [`Slot::retain`] moves the cursor,
/// [`Slot::insert`]/[`Slot::write`] add content at it and [`Slot::delete`]
/// removes content forward from it. Adjacent text is always stored as a
/// single run, so offsets address one continuous string where each
/// component counts as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    schema: Vec<ContentType>,
    content: Vec<ContentItem>,
    formats: FormatMap,
    index: usize,
    length: usize,
    pub(crate) parent: Option<ComponentId>,
}

impl Slot {
    pub fn new(schema: impl Into<Vec<ContentType>>) -> Self {
        Self {
            schema: schema.into(),
            content: Vec::new(),
            formats: FormatMap::default(),
            index: 0,
            length: 0,
            parent: None,
        }
    }

    pub fn schema(&self) -> &[ContentType] {
        &self.schema
    }

    pub fn accepts(&self, content_type: ContentType) -> bool {
        self.schema.contains(&content_type)
    }

    /// Owning component, `None` while the slot is detached
    pub fn parent(&self) -> Option<ComponentId> {
        self.parent
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Current cursor position
    pub fn index(&self) -> usize {
        self.index
    }

    /// Move the cursor. Returns `false` when `index` lies outside `0..=len`.
    pub fn retain(&mut self, index: usize) -> bool {
        if index > self.length {
            return false;
        }
        self.index = index;
        true
    }

    /// Apply (or clear, when `value` is `None`) `formatter` between the cursor
    /// and `index`, then move the cursor to `index`.
    ///
    /// Block formatters always target the whole slot.
    pub fn retain_format(
        &mut self,
        index: usize,
        formatter: &Formatter,
        value: Option<FormatValue>,
    ) -> bool {
        if index > self.length {
            return false;
        }
        let (start, end) = if formatter.is_block() {
            (0, self.length)
        } else {
            (self.index.min(index), self.index.max(index))
        };
        self.formats.apply(formatter, start, end, value, self.length);
        self.index = index;
        true
    }

    /// Insert at the cursor without extending neighbouring format runs
    pub fn insert(&mut self, item: impl Into<ContentItem>) -> bool {
        self.insert_item(item.into(), false)
    }

    /// Insert at the cursor; typed text inherits the format runs it continues
    pub fn write(&mut self, item: impl Into<ContentItem>) -> bool {
        let item = item.into();
        let expand = matches!(item, ContentItem::Text(_));
        self.insert_item(item, expand)
    }

    fn insert_item(&mut self, item: ContentItem, expand: bool) -> bool {
        if !self.accepts(item.content_type()) || item.is_empty() {
            return false;
        }
        let len = item.len();
        let index = self.index;
        let at = self.split_at(index);
        self.content.insert(at, item);
        self.normalize();
        self.length += len;
        self.formats.on_insert(index, len, expand);
        self.index = index + len;
        true
    }

    /// Remove `count` units forward from the cursor. The cursor stays put.
    pub fn delete(&mut self, count: usize) -> bool {
        let end = (self.index + count).min(self.length);
        if end == self.index {
            return false;
        }
        self.cut(self.index..end);
        true
    }

    /// Remove `range` and return it as a new detached slot.
    ///
    /// The fragment keeps this slot's schema, the inline ranges that overlap the
    /// removed span (re-based to the fragment) and every block format.
    /// `slot.cut(..)` empties the slot.
    pub fn cut(&mut self, range: impl RangeBounds<usize>) -> Slot {
        let (start, end) = self.bounds(range);
        let mut fragment = Slot::new(self.schema.clone());
        fragment.formats = self.formats.extract(start, end);
        if start == end {
            self.index = start;
            return fragment;
        }

        let first = self.split_at(start);
        let last = self.split_at(end);
        fragment.content = self.content.drain(first..last).collect();
        fragment.length = end - start;
        self.normalize();

        self.length -= end - start;
        self.formats.on_delete(start, end);
        self.index = start;
        fragment
    }

    /// Content items intersecting `range`, with text runs split at the bounds
    pub fn slice_content(&self, range: impl RangeBounds<usize>) -> Vec<ContentItem> {
        let (start, end) = self.bounds(range);
        let mut items = Vec::new();
        if start >= end {
            return items;
        }
        let mut offset = 0;
        for item in &self.content {
            let len = item.len();
            let item_end = offset + len;
            if item_end > start && offset < end {
                match item {
                    ContentItem::Text(text) => {
                        let from = start.saturating_sub(offset);
                        let to = end.min(item_end) - offset;
                        let piece = &text[byte_index(text, from)..byte_index(text, to)];
                        items.push(ContentItem::Text(piece.to_string()));
                    }
                    ContentItem::Component(_) => items.push(item.clone()),
                }
            }
            if item_end >= end {
                break;
            }
            offset = item_end;
        }
        items
    }

    /// The single-unit item at `index`: one char of text or a component
    pub fn get_content_at_index(&self, index: usize) -> Option<ContentItem> {
        if index >= self.length {
            return None;
        }
        self.slice_content(index..index + 1).into_iter().next()
    }

    pub fn index_of(&self, component: ComponentId) -> Option<usize> {
        let mut offset = 0;
        for item in &self.content {
            if item.component() == Some(component) {
                return Some(offset);
            }
            offset += item.len();
        }
        None
    }

    /// Components in content order
    pub fn components(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.content.iter().filter_map(ContentItem::component)
    }

    /// Plain text of this slot, components skipped
    pub fn text(&self) -> String {
        self.content.iter().filter_map(ContentItem::as_text).collect()
    }

    pub fn get_formats(&self) -> Vec<FormatItem> {
        self.formats.items(self.length)
    }

    /// Ranges of `formatter` intersecting `range`, clipped to it
    pub fn get_format_ranges_by_formatter(
        &self,
        formatter: &Formatter,
        range: impl RangeBounds<usize>,
    ) -> Vec<FormatRange> {
        let (start, end) = self.bounds(range);
        self.formats.ranges(formatter, start, end, self.length)
    }

    fn bounds(&self, range: impl RangeBounds<usize>) -> (usize, usize) {
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s + 1,
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&e) => e + 1,
            Bound::Excluded(&e) => e,
            Bound::Unbounded => self.length,
        };
        let end = end.min(self.length);
        (start.min(end), end)
    }

    /// Make `offset` an item boundary, splitting a text run if needed.
    /// Returns the position in `content` where that boundary sits.
    fn split_at(&mut self, offset: usize) -> usize {
        let mut position = 0;
        let mut found = None;
        for (i, item) in self.content.iter().enumerate() {
            if position == offset {
                return i;
            }
            let len = item.len();
            if offset < position + len {
                found = Some((i, offset - position));
                break;
            }
            position += len;
        }
        let Some((i, within)) = found else {
            return self.content.len();
        };
        let ContentItem::Text(text) = &mut self.content[i] else {
            unreachable!("a component occupies exactly one unit");
        };
        let tail = text.split_off(byte_index(text, within));
        self.content.insert(i + 1, ContentItem::Text(tail));
        i + 1
    }

    /// Merge adjacent text runs and drop empty ones
    fn normalize(&mut self) {
        let mut merged: Vec<ContentItem> = Vec::with_capacity(self.content.len());
        for item in self.content.drain(..) {
            match (merged.last_mut(), item) {
                (_, ContentItem::Text(text)) if text.is_empty() => {}
                (Some(ContentItem::Text(last)), ContentItem::Text(text)) => last.push_str(&text),
                (_, item) => merged.push(item),
            }
        }
        self.content = merged;
    }

    pub(crate) fn content(&self) -> &[ContentItem] {
        &self.content
    }

    pub(crate) fn block_value(&self, formatter: &Formatter) -> Option<&FormatValue> {
        self.formats.block_value(formatter)
    }
}
