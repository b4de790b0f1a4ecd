//! Format ranges over a slot's content.
//!
//! Inline formatters keep an ordered list of half-open ranges per formatter.
//! For any formatter the ranges are sorted by start, never overlap, and are
//! maximal: two abutting ranges with equal values are always merged.
//! Block formatters carry a single value that covers the whole slot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Opaque format value. Structural equality decides whether ranges merge.
pub type FormatValue = serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FormatType {
    Inline,
    Block,
}

/// A named, classified attribute that can be applied over a content range
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Formatter {
    name: String,
    format_type: FormatType,
}

impl Formatter {
    pub fn new(name: impl Into<String>, format_type: FormatType) -> Self {
        Self {
            name: name.into(),
            format_type,
        }
    }

    pub fn inline(name: impl Into<String>) -> Self {
        Self::new(name, FormatType::Inline)
    }

    pub fn block(name: impl Into<String>) -> Self {
        Self::new(name, FormatType::Block)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format_type(&self) -> FormatType {
        self.format_type
    }

    pub fn is_block(&self) -> bool {
        self.format_type == FormatType::Block
    }
}

/// A `[start_index, end_index)` span carrying one value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatRange {
    pub start_index: usize,
    pub end_index: usize,
    pub value: FormatValue,
}

impl FormatRange {
    pub fn new(start_index: usize, end_index: usize, value: FormatValue) -> Self {
        Self {
            start_index,
            end_index,
            value,
        }
    }

    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }
}

/// A format range together with the formatter it belongs to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatItem {
    pub formatter: Formatter,
    pub start_index: usize,
    pub end_index: usize,
    pub value: FormatValue,
}

#[derive(Debug, Clone, PartialEq)]
struct InlineTrack {
    formatter: Formatter,
    ranges: Vec<FormatRange>,
}

/// All formats of one slot
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct FormatMap {
    inline: BTreeMap<String, InlineTrack>,
    block: BTreeMap<String, (Formatter, FormatValue)>,
}

impl FormatMap {
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.inline.is_empty() && self.block.is_empty()
    }

    /// Apply `value` over `[start, end)`, or clear that span when `value` is `None`.
    ///
    /// `slot_len` is the current length of the owning slot. Block formatters
    /// ignore the span.
    pub fn apply(
        &mut self,
        formatter: &Formatter,
        start: usize,
        end: usize,
        value: Option<FormatValue>,
        slot_len: usize,
    ) {
        if formatter.is_block() {
            match value {
                Some(value) => {
                    self.block
                        .insert(formatter.name.clone(), (formatter.clone(), value));
                }
                None => {
                    self.block.remove(&formatter.name);
                }
            }
            return;
        }

        let start = start.min(slot_len);
        let end = end.min(slot_len).max(start);

        let existing = self
            .inline
            .remove(&formatter.name)
            .map(|track| track.ranges)
            .unwrap_or_default();

        let mut ranges = Vec::with_capacity(existing.len() + 2);
        for range in existing {
            if !overlaps(&range, start, end) {
                ranges.push(range);
                continue;
            }
            if range.start_index < start {
                ranges.push(FormatRange::new(range.start_index, start, range.value.clone()));
            }
            if range.end_index > end {
                ranges.push(FormatRange::new(end, range.end_index, range.value));
            }
        }
        if let Some(value) = value {
            ranges.push(FormatRange::new(start, end, value));
        }

        self.store(formatter, ranges, slot_len);
    }

    /// Shift ranges for `len` units inserted at `index`.
    ///
    /// With `expand` set, a range that ends at (or straddles) the insertion point
    /// grows over the new content. Without it, a straddling range is split so the
    /// inserted content stays unformatted.
    pub fn on_insert(&mut self, index: usize, len: usize, expand: bool) {
        for track in self.inline.values_mut() {
            let mut ranges = Vec::with_capacity(track.ranges.len() + 1);
            for mut range in track.ranges.drain(..) {
                if range.is_empty() {
                    // only an empty slot holds zero-length ranges
                    if expand && range.start_index == index {
                        range.end_index += len;
                        ranges.push(range);
                    }
                    continue;
                }
                if expand && range.start_index < index && index <= range.end_index {
                    range.end_index += len;
                    ranges.push(range);
                } else if range.start_index >= index {
                    range.start_index += len;
                    range.end_index += len;
                    ranges.push(range);
                } else if index < range.end_index {
                    ranges.push(FormatRange::new(range.start_index, index, range.value.clone()));
                    ranges.push(FormatRange::new(
                        index + len,
                        range.end_index + len,
                        range.value,
                    ));
                } else {
                    ranges.push(range);
                }
            }
            track.ranges = ranges;
        }
        self.inline.retain(|_, track| !track.ranges.is_empty());
    }

    /// Shrink ranges for the removal of `[start, end)`
    pub fn on_delete(&mut self, start: usize, end: usize) {
        let count = end - start;
        let map = |x: usize| {
            if x <= start {
                x
            } else if x >= end {
                x - count
            } else {
                start
            }
        };
        for track in self.inline.values_mut() {
            let ranges = track
                .ranges
                .drain(..)
                .map(|range| FormatRange::new(map(range.start_index), map(range.end_index), range.value))
                .filter(|range| !range.is_empty())
                .collect();
            track.ranges = merge(ranges);
        }
        self.inline.retain(|_, track| !track.ranges.is_empty());
    }

    /// Formats intersecting `[start, end)`, re-based so `start` becomes 0
    pub fn extract(&self, start: usize, end: usize) -> FormatMap {
        let mut out = FormatMap {
            inline: BTreeMap::new(),
            block: self.block.clone(),
        };
        for (name, track) in &self.inline {
            let ranges: Vec<FormatRange> = track
                .ranges
                .iter()
                .filter(|range| range.start_index < end && range.end_index > start)
                .map(|range| {
                    FormatRange::new(
                        range.start_index.max(start) - start,
                        range.end_index.min(end) - start,
                        range.value.clone(),
                    )
                })
                .collect();
            if !ranges.is_empty() {
                out.inline.insert(
                    name.clone(),
                    InlineTrack {
                        formatter: track.formatter.clone(),
                        ranges,
                    },
                );
            }
        }
        out
    }

    /// Every format, block ones reported over `[0, slot_len)`, ordered by start index
    pub fn items(&self, slot_len: usize) -> Vec<FormatItem> {
        let mut items: Vec<FormatItem> = self
            .block
            .values()
            .map(|(formatter, value)| FormatItem {
                formatter: formatter.clone(),
                start_index: 0,
                end_index: slot_len,
                value: value.clone(),
            })
            .collect();
        for track in self.inline.values() {
            items.extend(track.ranges.iter().map(|range| FormatItem {
                formatter: track.formatter.clone(),
                start_index: range.start_index,
                end_index: range.end_index,
                value: range.value.clone(),
            }));
        }
        items.sort_by_key(|item| item.start_index);
        items
    }

    /// Ranges of one formatter intersecting `[start, end)`, clipped to that window
    pub fn ranges(
        &self,
        formatter: &Formatter,
        start: usize,
        end: usize,
        slot_len: usize,
    ) -> Vec<FormatRange> {
        if formatter.is_block() {
            return self
                .block
                .get(&formatter.name)
                .map(|(_, value)| {
                    let end = end.min(slot_len);
                    let start = start.min(end);
                    vec![FormatRange::new(start, end, value.clone())]
                })
                .unwrap_or_default();
        }
        let Some(track) = self.inline.get(&formatter.name) else {
            return Vec::new();
        };
        track
            .ranges
            .iter()
            .filter(|range| {
                if range.is_empty() {
                    start <= range.start_index && range.start_index <= end
                } else {
                    range.start_index < end && range.end_index > start
                }
            })
            .map(|range| {
                let s = range.start_index.max(start);
                let e = range.end_index.min(end).max(s);
                FormatRange::new(s, e, range.value.clone())
            })
            .collect()
    }

    pub fn block_value(&self, formatter: &Formatter) -> Option<&FormatValue> {
        self.block.get(&formatter.name).map(|(_, value)| value)
    }

    fn store(&mut self, formatter: &Formatter, mut ranges: Vec<FormatRange>, slot_len: usize) {
        if slot_len > 0 {
            ranges.retain(|range| !range.is_empty());
        }
        ranges.sort_by_key(|range| range.start_index);
        let ranges = merge(ranges);
        if !ranges.is_empty() {
            self.inline.insert(
                formatter.name.clone(),
                InlineTrack {
                    formatter: formatter.clone(),
                    ranges,
                },
            );
        }
    }
}

fn overlaps(range: &FormatRange, start: usize, end: usize) -> bool {
    if start == end {
        return range.is_empty() && range.start_index == start;
    }
    range.start_index < end && range.end_index > start
}

/// Coalesce sorted ranges whose values are equal and which abut or overlap
fn merge(ranges: Vec<FormatRange>) -> Vec<FormatRange> {
    let mut merged: Vec<FormatRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        if let Some(last) = merged.last_mut()
            && last.end_index >= range.start_index
            && last.value == range.value
        {
            last.end_index = last.end_index.max(range.end_index);
            continue;
        }
        merged.push(range);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn bold() -> Formatter {
        Formatter::inline("bold")
    }

    fn ranges(map: &FormatMap, len: usize) -> Vec<(usize, usize, FormatValue)> {
        map.ranges(&bold(), 0, len, len)
            .into_iter()
            .map(|r| (r.start_index, r.end_index, r.value))
            .collect()
    }

    // ============ Apply tests ============

    #[test]
    fn test_apply_merges_abutting_equal_values() {
        let mut map = FormatMap::default();
        map.apply(&bold(), 0, 3, Some(json!(true)), 10);
        map.apply(&bold(), 3, 6, Some(json!(true)), 10);

        assert_eq!(ranges(&map, 10), vec![(0, 6, json!(true))]);
    }

    #[test]
    fn test_apply_keeps_different_values_apart() {
        let mut map = FormatMap::default();
        map.apply(&Formatter::inline("color"), 0, 4, Some(json!("red")), 10);
        map.apply(&Formatter::inline("color"), 2, 6, Some(json!("blue")), 10);

        let got = map.ranges(&Formatter::inline("color"), 0, 10, 10);
        assert_eq!(
            got,
            vec![
                FormatRange::new(0, 2, json!("red")),
                FormatRange::new(2, 6, json!("blue")),
            ]
        );
    }

    #[test]
    fn test_clear_splits_existing_range() {
        let mut map = FormatMap::default();
        map.apply(&bold(), 0, 10, Some(json!(true)), 10);
        map.apply(&bold(), 3, 5, None, 10);

        assert_eq!(
            ranges(&map, 10),
            vec![(0, 3, json!(true)), (5, 10, json!(true))]
        );
    }

    #[test]
    fn test_zero_length_range_only_survives_in_empty_slot() {
        let mut map = FormatMap::default();
        map.apply(&bold(), 2, 2, Some(json!(true)), 5);
        assert!(map.is_empty());

        map.apply(&bold(), 0, 0, Some(json!(true)), 0);
        assert_eq!(ranges(&map, 0), vec![(0, 0, json!(true))]);
    }

    #[test]
    fn test_block_format_spans_whole_slot() {
        let mut map = FormatMap::default();
        let align = Formatter::block("textAlign");
        map.apply(&align, 2, 3, Some(json!("center")), 8);

        let items = map.items(8);
        assert_eq!(items.len(), 1);
        assert_eq!((items[0].start_index, items[0].end_index), (0, 8));
        assert_eq!(map.block_value(&align), Some(&json!("center")));
    }

    // ============ Insert / delete tests ============

    #[test]
    fn test_insert_expand_grows_range_ending_at_index() {
        let mut map = FormatMap::default();
        map.apply(&bold(), 0, 3, Some(json!(true)), 5);
        map.on_insert(3, 2, true);

        assert_eq!(ranges(&map, 7), vec![(0, 5, json!(true))]);
    }

    #[test]
    fn test_insert_without_expand_splits_straddling_range() {
        let mut map = FormatMap::default();
        map.apply(&bold(), 0, 4, Some(json!(true)), 5);
        map.on_insert(2, 1, false);

        assert_eq!(
            ranges(&map, 6),
            vec![(0, 2, json!(true)), (3, 5, json!(true))]
        );
    }

    #[test]
    fn test_pending_format_in_empty_slot_expands_on_write() {
        let mut map = FormatMap::default();
        map.apply(&bold(), 0, 0, Some(json!(true)), 0);
        map.on_insert(0, 3, true);

        assert_eq!(ranges(&map, 3), vec![(0, 3, json!(true))]);
    }

    #[test]
    fn test_delete_drops_and_merges() {
        let mut map = FormatMap::default();
        map.apply(&bold(), 0, 2, Some(json!(true)), 10);
        map.apply(&bold(), 4, 6, Some(json!(true)), 10);
        map.apply(&Formatter::inline("italic"), 2, 4, Some(json!(true)), 10);

        map.on_delete(2, 4);

        assert_eq!(ranges(&map, 6), vec![(0, 4, json!(true))]);
        assert!(
            map.ranges(&Formatter::inline("italic"), 0, 6, 6)
                .is_empty()
        );
    }

    #[test]
    fn test_extract_rebases_ranges() {
        let mut map = FormatMap::default();
        map.apply(&bold(), 1, 6, Some(json!(true)), 10);
        let part = map.extract(4, 9);

        assert_eq!(ranges(&part, 5), vec![(0, 2, json!(true))]);
    }

    #[test]
    fn test_ranges_are_clipped_to_window() {
        let mut map = FormatMap::default();
        map.apply(&bold(), 0, 10, Some(json!(true)), 10);

        assert_eq!(
            map.ranges(&bold(), 3, 5, 10),
            vec![FormatRange::new(3, 5, json!(true))]
        );
    }
}
