use serde::Serialize;

use crate::models::{ContentItem, FormatItem, FormatValue, Formatter, SlotId};

/// Format change carried by a retain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatOp {
    pub formatter: Formatter,
    /// `None` clears the formatter over the retained span
    pub value: Option<FormatValue>,
}

/// One invertible step of the op-log.
///
/// Slot records use `Retain`, `Insert` and `Delete` against the slot's cursor.
/// Component records use `Apply`, `InsertSlot` and `RemoveSlot`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Operation {
    Retain {
        index: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        format: Option<FormatOp>,
    },
    /// Insert at the cursor, then apply `formats` relative to the inserted item
    Insert {
        content: ContentItem,
        formats: Vec<FormatItem>,
    },
    Delete {
        count: usize,
    },
    Apply {
        state: serde_json::Value,
    },
    InsertSlot {
        index: usize,
        slot: SlotId,
    },
    RemoveSlot {
        index: usize,
        slot: SlotId,
    },
}

impl Operation {
    pub fn retain(index: usize) -> Self {
        Operation::Retain {
            index,
            format: None,
        }
    }

    pub fn retain_format(index: usize, formatter: &Formatter, value: Option<FormatValue>) -> Self {
        Operation::Retain {
            index,
            format: Some(FormatOp {
                formatter: formatter.clone(),
                value,
            }),
        }
    }
}

/// A recorded mutation and its inverse.
///
/// `path` alternates slot index and content index from the root component:
/// `[]` is the root, `[0]` its first slot, `[0, 2]` the component at offset 2 of
/// that slot, and so on. Slot records end on a slot index, component records on
/// a content index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRecord {
    pub path: Vec<usize>,
    pub apply: Vec<Operation>,
    pub unapply: Vec<Operation>,
}

/// Per-component render bookkeeping.
///
/// `dirty` is set when the component's own slots or state changed, `changed`
/// when something below it did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeMarker {
    dirty: bool,
    changed: bool,
}

impl ChangeMarker {
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Reset both flags once a host has re-rendered the component
    pub fn rendered(&mut self) {
        self.dirty = false;
        self.changed = false;
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
        self.changed = true;
    }

    pub(crate) fn mark_changed(&mut self) {
        self.changed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operations_serialize_tagged() {
        let ops = vec![
            Operation::retain(3),
            Operation::retain_format(5, &Formatter::inline("bold"), Some(json!(true))),
            Operation::Delete { count: 2 },
        ];
        insta::assert_json_snapshot!(ops, @r###"
        [
          {
            "type": "retain",
            "index": 3
          },
          {
            "type": "retain",
            "index": 5,
            "format": {
              "formatter": {
                "name": "bold",
                "format_type": "Inline"
              },
              "value": true
            }
          },
          {
            "type": "delete",
            "count": 2
          }
        ]
        "###);
    }

    #[test]
    fn test_marker_rendered_resets_flags() {
        let mut marker = ChangeMarker::default();
        marker.mark_dirty();
        assert!(marker.is_dirty() && marker.is_changed());
        marker.rendered();
        assert!(!marker.is_dirty() && !marker.is_changed());
    }
}
