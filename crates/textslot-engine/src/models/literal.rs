//! Serialized shape of slots and components.
//!
//! A document is exchanged as a tree of literals: a [`ComponentLiteral`] names a
//! registered component and carries its state plus the literals of its slots,
//! and a [`SlotLiteral`] lists content (plain strings or nested components) and
//! the format ranges keyed by formatter name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::content::ContentType;
use crate::models::format::FormatRange;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotLiteral {
    pub schema: Vec<ContentType>,
    #[serde(default)]
    pub content: Vec<ContentLiteral>,
    #[serde(default)]
    pub formats: BTreeMap<String, Vec<FormatRange>>,
}

impl SlotLiteral {
    pub fn new(schema: impl Into<Vec<ContentType>>) -> Self {
        Self {
            schema: schema.into(),
            content: Vec::new(),
            formats: BTreeMap::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.content.push(ContentLiteral::Text(text.into()));
        self
    }

    pub fn with_component(mut self, component: ComponentLiteral) -> Self {
        self.content.push(ContentLiteral::Component(component));
        self
    }

    pub fn with_format(mut self, formatter: impl Into<String>, range: FormatRange) -> Self {
        self.formats.entry(formatter.into()).or_default().push(range);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentLiteral {
    Text(String),
    Component(ComponentLiteral),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentLiteral {
    pub name: String,
    #[serde(default)]
    pub state: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<SlotLiteral>,
}

impl ComponentLiteral {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Value::Null,
            slots: Vec::new(),
        }
    }

    pub fn with_state(mut self, state: Value) -> Self {
        self.state = state;
        self
    }

    pub fn with_slot(mut self, slot: SlotLiteral) -> Self {
        self.slots.push(slot);
        self
    }
}
