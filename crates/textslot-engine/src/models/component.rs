use serde_json::Value;

use crate::editing::changes::ChangeMarker;
use crate::models::content::{ContentType, SlotId};

/// A named, stateful tree node owning zero or more slots.
///
/// Components live in the [`crate::Document`] arena. The slot list and the
/// parent link are maintained by the document; a component never owns its
/// parent, it only points back at it.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    name: String,
    content_type: ContentType,
    pub(crate) state: Value,
    pub(crate) slots: Vec<SlotId>,
    pub(crate) parent: Option<SlotId>,
    pub(crate) marker: ChangeMarker,
}

impl Component {
    pub(crate) fn new(name: impl Into<String>, content_type: ContentType, state: Value) -> Self {
        Self {
            name: name.into(),
            content_type,
            state,
            slots: Vec::new(),
            parent: None,
            marker: ChangeMarker::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn state(&self) -> &Value {
        &self.state
    }

    pub fn slots(&self) -> &[SlotId] {
        &self.slots
    }

    /// Slot holding this component, `None` for the root and detached components
    pub fn parent(&self) -> Option<SlotId> {
        self.parent
    }

    pub fn marker(&self) -> &ChangeMarker {
        &self.marker
    }
}
