//! Interceptable edit events.
//!
//! Components register listeners per event kind while they are being built.
//! Edit commands fire the matching event at the component owning the target
//! slot before running their default action; a listener may replace that
//! action by calling [`Event::prevent_default`] and mutating the tree itself.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::editing::editor::Editor;
use crate::models::{ComponentId, ContentItem, SlotId};

/// An event delivered to listeners; `target` is the slot the edit applies to
#[derive(Debug, Clone, PartialEq)]
pub struct Event<D> {
    target: SlotId,
    pub data: D,
    prevented: bool,
}

impl<D> Event<D> {
    pub fn new(target: SlotId, data: D) -> Self {
        Self {
            target,
            data,
            prevented: false,
        }
    }

    pub fn target(&self) -> SlotId {
        self.target
    }

    /// Skip the default action of the command that fired this event
    pub fn prevent_default(&mut self) {
        self.prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.prevented
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertEventData {
    pub index: usize,
    pub content: ContentItem,
}

/// Notification after content landed; `index` is the cursor after the insert
#[derive(Debug, Clone, PartialEq)]
pub struct InsertedEventData {
    pub index: usize,
    pub content: ContentItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnterEventData {
    pub index: usize,
}

/// Removal of `count` units ending at `index` in the target slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteEventData {
    pub index: usize,
    pub count: usize,
    /// Content is moved out (the tail of the end slot) rather than dropped
    pub is_move: bool,
    pub is_start: bool,
    pub is_end: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PasteEventData {
    pub index: usize,
    /// Detached slot holding the parsed clipboard content
    pub data: SlotId,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextMenuEventData {
    pub index: usize,
}

pub struct ContextMenuItem {
    pub label: String,
    pub icon_classes: Vec<String>,
    pub disabled: bool,
    pub on_click: Rc<dyn Fn(&mut Editor)>,
}

impl ContextMenuItem {
    pub fn new(label: impl Into<String>, on_click: impl Fn(&mut Editor) + 'static) -> Self {
        Self {
            label: label.into(),
            icon_classes: Vec::new(),
            disabled: false,
            on_click: Rc::new(on_click),
        }
    }
}

impl fmt::Debug for ContextMenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextMenuItem")
            .field("label", &self.label)
            .field("icon_classes", &self.icon_classes)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Insert,
    Inserted,
    Enter,
    Delete,
    Paste,
    ContextMenu,
}

pub type Handler<D> = Rc<dyn Fn(&mut Editor, &mut Event<D>)>;
pub type ContextMenuHandler =
    Rc<dyn Fn(&mut Editor, &mut Event<ContextMenuEventData>) -> Vec<ContextMenuItem>>;

#[derive(Clone)]
pub enum Listener {
    Insert(Handler<InsertEventData>),
    Inserted(Handler<InsertedEventData>),
    Enter(Handler<EnterEventData>),
    Delete(Handler<DeleteEventData>),
    Paste(Handler<PasteEventData>),
    ContextMenu(ContextMenuHandler),
}

impl Listener {
    pub fn kind(&self) -> EventKind {
        match self {
            Listener::Insert(_) => EventKind::Insert,
            Listener::Inserted(_) => EventKind::Inserted,
            Listener::Enter(_) => EventKind::Enter,
            Listener::Delete(_) => EventKind::Delete,
            Listener::Paste(_) => EventKind::Paste,
            Listener::ContextMenu(_) => EventKind::ContextMenu,
        }
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener::{:?}", self.kind())
    }
}

/// Payload types that can be dispatched through [`Editor::invoke`]
pub trait EventData: Sized {
    const KIND: EventKind;

    fn handler(listener: &Listener) -> Option<Handler<Self>>;
}

macro_rules! event_data {
    ($data:ty, $variant:ident) => {
        impl EventData for $data {
            const KIND: EventKind = EventKind::$variant;

            fn handler(listener: &Listener) -> Option<Handler<Self>> {
                match listener {
                    Listener::$variant(handler) => Some(handler.clone()),
                    _ => None,
                }
            }
        }
    };
}

event_data!(InsertEventData, Insert);
event_data!(InsertedEventData, Inserted);
event_data!(EnterEventData, Enter);
event_data!(DeleteEventData, Delete);
event_data!(PasteEventData, Paste);

/// Listener table keyed by component and event kind
#[derive(Debug, Clone, Default)]
pub struct EventRegistry {
    listeners: HashMap<(ComponentId, EventKind), Vec<Listener>>,
}

impl EventRegistry {
    pub fn add(&mut self, component: ComponentId, listener: Listener) {
        self.listeners
            .entry((component, listener.kind()))
            .or_default()
            .push(listener);
    }

    /// Snapshot of the listeners, safe to call while the registry changes
    pub fn listeners(&self, component: ComponentId, kind: EventKind) -> Vec<Listener> {
        self.listeners
            .get(&(component, kind))
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prevent_default_flips_flag() {
        let mut event = Event::new(SlotId(0), EnterEventData { index: 3 });
        assert!(!event.is_default_prevented());
        event.prevent_default();
        assert!(event.is_default_prevented());
        assert_eq!(event.target(), SlotId(0));
    }

    #[test]
    fn test_registry_keys_by_component_and_kind() {
        let mut registry = EventRegistry::default();
        let enter: Handler<EnterEventData> =
            Rc::new(|_: &mut Editor, event: &mut Event<EnterEventData>| event.prevent_default());
        registry.add(ComponentId(1), Listener::Enter(enter));

        assert_eq!(registry.listeners(ComponentId(1), EventKind::Enter).len(), 1);
        assert!(registry.listeners(ComponentId(1), EventKind::Delete).is_empty());
        assert!(registry.listeners(ComponentId(2), EventKind::Enter).is_empty());

        let listeners = registry.listeners(ComponentId(1), EventKind::Enter);
        assert!(EnterEventData::handler(&listeners[0]).is_some());
        assert!(DeleteEventData::handler(&listeners[0]).is_none());
    }
}
