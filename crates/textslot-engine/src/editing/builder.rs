use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::editing::editor::Editor;
use crate::editing::events::{
    ContextMenuEventData, ContextMenuItem, DeleteEventData, EnterEventData, Event,
    InsertEventData, InsertedEventData, Listener, PasteEventData,
};
use crate::models::{ComponentId, ContentType, SlotId};

/// Slots and state a component starts from, usually translated from a literal
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentInit {
    pub state: Value,
    pub slots: Vec<SlotId>,
}

impl ComponentInit {
    pub fn new(state: Value, slots: Vec<SlotId>) -> Self {
        Self { state, slots }
    }

    pub fn with_slots(slots: Vec<SlotId>) -> Self {
        Self {
            state: Value::Null,
            slots,
        }
    }
}

/// Recipe for one kind of component
pub trait ComponentFactory {
    fn name(&self) -> &str;

    fn content_type(&self) -> ContentType;

    /// Declare slots, state and listeners of a new instance
    fn setup(&self, builder: &mut ComponentBuilder<'_>, init: ComponentInit);
}

/// Construction context threaded through [`ComponentFactory::setup`]
pub struct ComponentBuilder<'a> {
    editor: &'a mut Editor,
    id: ComponentId,
    slots: Vec<SlotId>,
    state: Value,
}

impl<'a> ComponentBuilder<'a> {
    pub(crate) fn new(editor: &'a mut Editor, id: ComponentId) -> Self {
        Self {
            editor,
            id,
            slots: Vec::new(),
            state: Value::Null,
        }
    }

    /// Id of the component being built, for listeners that refer to themselves
    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn editor(&mut self) -> &mut Editor {
        self.editor
    }

    pub fn use_slots(&mut self, slots: Vec<SlotId>) {
        self.slots = slots;
    }

    /// Create an empty slot and append it to the component
    pub fn new_slot(&mut self, schema: impl Into<Vec<ContentType>>) -> SlotId {
        let slot = self.editor.doc.create_slot(schema);
        self.slots.push(slot);
        slot
    }

    pub fn use_state(&mut self, state: Value) {
        self.state = state;
    }

    pub fn on_insert(&mut self, handler: impl Fn(&mut Editor, &mut Event<InsertEventData>) + 'static) {
        self.listen(Listener::Insert(Rc::new(handler)));
    }

    pub fn on_inserted(
        &mut self,
        handler: impl Fn(&mut Editor, &mut Event<InsertedEventData>) + 'static,
    ) {
        self.listen(Listener::Inserted(Rc::new(handler)));
    }

    pub fn on_enter(&mut self, handler: impl Fn(&mut Editor, &mut Event<EnterEventData>) + 'static) {
        self.listen(Listener::Enter(Rc::new(handler)));
    }

    pub fn on_delete(&mut self, handler: impl Fn(&mut Editor, &mut Event<DeleteEventData>) + 'static) {
        self.listen(Listener::Delete(Rc::new(handler)));
    }

    pub fn on_paste(&mut self, handler: impl Fn(&mut Editor, &mut Event<PasteEventData>) + 'static) {
        self.listen(Listener::Paste(Rc::new(handler)));
    }

    pub fn on_context_menu(
        &mut self,
        handler: impl Fn(&mut Editor, &mut Event<ContextMenuEventData>) -> Vec<ContextMenuItem>
        + 'static,
    ) {
        self.listen(Listener::ContextMenu(Rc::new(handler)));
    }

    fn listen(&mut self, listener: Listener) {
        self.editor.registry.add(self.id, listener);
    }

    pub(crate) fn finish(self) {
        let Self {
            editor,
            id,
            slots,
            state,
        } = self;
        editor.doc.attach_slots(id, slots);
        editor.doc.set_state(id, state);
    }
}

/// Registered component factories, by name
#[derive(Clone, Default)]
pub struct ComponentList {
    factories: HashMap<String, Rc<dyn ComponentFactory>>,
}

impl ComponentList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, factory: impl ComponentFactory + 'static) -> &mut Self {
        self.factories
            .insert(factory.name().to_string(), Rc::new(factory));
        self
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn ComponentFactory>> {
        self.factories.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl fmt::Debug for ComponentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("ComponentList").field("factories", &names).finish()
    }
}
