use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::editing::builder::{ComponentBuilder, ComponentInit, ComponentList};
use crate::editing::commander::{Clipboard, Commander};
use crate::editing::document::Document;
use crate::editing::events::{
    ContextMenuEventData, ContextMenuItem, Event, EventData, EventKind, EventRegistry, Listener,
};
use crate::editing::history::{History, Transaction};
use crate::editing::keyboard::Keyboard;
use crate::editing::query::Query;
use crate::editing::selection::{
    SelectedScope, Selection, SelectionMiddleware, SelectionRange, find_first_location,
};
use crate::editing::translator::Translator;
use crate::error::EngineError;
use crate::formatters::FormatterList;
use crate::models::{ComponentId, ComponentLiteral, ComponentRef, Formatter, SlotId};

pub const DEFAULT_HISTORY_LIMIT: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOptions {
    /// Maximum number of undoable transactions
    pub history_limit: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// An editing session: the document, its selection and the capabilities
/// (component and formatter registries, listeners, history) commands need.
///
/// Edit commands are reached through short-lived views:
/// [`Editor::keyboard`], [`Editor::commander`], [`Editor::query`] and
/// [`Editor::translator`].
pub struct Editor {
    pub(crate) doc: Document,
    pub(crate) selection: Selection,
    pub(crate) registry: EventRegistry,
    components: ComponentList,
    formatters: FormatterList,
    history: History,
    depth: usize,
    selection_before: Option<SelectionRange>,
    pub(crate) clipboard: Option<Box<dyn Clipboard>>,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("root", &self.doc.root())
            .field("selection", &self.selection)
            .field("components", &self.components)
            .field("history", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl Editor {
    pub fn new(components: ComponentList, formatters: FormatterList, options: EditorOptions) -> Self {
        Self {
            doc: Document::new(),
            selection: Selection::new(),
            registry: EventRegistry::default(),
            components,
            formatters,
            history: History::new(options.history_limit),
            depth: 0,
            selection_before: None,
            clipboard: None,
        }
    }

    /// Editor wired with the bundled components and formatters
    pub fn with_bundled(options: EditorOptions) -> Self {
        Self::new(crate::components::bundled(), crate::formatters::bundled(), options)
    }

    // ============ Loading and export ============

    /// Build the tree described by `literal` and make it the document root.
    ///
    /// Clears history and places the caret at the first location of the new root.
    pub fn load(&mut self, literal: &ComponentLiteral) -> Result<ComponentId, EngineError> {
        let root = self
            .translator()
            .create_component(literal)
            .ok_or_else(|| EngineError::UnknownComponent(literal.name.clone()))?;
        self.doc.set_root(root);
        self.history.clear();
        self.selection.unselect();
        if let Some(first) = self.doc.component(root).slots().first() {
            let location = find_first_location(&self.doc, *first);
            self.selection.set_location(location.slot, location.offset);
        }
        log::debug!("loaded document root {root:?}");
        Ok(root)
    }

    pub fn load_json(&mut self, json: &str) -> Result<ComponentId, EngineError> {
        let literal: ComponentLiteral = serde_json::from_str(json)?;
        self.load(&literal)
    }

    pub fn to_literal(&self) -> Result<ComponentLiteral, EngineError> {
        let root = self.doc.root().ok_or(EngineError::MissingRoot)?;
        Ok(self.doc.component_literal(root))
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(&self.to_literal()?)?)
    }

    // ============ Accessors ============

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Direct tree access for listeners and hosts. Changes made outside a
    /// command are committed with the next command or undo.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn root(&self) -> Option<ComponentId> {
        self.doc.root()
    }

    pub fn component_ref(&self, component: ComponentId) -> ComponentRef {
        self.doc.component_ref(component)
    }

    pub fn formatter(&self, name: &str) -> Option<Formatter> {
        self.formatters.get(name).cloned()
    }

    pub fn components(&self) -> &ComponentList {
        &self.components
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn set_clipboard(&mut self, clipboard: impl Clipboard + 'static) {
        self.clipboard = Some(Box::new(clipboard));
    }

    pub fn keyboard(&mut self) -> Keyboard<'_> {
        Keyboard::new(self)
    }

    pub fn commander(&mut self) -> Commander<'_> {
        Commander::new(self)
    }

    pub fn query(&self) -> Query<'_> {
        Query::new(self)
    }

    pub fn translator(&mut self) -> Translator<'_> {
        Translator::new(self)
    }

    // ============ Selection ============

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn set_location(&mut self, slot: SlotId, offset: usize) {
        self.selection.set_location(slot, offset);
    }

    pub fn set_start(&mut self, slot: SlotId, offset: usize) {
        self.selection.set_start(&self.doc, slot, offset);
    }

    pub fn set_end(&mut self, slot: SlotId, offset: usize) {
        self.selection.set_end(&self.doc, slot, offset);
    }

    /// Select `[start, end)` in one call
    pub fn select(&mut self, start: (SlotId, usize), end: (SlotId, usize)) {
        self.selection.set_location(start.0, start.1);
        self.selection.set_end(&self.doc, end.0, end.1);
    }

    pub fn collapse(&mut self, to_end: bool) {
        self.selection.collapse(to_end);
    }

    pub fn unselect(&mut self) {
        self.selection.unselect();
    }

    pub fn add_selection_middleware(&mut self, middleware: Rc<dyn SelectionMiddleware>) {
        self.selection.add_middleware(middleware);
    }

    pub fn selected_scopes(&self) -> Vec<SelectedScope> {
        self.selection.get_selected_scopes(&self.doc)
    }

    // ============ Components and events ============

    /// Instantiate the registered component `name`.
    ///
    /// The new component is detached; insert it into a slot to make it part
    /// of the document.
    pub fn create_component(&mut self, name: &str, init: ComponentInit) -> Option<ComponentId> {
        let Some(factory) = self.components.get(name) else {
            log::warn!("no component registered as {name}");
            return None;
        };
        let id = self
            .doc
            .create_component(factory.name(), factory.content_type(), Value::Null);
        let mut builder = ComponentBuilder::new(self, id);
        factory.setup(&mut builder, init);
        builder.finish();
        Some(id)
    }

    /// Replace a component's state as one undoable step
    pub fn update_state(&mut self, component: ComponentId, state: Value) {
        self.transact(|editor| editor.doc.set_state(component, state));
    }

    /// Register a listener on an existing component
    pub fn listen(&mut self, component: ComponentId, listener: Listener) {
        self.registry.add(component, listener);
    }

    /// Run every listener of `component` for this event kind
    pub fn invoke<D: EventData>(&mut self, component: ComponentId, event: &mut Event<D>) {
        for listener in self.registry.listeners(component, D::KIND) {
            if let Some(handler) = D::handler(&listener) {
                log::trace!("dispatch {:?} to {component:?}", D::KIND);
                handler(self, event);
            }
        }
    }

    /// Context-menu items from the common ancestor component upward.
    ///
    /// A listener that prevents the default stops the walk.
    pub fn context_menu(&mut self) -> Vec<ContextMenuItem> {
        let Some(start) = self.selection.start() else {
            return Vec::new();
        };
        let target = self
            .selection
            .common_ancestor_slot(&self.doc)
            .unwrap_or(start.slot);
        let mut event = Event::new(target, ContextMenuEventData { index: start.offset });
        let mut items = Vec::new();
        let mut current = self.selection.common_ancestor_component(&self.doc);
        while let Some(component) = current {
            for listener in self.registry.listeners(component, EventKind::ContextMenu) {
                if let Listener::ContextMenu(handler) = listener {
                    items.extend(handler(self, &mut event));
                }
            }
            if event.is_default_prevented() {
                break;
            }
            current = self
                .doc
                .parent_slot(component)
                .and_then(|slot| self.doc.parent_component(slot));
        }
        items
    }

    // ============ Transactions and history ============

    /// Run `f` as one undoable transaction.
    ///
    /// Nested calls join the outermost transaction, which commits every change
    /// recorded while it ran.
    pub fn transact<R>(&mut self, f: impl FnOnce(&mut Editor) -> R) -> R {
        if self.depth == 0 {
            self.flush();
            self.selection_before = self.selection.range();
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        if self.depth == 0 {
            let before = self.selection_before.take();
            self.commit(before);
        }
        result
    }

    fn flush(&mut self) {
        if self.doc.has_changes() {
            self.commit(self.selection.range());
        }
    }

    fn commit(&mut self, selection_before: Option<SelectionRange>) {
        let records = self.doc.take_changes();
        if records.is_empty() {
            return;
        }
        log::debug!("commit transaction with {} records", records.len());
        self.history.push(Transaction {
            records,
            selection_before,
            selection_after: self.selection.range(),
        });
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo() || self.doc.has_changes()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        self.flush();
        let Some(transaction) = self.history.take_undo() else {
            return false;
        };
        for record in transaction.records.iter().rev() {
            self.doc.replay(&record.path, &record.unapply);
        }
        self.selection.restore(transaction.selection_before);
        log::debug!("undo {} records", transaction.records.len());
        self.history.undone(transaction);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(transaction) = self.history.take_redo() else {
            return false;
        };
        for record in &transaction.records {
            self.doc.replay(&record.path, &record.apply);
        }
        self.selection.restore(transaction.selection_after);
        log::debug!("redo {} records", transaction.records.len());
        self.history.redone(transaction);
        true
    }
}
