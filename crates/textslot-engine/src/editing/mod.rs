/*!
 * # Editing Core
 *
 * The document model and every command that edits it.
 *
 * ## Architecture Overview
 *
 * ### 1. Arena document
 * - A [`Document`] owns every `Slot` and `Component`, addressed by `SlotId` / `ComponentId`
 * - Children are owned through id lists; `parent` links only navigate
 * - Removed nodes stay in the arena detached, so undo re-attaches the same ids
 *
 * ### 2. Recorded operations
 * - Each mutation reachable from the root yields a [`ChangeRecord`] with `apply` and `unapply`
 *   operation lists, addressed by the alternating slot / content index path from the root
 * - The owning component is marked dirty and its ancestors changed
 *
 * ### 3. Commands as transactions
 * - [`Keyboard`] (insert, enter, delete) and [`Commander`] (format, clipboard, structure)
 *   run each public call as one [`Transaction`] on the [`Editor`]
 * - Undo replays `unapply` lists in reverse, redo replays `apply` lists forward
 *
 * ### 4. Components talk through events
 * - Factories declare slots, state and listeners on a [`ComponentBuilder`]
 * - Commands dispatch cancelable events to the owning component before acting, and listeners
 *   may restructure the tree in place
 *
 * ## Usage Pattern
 *
 * ```rust
 * use textslot_engine::editing::*;
 * use textslot_engine::models::*;
 *
 * let mut editor = Editor::with_bundled(EditorOptions::default());
 * let root = ComponentLiteral::new("RootComponent").with_slot(
 *     SlotLiteral::new([ContentType::BlockComponent]).with_component(
 *         ComponentLiteral::new("ParagraphComponent")
 *             .with_slot(SlotLiteral::new([ContentType::Text]).with_text("hello")),
 *     ),
 * );
 * editor.load(&root).unwrap();
 *
 * // the caret starts at the first location of the document
 * editor.keyboard().insert("> ");
 * let bold = editor.formatter("bold").unwrap();
 * let slot = editor.selection().start_slot().unwrap();
 * editor.select((slot, 2), (slot, 7));
 * editor.commander().apply_format(&bold, serde_json::json!(true));
 *
 * assert!(editor.query().query_format(&bold).is_enabled());
 * assert!(editor.undo());
 * ```
 */

pub mod builder;
pub mod changes;
pub mod commander;
pub mod document;
pub mod editor;
pub mod events;
pub mod history;
pub mod keyboard;
pub mod query;
pub mod selection;
pub mod translator;

pub use builder::{ComponentBuilder, ComponentFactory, ComponentInit, ComponentList};
pub use changes::{ChangeMarker, ChangeRecord, FormatOp, Operation};
pub use commander::{Clipboard, Commander, PLACEHOLDER};
pub use document::Document;
pub use editor::{DEFAULT_HISTORY_LIMIT, Editor, EditorOptions};
pub use events::{
    ContextMenuEventData, ContextMenuItem, DeleteEventData, EnterEventData, Event, EventData,
    EventKind, EventRegistry, InsertEventData, InsertedEventData, Listener, PasteEventData,
};
pub use history::{History, Transaction};
pub use keyboard::Keyboard;
pub use query::{Query, QueryState};
pub use selection::{
    Location, SelectedScope, Selection, SelectionMiddleware, SelectionRange, compare_locations,
    find_first_location, find_last_location, next_location, previous_location,
};
pub use translator::Translator;
