//! Read-only state of formats and components under the selection.

use crate::editing::editor::Editor;
use crate::models::{Component, ComponentId, ContentItem, FormatValue, Formatter, SlotId};

#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    Normal,
    Disabled,
    Enabled(T),
}

impl<T> QueryState<T> {
    pub fn is_enabled(&self) -> bool {
        matches!(self, QueryState::Enabled(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            QueryState::Enabled(value) => Some(value),
            _ => None,
        }
    }
}

pub struct Query<'a> {
    editor: &'a Editor,
}

impl<'a> Query<'a> {
    pub(crate) fn new(editor: &'a Editor) -> Self {
        Self { editor }
    }

    /// Enabled with the shared value when every selected unit carries
    /// `formatter` with one and the same value. A collapsed selection is Normal.
    pub fn query_format(&self, formatter: &Formatter) -> QueryState<FormatValue> {
        let selection = &self.editor.selection;
        if !selection.is_selected() {
            return QueryState::Normal;
        }
        let states = selection
            .get_selected_scopes(&self.editor.doc)
            .into_iter()
            .map(|scope| self.states_by_range(scope.slot, formatter, scope.start_index, scope.end_index))
            .collect();
        merge_states(states)
    }

    /// Innermost component named `name` enclosing the selection, optionally
    /// narrowed by `filter`
    pub fn query_component(
        &self,
        name: &str,
        filter: Option<&dyn Fn(&Component) -> bool>,
    ) -> QueryState<ComponentId> {
        let doc = &self.editor.doc;
        let mut current = self.editor.selection.common_ancestor_component(doc);
        while let Some(component) = current {
            let node = doc.component(component);
            if node.name() == name && filter.is_none_or(|filter| filter(node)) {
                return QueryState::Enabled(component);
            }
            current = doc
                .parent_slot(component)
                .and_then(|slot| doc.parent_component(slot));
        }
        QueryState::Normal
    }

    /// Enabled when the selection spans exactly one component named `name`
    pub fn query_wrapped_component(&self, name: &str) -> QueryState<ComponentId> {
        let selection = &self.editor.selection;
        let (Some(start), Some(end)) = (selection.start(), selection.end()) else {
            return QueryState::Normal;
        };
        if start.slot != end.slot || end.offset - start.offset != 1 {
            return QueryState::Normal;
        }
        let doc = &self.editor.doc;
        match doc
            .slot(start.slot)
            .get_content_at_index(start.offset)
            .and_then(|item| item.component())
        {
            Some(component) if doc.component(component).name() == name => {
                QueryState::Enabled(component)
            }
            _ => QueryState::Normal,
        }
    }

    fn states_by_range(
        &self,
        slot: SlotId,
        formatter: &Formatter,
        start: usize,
        end: usize,
    ) -> Option<QueryState<FormatValue>> {
        let doc = &self.editor.doc;
        let node = doc.slot(slot);
        if start == end {
            let window = if start == 0 { 0..1 } else { start - 1..end };
            return node
                .get_format_ranges_by_formatter(formatter, window)
                .into_iter()
                .next()
                .map(|range| QueryState::Enabled(range.value));
        }

        let mut states = Vec::new();
        let mut index = start;
        for child in node.slice_content(start..end) {
            let len = child.len();
            match child {
                ContentItem::Text(_) => {
                    let mut s = index;
                    for range in node.get_format_ranges_by_formatter(formatter, index..index + len) {
                        // a gap before this range leaves part of the run unformatted
                        if s != range.start_index {
                            return Some(QueryState::Normal);
                        }
                        states.push(Some(QueryState::Enabled(range.value)));
                        s = range.end_index;
                    }
                    if s != index + len {
                        return Some(QueryState::Normal);
                    }
                }
                ContentItem::Component(component) => {
                    for child_slot in doc.component(component.id).slots() {
                        let len = doc.slot(*child_slot).len();
                        states.push(self.states_by_range(*child_slot, formatter, 0, len));
                    }
                }
            }
            index += len;
        }
        Some(merge_states(states))
    }
}

fn merge_states(states: Vec<Option<QueryState<FormatValue>>>) -> QueryState<FormatValue> {
    let mut shared: Option<FormatValue> = None;
    for state in &states {
        let Some(QueryState::Enabled(value)) = state else {
            return QueryState::Normal;
        };
        match &shared {
            Some(first) if first != value => return QueryState::Normal,
            Some(_) => {}
            None => shared = Some(value.clone()),
        }
    }
    match shared {
        Some(value) => QueryState::Enabled(value),
        None => QueryState::Normal,
    }
}
