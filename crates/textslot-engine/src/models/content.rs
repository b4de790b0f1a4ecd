use serde::{Deserialize, Serialize};

/// Handle to a slot stored in a [`crate::Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(pub(crate) usize);

/// Handle to a component stored in a [`crate::Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub(crate) usize);

/// Kinds of content a slot can be told to accept through its schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    Text,
    InlineComponent,
    BlockComponent,
}

/// A component as it appears inside a slot's content.
///
/// The content type travels with the id so a slot can check its schema
/// without reaching back into the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ComponentRef {
    pub id: ComponentId,
    pub content_type: ContentType,
}

/// One entry of a slot's content: a run of text or an embedded component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentItem {
    Text(String),
    Component(ComponentRef),
}

impl ContentItem {
    /// Offset units occupied by this item: one per char, one per component
    pub fn len(&self) -> usize {
        match self {
            ContentItem::Text(text) => text.chars().count(),
            ContentItem::Component(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            ContentItem::Text(_) => ContentType::Text,
            ContentItem::Component(component) => component.content_type,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentItem::Text(text) => Some(text),
            ContentItem::Component(_) => None,
        }
    }

    pub fn component(&self) -> Option<ComponentId> {
        match self {
            ContentItem::Text(_) => None,
            ContentItem::Component(component) => Some(component.id),
        }
    }
}

impl From<&str> for ContentItem {
    fn from(text: &str) -> Self {
        ContentItem::Text(text.to_string())
    }
}

impl From<String> for ContentItem {
    fn from(text: String) -> Self {
        ContentItem::Text(text)
    }
}

impl From<char> for ContentItem {
    fn from(c: char) -> Self {
        ContentItem::Text(c.to_string())
    }
}

impl From<ComponentRef> for ContentItem {
    fn from(component: ComponentRef) -> Self {
        ContentItem::Component(component)
    }
}

/// Byte index of the `char_offset`-th char, clamped to the end of the string
pub(crate) fn byte_index(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_length_counts_chars_not_bytes() {
        let item = ContentItem::from("héllo 🦀");
        assert_eq!(item.len(), 7);
        assert_eq!(item.content_type(), ContentType::Text);
    }

    #[test]
    fn test_component_occupies_one_unit() {
        let item = ContentItem::from(ComponentRef {
            id: ComponentId(3),
            content_type: ContentType::InlineComponent,
        });
        assert_eq!(item.len(), 1);
        assert_eq!(item.component(), Some(ComponentId(3)));
        assert_eq!(item.as_text(), None);
    }

    #[test]
    fn test_byte_index_clamps() {
        assert_eq!(byte_index("añb", 2), 3);
        assert_eq!(byte_index("añb", 10), 4);
    }
}
