pub mod component;
pub mod content;
pub mod format;
pub mod literal;
pub mod slot;

pub use component::Component;
pub use content::{ComponentId, ComponentRef, ContentItem, ContentType, SlotId};
pub use format::{FormatItem, FormatRange, FormatType, FormatValue, Formatter};
pub use literal::{ComponentLiteral, ContentLiteral, SlotLiteral};
pub use slot::Slot;
