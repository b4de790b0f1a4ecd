//! Formatter registry and the formatters bundled with the engine.

use std::collections::HashMap;

use crate::models::Formatter;

pub const BOLD: &str = "bold";
pub const ITALIC: &str = "italic";
pub const UNDERLINE: &str = "underline";
pub const COLOR: &str = "color";
pub const TEXT_ALIGN: &str = "textAlign";
pub const TEXT_INDENT: &str = "textIndent";

/// Registered formatters, by name
#[derive(Debug, Clone, Default)]
pub struct FormatterList {
    formatters: HashMap<String, Formatter>,
}

impl FormatterList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, formatter: Formatter) -> &mut Self {
        self.formatters
            .insert(formatter.name().to_string(), formatter);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Formatter> {
        self.formatters.get(name)
    }
}

/// `bold`, `italic`, `underline` and `color` inline; `textAlign` and `textIndent` block
pub fn bundled() -> FormatterList {
    let mut list = FormatterList::new();
    list.register(Formatter::inline(BOLD))
        .register(Formatter::inline(ITALIC))
        .register(Formatter::inline(UNDERLINE))
        .register(Formatter::inline(COLOR))
        .register(Formatter::block(TEXT_ALIGN))
        .register(Formatter::block(TEXT_INDENT));
    list
}
