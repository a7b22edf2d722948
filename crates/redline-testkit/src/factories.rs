//! Item and document factories

use redline_core::{Document, Item};

/// An incomplete item with the given text.
pub fn item(text: &str) -> Item {
    Item::new(text)
}

/// A completed item with the given text.
pub fn completed_item(text: &str) -> Item {
    let mut item = Item::new(text);
    item.completed = true;
    item
}

/// A document holding one incomplete item per entry, in order.
pub fn document_of(texts: &[&str]) -> Document {
    Document {
        items: texts.iter().map(|text| Item::new(*text)).collect(),
    }
}
