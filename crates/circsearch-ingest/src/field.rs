//! Leaf extraction from parsed items.
//!
//! Each catalog field sits in a `<field><value>…</value></field>` wrapper.
//! Anything that does not have that shape yields an empty string; extraction
//! never fails.

use circsearch_core::types::{CatalogFields, fields};

use crate::record::XmlValue;

/// Key of the leaf inside a field wrapper.
pub const VALUE_KEY: &str = "value";

/// Text at `item[field][value]`, or `""` when the item is absent, the field
/// is missing, or the leaf is not plain text.
#[must_use]
pub fn extract(item: Option<&XmlValue>, field: &str) -> String {
    item.and_then(|item| item.get(field))
        .and_then(|wrapper| wrapper.get(VALUE_KEY))
        .and_then(XmlValue::as_text)
        .map(str::to_owned)
        .unwrap_or_default()
}

/// All source fields of one item.
#[must_use]
pub fn extract_catalog_fields(item: &XmlValue) -> CatalogFields {
    let item = Some(item);
    CatalogFields {
        copies: extract(item, fields::COPIES),
        url: extract(item, fields::URL),
        id: extract(item, fields::ID),
        title: extract(item, fields::TITLE),
        isbn: extract(item, fields::ISBN),
    }
}
