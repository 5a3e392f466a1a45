//! Parsing of one record unit into a generic nested value.
//!
//! A unit may hold one `<item>` or several sibling `<item>` elements, so it
//! is parsed inside a synthetic wrapper root. Elements map to
//! [`XmlValue`] as follows:
//!
//! | element                              | value                          |
//! |--------------------------------------|--------------------------------|
//! | no attributes, no children, no text  | `Empty`                        |
//! | text only                            | `Text` (trimmed)               |
//! | attributes or child elements         | `Map` (`@attr`, `#text`, tags) |
//!
//! A tag repeated under the same parent becomes a `Seq` in document order.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use circsearch_core::error::{IngestError, IngestResult};

use crate::splitter::RawRecordUnit;

const WRAPPER: &str = "circsearch-unit";

/// Tag name of a logical record.
pub const ITEM_TAG: &str = "item";

/// Key holding the text of an element that also has attributes or children.
pub const TEXT_KEY: &str = "#text";

/// Generic nested value produced from markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlValue {
    Empty,
    Text(String),
    Map(BTreeMap<String, XmlValue>),
    Seq(Vec<XmlValue>),
}

impl XmlValue {
    /// Child value under `key`, if this is a map.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Map(map) => map.get(key),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_map(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// The item(s) a record unit contains, as they came out of the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemShape<'a> {
    /// The unit had no `item` element at top level.
    Absent,
    Single(&'a XmlValue),
    Many(&'a [XmlValue]),
}

impl<'a> ItemShape<'a> {
    /// Flatten to a list in document order.
    #[must_use]
    pub fn into_items(self) -> Vec<&'a XmlValue> {
        match self {
            Self::Absent => Vec::new(),
            Self::Single(item) => vec![item],
            Self::Many(items) => items.iter().collect(),
        }
    }
}

/// A parsed record unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord {
    top: BTreeMap<String, XmlValue>,
    line: usize,
}

impl ParsedRecord {
    /// Parse a record unit.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::MalformedRecord` carrying the unit's start line
    /// when the text is not well-formed markup.
    pub fn parse(unit: &RawRecordUnit) -> IngestResult<Self> {
        let wrapped = format!("<{WRAPPER}>{}</{WRAPPER}>", unit.text());
        let document =
            roxmltree::Document::parse(&wrapped).map_err(|e| IngestError::MalformedRecord {
                line: unit.line(),
                detail: e.to_string(),
            })?;

        let top = match element_value(document.root_element()) {
            XmlValue::Map(map) => map,
            _ => BTreeMap::new(),
        };
        Ok(Self {
            top,
            line: unit.line(),
        })
    }

    /// Start line of the unit this record came from.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Top-level value under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&XmlValue> {
        self.top.get(key)
    }

    #[must_use]
    pub fn item_shape(&self) -> ItemShape<'_> {
        match self.top.get(ITEM_TAG) {
            None => ItemShape::Absent,
            Some(XmlValue::Seq(items)) => ItemShape::Many(items),
            Some(item) => ItemShape::Single(item),
        }
    }

    /// Items in document order, whatever the shape.
    #[must_use]
    pub fn items(&self) -> Vec<&XmlValue> {
        self.item_shape().into_items()
    }
}

fn element_value(node: roxmltree::Node<'_, '_>) -> XmlValue {
    let mut map = BTreeMap::new();
    for attr in node.attributes() {
        map.insert(
            format!("@{}", attr.name()),
            XmlValue::Text(attr.value().to_owned()),
        );
    }

    let mut text = String::new();
    for child in node.children() {
        if child.is_element() {
            insert_child(&mut map, child.tag_name().name(), element_value(child));
        } else if child.is_text()
            && let Some(fragment) = child.text()
        {
            text.push_str(fragment);
        }
    }

    let text = text.trim();
    if map.is_empty() {
        return if text.is_empty() {
            XmlValue::Empty
        } else {
            XmlValue::Text(text.to_owned())
        };
    }
    if !text.is_empty() {
        map.insert(TEXT_KEY.to_owned(), XmlValue::Text(text.to_owned()));
    }
    XmlValue::Map(map)
}

fn insert_child(map: &mut BTreeMap<String, XmlValue>, name: &str, value: XmlValue) {
    match map.entry(name.to_owned()) {
        Entry::Vacant(slot) => {
            slot.insert(value);
        }
        Entry::Occupied(mut slot) => match slot.get_mut() {
            XmlValue::Seq(values) => values.push(value),
            existing => {
                let first = std::mem::replace(existing, XmlValue::Empty);
                *existing = XmlValue::Seq(vec![first, value]);
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ParsedRecord {
        ParsedRecord::parse(&RawRecordUnit::new(text, 1)).expect("parse")
    }

    #[test]
    fn single_item_is_normalized_to_one_element_list() {
        let record = parse(
            r#"<item id="1"><title><value>The Great Gatsby</value></title></item>"#,
        );
        assert!(matches!(record.item_shape(), ItemShape::Single(_)));
        let items = record.items();
        assert_eq!(items.len(), 1);
        let title = items[0]
            .get("title")
            .and_then(|t| t.get("value"))
            .and_then(XmlValue::as_text);
        assert_eq!(title, Some("The Great Gatsby"));
        assert_eq!(items[0].get("@id").and_then(XmlValue::as_text), Some("1"));
    }

    #[test]
    fn sibling_items_keep_document_order() {
        let record = parse(
            r#"<item id="1"><id><value>a</value></id></item><item id="2"><id><value>b</value></id></item>"#,
        );
        assert!(matches!(record.item_shape(), ItemShape::Many(items) if items.len() == 2));
        let ids: Vec<_> = record
            .items()
            .iter()
            .filter_map(|item| item.get("@id").and_then(XmlValue::as_text))
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn unit_without_item_has_no_items() {
        let record = parse("<note>stray</note>");
        assert_eq!(record.item_shape(), ItemShape::Absent);
        assert!(record.items().is_empty());
        assert_eq!(record.get("note").and_then(XmlValue::as_text), Some("stray"));
    }

    #[test]
    fn empty_leaf_is_empty() {
        let record = parse(r#"<item id="1"><isbn><value/></isbn></item>"#);
        let value = record.items()[0].get("isbn").and_then(|v| v.get("value"));
        assert_eq!(value, Some(&XmlValue::Empty));
    }

    #[test]
    fn whitespace_is_trimmed_from_text() {
        let record = parse("<item id=\"1\">\n  <url>\n    <value>  https://x  </value>\n  </url>\n</item>");
        let url = record.items()[0]
            .get("url")
            .and_then(|v| v.get("value"))
            .and_then(XmlValue::as_text);
        assert_eq!(url, Some("https://x"));
    }

    #[test]
    fn repeated_children_become_sequence() {
        let record = parse(r#"<item id="1"><title><value>A</value><value>B</value></title></item>"#);
        let value = record.items()[0].get("title").and_then(|t| t.get("value"));
        assert_eq!(
            value,
            Some(&XmlValue::Seq(vec![
                XmlValue::Text("A".into()),
                XmlValue::Text("B".into())
            ]))
        );
    }

    #[test]
    fn mixed_content_keeps_text_under_text_key() {
        let record = parse(r#"<item id="1"><title lang="en">Gatsby</title></item>"#);
        let title = record.items()[0].get("title").expect("title");
        assert_eq!(title.get(TEXT_KEY).and_then(XmlValue::as_text), Some("Gatsby"));
        assert_eq!(title.get("@lang").and_then(XmlValue::as_text), Some("en"));
    }

    #[test]
    fn entities_and_cdata_are_decoded() {
        let record = parse(
            r#"<item id="1"><title><value>Pride &amp; <![CDATA[Prejudice]]></value></title></item>"#,
        );
        let title = record.items()[0]
            .get("title")
            .and_then(|t| t.get("value"))
            .and_then(XmlValue::as_text);
        assert_eq!(title, Some("Pride & Prejudice"));
    }

    #[test]
    fn malformed_unit_reports_start_line() {
        let unit = RawRecordUnit::new(r#"<item id="1"><title></item>"#, 17);
        let err = ParsedRecord::parse(&unit).expect_err("malformed");
        assert!(matches!(err, IngestError::MalformedRecord { line: 17, .. }));
    }

    #[test]
    fn line_is_carried_over() {
        let record =
            ParsedRecord::parse(&RawRecordUnit::new(r#"<item id="1"></item>"#, 9)).expect("parse");
        assert_eq!(record.line(), 9);
    }
}
