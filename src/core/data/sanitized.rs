//! The hashable tree produced by the JSX tree builder.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One node of a sanitized JSX tree.
///
/// The tree is order-preserving: children positions drive the render-time
/// reconstruction of the original markup, so they must never be reordered.
///
/// `Text` and `Static` both serialize as plain strings. They are kept apart
/// only until whitespace normalization, which applies to raw JSX text and must
/// leave evaluated expressions untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanitizedValue {
    /// Raw JSX text, not yet whitespace-normalized.
    Text(String),
    /// Value of an expression proven constant at analysis time.
    Static(String),
    /// A component or HTML-like element.
    Element(SanitizedElement),
    /// Multiple children of one element, in source order.
    List(Vec<SanitizedValue>),
    /// Position of a `<Static>` region; filled per emitted unit.
    Slot(usize),
}

/// `{type, props}` node for elements and recognized components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedElement {
    /// Resolved role for recognized components, tag name otherwise, empty for fragments.
    pub kind: String,
    pub props: IndexMap<String, SanitizedValue>,
}

impl SanitizedValue {
    pub fn element(kind: impl Into<String>, props: IndexMap<String, SanitizedValue>) -> Self {
        SanitizedValue::Element(SanitizedElement {
            kind: kind.into(),
            props,
        })
    }

    /// Collapse built children: none disappears, one stays bare, several become a list.
    pub fn from_children(mut children: Vec<SanitizedValue>) -> Option<SanitizedValue> {
        match children.len() {
            0 => None,
            1 => children.pop(),
            _ => Some(SanitizedValue::List(children)),
        }
    }

    /// String content for `Text` and `Static` nodes.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SanitizedValue::Text(s) | SanitizedValue::Static(s) => Some(s),
            _ => None,
        }
    }
}

impl Serialize for SanitizedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SanitizedValue::Text(s) | SanitizedValue::Static(s) => serializer.serialize_str(s),
            SanitizedValue::List(items) => items.serialize(serializer),
            SanitizedValue::Slot(_) => serializer.serialize_none(),
            SanitizedValue::Element(el) => el.serialize(serializer),
        }
    }
}

impl Serialize for SanitizedElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", &self.kind)?;
        map.serialize_entry("props", &self.props)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_children_collapses_single_child() {
        assert_eq!(SanitizedValue::from_children(vec![]), None);
        assert_eq!(
            SanitizedValue::from_children(vec![SanitizedValue::Text("a".into())]),
            Some(SanitizedValue::Text("a".into()))
        );
        assert!(matches!(
            SanitizedValue::from_children(vec![
                SanitizedValue::Text("a".into()),
                SanitizedValue::Static("b".into()),
            ]),
            Some(SanitizedValue::List(items)) if items.len() == 2
        ));
    }

    #[test]
    fn test_serialize_element_shape() {
        let mut props = IndexMap::new();
        props.insert("children".to_string(), SanitizedValue::Text("World".into()));
        let tree = SanitizedValue::List(vec![
            SanitizedValue::Text("Hello ".into()),
            SanitizedValue::element("b", props),
        ]);
        insta::assert_snapshot!(
            serde_json::to_string(&tree).unwrap(),
            @r#"["Hello ",{"type":"b","props":{"children":"World"}}]"#
        );
    }
}
