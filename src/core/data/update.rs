//! Translation units ("updates") handed to the upload pipeline.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::core::data::SanitizedValue;

/// Format of a unit's `source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataFormat {
    /// Sanitized JSX tree.
    #[serde(rename = "JSX")]
    Jsx,
    /// ICU MessageFormat string.
    #[serde(rename = "ICU")]
    Icu,
}

/// Source payload of a unit: a tree for JSX, a string for ICU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UnitSource {
    Jsx(SanitizedValue),
    Icu(String),
}

/// Metadata attached to every unit.
///
/// Closed on purpose: only attributes listed here are recognized on a marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Hash of the evaluated `<Static>` content; only for units with Static regions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_chars: Option<u32>,
    pub file_paths: Vec<String>,
    /// Content hash over the data format, source and identifying metadata.
    pub hash: String,
}

/// One translatable unit extracted from a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationUnit {
    pub data_format: DataFormat,
    pub source: UnitSource,
    pub metadata: Metadata,
}

impl TranslationUnit {
    /// Build a unit and stamp its content hash.
    pub fn new(data_format: DataFormat, source: UnitSource, mut metadata: Metadata) -> Self {
        metadata.hash = content_hash(data_format, &source, &metadata);
        Self {
            data_format,
            source,
            metadata,
        }
    }
}

/// SHA-256 hex digest of a string.
pub fn sha256_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hash over everything that identifies a unit's content.
///
/// `filePaths` is excluded so the same content found in two files hashes the same.
fn content_hash(data_format: DataFormat, source: &UnitSource, metadata: &Metadata) -> String {
    let canonical = serde_json::json!({
        "dataFormat": data_format,
        "source": source,
        "id": metadata.id,
        "context": metadata.context,
        "staticId": metadata.static_id,
        "maxChars": metadata.max_chars,
    });
    sha256_hex(&canonical.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jsx_unit(text: &str, file: &str) -> TranslationUnit {
        TranslationUnit::new(
            DataFormat::Jsx,
            UnitSource::Jsx(SanitizedValue::Static(text.to_string())),
            Metadata {
                file_paths: vec![file.to_string()],
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_same_content_same_hash() {
        let a = jsx_unit("Hello", "a.tsx");
        let b = jsx_unit("Hello", "b.tsx");
        assert_eq!(a.metadata.hash, b.metadata.hash);
        assert_eq!(a.metadata.hash.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let a = jsx_unit("Hello", "a.tsx");
        let b = jsx_unit("Hello!", "a.tsx");
        assert_ne!(a.metadata.hash, b.metadata.hash);
    }

    #[test]
    fn test_context_changes_hash() {
        let plain = jsx_unit("Bank", "a.tsx");
        let with_context = TranslationUnit::new(
            DataFormat::Jsx,
            UnitSource::Jsx(SanitizedValue::Static("Bank".into())),
            Metadata {
                context: Some("river".into()),
                file_paths: vec!["a.tsx".into()],
                ..Default::default()
            },
        );
        assert_ne!(plain.metadata.hash, with_context.metadata.hash);
    }

    #[test]
    fn test_serialized_shape() {
        let unit = TranslationUnit::new(
            DataFormat::Icu,
            UnitSource::Icu("Hello {name}".into()),
            Metadata {
                id: Some("greeting".into()),
                file_paths: vec!["a.tsx".into()],
                ..Default::default()
            },
        );
        let json = serde_json::to_value(&unit).unwrap();
        assert_eq!(json["dataFormat"], "ICU");
        assert_eq!(json["source"], "Hello {name}");
        assert_eq!(json["metadata"]["id"], "greeting");
        assert_eq!(json["metadata"]["filePaths"][0], "a.tsx");
        assert!(json["metadata"].get("context").is_none());
    }
}
