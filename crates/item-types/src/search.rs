//! Search index types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the only field in an indexed document
pub const TEXT_FIELD: &str = "text";

/// Document written to the search index for every created item.
///
/// There is deliberately no item id here: documents are append-only and
/// cannot be addressed by the item they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub text: String,
}

impl IndexedDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A raw hit as returned by the search engine, ranked by its own scoring.
///
/// `_source` is kept as the engine returned it, and fields not named here
/// (`_type`, `_routing`, `highlight`, ...) are carried in `extra`, so a hit
/// serializes back to what the engine sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_index", default)]
    pub index: String,
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchHit {
    pub fn new(
        index: impl Into<String>,
        id: impl Into<String>,
        score: Option<f64>,
        document: &IndexedDocument,
    ) -> Self {
        let mut source = Map::new();
        source.insert(TEXT_FIELD.to_string(), Value::from(document.text.clone()));
        Self {
            index: index.into(),
            id: id.into(),
            score,
            source: Value::Object(source),
            extra: Map::new(),
        }
    }

    /// The indexed text, if the source document has one
    pub fn text(&self) -> Option<&str> {
        self.source.get(TEXT_FIELD).and_then(Value::as_str)
    }
}

/// Body of `POST /search`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(rename = "searchText")]
    pub search_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hit_from_engine_json() {
        let raw = json!({
            "_index": "items",
            "_id": "Jx3kAo0B",
            "_score": 0.2876821,
            "_source": { "text": "buy milk" }
        });
        let hit: SearchHit = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(hit.text(), Some("buy milk"));
        assert_eq!(hit.index, "items");
        assert_eq!(serde_json::to_value(&hit).unwrap(), raw);
    }

    #[test]
    fn test_hit_keeps_engine_specific_fields() {
        let raw = json!({
            "_index": "items",
            "_type": "_doc",
            "_id": "a1",
            "_score": 1.0,
            "_routing": "r1",
            "_source": { "text": "buy milk" },
            "highlight": { "text": ["buy <em>milk</em>"] }
        });
        let hit: SearchHit = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(hit.extra["_type"], json!("_doc"));
        assert_eq!(serde_json::to_value(&hit).unwrap(), raw);
    }

    #[test]
    fn test_hit_without_text_still_parses() {
        let hit: SearchHit = serde_json::from_value(json!({
            "_index": "items",
            "_id": "old",
            "_score": 0.5,
            "_source": { "title": "legacy" }
        }))
        .unwrap();

        assert_eq!(hit.text(), None);
        assert_eq!(hit.source, json!({ "title": "legacy" }));
    }

    #[test]
    fn test_new_hit_source_shape() {
        let hit = SearchHit::new("items", "0", Some(1.0), &IndexedDocument::new("walk dog"));
        assert_eq!(hit.source, json!({ "text": "walk dog" }));
        assert!(hit.extra.is_empty());
    }

    #[test]
    fn test_search_request_field_name() {
        let req: SearchRequest = serde_json::from_str(r#"{"searchText":"milk"}"#).unwrap();
        assert_eq!(req.search_text, "milk");
    }
}
