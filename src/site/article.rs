//! Article records extracted from the JSON article endpoint

use crate::engine::FailureReason;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One extracted article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub author: String,
    /// Resource key derived from the article URL
    pub id: String,
    pub title: String,
    pub content: String,
    pub date: String,
    /// Article page the record was fetched for
    pub source_url: String,
}

/// The `meta` object of the endpoint's response body
#[derive(Debug, Deserialize)]
struct ArticleMeta {
    title: String,
    author: String,
    content: String,
    #[serde(deserialize_with = "string_or_number")]
    date: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/// Parses a 200 response body into a record
///
/// An empty document (`null`, `{}`, `[]`, `""`, blank body) or one without
/// `meta` is [`FailureReason::EmptyPayload`]; anything that is not JSON or
/// has a broken `meta` is [`FailureReason::MalformedPayload`]. Both are
/// permanent.
pub fn parse_article(key: &str, source_url: &str, body: &str) -> Result<ArticleRecord, FailureReason> {
    if body.trim().is_empty() {
        return Err(FailureReason::EmptyPayload);
    }

    let document: Value = serde_json::from_str(body)
        .map_err(|e| FailureReason::MalformedPayload(format!("invalid JSON: {}", e)))?;

    if is_empty_document(&document) {
        return Err(FailureReason::EmptyPayload);
    }

    let meta = match document.get("meta") {
        Some(Value::Null) | None => return Err(FailureReason::EmptyPayload),
        Some(meta) => meta.clone(),
    };

    let meta: ArticleMeta = serde_json::from_value(meta)
        .map_err(|e| FailureReason::MalformedPayload(format!("bad meta: {}", e)))?;

    Ok(ArticleRecord {
        author: meta.author,
        id: key.to_string(),
        title: meta.title,
        content: meta.content,
        date: meta.date,
        source_url: source_url.to_string(),
    })
}

fn is_empty_document(document: &Value) -> bool {
    match document {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::Number(_) => false,
    }
}
