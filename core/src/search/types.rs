//! Wire types for the search gateway REST API

use serde::{Deserialize, Serialize};

/// How a facet value is compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    Equals,
    Gt,
}

/// One value constraint within a facet filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetValue {
    pub value: String,
    pub relation_type: RelationType,
}

/// A facet filter restricting results on one document field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetFilter {
    pub field_name: String,
    pub values: Vec<FacetValue>,
}

impl FacetFilter {
    /// `field == value`
    pub fn equals(field_name: &str, value: &str) -> Self {
        Self::single(field_name, value, RelationType::Equals)
    }

    /// `field > value`
    pub fn greater_than(field_name: &str, value: &str) -> Self {
        Self::single(field_name, value, RelationType::Gt)
    }

    /// Restrict to a document type (`opportunity`, `account`, `contact`)
    pub fn document_type(value: &str) -> Self {
        Self::equals("type", value)
    }

    fn single(field_name: &str, value: &str, relation_type: RelationType) -> Self {
        Self {
            field_name: field_name.to_string(),
            values: vec![FacetValue {
                value: value.to_string(),
                relation_type,
            }],
        }
    }
}

/// Concatenate two optional filter sets, `None` when both are empty
pub fn merge_facet_filters(
    existing: Option<Vec<FacetFilter>>,
    new: Option<Vec<FacetFilter>>,
) -> Option<Vec<FacetFilter>> {
    let existing = existing.filter(|f| !f.is_empty());
    let new = new.filter(|f| !f.is_empty());
    match (existing, new) {
        (None, None) => None,
        (Some(existing), None) => Some(existing),
        (None, Some(new)) => Some(new),
        (Some(mut existing), Some(new)) => {
            existing.extend(new);
            Some(existing)
        }
    }
}

/// Search request parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    /// Datasources to search; empty means all sources
    pub datasources: Vec<String>,
    pub page_size: u32,
    pub facet_filters: Option<Vec<FacetFilter>>,
}

impl SearchRequest {
    pub fn new<S: Into<String>>(query: S, page_size: u32) -> Self {
        Self {
            query: query.into(),
            datasources: Vec::new(),
            page_size,
            facet_filters: None,
        }
    }

    pub fn with_datasources(mut self, datasources: &[&str]) -> Self {
        self.datasources = datasources.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn with_facet_filters(mut self, facet_filters: Option<Vec<FacetFilter>>) -> Self {
        self.facet_filters = facet_filters;
        self
    }
}

/// JSON body posted to the search endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchPayload<'a> {
    pub query: &'a str,
    pub page_size: u32,
    pub max_snippet_size: u32,
    pub request_options: RequestOptions<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RequestOptions<'a> {
    pub facet_bucket_size: u32,
    pub return_llm_content_over_snippets: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datasources_filter: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet_filters: Option<&'a [FacetFilter]>,
}

/// Top-level search response
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub results: Vec<RawResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawResult {
    #[serde(default)]
    pub document: RawDocument,
    #[serde(default)]
    pub llm_content: Option<serde_json::Value>,
    #[serde(default)]
    pub snippets: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawDocument {
    pub title: Option<String>,
    pub url: Option<String>,
    pub datasource: Option<String>,
    pub author: Option<RawAuthor>,
    pub update_time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawAuthor {
    pub name: Option<String>,
}

/// A single normalized search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    /// Best available text: LLM content when present, otherwise the first snippet
    pub content: String,
    pub datasource: String,
    pub author: String,
    pub updated_at: String,
}

impl From<RawResult> for SearchHit {
    fn from(raw: RawResult) -> Self {
        let content = raw
            .llm_content
            .as_ref()
            .and_then(content_text)
            .or_else(|| raw.snippets.as_ref().and_then(content_text))
            .unwrap_or_default();

        let document = raw.document;
        Self {
            title: document.title.unwrap_or_else(|| "Untitled".to_string()),
            url: document.url.unwrap_or_default(),
            content,
            datasource: document.datasource.unwrap_or_default(),
            author: document
                .author
                .and_then(|a| a.name)
                .unwrap_or_else(|| "Unknown".to_string()),
            updated_at: document.update_time.unwrap_or_default(),
        }
    }
}

/// Pull readable text out of an `llmContent` / `snippets` value.
///
/// Accepts a plain string, a list whose first element is a string or an
/// object with `text`/`snippet`, or such an object directly.
fn content_text(value: &serde_json::Value) -> Option<String> {
    use serde_json::Value;

    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items.first().and_then(content_text),
        Value::Object(map) => map
            .get("text")
            .or_else(|| map.get("snippet"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        _ => None,
    }
}
