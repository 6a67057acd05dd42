//! Search gateway HTTP client

use super::types::{RequestOptions, SearchHit, SearchPayload, SearchRequest, SearchResponse};
use crate::config::SearchConfig;
use crate::error::{ConfigError, Result, SearchError};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

/// Upper bound on snippet length requested from the gateway
const MAX_SNIPPET_SIZE: u32 = 4000;
/// Facet bucket size requested from the gateway
const FACET_BUCKET_SIZE: u32 = 100;

/// Anything that can answer a search request
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, request: &SearchRequest)
        -> std::result::Result<Vec<SearchHit>, SearchError>;
}

/// Resolve the search endpoint URL from an instance setting.
///
/// Accepts `acme`, `acme-be.glean.com`, or either with a scheme and trailing
/// slash. A bare name without a dot is expanded to `<name>-be.glean.com`.
pub fn resolve_search_url(instance: &str) -> std::result::Result<String, ConfigError> {
    let clean = instance
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');

    if clean.is_empty() {
        return Err(ConfigError::MissingField {
            field: crate::config::GLEAN_INSTANCE_ENV.to_string(),
        });
    }

    let host = if clean.contains('.') {
        clean.to_string()
    } else {
        format!("{}-be.glean.com", clean)
    };

    let endpoint = format!("https://{}/rest/api/v1/search", host);
    url::Url::parse(&endpoint).map_err(|_| ConfigError::InvalidValue {
        field: crate::config::GLEAN_INSTANCE_ENV.to_string(),
        value: instance.to_string(),
    })?;

    Ok(endpoint)
}

/// REST client for the enterprise search gateway
pub struct GleanClient {
    client: Client,
    endpoint: String,
    api_token: String,
}

impl GleanClient {
    /// Create a client from resolved configuration
    pub fn new(config: &SearchConfig) -> Result<Self> {
        config.validate()?;
        let endpoint = resolve_search_url(&config.instance)?;
        Self::with_endpoint(endpoint, config)
    }

    /// Create a client that posts to an explicit endpoint URL
    pub fn with_endpoint<S: Into<String>>(endpoint: S, config: &SearchConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_token: config.api_token.clone(),
        })
    }

    /// The endpoint this client posts to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SearchBackend for GleanClient {
    async fn search(
        &self,
        request: &SearchRequest,
    ) -> std::result::Result<Vec<SearchHit>, SearchError> {
        let payload = SearchPayload {
            query: &request.query,
            page_size: request.page_size,
            max_snippet_size: MAX_SNIPPET_SIZE,
            request_options: RequestOptions {
                facet_bucket_size: FACET_BUCKET_SIZE,
                return_llm_content_over_snippets: true,
                datasources_filter: if request.datasources.is_empty() {
                    None
                } else {
                    Some(&request.datasources)
                },
                facet_filters: request.facet_filters.as_deref(),
            },
        };

        debug!(
            query = %request.query,
            datasources = ?request.datasources,
            page_size = request.page_size,
            "search request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "search gateway returned an error");
            return Err(SearchError::Status {
                status: status.as_u16(),
            });
        }

        let body: SearchResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Timeout
            } else {
                SearchError::Decode {
                    message: e.to_string(),
                }
            }
        })?;

        let hits: Vec<SearchHit> = body.results.into_iter().map(SearchHit::from).collect();
        debug!(hits = hits.len(), "search response");
        Ok(hits)
    }
}

fn transport_error(error: reqwest::Error) -> SearchError {
    if error.is_timeout() {
        SearchError::Timeout
    } else if let Some(status) = error.status() {
        SearchError::Status {
            status: status.as_u16(),
        }
    } else {
        SearchError::Transport {
            message: error.to_string(),
        }
    }
}

impl SearchError {
    /// The message shown to the model (and ultimately the user) for this failure.
    ///
    /// The gateway reports missing permissions as 404 rather than 403.
    pub fn user_message(&self) -> String {
        match self {
            SearchError::Status { status: 400 } => {
                "There was an issue with the search query. Please try rephrasing your question."
                    .to_string()
            }
            SearchError::Status { status: 401 } => {
                "Your session has expired. Please log in again to continue.".to_string()
            }
            SearchError::Status { status: 404 } => {
                "You don't have permission to access this search feature. Contact your administrator if you believe this is an error."
                    .to_string()
            }
            SearchError::Status { status: 405 } => {
                "There's a configuration issue with the search system. Please contact support."
                    .to_string()
            }
            SearchError::Status { status: 408 } | SearchError::Timeout => {
                "The search took too long. Please try a more specific query.".to_string()
            }
            SearchError::Status { status: 429 } => {
                "Too many searches in a short time. Please wait a moment and try again."
                    .to_string()
            }
            SearchError::Status { status } if *status >= 500 => {
                "The search system is temporarily unavailable. Please try again shortly."
                    .to_string()
            }
            SearchError::Status { status } => format!(
                "Search error ({}). Please try again or contact support.",
                status
            ),
            SearchError::Transport { .. } | SearchError::Decode { .. } => {
                "Something went wrong with this search. Please try again.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::FacetFilter;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> SearchConfig {
        SearchConfig::new("acme".to_string(), "secret-token".to_string())
    }

    async fn client_for(server: &MockServer) -> GleanClient {
        GleanClient::with_endpoint(format!("{}/rest/api/v1/search", server.uri()), &config())
            .unwrap()
    }

    #[test]
    fn test_resolve_search_url() {
        assert_eq!(
            resolve_search_url("guild").unwrap(),
            "https://guild-be.glean.com/rest/api/v1/search"
        );
        assert_eq!(
            resolve_search_url("https://acme-be.glean.com/").unwrap(),
            "https://acme-be.glean.com/rest/api/v1/search"
        );
        assert_eq!(
            resolve_search_url("http://search.internal.example").unwrap(),
            "https://search.internal.example/rest/api/v1/search"
        );
        assert!(resolve_search_url("  ").is_err());
    }

    #[test]
    fn test_new_rejects_missing_token() {
        let config = SearchConfig::new("acme".to_string(), String::new());
        assert!(GleanClient::new(&config).is_err());
        let client = GleanClient::new(&SearchConfig::new("acme".to_string(), "t".to_string()))
            .unwrap();
        assert_eq!(client.endpoint(), "https://acme-be.glean.com/rest/api/v1/search");
    }

    #[tokio::test]
    async fn test_search_sends_payload_and_parses_hits() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/api/v1/search"))
            .and(header("authorization", "Bearer secret-token"))
            .and(body_json(json!({
                "query": "\"Tesla\" renewal",
                "pageSize": 5,
                "maxSnippetSize": 4000,
                "requestOptions": {
                    "facetBucketSize": 100,
                    "returnLlmContentOverSnippets": true,
                    "datasourcesFilter": ["salescloud"],
                    "facetFilters": [
                        {"fieldName": "type", "values": [{"value": "opportunity", "relationType": "EQUALS"}]}
                    ]
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{
                    "document": {
                        "title": "Tesla Renewal FY27",
                        "url": "https://sf.example/opp/1",
                        "datasource": "salescloud",
                        "author": {"name": "Jordan"},
                        "updateTime": "2026-09-01T00:00:00Z"
                    },
                    "llmContent": [{"text": "Stage: Negotiation"}]
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = SearchRequest::new("\"Tesla\" renewal", 5)
            .with_datasources(&["salescloud"])
            .with_facet_filters(Some(vec![FacetFilter::document_type("opportunity")]));

        let hits = client_for(&server).await.search(&request).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Tesla Renewal FY27");
        assert_eq!(hits[0].content, "Stage: Negotiation");
        assert_eq!(hits[0].author, "Jordan");
        assert_eq!(hits[0].updated_at, "2026-09-01T00:00:00Z");
    }

    #[tokio::test]
    async fn test_search_omits_empty_filters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({
                "query": "anything",
                "pageSize": 10,
                "maxSnippetSize": 4000,
                "requestOptions": {
                    "facetBucketSize": 100,
                    "returnLlmContentOverSnippets": true
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let hits = client_for(&server)
            .await
            .search(&SearchRequest::new("anything", 10))
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_search_maps_status_errors() {
        for status in [400u16, 401, 404, 429, 503] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(status))
                .mount(&server)
                .await;

            let err = client_for(&server)
                .await
                .search(&SearchRequest::new("q", 5))
                .await
                .unwrap_err();
            assert!(
                matches!(err, SearchError::Status { status: s } if s == status),
                "status {} mapped to {:?}",
                status,
                err
            );
        }
    }

    #[test]
    fn test_user_messages() {
        let msg = |status| SearchError::Status { status }.user_message();
        assert!(msg(400).contains("rephrasing"));
        assert!(msg(401).contains("session has expired"));
        assert!(msg(404).contains("don't have permission"));
        assert!(msg(405).contains("configuration issue"));
        assert!(msg(408).contains("took too long"));
        assert!(msg(429).contains("Too many searches"));
        assert!(msg(500).contains("temporarily unavailable"));
        assert!(msg(502).contains("temporarily unavailable"));
        assert_eq!(
            msg(418),
            "Search error (418). Please try again or contact support."
        );
        assert!(SearchError::Timeout.user_message().contains("took too long"));
        assert!(SearchError::Transport {
            message: "dns".to_string()
        }
        .user_message()
        .starts_with("Something went wrong"));
    }
}
