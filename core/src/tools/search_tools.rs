//! The fixed set of enterprise-search tools offered to the model

use super::base::{Tool, ToolCall, ToolResult};
use crate::error::Result;
use crate::query::{self, AliasTable, QueryRewrite};
use crate::search::{format_results, merge_facet_filters, FacetFilter, SearchBackend, SearchRequest};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

/// Static description of one search tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// Description of the `query` argument shown to the model
    pub query_description: &'static str,
    /// Datasources to search; empty searches everything
    pub datasources: &'static [&'static str],
    pub page_size: u32,
    /// Document type facet applied to every search
    pub document_type: Option<&'static str>,
    /// Whether phrases like `last week` become date filters
    pub parse_time: bool,
    pub rewrite: QueryRewrite,
    /// Source label used in the formatted results
    pub label: &'static str,
}

/// All search tools, in the order they are offered to the model
pub const SEARCH_TOOLS: &[SearchToolSpec] = &[
    SearchToolSpec {
        name: "search_salesforce_opportunities",
        description: "Search Salesforce OPPORTUNITIES for renewals, contracts, deals. Query MUST start with account name.",
        query_description: "Query starting with account name",
        datasources: &["salescloud"],
        page_size: 5,
        document_type: Some("opportunity"),
        parse_time: true,
        rewrite: QueryRewrite::QuoteAccount,
        label: "Salesforce Opportunities",
    },
    SearchToolSpec {
        name: "search_salesforce_accounts",
        description: "Search Salesforce ACCOUNT records for company info. Query MUST start with account name.",
        query_description: "Query starting with account name",
        datasources: &["salescloud"],
        page_size: 5,
        document_type: Some("account"),
        parse_time: false,
        rewrite: QueryRewrite::QuoteAccount,
        label: "Salesforce Accounts",
    },
    SearchToolSpec {
        name: "search_salesforce_contacts",
        description: "Search Salesforce for CLIENT contacts at partner companies. Use for 'who are the contacts at [Account]' questions. NOT for Guild employees.",
        query_description: "Account name + contacts (e.g., 'Tesla contacts')",
        datasources: &["salescloud"],
        page_size: 5,
        document_type: Some("contact"),
        parse_time: false,
        rewrite: QueryRewrite::QuoteAccount,
        label: "Salesforce Contacts",
    },
    SearchToolSpec {
        name: "search_metrics_and_dashboards",
        description: "Search Salesforce/Looker for metrics, dashboards, funding. Query should include account name.",
        query_description: "Query with account name",
        datasources: &["salescloud", "looker"],
        page_size: 6,
        document_type: None,
        parse_time: false,
        rewrite: QueryRewrite::QuoteAccount,
        label: "Metrics (Salesforce + Looker)",
    },
    SearchToolSpec {
        name: "search_strategy_docs",
        description: "Search Google Drive for QBRs, Account Plans, strategy docs. Query should include account name.",
        query_description: "Query with account name",
        datasources: &["gdrive"],
        page_size: 5,
        document_type: None,
        parse_time: true,
        rewrite: QueryRewrite::ExpandAliases,
        label: "Google Drive",
    },
    SearchToolSpec {
        name: "search_communications",
        description: "Search Gong/Slack/Gmail for calls, sentiment, messages. Query should include account name.",
        query_description: "Query with account name",
        datasources: &["gong", "slack", "gmail"],
        page_size: 9,
        document_type: None,
        parse_time: true,
        rewrite: QueryRewrite::ExpandAliases,
        label: "Communications (Gong/Slack/Gmail)",
    },
    SearchToolSpec {
        name: "search_general_fallback",
        description: "Search ALL sources. Only use when user approves after other tools fail.",
        query_description: "Search query",
        datasources: &[],
        page_size: 10,
        document_type: None,
        parse_time: false,
        rewrite: QueryRewrite::QuoteAccount,
        label: "All Sources",
    },
];

/// Look up a search tool definition by name
pub fn find_search_tool(name: &str) -> Option<&'static SearchToolSpec> {
    SEARCH_TOOLS.iter().find(|spec| spec.name == name)
}

/// A search tool bound to a backend
pub struct SearchTool {
    spec: &'static SearchToolSpec,
    backend: Arc<dyn SearchBackend>,
    aliases: &'static AliasTable,
}

impl SearchTool {
    pub fn new(spec: &'static SearchToolSpec, backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            spec,
            backend,
            aliases: query::default_table(),
        }
    }

    /// Use a different alias table for expansion
    pub fn with_aliases(mut self, aliases: &'static AliasTable) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn spec(&self) -> &'static SearchToolSpec {
        self.spec
    }

    /// Turn the model's query into a gateway request.
    ///
    /// Time parsing runs first so the rewrite sees the cleaned query; the
    /// type facet precedes the date facet.
    pub fn build_request(&self, raw_query: &str, today: NaiveDate) -> SearchRequest {
        let (cleaned, date_filter) = if self.spec.parse_time {
            query::parse_time_expression(raw_query, today)
        } else {
            (raw_query.to_string(), None)
        };

        let rewritten = match self.spec.rewrite {
            QueryRewrite::QuoteAccount => query::quote_account_name(&cleaned),
            QueryRewrite::ExpandAliases => self.aliases.expand(&cleaned),
        };

        let type_filter = self
            .spec
            .document_type
            .map(|t| vec![FacetFilter::document_type(t)]);

        SearchRequest::new(rewritten, self.spec.page_size)
            .with_datasources(self.spec.datasources)
            .with_facet_filters(merge_facet_filters(type_filter, date_filter))
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        self.spec.name
    }

    fn description(&self) -> &str {
        self.spec.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": self.spec.query_description
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let raw_query: String = call.get_parameter("query")?;
        let request = self.build_request(&raw_query, Local::now().date_naive());

        info!(tool = self.spec.name, query = %request.query, "searching");
        let outcome = self.backend.search(&request).await;
        match &outcome {
            Ok(hits) => debug!(tool = self.spec.name, hits = hits.len(), "search finished"),
            Err(e) => debug!(tool = self.spec.name, error = %e, "search failed"),
        }

        let content = format_results(&outcome, self.spec.label);
        Ok(match outcome {
            Ok(_) => ToolResult::success(call.id, content),
            Err(_) => ToolResult::error(call.id, content),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::search::{RelationType, SearchHit};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBackend {
        requests: Mutex<Vec<SearchRequest>>,
        fail_with: Option<u16>,
    }

    #[async_trait]
    impl SearchBackend for RecordingBackend {
        async fn search(
            &self,
            request: &SearchRequest,
        ) -> std::result::Result<Vec<SearchHit>, SearchError> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(status) = self.fail_with {
                return Err(SearchError::Status { status });
            }
            Ok(vec![SearchHit {
                title: "Renewal".to_string(),
                url: "https://sf.example/1".to_string(),
                content: "Closing Q3".to_string(),
                datasource: "salescloud".to_string(),
                author: "Unknown".to_string(),
                updated_at: String::new(),
            }])
        }
    }

    fn tool(name: &str, backend: Arc<RecordingBackend>) -> SearchTool {
        SearchTool::new(find_search_tool(name).unwrap(), backend)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    #[test]
    fn test_table_order_and_shape() {
        let names: Vec<_> = SEARCH_TOOLS.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "search_salesforce_opportunities",
                "search_salesforce_accounts",
                "search_salesforce_contacts",
                "search_metrics_and_dashboards",
                "search_strategy_docs",
                "search_communications",
                "search_general_fallback",
            ]
        );
        assert!(find_search_tool("search_general_fallback")
            .unwrap()
            .datasources
            .is_empty());
    }

    #[test]
    fn test_opportunities_request_merges_type_then_date() {
        let backend = Arc::new(RecordingBackend::default());
        let request = tool("search_salesforce_opportunities", backend)
            .build_request("JPMorgan Chase renewal last 30 days", today());

        assert_eq!(request.query, "\"JPMorgan Chase\" renewal");
        assert_eq!(request.datasources, vec!["salescloud"]);
        assert_eq!(request.page_size, 5);

        let filters = request.facet_filters.unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0], FacetFilter::document_type("opportunity"));
        assert_eq!(filters[1].field_name, "last_updated_at");
        assert_eq!(filters[1].values[0].relation_type, RelationType::Gt);
        assert_eq!(filters[1].values[0].value, "2026-02-13");
    }

    #[test]
    fn test_accounts_ignore_time_phrases() {
        let backend = Arc::new(RecordingBackend::default());
        let request = tool("search_salesforce_accounts", backend)
            .build_request("Walmart overview last week", today());
        assert_eq!(request.query, "\"Walmart\" overview last week");
        assert_eq!(
            request.facet_filters,
            Some(vec![FacetFilter::document_type("account")])
        );
    }

    #[test]
    fn test_communications_expand_aliases() {
        let backend = Arc::new(RecordingBackend::default());
        let request = tool("search_communications", backend)
            .build_request("WFM calls last week", today());
        assert_eq!(
            request.query,
            "(\"Whole Foods Market\" OR \"WFM\" OR \"Whole Foods\") calls"
        );
        assert_eq!(request.datasources, vec!["gong", "slack", "gmail"]);
        assert_eq!(request.page_size, 9);
        assert_eq!(
            request.facet_filters,
            Some(vec![FacetFilter::equals("last_updated_at", "past_week")])
        );
    }

    #[test]
    fn test_metrics_has_no_filters() {
        let backend = Arc::new(RecordingBackend::default());
        let request = tool("search_metrics_and_dashboards", backend)
            .build_request("Hilton spend", today());
        assert_eq!(request.query, "\"Hilton\" spend");
        assert_eq!(request.datasources, vec!["salescloud", "looker"]);
        assert_eq!(request.facet_filters, None);
    }

    #[tokio::test]
    async fn test_execute_formats_hits() {
        let backend = Arc::new(RecordingBackend::default());
        let result = tool("search_salesforce_contacts", backend.clone())
            .execute(ToolCall::new(
                "search_salesforce_contacts",
                json!({"query": "Tesla contacts"}),
            ))
            .await
            .unwrap();

        assert!(result.success);
        assert!(result
            .content
            .starts_with("Found 1 result(s) from Salesforce Contacts"));
        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests[0].query, "\"Tesla\" contacts");
    }

    #[tokio::test]
    async fn test_execute_renders_search_failure() {
        let backend = Arc::new(RecordingBackend {
            fail_with: Some(401),
            ..Default::default()
        });
        let result = tool("search_general_fallback", backend)
            .execute(ToolCall::new("search_general_fallback", json!({"query": "Ford"})))
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(
            result.content,
            "Your session has expired. Please log in again to continue."
        );
    }

    #[tokio::test]
    async fn test_missing_query_is_an_error() {
        let backend = Arc::new(RecordingBackend::default());
        let result = tool("search_strategy_docs", backend.clone())
            .execute(ToolCall::new("search_strategy_docs", json!({"q": "x"})))
            .await;
        assert!(result.is_err());
        assert!(backend.requests.lock().unwrap().is_empty());
    }
}
