//! Enterprise search gateway: client, wire types and result formatting

pub mod client;
pub mod format;
pub mod types;

pub use client::{resolve_search_url, GleanClient, SearchBackend};
pub use format::format_results;
pub use types::{
    merge_facet_filters, FacetFilter, FacetValue, RelationType, SearchHit, SearchRequest,
};
