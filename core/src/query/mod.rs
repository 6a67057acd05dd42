//! Query rewriting applied by the search tools before hitting the gateway

pub mod aliases;
pub mod quote;
pub mod time;

pub use aliases::{default_table, AliasTable};
pub use quote::quote_account_name;
pub use time::parse_time_expression;

/// How a tool rewrites its query before searching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryRewrite {
    /// Wrap the leading account name in quotes
    QuoteAccount,
    /// Replace a known account name with an OR group of its aliases
    ExpandAliases,
}
