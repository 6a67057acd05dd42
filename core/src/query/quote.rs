//! Account-name quoting

/// Words that end the account-name prefix of a query
const ACTION_WORDS: &[&str] = &[
    "renewal",
    "renew",
    "contract",
    "opportunity",
    "deal",
    "contact",
    "contacts",
    "stakeholder",
    "decision",
    "account",
    "company",
    "info",
    "overview",
    "call",
    "calls",
    "meeting",
    "email",
    "slack",
    "qbr",
    "ebr",
    "plan",
    "strategy",
    "doc",
    "metric",
    "metrics",
    "dashboard",
    "spend",
    "funding",
    "key",
    "recent",
    "last",
    "latest",
    "upcoming",
];

fn is_action_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    ACTION_WORDS.contains(&lower.as_str())
}

/// Quote the account name at the start of a query so the gateway treats a
/// multi-word name as one phrase.
///
/// `JPMorgan Chase renewal` becomes `"JPMorgan Chase" renewal`. Queries that
/// already start with a quote, or that start with an action word, are
/// returned unchanged.
pub fn quote_account_name(query: &str) -> String {
    if query.starts_with('"') {
        return query.to_string();
    }

    let words: Vec<&str> = query.split_whitespace().collect();
    let split = words
        .iter()
        .position(|w| is_action_word(w))
        .unwrap_or(words.len());

    if split == 0 {
        return query.to_string();
    }

    let account = words[..split].join(" ");
    let rest = words[split..].join(" ");
    format!("\"{}\" {}", account, rest).trim().to_string()
}
