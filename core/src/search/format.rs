//! Rendering search outcomes as tool output text

use super::types::SearchHit;
use crate::error::SearchError;

/// Number of hits rendered per result block
const MAX_DISPLAYED_HITS: usize = 5;
/// Content longer than this is truncated
const MAX_CONTENT_CHARS: usize = 500;

/// Render a search outcome for the model.
///
/// Failures render as their user-facing message; an empty result set gets a
/// hint that the user may lack access to matching records.
pub fn format_results(outcome: &Result<Vec<SearchHit>, SearchError>, label: &str) -> String {
    let hits = match outcome {
        Ok(hits) => hits,
        Err(error) => return error.user_message(),
    };

    if hits.is_empty() {
        return format!(
            "No accessible results found in {}.\n\n\
             This could mean:\n\
             • No matching records exist for this query\n\
             • You may not have permission to view matching records in this source\n\n\
             Try a different source or rephrase your query.",
            label
        );
    }

    let entries: Vec<String> = hits
        .iter()
        .take(MAX_DISPLAYED_HITS)
        .enumerate()
        .map(|(i, hit)| format_hit(i + 1, hit))
        .collect();

    format!(
        "Found {} result(s) from {}\n\n{}",
        hits.len(),
        label,
        entries.join("\n")
    )
}

fn format_hit(position: usize, hit: &SearchHit) -> String {
    format!(
        "**[{}] {}**\n- **Datasource: {}**\n- Content: {}\n- URL: {}\n",
        position,
        hit.title,
        hit.datasource,
        truncate(&hit.content, MAX_CONTENT_CHARS),
        hit.url
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
