//! Time-expression parsing into `last_updated_at` facet filters

use crate::search::FacetFilter;
use chrono::{Days, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

/// Field the gateway uses for document recency
const LAST_UPDATED_FIELD: &str = "last_updated_at";

/// Relative-date keywords understood by the gateway, checked in order
const KEYWORD_PATTERNS: &[(&str, &str)] = &[
    (r"(?i)\b(last|past)\s+week\b", "past_week"),
    (r"(?i)\b(last|past)\s+month\b", "past_month"),
    (r"(?i)\b(last|past)\s+day\b", "past_day"),
    (r"(?i)\btoday\b", "today"),
    (r"(?i)\byesterday\b", "yesterday"),
    (r"(?i)\brecent(ly)?\b", "past_week"),
];

fn keyword_regexes() -> &'static [(Regex, &'static str)] {
    static REGEXES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    REGEXES.get_or_init(|| {
        KEYWORD_PATTERNS
            .iter()
            .filter_map(|(pattern, keyword)| Regex::new(pattern).ok().map(|re| (re, *keyword)))
            .collect()
    })
}

fn days_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    REGEX
        .get_or_init(|| Regex::new(r"(?i)\b(last|past)\s+(\d+)\s+days?\b").ok())
        .as_ref()
}

/// Strip a time expression from `query` and turn it into a date filter.
///
/// Keywords such as `last week` or `recently` become an `EQUALS` filter on a
/// gateway keyword; `last N days` becomes a `GT` filter on the date `N` days
/// before `today`. Returns the cleaned query with whitespace collapsed.
pub fn parse_time_expression(query: &str, today: NaiveDate) -> (String, Option<Vec<FacetFilter>>) {
    let mut cleaned = query.to_string();
    let mut filter = None;

    for (re, keyword) in keyword_regexes() {
        if re.is_match(query) {
            filter = Some(vec![FacetFilter::equals(LAST_UPDATED_FIELD, keyword)]);
            cleaned = re.replace_all(query, "").into_owned();
            break;
        }
    }

    if filter.is_none() {
        if let Some((re, caps)) = days_regex().and_then(|re| Some((re, re.captures(query)?))) {
            // A window reaching past the calendar's start means "all time"
            let start = caps
                .get(2)
                .and_then(|days| days.as_str().parse::<u64>().ok())
                .and_then(|days| today.checked_sub_days(Days::new(days)));

            filter = start.map(|start| {
                let value = start.format("%Y-%m-%d").to_string();
                vec![FacetFilter::greater_than(LAST_UPDATED_FIELD, &value)]
            });
            cleaned = re.replace_all(query, "").into_owned();
        }
    }

    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    (cleaned, filter)
}
