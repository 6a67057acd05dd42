//! Account alias table and OR-group expansion

/// Enterprise account list with the abbreviations people use for them
const DEFAULT_ACCOUNTS: &[(&str, &[&str])] = &[
    ("JPMorgan Chase", &["JPMC", "JPM", "JP Morgan", "Chase"]),
    ("USAA", &[]),
    ("PNC", &[]),
    ("Fidelity", &[]),
    ("Discover", &[]),
    ("Allstate", &[]),
    ("Regions", &[]),
    ("Rocket", &[]),
    ("Zurich", &[]),
    ("AdventHealth", &["AH", "Advent Health", "Advent"]),
    ("Baylor Scott & White Health", &["BSWH", "Baylor Scott White", "BSW"]),
    ("Bon Secours Mercy Health", &["BSMH", "Bon Secours"]),
    ("UCHealth", &["UCH", "UC Health"]),
    ("Main Line Health", &["MLH"]),
    ("Sentara Health", &["Sentara"]),
    ("Humana", &[]),
    ("Baptist Health", &[]),
    ("CHRISTUS Health", &["CHRISTUS"]),
    ("Cincinnati Children's", &["Cinci Children's"]),
    ("IU Health", &["Indiana University Health"]),
    ("Johns Hopkins Health System", &["JHHS", "Johns Hopkins"]),
    ("Trinity Health", &[]),
    ("Providence", &[]),
    ("Sutter Health", &["Sutter"]),
    ("Wellstar", &[]),
    ("Sharp HealthCare", &["Sharp"]),
    ("The Cigna Group", &["Cigna"]),
    ("Walgreens", &[]),
    ("Walmart", &["WMT", "Wal-Mart"]),
    ("Target", &["TGT"]),
    ("Bath & Body Works", &["BBW", "Bath and Body Works"]),
    ("Kohl's", &["Kohls"]),
    ("Lowe's", &["Lowes"]),
    ("Macy's, Inc.", &["Macys", "Macy's"]),
    ("Sherwin-Williams", &["Sherwin Williams"]),
    ("Whole Foods Market", &["WFM", "Whole Foods"]),
    ("H-E-B", &["HEB"]),
    ("Hy-Vee and Affiliates", &["Hy-Vee", "HyVee"]),
    ("Giant Eagle", &[]),
    ("Meijer", &[]),
    ("Disney", &["Walt Disney", "WDW"]),
    ("Hilton", &[]),
    ("Herschend", &[]),
    ("Tesla", &[]),
    ("Ford", &[]),
    ("PepsiCo", &["Pepsi"]),
    ("Tyson", &["Tyson Foods"]),
    ("Smithfield", &[]),
    ("Hershey", &["The Hershey Company"]),
    ("Lennox", &[]),
    ("Chipotle", &[]),
    ("Five Guys", &[]),
    ("MOD Pizza", &["MOD"]),
    ("Din Tai Fung", &["DTF"]),
    ("Guild for Guilders", &["G4G"]),
    ("Charter", &[]),
    ("Sunrun", &[]),
    ("Lennar", &[]),
    ("Pitney Bowes", &[]),
];

#[derive(Debug, Clone)]
struct Account {
    canonical: String,
    aliases: Vec<String>,
}

/// Canonical account names and their aliases.
///
/// The reverse index maps every lowercased canonical name and alias to its
/// account and is scanned in insertion order, so earlier accounts win when
/// several names occur in one query.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    accounts: Vec<Account>,
    reverse: Vec<(String, usize)>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account. A name already in the reverse index is repointed to
    /// this account but keeps its scan position.
    pub fn insert<S: Into<String>>(&mut self, canonical: S, aliases: &[&str]) {
        let canonical = canonical.into();
        let index = self.accounts.len();

        let keys = std::iter::once(canonical.as_str()).chain(aliases.iter().copied());
        for key in keys {
            let key = key.to_lowercase();
            match self.reverse.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = index,
                None => self.reverse.push((key, index)),
            }
        }

        self.accounts.push(Account {
            canonical,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        });
    }

    /// Number of accounts in the table
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Canonical name for an alias or canonical name, case-insensitive
    pub fn canonical(&self, name: &str) -> Option<&str> {
        let key = name.to_lowercase();
        self.reverse
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, idx)| self.accounts[*idx].canonical.as_str())
    }

    /// Replace the first known account name in `query` with an OR group of
    /// all its names, canonical first.
    ///
    /// `JPMC calls` becomes `("JPMorgan Chase" OR "JPMC" OR "JPM" OR "JP Morgan" OR "Chase") calls`.
    pub fn expand(&self, query: &str) -> String {
        let query_lower = query.to_lowercase();

        for (key, idx) in &self.reverse {
            if !query_lower.contains(key.as_str()) {
                continue;
            }
            let Some((start, end)) = find_case_insensitive(query, key) else {
                continue;
            };

            let group = self.or_group(&self.accounts[*idx]);
            return format!("{}{}{}", &query[..start], group, &query[end..]);
        }

        query.to_string()
    }

    fn or_group(&self, account: &Account) -> String {
        let mut seen: Vec<String> = Vec::new();
        let mut names: Vec<String> = Vec::new();
        for name in std::iter::once(&account.canonical).chain(account.aliases.iter()) {
            let lower = name.to_lowercase();
            if !seen.contains(&lower) {
                seen.push(lower);
                names.push(format!("\"{}\"", name));
            }
        }
        format!("({})", names.join(" OR "))
    }
}

/// The built-in account table
pub fn default_table() -> &'static AliasTable {
    static TABLE: std::sync::OnceLock<AliasTable> = std::sync::OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = AliasTable::new();
        for (canonical, aliases) in DEFAULT_ACCOUNTS {
            table.insert(*canonical, aliases);
        }
        table
    })
}

/// Byte range of the first case-insensitive occurrence of `needle_lower`
fn find_case_insensitive(haystack: &str, needle_lower: &str) -> Option<(usize, usize)> {
    let needle_len = needle_lower.chars().count();
    for (start, _) in haystack.char_indices() {
        let mut end = start;
        let mut candidate = String::new();
        for (count, (offset, c)) in haystack[start..].char_indices().enumerate() {
            if count == needle_len {
                break;
            }
            candidate.extend(c.to_lowercase());
            end = start + offset + c.len_utf8();
        }
        if candidate == needle_lower {
            return Some((start, end));
        }
    }
    None
}
