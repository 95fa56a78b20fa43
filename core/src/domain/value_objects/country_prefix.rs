//! Whitelist of dialing prefixes eligible for SMS codes

use dragon_shared::config::CountryPrefix;

/// Read-only set of (country, dialing prefix) pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryPrefixTable {
    entries: Vec<CountryPrefix>,
}

impl CountryPrefixTable {
    /// Build a table; longer prefixes are matched first
    pub fn new(mut entries: Vec<CountryPrefix>) -> Self {
        entries.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Self { entries }
    }

    /// Country whose prefix starts the given mobile number
    pub fn find(&self, mobile: &str) -> Option<&CountryPrefix> {
        self.entries
            .iter()
            .find(|entry| !entry.prefix.is_empty() && mobile.starts_with(entry.prefix.as_str()))
    }

    /// Whether the mobile number belongs to a supported country
    pub fn supports(&self, mobile: &str) -> bool {
        self.find(mobile).is_some()
    }

    pub fn entries(&self) -> &[CountryPrefix] {
        &self.entries
    }
}

impl Default for CountryPrefixTable {
    fn default() -> Self {
        Self::new(vec![CountryPrefix::new("China", "86")])
    }
}
