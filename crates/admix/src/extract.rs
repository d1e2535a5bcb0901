//! Location matcher rules over competitor page text.
//!
//! Each rule is an independent regex heuristic producing occurrences of one
//! or two entity kinds; the miner composes them with a counting pass. Rules
//! are deliberately small so each pattern can be tested in isolation.

use regex::Regex;

use crate::types::AdmixResult;

/// Full state name / postal abbreviation pairs.
const US_STATES: [(&str, &str); 50] = [
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
];

/// Subdomain labels that never name a city.
const INFRA_SUBDOMAINS: [&str; 12] = [
    "www", "app", "api", "blog", "shop", "store", "mail", "web", "m", "cdn", "staging", "dev",
];

/// Which entity counter an occurrence feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    City,
    State,
    Zip,
}

/// A single entity occurrence found in page text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub kind: EntityKind,
    pub value: String,
}

impl Occurrence {
    fn new(kind: EntityKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// One independent matcher rule over page text.
pub trait MatcherRule {
    fn name(&self) -> &'static str;
    fn scan(&self, text: &str) -> Vec<Occurrence>;
}

/// 5-digit and 5+4 ZIP codes, counted by their 5-digit prefix.
pub struct ZipRule {
    re: Regex,
}

impl ZipRule {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            re: Regex::new(r"\b(\d{5})(?:-\d{4})?\b")?,
        })
    }
}

impl MatcherRule for ZipRule {
    fn name(&self) -> &'static str {
        "zip"
    }

    fn scan(&self, text: &str) -> Vec<Occurrence> {
        self.re
            .captures_iter(text)
            .map(|cap| Occurrence::new(EntityKind::Zip, &cap[1]))
            .collect()
    }
}

/// Full state names (case-insensitive) and postal abbreviations
/// (uppercase-only, so "in"/"or"/"me" prose never matches), normalized to
/// the abbreviation.
pub struct StateRule {
    names_re: Regex,
    abbrevs_re: Regex,
}

impl StateRule {
    pub fn new() -> Result<Self, regex::Error> {
        let names: Vec<&str> = US_STATES.iter().map(|(name, _)| *name).collect();
        let abbrevs: Vec<&str> = US_STATES.iter().map(|(_, abbrev)| *abbrev).collect();
        Ok(Self {
            names_re: Regex::new(&format!(r"(?i)\b(?:{})\b", names.join("|")))?,
            abbrevs_re: Regex::new(&format!(r"\b(?:{})\b", abbrevs.join("|")))?,
        })
    }
}

impl MatcherRule for StateRule {
    fn name(&self) -> &'static str {
        "state"
    }

    fn scan(&self, text: &str) -> Vec<Occurrence> {
        let mut found = Vec::new();
        for m in self.names_re.find_iter(text) {
            if let Some(abbrev) = state_abbrev(m.as_str()) {
                found.push(Occurrence::new(EntityKind::State, abbrev));
            }
        }
        for m in self.abbrevs_re.find_iter(text) {
            found.push(Occurrence::new(EntityKind::State, m.as_str()));
        }
        found
    }
}

/// Capitalized one-to-three-word sequences followed by a place marker
/// ("City", "County", "Metro", "Area", "Region").
pub struct CityPhraseRule {
    re: Regex,
}

impl CityPhraseRule {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            re: Regex::new(
                r"\b([A-Z][a-z]+(?:\s[A-Z][a-z]+){0,2})\s+(?:City|County|Metro|Area|Region)\b",
            )?,
        })
    }
}

impl MatcherRule for CityPhraseRule {
    fn name(&self) -> &'static str {
        "city-phrase"
    }

    fn scan(&self, text: &str) -> Vec<Occurrence> {
        self.re
            .captures_iter(text)
            .map(|cap| Occurrence::new(EntityKind::City, &cap[1]))
            .collect()
    }
}

/// "City, ST" and "City, State" comma patterns. The second group is
/// validated against the state table; an invalid state drops the match
/// entirely, so "Hello, World" counts nothing.
pub struct CityStateRule {
    re: Regex,
}

impl CityStateRule {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            re: Regex::new(
                r"\b([A-Z][a-z]+(?:\s[A-Z][a-z]+){0,2}),\s+([A-Z][A-Za-z]+(?:\s[A-Z][a-z]+)?)\b",
            )?,
        })
    }
}

impl MatcherRule for CityStateRule {
    fn name(&self) -> &'static str {
        "city-state"
    }

    fn scan(&self, text: &str) -> Vec<Occurrence> {
        let mut found = Vec::new();
        for cap in self.re.captures_iter(text) {
            if let Some(abbrev) = state_abbrev(&cap[2]) {
                found.push(Occurrence::new(EntityKind::City, &cap[1]));
                found.push(Occurrence::new(EntityKind::State, abbrev));
            }
        }
        found
    }
}

fn state_abbrev(token: &str) -> Option<&'static str> {
    let trimmed = token.trim();
    US_STATES.iter().find_map(|(name, abbrev)| {
        if trimmed == *abbrev || trimmed.eq_ignore_ascii_case(name) {
            Some(*abbrev)
        } else {
            None
        }
    })
}

/// Weak heuristic: a non-infrastructure first subdomain label, title-cased,
/// as a city candidate ("denver.example.com" → "Denver").
pub fn city_from_subdomain(url: &str) -> Option<String> {
    let after_scheme = url.split("://").nth(1).unwrap_or(url);
    let host = after_scheme
        .split(['/', ':', '?'])
        .next()
        .unwrap_or_default();

    let labels: Vec<&str> = host.split('.').collect();
    // Need sub.domain.tld at minimum; the bare domain is not a city hint.
    if labels.len() < 3 {
        return None;
    }

    let label = labels[0].to_ascii_lowercase();
    if label.len() < 3
        || INFRA_SUBDOMAINS.contains(&label.as_str())
        || !label.chars().all(|c| c.is_ascii_alphabetic())
    {
        return None;
    }

    let mut chars = label.chars();
    let first = chars.next()?;
    Some(first.to_ascii_uppercase().to_string() + chars.as_str())
}

/// The ordered rule set, compiled once.
pub struct LocationExtractor {
    rules: Vec<Box<dyn MatcherRule + Send + Sync>>,
}

impl LocationExtractor {
    pub fn new() -> AdmixResult<Self> {
        Ok(Self {
            rules: vec![
                Box::new(ZipRule::new()?),
                Box::new(StateRule::new()?),
                Box::new(CityPhraseRule::new()?),
                Box::new(CityStateRule::new()?),
            ],
        })
    }

    /// Run every rule over the text, in order.
    pub fn scan(&self, text: &str) -> Vec<Occurrence> {
        self.rules.iter().flat_map(|rule| rule.scan(text)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(occurrences: &[Occurrence], kind: EntityKind) -> Vec<&str> {
        occurrences
            .iter()
            .filter(|o| o.kind == kind)
            .map(|o| o.value.as_str())
            .collect()
    }

    #[test]
    fn test_zip_rule() {
        let rule = ZipRule::new().unwrap();
        let found = rule.scan("offices at 78701 and 10001-4356");
        assert_eq!(values(&found, EntityKind::Zip), vec!["78701", "10001"]);
    }

    #[test]
    fn test_state_rule_full_names() {
        let rule = StateRule::new().unwrap();
        let found = rule.scan("serving texas and New Mexico families");
        let states = values(&found, EntityKind::State);
        assert!(states.contains(&"TX"));
        assert!(states.contains(&"NM"));
    }

    #[test]
    fn test_state_rule_abbrev_uppercase_only() {
        let rule = StateRule::new().unwrap();
        let found = rule.scan("move in or call our TX office");
        let states = values(&found, EntityKind::State);
        // lowercase "in" and "or" are prose, not Indiana/Oregon
        assert_eq!(states, vec!["TX"]);
    }

    #[test]
    fn test_city_phrase_rule() {
        let rule = CityPhraseRule::new().unwrap();
        let found = rule.scan("serving Travis County and the Greater Austin Area");
        let cities = values(&found, EntityKind::City);
        assert!(cities.contains(&"Travis"));
        assert!(cities.contains(&"Greater Austin"));
    }

    #[test]
    fn test_city_state_rule() {
        let rule = CityStateRule::new().unwrap();
        let found = rule.scan("visit us in Austin, TX or Portland, Oregon");
        assert_eq!(values(&found, EntityKind::City), vec!["Austin", "Portland"]);
        assert_eq!(values(&found, EntityKind::State), vec!["TX", "OR"]);
    }

    #[test]
    fn test_city_state_rule_rejects_non_states() {
        let rule = CityStateRule::new().unwrap();
        assert!(rule.scan("Hello, World").is_empty());
    }

    #[test]
    fn test_subdomain_city() {
        assert_eq!(
            city_from_subdomain("https://denver.example.com/about"),
            Some("Denver".to_string())
        );
        assert_eq!(city_from_subdomain("https://www.example.com"), None);
        assert_eq!(city_from_subdomain("https://example.com"), None);
        assert_eq!(city_from_subdomain("https://cdn.example.com"), None);
    }

    #[test]
    fn test_extractor_composes_rules() {
        let extractor = LocationExtractor::new().unwrap();
        let found = extractor.scan("Austin, TX 78701");
        assert!(!values(&found, EntityKind::City).is_empty());
        assert!(!values(&found, EntityKind::State).is_empty());
        assert!(!values(&found, EntityKind::Zip).is_empty());
    }
}
