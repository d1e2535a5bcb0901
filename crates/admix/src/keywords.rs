//! Keyword extraction: tokenizing, stopword filtering, frequency ranking.

use std::collections::HashMap;

use regex::Regex;

use crate::types::{AdmixResult, EntityCount};

/// Default cap on the ranked keyword list.
pub const DEFAULT_TOP_N: usize = 40;

/// Tokens shorter than this carry no signal.
const MIN_TOKEN_LEN: usize = 3;

/// Words dropped before counting: English function words plus web chrome
/// that shows up on every marketing page.
const STOPWORDS: &[&str] = &[
    "about", "above", "after", "again", "all", "also", "and", "any", "are", "because", "been",
    "before", "being", "below", "between", "both", "but", "can", "could", "did", "does", "doing",
    "down", "during", "each", "few", "for", "from", "further", "get", "had", "has", "have",
    "having", "her", "here", "hers", "him", "his", "how", "into", "its", "itself", "just", "more",
    "most", "much", "must", "nor", "not", "now", "off", "once", "only", "other", "our", "ours",
    "out", "over", "own", "same", "she", "should", "some", "such", "than", "that", "the", "their",
    "theirs", "them", "then", "there", "these", "they", "this", "those", "through", "too", "under",
    "until", "very", "was", "were", "what", "when", "where", "which", "while", "who", "whom",
    "why", "will", "with", "would", "you", "your", "yours",
    // web chrome
    "click", "cookie", "cookies", "contact", "learn", "login", "menu", "page", "policy",
    "privacy", "read", "reserved", "rights", "sign", "site", "submit", "terms", "today", "website",
];

/// Substrings marking domain-relevant terms, promoted to the front of the
/// ranking regardless of raw frequency.
const PRIORITY_TERMS: &[&str] = &[
    "care", "senior", "brand", "health", "home", "family", "living", "service", "music", "cloth",
    "style", "local", "community",
];

/// Injected keyword-extraction configuration.
#[derive(Debug, Clone)]
pub struct KeywordConfig {
    pub stopwords: Vec<String>,
    pub priority_terms: Vec<String>,
    pub top_n: usize,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            stopwords: STOPWORDS.iter().map(|s| s.to_string()).collect(),
            priority_terms: PRIORITY_TERMS.iter().map(|s| s.to_string()).collect(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// Tokenizer and ranker over an injected [`KeywordConfig`].
pub struct KeywordExtractor {
    token_re: Regex,
    config: KeywordConfig,
}

impl KeywordExtractor {
    pub fn new(config: KeywordConfig) -> AdmixResult<Self> {
        Ok(Self {
            // alphabetic runs, internal hyphens allowed
            token_re: Regex::new(r"[a-z]+(?:-[a-z]+)*")?,
            config,
        })
    }

    pub fn top_n(&self) -> usize {
        self.config.top_n
    }

    /// Count single tokens and adjacent-pair phrases in one page's text.
    pub fn count(&self, text: &str) -> HashMap<String, u32> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = self
            .token_re
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| t.len() >= MIN_TOKEN_LEN && !self.is_stopword(t))
            .collect();

        let mut counts: HashMap<String, u32> = HashMap::new();
        for token in &tokens {
            *counts.entry((*token).to_string()).or_insert(0) += 1;
        }
        for pair in tokens.windows(2) {
            *counts.entry(format!("{} {}", pair[0], pair[1])).or_insert(0) += 1;
        }
        counts
    }

    /// Order by descending frequency (ties alphabetical), promote
    /// priority-matching terms to the front, cap at `top_n`.
    pub fn rank(&self, counts: &HashMap<String, u32>) -> Vec<String> {
        let mut entries: Vec<(&str, u32)> =
            counts.iter().map(|(term, n)| (term.as_str(), *n)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let mut promoted = Vec::new();
        let mut rest = Vec::new();
        for (term, _) in entries {
            if self.is_priority(term) {
                promoted.push(term.to_string());
            } else {
                rest.push(term.to_string());
            }
        }
        promoted.extend(rest);
        promoted.truncate(self.config.top_n);
        promoted
    }

    /// Raw frequencies as a ranked, capped list.
    pub fn ranked_counts(&self, counts: &HashMap<String, u32>) -> Vec<EntityCount> {
        let mut entries: Vec<EntityCount> = counts
            .iter()
            .map(|(term, n)| EntityCount {
                value: term.clone(),
                count: *n,
            })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
        entries.truncate(self.config.top_n);
        entries
    }

    fn is_stopword(&self, token: &str) -> bool {
        self.config.stopwords.iter().any(|s| s == token)
    }

    fn is_priority(&self, term: &str) -> bool {
        self.config.priority_terms.iter().any(|p| term.contains(p.as_str()))
    }
}
