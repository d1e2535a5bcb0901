//! Competitor page mining: fetch, extract, aggregate into a ranked signal.

use std::collections::HashMap;

use crate::extract::{city_from_subdomain, EntityKind, LocationExtractor};
use crate::fetch::{PageFetcher, PageText};
use crate::keywords::{KeywordConfig, KeywordExtractor};
use crate::types::{AdmixResult, CompetitorSignal, EntityCount};

/// Ranking caps per location entity kind.
#[derive(Debug, Clone, Copy)]
pub struct SignalCaps {
    pub cities: usize,
    pub states: usize,
    pub zips: usize,
}

impl Default for SignalCaps {
    fn default() -> Self {
        Self {
            cities: 50,
            states: 50,
            zips: 100,
        }
    }
}

/// Best-effort competitor signal miner.
///
/// Fetches each URL sequentially through the injected [`PageFetcher`]; an
/// unavailable page contributes nothing, and an entirely unreachable URL
/// list yields an empty signal. `analyze` never returns an error.
pub struct CompetitorMiner {
    fetcher: Box<dyn PageFetcher>,
    locations: LocationExtractor,
    keywords: KeywordExtractor,
    caps: SignalCaps,
}

impl CompetitorMiner {
    pub fn new(fetcher: Box<dyn PageFetcher>) -> AdmixResult<Self> {
        Self::with_config(fetcher, KeywordConfig::default(), SignalCaps::default())
    }

    pub fn with_config(
        fetcher: Box<dyn PageFetcher>,
        keywords: KeywordConfig,
        caps: SignalCaps,
    ) -> AdmixResult<Self> {
        Ok(Self {
            fetcher,
            locations: LocationExtractor::new()?,
            keywords: KeywordExtractor::new(keywords)?,
            caps,
        })
    }

    /// Mine ranked keyword and location signals from the URL list.
    pub fn analyze(&self, urls: &[String]) -> CompetitorSignal {
        let mut cities: HashMap<String, u32> = HashMap::new();
        let mut states: HashMap<String, u32> = HashMap::new();
        let mut zips: HashMap<String, u32> = HashMap::new();
        let mut keyword_counts: HashMap<String, u32> = HashMap::new();

        for url in urls {
            let text = match self.fetcher.fetch_text(url) {
                PageText::Text(text) => text,
                PageText::Unavailable => {
                    tracing::debug!(%url, "page unavailable, contributes nothing");
                    continue;
                }
            };

            for occurrence in self.locations.scan(&text) {
                let counter = match occurrence.kind {
                    EntityKind::City => &mut cities,
                    EntityKind::State => &mut states,
                    EntityKind::Zip => &mut zips,
                };
                *counter.entry(occurrence.value).or_insert(0) += 1;
            }

            if let Some(city) = city_from_subdomain(url) {
                *cities.entry(city).or_insert(0) += 1;
            }

            for (term, n) in self.keywords.count(&text) {
                *keyword_counts.entry(term).or_insert(0) += n;
            }
        }

        CompetitorSignal {
            keywords: self.keywords.rank(&keyword_counts),
            keyword_counts: self.keywords.ranked_counts(&keyword_counts),
            cities: ranked(cities, self.caps.cities),
            states: ranked(states, self.caps.states),
            zips: ranked(zips, self.caps.zips),
        }
    }
}

fn ranked(counts: HashMap<String, u32>, cap: usize) -> Vec<EntityCount> {
    let mut entries: Vec<EntityCount> = counts
        .into_iter()
        .map(|(value, count)| EntityCount { value, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    entries.truncate(cap);
    entries
}
