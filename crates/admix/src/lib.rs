//! AdMix — campaign budget allocation, funnel splits, and competitor signal mining.

pub mod allocator;
pub mod extract;
pub mod fetch;
pub mod keywords;
pub mod miner;
pub mod types;

pub use allocator::{AllocatorConfig, BudgetAllocator, DEFAULT_MIN_BUDGET, PLATFORMS};
pub use extract::{city_from_subdomain, LocationExtractor, MatcherRule};
pub use fetch::{strip_html, HttpFetcher, PageFetcher, PageText, DEFAULT_FETCH_TIMEOUT};
pub use keywords::{KeywordConfig, KeywordExtractor, DEFAULT_TOP_N};
pub use miner::{CompetitorMiner, SignalCaps};
pub use types::*;
