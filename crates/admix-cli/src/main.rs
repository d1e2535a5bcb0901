//! AdMix CLI — entry point.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use admix::{
    AllocatorConfig, BudgetAllocator, CompetitorMiner, Goal, HttpFetcher, KeywordConfig,
    SignalCaps,
};

#[derive(Parser)]
#[command(
    name = "admix",
    about = "Campaign budget allocation and competitor signal mining",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Allocate a campaign budget across enabled platforms.
    Allocate {
        /// Total campaign budget in dollars.
        #[arg(long)]
        budget: f64,

        /// Campaign goal (awareness, traffic, leads, sales, conversions).
        #[arg(long)]
        goal: String,

        /// Enabled platforms, comma-separated (meta,google,tiktok,...).
        #[arg(long, value_delimiter = ',')]
        platforms: Vec<String>,

        /// Override the minimum accepted budget.
        #[arg(long)]
        min_budget: Option<f64>,
    },

    /// Print the TOF/MOF/BOF funnel split for a budget and goal.
    Funnel {
        /// Total campaign budget in dollars.
        #[arg(long)]
        budget: f64,

        /// Campaign goal (awareness, traffic, leads, sales, conversions).
        #[arg(long)]
        goal: String,

        /// Override the minimum accepted budget.
        #[arg(long)]
        min_budget: Option<f64>,
    },

    /// Rebalance a current allocation from observed performance scores.
    Rebalance {
        /// Current allocation, comma-separated platform=dollars pairs.
        #[arg(long, value_delimiter = ',')]
        current: Vec<String>,

        /// Performance scores, comma-separated platform=ratio pairs
        /// (ratio > 1 means outperforming; missing platforms are neutral).
        #[arg(long, value_delimiter = ',')]
        scores: Vec<String>,
    },

    /// Mine competitor pages for keyword and location signals.
    Mine {
        /// Competitor page URL; repeat for multiple pages.
        #[arg(long = "url", required = true)]
        urls: Vec<String>,

        /// Cap on the ranked keyword list.
        #[arg(long)]
        top_n: Option<usize>,

        /// Per-request fetch timeout in seconds.
        #[arg(long, default_value_t = 10)]
        timeout_secs: u64,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Allocate {
            budget,
            goal,
            platforms,
            min_budget,
        } => {
            let goal: Goal = goal.parse().map_err(anyhow::Error::msg)?;
            let allocator = allocator_with(min_budget);
            let plan = allocator.allocate(budget, goal, &platforms)?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }

        Commands::Funnel {
            budget,
            goal,
            min_budget,
        } => {
            let goal: Goal = goal.parse().map_err(anyhow::Error::msg)?;
            let allocator = allocator_with(min_budget);
            let split = allocator.funnel_split(budget, goal)?;
            println!("{}", serde_json::to_string_pretty(&split)?);
        }

        Commands::Rebalance { current, scores } => {
            let current: BTreeMap<String, f64> = parse_pairs(&current)?.into_iter().collect();
            let scores: HashMap<String, f64> = parse_pairs(&scores)?.into_iter().collect();
            let allocator = BudgetAllocator::default();
            let rebalanced = allocator.rebalance(&current, &scores);
            println!("{}", serde_json::to_string_pretty(&rebalanced)?);
        }

        Commands::Mine {
            urls,
            top_n,
            timeout_secs,
        } => {
            let fetcher = HttpFetcher::new(Duration::from_secs(timeout_secs))?;
            let mut keywords = KeywordConfig::default();
            if let Some(n) = top_n {
                keywords.top_n = n;
            }
            let miner =
                CompetitorMiner::with_config(Box::new(fetcher), keywords, SignalCaps::default())?;
            tracing::info!(urls = urls.len(), "mining competitor pages");
            let signal = miner.analyze(&urls);
            println!("{}", serde_json::to_string_pretty(&signal)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "admix", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn allocator_with(min_budget: Option<f64>) -> BudgetAllocator {
    let mut config = AllocatorConfig::default();
    if let Some(min) = min_budget {
        config.min_budget = min;
    }
    BudgetAllocator::new(config)
}

/// Parse `platform=value` pairs.
fn parse_pairs(pairs: &[String]) -> anyhow::Result<Vec<(String, f64)>> {
    pairs
        .iter()
        .map(|pair| {
            let (platform, value) = pair
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("expected platform=value, got '{pair}'"))?;
            let value: f64 = value
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid number in '{pair}'"))?;
            Ok((platform.trim().to_ascii_lowercase(), value))
        })
        .collect()
}
