//! Scores headlines from arguments or stdin and prints one line per headline.

use super::{load_config, offline_estimator};
use anyhow::{Context, Result};
use clap::Args;
use news_trade_core::AggregationPolicy;
use news_trade_sentiment::{aggregate, SentimentResult};
use serde::Serialize;
use std::io::BufRead;
use std::path::PathBuf;

/// Arguments for the score command.
#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Headlines to score. Reads one per line from stdin when omitted.
    pub headlines: Vec<String>,

    /// TOML config file layered over the defaults.
    #[arg(short, long, env = "NEWS_TRADE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Confidence floor (0.0-1.0) applied on top of whatlang's reliability check.
    #[arg(long, default_value_t = 0.0)]
    pub min_language_confidence: f64,

    /// Also print the aggregate signal under the configured policy.
    #[arg(long)]
    pub aggregate: bool,

    /// Emit JSON lines instead of tab-separated text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ScoredHeadline<'a> {
    headline: &'a str,
    score: f64,
    label: &'static str,
}

pub async fn run_score(args: ScoreArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let estimator = offline_estimator(&config.sentiment, args.min_language_confidence);

    let headlines = if args.headlines.is_empty() {
        read_stdin_lines()?
    } else {
        args.headlines
    };

    let results = estimator.estimate(&headlines).await;
    for (headline, result) in headlines.iter().zip(&results) {
        print_line(headline, result, args.json)?;
    }

    if args.aggregate {
        let policy = config.sentiment.aggregation;
        let summary = aggregate(&results, policy);
        print_line(&policy_name(policy), &summary, args.json)?;
    }

    Ok(())
}

fn read_stdin_lines() -> Result<Vec<String>> {
    std::io::stdin()
        .lock()
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .context("reading headlines from stdin")
}

fn print_line(headline: &str, result: &SentimentResult, json: bool) -> Result<()> {
    let (score, label) = result.as_tuple();
    if json {
        let line = serde_json::to_string(&ScoredHeadline {
            headline,
            score,
            label,
        })?;
        println!("{line}");
    } else {
        println!("{score:.4}\t{label}\t{headline}");
    }
    Ok(())
}

fn policy_name(policy: AggregationPolicy) -> String {
    let name = match policy {
        AggregationPolicy::First => "first",
        AggregationPolicy::MaxConfidence => "max_confidence",
        AggregationPolicy::MajorityVote => "majority_vote",
    };
    format!("[aggregate: {name}]")
}
