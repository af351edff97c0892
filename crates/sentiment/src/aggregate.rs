//! Reduces per-headline results for one symbol to a single signal.
//!
//! Only results carrying a model label (positive/negative/neutral) take part
//! in [`AggregationPolicy::MaxConfidence`] and [`AggregationPolicy::MajorityVote`];
//! skipped and failed headlines are ignored. With nothing to aggregate the
//! result is `(0, "neutral")`.

use crate::types::{SentimentLabel, SentimentResult};
use news_trade_core::AggregationPolicy;

#[must_use]
pub fn aggregate(results: &[SentimentResult], policy: AggregationPolicy) -> SentimentResult {
    match policy {
        AggregationPolicy::First => results
            .first()
            .copied()
            .unwrap_or_else(SentimentResult::neutral),
        AggregationPolicy::MaxConfidence => results
            .iter()
            .filter(|r| r.label().is_scored())
            .max_by(|a, b| a.score().total_cmp(&b.score()))
            .copied()
            .unwrap_or_else(SentimentResult::neutral),
        AggregationPolicy::MajorityVote => majority_vote(results),
    }
}

fn majority_vote(results: &[SentimentResult]) -> SentimentResult {
    let mut tallies: [(SentimentLabel, usize, f64); 3] = [
        (SentimentLabel::Positive, 0, 0.0),
        (SentimentLabel::Negative, 0, 0.0),
        (SentimentLabel::Neutral, 0, 0.0),
    ];

    for result in results {
        if let Some(tally) = tallies.iter_mut().find(|(label, _, _)| *label == result.label()) {
            tally.1 += 1;
            tally.2 += result.score();
        }
    }

    let top = tallies.iter().map(|(_, votes, _)| *votes).max().unwrap_or(0);
    if top == 0 {
        return SentimentResult::neutral();
    }

    let mut leaders = tallies.iter().filter(|(_, votes, _)| *votes == top);
    match (leaders.next(), leaders.next()) {
        (Some(&(label, votes, total)), None) => {
            #[allow(clippy::cast_precision_loss)]
            let mean = total / votes as f64;
            SentimentResult::try_new(mean.clamp(0.0, 1.0), label)
                .unwrap_or_else(SentimentResult::neutral)
        }
        // Tied labels carry no usable direction
        _ => SentimentResult::neutral(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: f64, label: SentimentLabel) -> SentimentResult {
        SentimentResult::try_new(score, label).unwrap()
    }

    fn mixed() -> Vec<SentimentResult> {
        vec![
            SentimentResult::error(),
            result(0.6, SentimentLabel::Negative),
            result(0.9995, SentimentLabel::Positive),
            result(0.9991, SentimentLabel::Positive),
            SentimentResult::non_target_language(),
        ]
    }

    #[test]
    fn test_empty_input_is_neutral() {
        for policy in [
            AggregationPolicy::First,
            AggregationPolicy::MaxConfidence,
            AggregationPolicy::MajorityVote,
        ] {
            assert_eq!(aggregate(&[], policy), SentimentResult::neutral());
        }
    }

    #[test]
    fn test_first_takes_first_item_verbatim() {
        assert_eq!(
            aggregate(&mixed(), AggregationPolicy::First),
            SentimentResult::error()
        );
    }

    #[test]
    fn test_max_confidence_ignores_unscored() {
        let aggregated = aggregate(&mixed(), AggregationPolicy::MaxConfidence);
        assert_eq!(aggregated, result(0.9995, SentimentLabel::Positive));
    }

    #[test]
    fn test_majority_vote_uses_mean_confidence() {
        let aggregated = aggregate(&mixed(), AggregationPolicy::MajorityVote);
        assert_eq!(aggregated.label(), SentimentLabel::Positive);
        assert!((aggregated.score() - 0.9993).abs() < 1e-9);
    }

    #[test]
    fn test_majority_vote_tie_is_neutral() {
        let tied = vec![
            result(0.99, SentimentLabel::Positive),
            result(0.99, SentimentLabel::Negative),
        ];
        assert_eq!(
            aggregate(&tied, AggregationPolicy::MajorityVote),
            SentimentResult::neutral()
        );
    }

    #[test]
    fn test_only_skipped_results_is_neutral() {
        let skipped = vec![SentimentResult::error(), SentimentResult::non_target_language()];
        assert_eq!(
            aggregate(&skipped, AggregationPolicy::MajorityVote),
            SentimentResult::neutral()
        );
        assert_eq!(
            aggregate(&skipped, AggregationPolicy::MaxConfidence),
            SentimentResult::neutral()
        );
    }
}
