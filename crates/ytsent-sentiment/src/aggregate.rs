//! Per-video sentiment statistics.

use rust_decimal::Decimal;
use ytsent_core::{ClassifiedComment, SentimentLabel, Statistics};

/// Percentages are carried in tenths of a percent.
const TENTHS_IN_WHOLE: u128 = 1000;

/// Tallies labels and computes one-decimal percentages.
#[must_use]
pub fn aggregate(comments: &[ClassifiedComment]) -> Statistics {
    tally(comments.iter().map(|c| c.sentiment.label))
}

/// Same as [`aggregate`] for callers holding bare labels.
#[must_use]
pub fn aggregate_labels(labels: &[SentimentLabel]) -> Statistics {
    tally(labels.iter().copied())
}

fn tally(labels: impl Iterator<Item = SentimentLabel>) -> Statistics {
    let mut counts = [0usize; 3];
    for label in labels {
        counts[slot(label)] += 1;
    }
    let [positive_pct, neutral_pct, negative_pct] = percentages(counts);
    Statistics {
        total: counts.iter().sum(),
        positive: counts[0],
        neutral: counts[1],
        negative: counts[2],
        positive_pct,
        neutral_pct,
        negative_pct,
    }
}

fn slot(label: SentimentLabel) -> usize {
    match label {
        SentimentLabel::Positive => 0,
        SentimentLabel::Neutral => 1,
        SentimentLabel::Negative => 2,
    }
}

/// Converts `[positive, neutral, negative]` counts into percentages with one
/// decimal place that sum to exactly `100.0`.
///
/// Largest-remainder (Hamilton) apportionment of 1000 tenths of a percent:
/// every share is first truncated to whole tenths, then the tenths still
/// missing go one each to the shares with the largest remainders, ties
/// broken in label order (positive, neutral, negative). A share therefore
/// moves by at most one tenth from its exact value. Whenever half-up
/// rounding of every share already sums to 100 the result is identical;
/// when it does not, e.g. `[1, 1, 14]`, the tie order decides which share
/// gets the spare tenth.
///
/// All zeros when every count is zero.
#[must_use]
pub fn percentages(counts: [usize; 3]) -> [Decimal; 3] {
    let total: u128 = counts.iter().map(|&c| c as u128).sum();
    if total == 0 {
        return [Decimal::ZERO; 3];
    }

    let mut tenths = [0u128; 3];
    let mut remainders = [0u128; 3];
    for (i, &count) in counts.iter().enumerate() {
        let scaled = count as u128 * TENTHS_IN_WHOLE;
        tenths[i] = scaled / total;
        remainders[i] = scaled % total;
    }

    let shortfall = TENTHS_IN_WHOLE - tenths.iter().sum::<u128>();
    let mut order = [0usize, 1, 2];
    // Stable sort keeps label order among equal remainders.
    order.sort_by(|&a, &b| remainders[b].cmp(&remainders[a]));
    for &i in order.iter().take(usize::try_from(shortfall).unwrap_or(0)) {
        tenths[i] += 1;
    }

    // Each share is at most 1000 tenths.
    tenths.map(|t| Decimal::new(i64::try_from(t).unwrap_or(i64::MAX), 1))
}
