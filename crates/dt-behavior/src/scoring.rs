//! Multi-criteria variant scoring.

use crate::message::Variant;

/// `1` when `lo == hi`, `-1` when `v` falls outside `[lo, hi]` (defensive
/// sentinel for a malformed call), otherwise the normalized position of `v`
/// inverted so smaller values score higher.
pub fn decreasing_kpi(v: f64, lo: f64, hi: f64) -> f64 {
    if (hi - lo).abs() < f64::EPSILON {
        return 1.0;
    }
    if v < lo || v > hi {
        return -1.0;
    }
    1.0 - (v - lo) / (hi - lo)
}

/// As [`decreasing_kpi`] but larger values score higher.
pub fn increasing_kpi(v: f64, lo: f64, hi: f64) -> f64 {
    if (hi - lo).abs() < f64::EPSILON {
        return 1.0;
    }
    if v < lo || v > hi {
        return -1.0;
    }
    (v - lo) / (hi - lo)
}

/// Weights combining the three per-variant KPIs into `total_efficiency`.
///
/// The default weighting of `finish_efficiency` rewards *later* completion
/// times (preserved from the source behavior this was distilled from even
/// though it reads as contrary to "finish earlier is better" — changing it
/// changes negotiation outcomes, so it is left as a scenario-tunable knob
/// rather than "corrected").
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScoringWeights {
    pub finish: f64,
    pub start: f64,
    pub price: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self { finish: 0.3, start: 0.2, price: 0.5 }
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// Index of the best-scoring variant, or `None` if `variants` is empty.
/// Ties are broken by insertion order (first max wins, via strict `>`).
pub fn select_best(variants: &[Variant], weights: &ScoringWeights) -> Option<usize> {
    if variants.is_empty() {
        return None;
    }

    let (min_start, max_start) = min_max(variants.iter().map(|v| v.start_time.0));
    let (min_finish, max_finish) = min_max(variants.iter().map(|v| v.end_time.0));
    let (min_price, max_price) = min_max(variants.iter().map(|v| v.price));

    let mut best_idx = 0;
    let mut best_score = f64::NEG_INFINITY;

    for (i, v) in variants.iter().enumerate() {
        let start_eff = decreasing_kpi(v.start_time.0, min_start, max_start);
        let finish_eff = increasing_kpi(v.end_time.0, min_finish, max_finish);
        let price_eff = decreasing_kpi(v.price, min_price, max_price);
        let total = weights.finish * finish_eff + weights.start * start_eff + weights.price * price_eff;
        if total > best_score {
            best_score = total;
            best_idx = i;
        }
    }

    Some(best_idx)
}
