//! Spec baselines and how a player measures up against them.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::stats::{mean, median};
use crate::source::lenient;
use crate::tally::OrderedTally;
use wipecall_types::{SpecBaseline, SpecComparison};

/// One ranked parse: a specialization and the DPS it reached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecRanking {
    #[serde(default, deserialize_with = "lenient")]
    pub spec: Option<String>,
    #[serde(default)]
    pub amount: f64,
}

/// Group ranking rows per spec into rounded average and median DPS.
///
/// Rows without a spec or with no amount are ignored.
pub fn baselines_from_rankings(rankings: &[SpecRanking]) -> HashMap<String, SpecBaseline> {
    let mut by_spec: OrderedTally<String, Vec<f64>> = OrderedTally::new();
    for row in rankings {
        let Some(spec) = row.spec.as_deref().filter(|s| !s.is_empty()) else {
            continue;
        };
        if row.amount == 0.0 || row.amount.is_nan() {
            continue;
        }
        by_spec.entry(spec.to_string()).push(row.amount);
    }

    by_spec
        .into_entries()
        .into_iter()
        .map(|(spec, amounts)| {
            let baseline = SpecBaseline {
                average_dps: mean(&amounts).round(),
                median_dps: median(&amounts).round(),
                sample_size: amounts.len() as u32,
            };
            (spec, baseline)
        })
        .collect()
}

/// Player average as a percentage of the spec's average and median.
pub fn compare_to_spec(average_dps: f64, baseline: &SpecBaseline) -> Option<SpecComparison> {
    if baseline.average_dps <= 0.0 {
        return None;
    }
    let vs_median = if baseline.median_dps > 0.0 {
        average_dps / baseline.median_dps * 100.0
    } else {
        0.0
    };

    Some(SpecComparison {
        spec_average_dps: baseline.average_dps,
        spec_median_dps: baseline.median_dps,
        vs_average: average_dps / baseline.average_dps * 100.0,
        vs_median,
        sample_size: baseline.sample_size,
    })
}
