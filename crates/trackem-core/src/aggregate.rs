//! Contribution summaries.
//!
//! [`summarize`] is the single definition of every derived number shown
//! for an activity or a group. It is deterministic and independent of
//! the order of its input: amounts are sorted inside each bucket before
//! they are added, and currencies are keyed in a `BTreeMap`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::contribution::{Contribution, ContributionType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionCounts {
    pub money: u64,
    pub time: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeTotal {
    pub minutes: f64,
    /// `"{h}h {m}m"`, or `"0m"` when nothing was logged.
    pub formatted: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionSummary {
    pub contribution_counts: ContributionCounts,
    /// Per currency code. Currencies without contributions are absent.
    pub money_totals: BTreeMap<String, f64>,
    pub time_totals: TimeTotal,
    /// Distinct contributors, former members included.
    pub contributor_count: u64,
}

impl Default for ContributionSummary {
    fn default() -> Self {
        summarize(&[])
    }
}

/// Compute the summary of one fetched set of contributions.
pub fn summarize(contributions: &[Contribution]) -> ContributionSummary {
    let mut counts = ContributionCounts::default();
    let mut money: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut minutes: Vec<f64> = Vec::new();
    let mut contributors: BTreeSet<Uuid> = BTreeSet::new();

    for c in contributions {
        counts.total += 1;
        contributors.insert(c.user_id);
        match c.contribution_type {
            ContributionType::Money => {
                counts.money += 1;
                // Rows without a currency are rejected on write; a legacy
                // row that slipped through is counted but not summed.
                if let Some(currency) = &c.currency {
                    money.entry(currency.clone()).or_default().push(c.amount);
                }
            }
            ContributionType::Time => {
                counts.time += 1;
                minutes.push(c.amount);
            }
        }
    }

    let money_totals = money
        .into_iter()
        .map(|(currency, amounts)| (currency, ordered_sum(amounts)))
        .collect();
    let total_minutes = ordered_sum(minutes);

    ContributionSummary {
        contribution_counts: counts,
        money_totals,
        time_totals: TimeTotal {
            minutes: total_minutes,
            formatted: format_minutes(total_minutes),
        },
        contributor_count: contributors.len() as u64,
    }
}

/// Render a number of minutes as `"{h}h {m}m"`.
///
/// Only an exact zero renders as `"0m"`. Any positive total, even one
/// below a minute, takes the `"{h}h {m}m"` form with both parts
/// floored, so `0.5` renders as `"0h 0m"`.
pub fn format_minutes(minutes: f64) -> String {
    if minutes == 0.0 {
        return "0m".into();
    }
    let hours = (minutes / 60.0).floor();
    let rest = (minutes % 60.0).floor();
    format!("{hours}h {rest}m")
}

fn ordered_sum(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    values.into_iter().sum()
}
