//! Day-range filtering and per-bin averaging.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::geom::Point;
use crate::sample::{Metric, Sample};
use crate::state::DayRange;

/// Mean metric value of one bin over the selected days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregatedPoint {
    /// Bin index within the day.
    pub bin: i64,
    /// Arithmetic mean of the contributing samples.
    pub value: f64,
}

impl AggregatedPoint {
    /// Create a new aggregated point.
    pub fn new(bin: i64, value: f64) -> Self {
        Self { bin, value }
    }

    /// Data-space point for plotting.
    pub fn to_point(self) -> Point {
        Point::new(self.bin as f64, self.value)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Average `metric` per bin over samples whose day lies in `days`.
///
/// Samples without a usable value for the metric's storage field are ignored,
/// so a bin with no contributing sample yields no point. The result is sorted
/// ascending by bin.
pub fn aggregate(samples: &[Sample], metric: Metric, days: DayRange) -> Vec<AggregatedPoint> {
    let field = metric.storage_field();
    let mut bins: BTreeMap<i64, Accumulator> = BTreeMap::new();
    for sample in samples {
        if !days.contains(sample.day) {
            continue;
        }
        let Some(value) = sample.value(field) else {
            continue;
        };
        bins.entry(sample.bin).or_default().push(value);
    }
    bins.into_iter()
        .filter_map(|(bin, acc)| acc.mean().map(|value| AggregatedPoint::new(bin, value)))
        .collect()
}
