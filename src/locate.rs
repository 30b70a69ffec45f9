//! Pointer-to-sample lookup for tooltips.

use serde::Serialize;

use crate::aggregate::AggregatedPoint;
use crate::axis::LinearScale;
use crate::sample::Metric;

/// Find the aggregated point under a horizontal pointer position.
///
/// The pointer is inverted through `x_scale` and rounded to the nearest whole
/// bin; only an exact bin match is returned. A gap in the series is a miss,
/// never a fallback to a neighbouring bin. `series` must be sorted by bin.
pub fn locate(
    series: &[AggregatedPoint],
    pointer_x: f32,
    x_scale: &LinearScale,
) -> Option<AggregatedPoint> {
    if series.is_empty() || !pointer_x.is_finite() {
        return None;
    }
    let bin = x_scale.invert(pointer_x as f64).round();
    if !bin.is_finite() {
        return None;
    }
    let bin = bin as i64;
    series
        .binary_search_by_key(&bin, |point| point.bin)
        .ok()
        .map(|index| series[index])
}

/// Tooltip content for a located point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    /// Located bin.
    pub bin: i64,
    /// Mean value at the bin.
    pub value: f64,
    /// Two-line display text.
    pub text: String,
}

impl Tooltip {
    /// Build tooltip content for a point of the given metric.
    pub fn new(point: AggregatedPoint, metric: Metric) -> Self {
        Self {
            bin: point.bin,
            value: point.value,
            text: format!("Bin: {}\n{}: {:.2}", point.bin, metric.label(), point.value),
        }
    }
}
