//! Axis configuration, linear scaling, ticks, and formatting.

use serde::Serialize;

use crate::view::Range;

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;
const NICE_MAX_ITERATIONS: usize = 10;

/// Linear mapping from a data domain to a pixel range.
///
/// The pixel range keeps its orientation: a vertical scale maps onto
/// `[height, 0]` so larger values land higher on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearScale {
    domain: Range,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    /// Create a scale from a domain and a (possibly inverted) pixel range.
    pub fn new(domain: Range, range_start: f64, range_end: f64) -> Self {
        Self {
            domain,
            range_start,
            range_end,
        }
    }

    /// Access the data domain.
    pub fn domain(&self) -> Range {
        self.domain
    }

    /// Access the pixel range as `(start, end)`.
    pub fn range(&self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    /// Replace the pixel range, keeping the domain.
    pub fn with_range(mut self, range_start: f64, range_end: f64) -> Self {
        self.range_start = range_start;
        self.range_end = range_end;
        self
    }

    /// Map a data value to a pixel coordinate.
    ///
    /// A zero-span domain maps every value to the middle of the range.
    pub fn map(&self, value: f64) -> f64 {
        let span = self.domain.span();
        let t = if span == 0.0 {
            0.5
        } else {
            (value - self.domain.min) / span
        };
        self.range_start + t * (self.range_end - self.range_start)
    }

    /// Map a pixel coordinate back into data space.
    pub fn invert(&self, pixel: f64) -> f64 {
        let extent = self.range_end - self.range_start;
        if extent == 0.0 {
            return self.domain.min;
        }
        let t = (pixel - self.range_start) / extent;
        self.domain.min + t * self.domain.span()
    }

    /// Expand the domain outward to round tick-aligned bounds.
    pub fn nice(mut self, count: usize) -> Self {
        self.domain = nice_range(self.domain, count);
        self
    }

    /// Approximately `count` round tick values inside the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain.min, self.domain.max, count)
    }

    /// Step between ticks for the given count, used to pick label precision.
    pub fn tick_step(&self, count: usize) -> f64 {
        tick_step(self.domain.min, self.domain.max, count)
    }
}

fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let step = (stop - start) / count.max(1) as f64;
    let power = step.log10().floor();
    let error = step / 10_f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10_f64.powf(power)
    } else {
        -(10_f64.powf(-power)) / factor
    }
}

fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let step0 = (stop - start).abs() / count.max(1) as f64;
    if !step0.is_finite() || step0 == 0.0 {
        return 0.0;
    }
    let mut step1 = 10_f64.powf(step0.log10().floor());
    let error = step0 / step1;
    if error >= E10 {
        step1 *= 10.0;
    } else if error >= E5 {
        step1 *= 5.0;
    } else if error >= E2 {
        step1 *= 2.0;
    }
    step1
}

fn nice_range(range: Range, count: usize) -> Range {
    let mut start = range.min;
    let mut stop = range.max;
    if !range.is_finite() || start == stop {
        return range;
    }
    let mut previous: Option<f64> = None;
    for _ in 0..NICE_MAX_ITERATIONS {
        let step = tick_increment(start, stop, count);
        if previous == Some(step) {
            break;
        }
        if step > 0.0 {
            start = (start / step).floor() * step;
            stop = (stop / step).ceil() * step;
        } else if step < 0.0 {
            start = (start * step).ceil() / step;
            stop = (stop * step).floor() / step;
        } else {
            break;
        }
        previous = Some(step);
    }
    Range::new(start, stop)
}

fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let step = (stop - start) / count as f64;
    let power = step.log10().floor();
    let error = step / 10_f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };

    if power < 0.0 {
        let inc = 10_f64.powf(-power) / factor;
        let mut i1 = (start * inc).round();
        let mut i2 = (stop * inc).round();
        if i1 / inc < start {
            i1 += 1.0;
        }
        if i2 / inc > stop {
            i2 -= 1.0;
        }
        if i2 < i1 {
            return Vec::new();
        }
        let n = (i2 - i1) as usize + 1;
        (0..n).map(|i| (i1 + i as f64) / inc).collect()
    } else {
        let inc = 10_f64.powf(power) * factor;
        let mut i1 = (start / inc).round();
        let mut i2 = (stop / inc).round();
        if i1 * inc < start {
            i1 += 1.0;
        }
        if i2 * inc > stop {
            i2 -= 1.0;
        }
        if i2 < i1 {
            return Vec::new();
        }
        let n = (i2 - i1) as usize + 1;
        (0..n).map(|i| (i1 + i as f64) * inc).collect()
    }
}

/// Formatter for axis tick labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AxisFormatter {
    /// Decimal formatter with precision derived from the tick step.
    #[default]
    Default,
    /// Integer formatter (`d`).
    Integer,
}

impl AxisFormatter {
    /// Format a value for display, given the tick step of its axis.
    pub fn format(&self, value: f64, step: f64) -> String {
        match self {
            Self::Default => {
                let decimals = if step > 0.0 && step < 1.0 {
                    (-step.log10().floor()).max(0.0) as usize
                } else {
                    0
                };
                // Avoid "-0".
                let value = if value == 0.0 { 0.0 } else { value };
                format!("{value:.decimals$}")
            }
            Self::Integer => format!("{}", value.round() as i64),
        }
    }
}

/// A labelled tick positioned in pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    /// Tick value in data space.
    pub value: f64,
    /// Tick position in pixels along the axis.
    pub position: f32,
    /// Formatted label.
    pub label: String,
}

/// Axis configuration: title, tick density, and label formatting.
#[derive(Debug, Clone)]
pub struct AxisConfig {
    title: Option<String>,
    tick_count: usize,
    formatter: AxisFormatter,
}

impl AxisConfig {
    /// Create an axis configuration asking for roughly `tick_count` ticks.
    pub fn new(tick_count: usize) -> Self {
        Self {
            title: None,
            tick_count,
            formatter: AxisFormatter::default(),
        }
    }

    /// Set the axis title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the axis formatter.
    pub fn with_formatter(mut self, formatter: AxisFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Access the axis title.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Requested tick count.
    pub fn tick_count(&self) -> usize {
        self.tick_count
    }

    /// Access the formatter.
    pub fn formatter(&self) -> &AxisFormatter {
        &self.formatter
    }

    /// Lay out labelled ticks along a scale.
    pub fn ticks(&self, scale: &LinearScale) -> Vec<Tick> {
        let step = scale.tick_step(self.tick_count);
        scale
            .ticks(self.tick_count)
            .into_iter()
            .map(|value| Tick {
                value,
                position: scale.map(value) as f32,
                label: self.formatter.format(value, step),
            })
            .collect()
    }
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self::new(10)
    }
}
