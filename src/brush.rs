//! Range selector: a day-axis brush with numeric min/max entry.
//!
//! The selector owns only the pixel geometry of the timeline. The selected
//! days live in [`ViewState`](crate::state::ViewState); the selector reads
//! them to place its handles and writes them through [`ViewController`].

use serde::{Deserialize, Serialize};

use crate::axis::{AxisConfig, AxisFormatter, LinearScale, Tick};
use crate::geom::{Margin, ScreenPoint, ScreenRect};
use crate::render::{Color, RectStyle, RenderCommand, RenderList, TextStyle};
use crate::state::{DayRange, RangeError, StateChange, ViewController};
use crate::view::Range;

/// Timeline geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineLayout {
    /// Space around the brush area.
    pub margin: Margin,
    /// Total height including margins.
    pub outer_height: f32,
    /// Requested tick count on the day axis.
    pub ticks: usize,
}

impl Default for TimelineLayout {
    fn default() -> Self {
        Self {
            margin: Margin::new(0.0, 20.0, 20.0, 20.0),
            outer_height: 60.0,
            ticks: 14,
        }
    }
}

/// Brush over the continuous day axis `[0, max_day]`.
#[derive(Debug, Clone)]
pub struct RangeSelector {
    max_day: u32,
    layout: TimelineLayout,
    scale: LinearScale,
    axis: AxisConfig,
}

impl RangeSelector {
    /// Create a selector spanning `outer_width` pixels.
    pub fn new(max_day: u32, layout: TimelineLayout, outer_width: f32) -> Self {
        let inner = layout.margin.inner_width(outer_width) as f64;
        Self {
            max_day,
            layout,
            scale: LinearScale::new(Range::new(0.0, max_day as f64), 0.0, inner),
            axis: AxisConfig::new(layout.ticks).with_formatter(AxisFormatter::Integer),
        }
    }

    /// Largest selectable day.
    pub fn max_day(&self) -> u32 {
        self.max_day
    }

    /// Day-to-pixel scale of the brush area.
    pub fn scale(&self) -> &LinearScale {
        &self.scale
    }

    /// Brush area width in pixels.
    pub fn inner_width(&self) -> f32 {
        let (start, end) = self.scale.range();
        (end - start) as f32
    }

    /// Brush area height in pixels.
    pub fn inner_height(&self) -> f32 {
        self.layout.margin.inner_height(self.layout.outer_height)
    }

    /// Recompute pixel geometry for a new width.
    ///
    /// Only the pixel range changes; the day selection lives in the view
    /// state and is untouched, so handles follow it to their new positions.
    pub fn resize(&mut self, outer_width: f32) {
        let inner = self.layout.margin.inner_width(outer_width) as f64;
        self.scale = self.scale.with_range(0.0, inner);
    }

    /// Convert a pixel interval to a day range.
    ///
    /// Each endpoint is inverted through the scale, rounded to the nearest
    /// day, and clamped to `[0, max_day]`; the pair is then ordered.
    pub fn days_for_pixels(&self, x0: f32, x1: f32) -> Option<DayRange> {
        if !x0.is_finite() || !x1.is_finite() {
            return None;
        }
        let d0 = self.pixel_to_day(x0);
        let d1 = self.pixel_to_day(x1);
        Some(DayRange::ordered(d0, d1))
    }

    /// Apply a brush selection. `None` (a cleared brush) is ignored.
    pub fn brush(
        &self,
        controller: &mut ViewController,
        selection: Option<(f32, f32)>,
    ) -> Option<StateChange> {
        let (x0, x1) = selection?;
        let days = self.days_for_pixels(x0, x1)?;
        controller.set_clamped_day_range(days.low() as i64, days.high() as i64)
    }

    /// Apply a typed minimum day; rejected if it exceeds the current maximum.
    pub fn edit_min(
        &self,
        controller: &mut ViewController,
        text: &str,
    ) -> Result<Option<StateChange>, RangeError> {
        let low = parse_day(text)?;
        let high = controller.state().day_range().high() as i64;
        controller.set_day_range(low, high)
    }

    /// Apply a typed maximum day; rejected if it is below the current minimum.
    pub fn edit_max(
        &self,
        controller: &mut ViewController,
        text: &str,
    ) -> Result<Option<StateChange>, RangeError> {
        let high = parse_day(text)?;
        let low = controller.state().day_range().low() as i64;
        controller.set_day_range(low, high)
    }

    /// Pixel positions of the selection handles.
    pub fn handle_positions(&self, days: DayRange) -> (f32, f32) {
        (
            self.scale.map(days.low() as f64) as f32,
            self.scale.map(days.high() as f64) as f32,
        )
    }

    /// Selection overlay rectangle in brush-area coordinates.
    pub fn selection_rect(&self, days: DayRange) -> ScreenRect {
        let (x0, x1) = self.handle_positions(days);
        ScreenRect::new(
            ScreenPoint::new(x0, 0.0),
            ScreenPoint::new(x1, self.inner_height()),
        )
    }

    /// Integer day ticks along the bottom of the brush area.
    pub fn ticks(&self) -> Vec<Tick> {
        self.axis.ticks(&self.scale)
    }

    /// Draw commands for the timeline, in brush-area coordinates.
    pub fn render_list(&self, days: DayRange) -> RenderList {
        let mut list = RenderList::new();
        let baseline = self.inner_height();
        for tick in self.ticks() {
            list.push(RenderCommand::Text {
                position: ScreenPoint::new(tick.position, baseline + 12.0),
                text: tick.label,
                style: TextStyle {
                    color: Color::BLACK,
                    size: 10.0,
                },
            });
        }
        list.push(RenderCommand::Rect {
            rect: self.selection_rect(days),
            style: RectStyle {
                fill: Color::new(0.47, 0.47, 0.47, 0.3),
                stroke: Color::WHITE,
                stroke_width: 1.0,
            },
        });
        list
    }

    fn pixel_to_day(&self, x: f32) -> u32 {
        let day = self.scale.invert(x as f64).round();
        day.clamp(0.0, self.max_day as f64) as u32
    }
}

fn parse_day(text: &str) -> Result<i64, RangeError> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| RangeError::NotANumber(text.to_string()))
}
