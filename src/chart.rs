//! Primary chart renderer.
//!
//! Turns an aggregated series and the current view state into a
//! [`ChartFrame`]: scales, the line's vertices, the lights-off/lights-on
//! markers, axis titles, ticks, and the subtitle.

use serde::{Deserialize, Serialize};

use crate::aggregate::AggregatedPoint;
use crate::axis::{AxisConfig, LinearScale, Tick};
use crate::estrus::EstrusCalendar;
use crate::geom::{Margin, ScreenPoint};
use crate::render::{Color, LineStyle, RenderCommand, RenderList, TextStyle, build_polyline};
use crate::sample::Resolution;
use crate::state::ViewState;
use crate::transform::Transform;
use crate::view::{Domain, Range};

/// Tick count used when expanding the value axis to nice bounds.
const NICE_TICKS: usize = 10;

/// Horizontal offset of marker labels from their rule.
const MARKER_LABEL_DX: f32 = 4.0;

/// Vertical offset of marker labels above the plot area.
const MARKER_LABEL_DY: f32 = -4.0;

/// Chart geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartLayout {
    /// Space around the plot area.
    pub margin: Margin,
    /// Total height including margins.
    pub outer_height: f32,
    /// Requested tick count on the bin axis.
    pub x_ticks: usize,
    /// Requested tick count on the value axis.
    pub y_ticks: usize,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            margin: Margin::new(20.0, 20.0, 40.0, 50.0),
            outer_height: 400.0,
            x_ticks: 8,
            y_ticks: 6,
        }
    }
}

/// Fixed vertical marker at a bin position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    /// Bin index of the marker.
    pub bin: u32,
    /// Pixel position of the marker.
    pub x: f32,
    /// Marker label.
    pub label: &'static str,
}

/// Render-ready description of the primary chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartFrame {
    /// Data-to-pixel transform of the plot area.
    pub transform: Transform,
    /// Line vertices in series order, plot-area coordinates.
    pub points: Vec<ScreenPoint>,
    /// Lights-off and lights-on markers.
    pub annotations: Vec<Annotation>,
    /// Active range, estrus count, resolution, and metric.
    pub subtitle: String,
    /// Bin axis title.
    pub x_title: String,
    /// Value axis title.
    pub y_title: String,
    /// Bin axis ticks.
    pub x_ticks: Vec<Tick>,
    /// Value axis ticks.
    pub y_ticks: Vec<Tick>,
    /// Plot area width.
    pub width: f32,
    /// Plot area height.
    pub height: f32,
    /// True when the domain is a fallback because the series was empty.
    pub fallback_domain: bool,
}

impl ChartFrame {
    /// Horizontal scale.
    pub fn x_scale(&self) -> &LinearScale {
        self.transform.x_scale()
    }

    /// Vertical scale.
    pub fn y_scale(&self) -> &LinearScale {
        self.transform.y_scale()
    }

    /// Draw commands in plot-area coordinates.
    pub fn render_list(&self, margin: Margin) -> RenderList {
        let mut list = RenderList::new();
        if !self.points.is_empty() {
            list.push(RenderCommand::Polyline {
                points: self.points.clone(),
                style: LineStyle {
                    color: Color::SERIES,
                    width: 2.0,
                },
            });
        }
        for marker in &self.annotations {
            list.push(RenderCommand::Rule {
                start: ScreenPoint::new(marker.x, 0.0),
                end: ScreenPoint::new(marker.x, self.height),
                style: LineStyle {
                    color: Color::GREY,
                    width: 1.0,
                },
            });
            list.push(RenderCommand::Text {
                position: ScreenPoint::new(marker.x + MARKER_LABEL_DX, MARKER_LABEL_DY),
                text: marker.label.to_string(),
                style: TextStyle::default(),
            });
        }
        list.push(RenderCommand::Text {
            position: ScreenPoint::new(self.width / 2.0, self.height + margin.bottom - 10.0),
            text: self.x_title.clone(),
            style: TextStyle::default(),
        });
        list.push(RenderCommand::Text {
            position: ScreenPoint::new(-margin.left + 15.0, self.height / 2.0),
            text: self.y_title.clone(),
            style: TextStyle::default(),
        });
        list
    }
}

/// Builds chart frames for a viewport width.
///
/// The renderer remembers the last non-empty domain, with the resolution it
/// was drawn at, so an empty selection keeps the previous axes instead of
/// collapsing. A remembered domain is never reused across resolutions.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    layout: ChartLayout,
    outer_width: f32,
    last_domain: Option<(Resolution, Domain)>,
}

impl ChartRenderer {
    /// Create a renderer for a viewport `outer_width` pixels wide.
    pub fn new(layout: ChartLayout, outer_width: f32) -> Self {
        Self {
            layout,
            outer_width,
            last_domain: None,
        }
    }

    /// Chart geometry.
    pub fn layout(&self) -> &ChartLayout {
        &self.layout
    }

    /// Plot area width.
    pub fn inner_width(&self) -> f32 {
        self.layout.margin.inner_width(self.outer_width)
    }

    /// Plot area height.
    pub fn inner_height(&self) -> f32 {
        self.layout.margin.inner_height(self.layout.outer_height)
    }

    /// Change the viewport width. Only the horizontal pixel range depends on it.
    pub fn resize(&mut self, outer_width: f32) {
        self.outer_width = outer_width;
    }

    /// Build a frame for a series sorted by bin.
    pub fn render(
        &mut self,
        series: &[AggregatedPoint],
        state: &ViewState,
        calendar: &EstrusCalendar,
    ) -> ChartFrame {
        let (domain, fallback_domain) = match series_domain(series) {
            Some(domain) => {
                self.last_domain = Some((state.resolution(), domain));
                (domain, false)
            }
            None => (self.fallback_domain(state), true),
        };

        let width = self.inner_width();
        let height = self.inner_height();
        let transform = Transform::new(
            LinearScale::new(domain.x, 0.0, width as f64),
            LinearScale::new(domain.y, height as f64, 0.0),
        );

        let mut points = Vec::with_capacity(series.len());
        build_polyline(series.iter().map(|p| p.to_point()), &transform, &mut points);

        let resolution = state.resolution();
        let annotations = [(0, "Lights Off"), (resolution.half_day_bin(), "Lights On")]
            .into_iter()
            .map(|(bin, label)| Annotation {
                bin,
                x: transform.x_scale().map(bin as f64) as f32,
                label,
            })
            .collect();

        let x_axis = AxisConfig::new(self.layout.x_ticks)
            .with_title(format!("Time of Day (bins of {} min)", resolution.minutes()));
        let y_axis = AxisConfig::new(self.layout.y_ticks).with_title(state.metric().label());

        log::debug!(
            "rendered {} points over {:?} (fallback: {fallback_domain})",
            points.len(),
            domain
        );

        ChartFrame {
            points,
            annotations,
            subtitle: subtitle(state, calendar),
            x_title: x_axis.title().unwrap_or_default().to_string(),
            y_title: y_axis.title().unwrap_or_default().to_string(),
            x_ticks: x_axis.ticks(transform.x_scale()),
            y_ticks: y_axis.ticks(transform.y_scale()),
            transform,
            width,
            height,
            fallback_domain,
        }
    }

    fn fallback_domain(&self, state: &ViewState) -> Domain {
        let resolution = state.resolution();
        match self.last_domain {
            Some((drawn_at, domain)) if drawn_at == resolution => domain,
            _ => {
                let last_bin = resolution.bins_per_day().saturating_sub(1);
                Domain::new(Range::new(0.0, last_bin as f64), Range::new(0.0, 1.0))
            }
        }
    }
}

fn series_domain(series: &[AggregatedPoint]) -> Option<Domain> {
    let x = Range::extent(series.iter().map(|p| p.bin as f64))?;
    let y = Range::extent(series.iter().map(|p| p.value))?;
    let y = LinearScale::new(y, 0.0, 1.0).nice(NICE_TICKS).domain();
    Some(Domain::new(x, y))
}

/// Subtitle text: day range, estrus-day count, resolution, metric.
pub fn subtitle(state: &ViewState, calendar: &EstrusCalendar) -> String {
    let days = state.day_range();
    format!(
        "Showing days {days} (Estrus days: {}/{}), bin = {}, metric = {}",
        calendar.count_in(days),
        days.len(),
        state.resolution(),
        state.metric().label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{Metric, Resolution, Sample};

    fn state() -> ViewState {
        ViewState::new(Resolution::Min60, Metric::Activity, 13)
    }

    fn series() -> Vec<AggregatedPoint> {
        (0..24).map(|bin| AggregatedPoint::new(bin, 1.0 + bin as f64 * 0.4)).collect()
    }

    // 600px outer width leaves a 530 x 340 plot area.
    fn renderer() -> ChartRenderer {
        ChartRenderer::new(ChartLayout::default(), 600.0)
    }

    #[test]
    fn scales_cover_series_extent() {
        let frame = renderer().render(&series(), &state(), &EstrusCalendar::default());
        assert_eq!(frame.x_scale().domain(), Range::new(0.0, 23.0));
        assert_eq!(frame.x_scale().range(), (0.0, 530.0));
        assert_eq!(frame.y_scale().domain(), Range::new(1.0, 11.0));
        assert_eq!(frame.y_scale().range(), (340.0, 0.0));
        assert_eq!(frame.points.len(), 24);
        assert_eq!(frame.points[0], ScreenPoint::new(0.0, 340.0));
        assert!(!frame.fallback_domain);
    }

    #[test]
    fn rendering_is_idempotent() {
        let mut renderer = renderer();
        let calendar = EstrusCalendar::default();
        let first = renderer.render(&series(), &state(), &calendar);
        let second = renderer.render(&series(), &state(), &calendar);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_series_uses_default_then_prior_domain() {
        let mut renderer = renderer();
        let calendar = EstrusCalendar::default();
        let frame = renderer.render(&[], &state(), &calendar);
        assert!(frame.points.is_empty());
        assert!(frame.fallback_domain);
        assert_eq!(frame.x_scale().domain(), Range::new(0.0, 23.0));
        assert_eq!(frame.y_scale().domain(), Range::new(0.0, 1.0));
        assert!(frame.render_list(ChartLayout::default().margin).commands().iter().all(
            |command| !matches!(command, RenderCommand::Polyline { .. })
        ));

        let full = renderer.render(&series(), &state(), &calendar);
        let empty = renderer.render(&[], &state(), &calendar);
        assert_eq!(empty.transform.domain(), full.transform.domain());
    }

    #[test]
    fn empty_series_after_resolution_switch_uses_that_resolution() {
        let mut renderer = renderer();
        let calendar = EstrusCalendar::default();
        renderer.render(&series(), &state(), &calendar);

        let fine = state().with_resolution(Resolution::Min5);
        let frame = renderer.render(&[], &fine, &calendar);
        assert!(frame.fallback_domain);
        assert_eq!(frame.x_scale().domain(), Range::new(0.0, 287.0));
        let lights_on = &frame.annotations[1];
        assert_eq!(lights_on.bin, 144);
        assert!(lights_on.x >= 0.0 && lights_on.x <= frame.width);

        // Back at the original resolution the remembered domain applies again.
        let frame = renderer.render(&[], &state(), &calendar);
        assert_eq!(frame.x_scale().domain(), Range::new(0.0, 23.0));
        assert_eq!(frame.y_scale().domain(), Range::new(1.0, 11.0));
    }

    #[test]
    fn lights_on_marker_follows_resolution() {
        let mut renderer = renderer();
        let calendar = EstrusCalendar::default();
        let frame = renderer.render(&series(), &state(), &calendar);
        assert_eq!(frame.annotations[0].bin, 0);
        assert_eq!(frame.annotations[0].label, "Lights Off");
        assert_eq!(frame.annotations[1].bin, 12);
        assert_eq!(frame.annotations[1].label, "Lights On");

        let fine = state().with_resolution(Resolution::Min15);
        let frame = renderer.render(&series(), &fine, &calendar);
        assert_eq!(frame.annotations[1].bin, 48);
        assert_eq!(frame.x_title, "Time of Day (bins of 15 min)");
    }

    #[test]
    fn resize_changes_only_horizontal_range() {
        let mut renderer = renderer();
        let calendar = EstrusCalendar::default();
        let before = renderer.render(&series(), &state(), &calendar);
        renderer.resize(900.0);
        let after = renderer.render(&series(), &state(), &calendar);
        assert_eq!(after.x_scale().domain(), before.x_scale().domain());
        assert_eq!(after.x_scale().range(), (0.0, 830.0));
        assert_eq!(after.y_scale(), before.y_scale());
    }

    #[test]
    fn subtitle_reports_range_estrus_resolution_and_metric() {
        let samples: Vec<Sample> = (0..14)
            .map(|day| Sample::new(day, 0).with_estrus(day % 4 == 2))
            .collect();
        let calendar = EstrusCalendar::from_samples(&samples);
        let state = state().with_metric(Metric::Ratio);
        assert_eq!(
            subtitle(&state, &calendar),
            "Showing days 0-13 (Estrus days: 3/14), bin = 60 min, metric = Temp / Activity"
        );
        let state = state.with_day_range(3, 5).unwrap();
        assert_eq!(
            subtitle(&state, &calendar),
            "Showing days 3-5 (Estrus days: 0/3), bin = 60 min, metric = Temp / Activity"
        );
    }
}
