//! Small-multiples panels: one mini chart per recorded day.
//!
//! Panels are independent of [`ViewState`](crate::state::ViewState). They
//! share one pair of scales computed from the extent of every day so that
//! panels are comparable, and keep their own hover and selection state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::axis::LinearScale;
use crate::geom::{Point, ScreenPoint, ScreenRect};
use crate::render::{
    Color, LineStyle, RectStyle, RenderCommand, RenderList, TextStyle, build_polyline,
};
use crate::sample::{Metric, Sample};
use crate::transform::Transform;
use crate::view::Range;

/// Samples of one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup {
    /// Recording day.
    pub day: u32,
    /// Flag of the first record seen for the day.
    pub estrus: bool,
    /// False when records of the day disagree on the flag.
    pub consistent: bool,
    /// Records of the day, ordered by bin.
    pub samples: Vec<Sample>,
}

/// Partition samples by day.
///
/// The estrus flag of a day is assumed constant across its records; the first
/// record in input order decides it and disagreement is logged.
pub fn partition_by_day(samples: &[Sample]) -> BTreeMap<u32, DayGroup> {
    let mut groups: BTreeMap<u32, DayGroup> = BTreeMap::new();
    for sample in samples {
        let group = groups.entry(sample.day).or_insert_with(|| DayGroup {
            day: sample.day,
            estrus: sample.estrus,
            consistent: true,
            samples: Vec::new(),
        });
        if sample.estrus != group.estrus {
            group.consistent = false;
        }
        group.samples.push(sample.clone());
    }
    for group in groups.values_mut() {
        group.samples.sort_by_key(|sample| sample.bin);
        if !group.consistent {
            log::warn!(
                "day {} has mixed estrus flags; using the first record's flag ({})",
                group.day,
                group.estrus
            );
        }
    }
    groups
}

/// Fixed panel size and spacing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelLayout {
    /// Panel width in pixels.
    pub width: f32,
    /// Panel height in pixels.
    pub height: f32,
    /// Gap between panels in pixels.
    pub gap: f32,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self {
            width: 160.0,
            height: 90.0,
            gap: 8.0,
        }
    }
}

/// Render-ready description of one panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelFrame {
    /// Day shown by the panel.
    pub day: u32,
    /// Estrus flag of the day.
    pub estrus: bool,
    /// Panel bounds in container coordinates.
    pub rect: ScreenRect,
    /// Series vertices in container coordinates.
    pub points: Vec<ScreenPoint>,
    /// Panel title.
    pub title: String,
    /// Whether the panel is the selected one.
    pub highlighted: bool,
    /// Whether the pointer is over the panel.
    pub hovered: bool,
}

impl PanelFrame {
    /// Draw commands for the panel.
    pub fn render_list(&self) -> RenderList {
        let mut list = RenderList::new();
        let border = if self.highlighted {
            RectStyle {
                stroke: Color::BLACK,
                stroke_width: 2.0,
                ..RectStyle::default()
            }
        } else {
            RectStyle {
                stroke: Color::GREY,
                ..RectStyle::default()
            }
        };
        list.push(RenderCommand::Rect {
            rect: self.rect,
            style: border,
        });
        if self.points.len() > 1 {
            list.push(RenderCommand::Polyline {
                points: self.points.clone(),
                style: LineStyle {
                    color: estrus_color(self.estrus),
                    width: 1.5,
                },
            });
        }
        list.push(RenderCommand::Text {
            position: ScreenPoint::new(self.rect.min.x + 4.0, self.rect.min.y + 12.0),
            text: self.title.clone(),
            style: TextStyle {
                color: estrus_color(self.estrus),
                size: 10.0,
            },
        });
        list
    }
}

fn estrus_color(estrus: bool) -> Color {
    if estrus { Color::ESTRUS } else { Color::NON_ESTRUS }
}

/// Grid of per-day panels with local hover and single selection.
#[derive(Debug, Clone)]
pub struct SmallMultiples {
    groups: Vec<DayGroup>,
    metric: Metric,
    layout: PanelLayout,
    transform: Option<Transform>,
    columns: usize,
    selected: Option<u32>,
    hovered: Option<u32>,
}

impl SmallMultiples {
    /// Partition samples by day and compute the shared scales.
    ///
    /// X is the fractional hour of day, Y the metric's storage field.
    pub fn new(
        samples: &[Sample],
        metric: Metric,
        layout: PanelLayout,
        container_width: f32,
    ) -> Self {
        let groups: Vec<DayGroup> = partition_by_day(samples).into_values().collect();
        let transform = shared_transform(&groups, metric, layout);
        Self {
            groups,
            metric,
            layout,
            transform,
            columns: columns_for(container_width, layout),
            selected: None,
            hovered: None,
        }
    }

    /// Metric drawn in every panel.
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Shared transform, `None` when no record carries the metric.
    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    /// Day groups in day order.
    pub fn groups(&self) -> &[DayGroup] {
        &self.groups
    }

    /// Number of grid columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Selected day, if any.
    pub fn selected(&self) -> Option<u32> {
        self.selected
    }

    /// Reflow the grid for a new container width. Scales are unaffected.
    pub fn resize(&mut self, container_width: f32) {
        self.columns = columns_for(container_width, self.layout);
    }

    /// Bounds of the panel at a grid index.
    pub fn panel_rect(&self, index: usize) -> ScreenRect {
        let col = index % self.columns;
        let row = index / self.columns;
        let origin = ScreenPoint::new(
            col as f32 * (self.layout.width + self.layout.gap),
            row as f32 * (self.layout.height + self.layout.gap),
        );
        ScreenRect::from_origin_size(origin, self.layout.width, self.layout.height)
    }

    /// Day of the panel under a point.
    pub fn hit_test(&self, point: ScreenPoint) -> Option<u32> {
        self.groups
            .iter()
            .enumerate()
            .find(|(index, _)| self.panel_rect(*index).contains(point))
            .map(|(_, group)| group.day)
    }

    /// Update hover state and return the hover label.
    pub fn hover(&mut self, point: ScreenPoint) -> Option<String> {
        self.hovered = self.hit_test(point);
        self.hover_label()
    }

    /// Clear hover state.
    pub fn leave(&mut self) {
        self.hovered = None;
    }

    /// Label for the hovered panel: day plus estrus status.
    pub fn hover_label(&self) -> Option<String> {
        let day = self.hovered?;
        let group = self.group(day)?;
        let status = if group.estrus { "Estrus" } else { "Non-estrus" };
        Some(format!("Day {day}: {status}"))
    }

    /// Click at a point; returns the selection afterwards.
    pub fn click(&mut self, point: ScreenPoint) -> Option<u32> {
        if let Some(day) = self.hit_test(point) {
            self.toggle_selection(day);
        }
        self.selected
    }

    /// Select a day exclusively; selecting the selected day clears it.
    pub fn toggle_selection(&mut self, day: u32) -> Option<u32> {
        if self.group(day).is_none() {
            return self.selected;
        }
        self.selected = if self.selected == Some(day) {
            None
        } else {
            Some(day)
        };
        self.selected
    }

    /// Render-ready frames for every panel.
    pub fn frames(&self) -> Vec<PanelFrame> {
        let mut vertices = Vec::new();
        self.groups
            .iter()
            .enumerate()
            .map(|(index, group)| {
                let rect = self.panel_rect(index);
                let points = match &self.transform {
                    Some(transform) => {
                        build_polyline(panel_points(group, self.metric), transform, &mut vertices);
                        vertices
                            .iter()
                            .map(|p| ScreenPoint::new(p.x + rect.min.x, p.y + rect.min.y))
                            .collect()
                    }
                    None => Vec::new(),
                };
                PanelFrame {
                    day: group.day,
                    estrus: group.estrus,
                    rect,
                    points,
                    title: format!("Day {}", group.day),
                    highlighted: self.selected == Some(group.day),
                    hovered: self.hovered == Some(group.day),
                }
            })
            .collect()
    }

    fn group(&self, day: u32) -> Option<&DayGroup> {
        self.groups.iter().find(|group| group.day == day)
    }
}

fn panel_points(group: &DayGroup, metric: Metric) -> impl Iterator<Item = Point> + '_ {
    group
        .samples
        .iter()
        .filter_map(move |sample| Some(Point::new(sample.hour?, sample.metric(metric)?)))
}

fn shared_transform(groups: &[DayGroup], metric: Metric, layout: PanelLayout) -> Option<Transform> {
    let points: Vec<Point> = groups
        .iter()
        .flat_map(|group| panel_points(group, metric))
        .collect();
    let x = Range::extent(points.iter().map(|p| p.x))?;
    let y = Range::extent(points.iter().map(|p| p.y))?;
    Some(Transform::new(
        LinearScale::new(x, 0.0, layout.width as f64),
        LinearScale::new(y, layout.height as f64, 0.0).nice(4),
    ))
}

fn columns_for(container_width: f32, layout: PanelLayout) -> usize {
    let cell = layout.width + layout.gap;
    if cell <= 0.0 || !container_width.is_finite() {
        return 1;
    }
    (((container_width + layout.gap) / cell).floor() as usize).max(1)
}
