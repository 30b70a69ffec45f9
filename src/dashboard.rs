//! The linked dashboard: one view state driving the range selector and the
//! primary chart, next to the independent small-multiples panels.

use std::collections::BTreeMap;

use crate::aggregate::{AggregatedPoint, aggregate};
use crate::brush::RangeSelector;
use crate::chart::{ChartFrame, ChartRenderer};
use crate::config::ViewerConfig;
use crate::error::{Error, Result};
use crate::estrus::EstrusCalendar;
use crate::locate::{Tooltip, locate};
use crate::panels::SmallMultiples;
use crate::render::RenderList;
use crate::sample::{Metric, Resolution};
use crate::state::{StateChange, SubscriberId, ViewController, ViewState};
use crate::store::RecordStore;

/// Loaded data plus every view derived from it.
///
/// Each accepted state change re-runs filter, aggregate, and render before
/// the mutating call returns, so the series and frame always describe the
/// current state.
#[derive(Debug)]
pub struct Dashboard {
    store: RecordStore,
    calendars: BTreeMap<Resolution, EstrusCalendar>,
    controller: ViewController,
    selector: RangeSelector,
    renderer: ChartRenderer,
    panels: SmallMultiples,
    series: Vec<AggregatedPoint>,
    frame: ChartFrame,
}

impl Dashboard {
    /// Build the dashboard for a viewport `width` pixels wide.
    ///
    /// Fails if the default or panel resolution has no loaded data.
    pub fn new(store: RecordStore, config: &ViewerConfig, width: f32) -> Result<Self> {
        let max_day = config.max_day.or_else(|| store.max_day()).unwrap_or(0);
        let state = ViewState::new(config.default_resolution, config.default_metric, max_day);

        let calendars = store
            .resolutions()
            .filter_map(|resolution| {
                let samples = store.samples(resolution).ok()?;
                Some((resolution, EstrusCalendar::from_samples(samples)))
            })
            .collect();

        let panels = SmallMultiples::new(
            store.samples(config.panel_resolution)?,
            config.panel_metric,
            config.panels,
            width,
        );

        let mut renderer = ChartRenderer::new(config.chart, width);
        let (series, frame) = render_view(&store, &calendars, &mut renderer, &state)?;

        log::info!(
            "dashboard ready: days 0-{max_day}, {}, {}",
            state.resolution(),
            state.metric()
        );

        Ok(Self {
            store,
            calendars,
            controller: ViewController::new(state),
            selector: RangeSelector::new(max_day, config.timeline, width),
            renderer,
            panels,
            series,
            frame,
        })
    }

    /// Current view state.
    pub fn state(&self) -> ViewState {
        self.controller.state()
    }

    /// Loaded records.
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Aggregated series behind the current frame.
    pub fn series(&self) -> &[AggregatedPoint] {
        &self.series
    }

    /// Current primary chart frame.
    pub fn frame(&self) -> &ChartFrame {
        &self.frame
    }

    /// Range selector geometry.
    pub fn selector(&self) -> &RangeSelector {
        &self.selector
    }

    /// Draw commands for the timeline at the current selection.
    pub fn timeline(&self) -> RenderList {
        self.selector.render_list(self.state().day_range())
    }

    /// Small-multiples panels.
    pub fn panels(&self) -> &SmallMultiples {
        &self.panels
    }

    /// Small-multiples panels, for hover and click handling.
    pub fn panels_mut(&mut self) -> &mut SmallMultiples {
        &mut self.panels
    }

    /// Estrus calendar of the active resolution.
    pub fn calendar(&self) -> Option<&EstrusCalendar> {
        self.calendars.get(&self.state().resolution())
    }

    /// Register a state change listener.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&StateChange) + 'static) -> SubscriberId {
        self.controller.subscribe(subscriber)
    }

    /// Remove a state change listener.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.controller.unsubscribe(id)
    }

    /// Switch resolution. A resolution without data is rejected and the
    /// current view is kept.
    pub fn set_resolution(&mut self, resolution: Resolution) -> Result<Option<StateChange>> {
        self.store.samples(resolution)?;
        let change = self.controller.set_resolution(resolution);
        self.apply(change)
    }

    /// Switch metric.
    pub fn set_metric(&mut self, metric: Metric) -> Result<Option<StateChange>> {
        let change = self.controller.set_metric(metric);
        self.apply(change)
    }

    /// Set the day range directly.
    pub fn set_day_range(&mut self, low: i64, high: i64) -> Result<Option<StateChange>> {
        let change = self.controller.set_day_range(low, high)?;
        self.apply(change)
    }

    /// Apply a brush selection in timeline pixels; `None` is ignored.
    pub fn brush(&mut self, selection: Option<(f32, f32)>) -> Result<Option<StateChange>> {
        let change = self.selector.brush(&mut self.controller, selection);
        self.apply(change)
    }

    /// Apply a typed minimum day.
    pub fn edit_min(&mut self, text: &str) -> Result<Option<StateChange>> {
        let change = self.selector.edit_min(&mut self.controller, text)?;
        self.apply(change)
    }

    /// Apply a typed maximum day.
    pub fn edit_max(&mut self, text: &str) -> Result<Option<StateChange>> {
        let change = self.selector.edit_max(&mut self.controller, text)?;
        self.apply(change)
    }

    /// Re-layout for a new viewport width. The day selection is kept.
    pub fn resize(&mut self, width: f32) -> Result<()> {
        self.renderer.resize(width);
        self.selector.resize(width);
        self.panels.resize(width);
        self.refresh()
    }

    /// Tooltip for the series point under a chart-area pointer position.
    pub fn pointer_move(&self, pointer_x: f32) -> Option<Tooltip> {
        locate(&self.series, pointer_x, self.frame.x_scale())
            .map(|point| Tooltip::new(point, self.state().metric()))
    }

    /// Re-run filter, aggregate, and render for the current state.
    pub fn refresh(&mut self) -> Result<()> {
        let state = self.controller.state();
        let (series, frame) =
            render_view(&self.store, &self.calendars, &mut self.renderer, &state)?;
        self.series = series;
        self.frame = frame;
        Ok(())
    }

    fn apply(&mut self, change: Option<StateChange>) -> Result<Option<StateChange>> {
        if change.is_some() {
            self.refresh()?;
        }
        Ok(change)
    }
}

fn render_view(
    store: &RecordStore,
    calendars: &BTreeMap<Resolution, EstrusCalendar>,
    renderer: &mut ChartRenderer,
    state: &ViewState,
) -> Result<(Vec<AggregatedPoint>, ChartFrame)> {
    let resolution = state.resolution();
    let samples = store.samples(resolution)?;
    let calendar = calendars
        .get(&resolution)
        .ok_or(Error::MissingResolution(resolution))?;
    let series = aggregate(samples, state.metric(), state.day_range());
    let frame = renderer.render(&series, state, calendar);
    log::debug!(
        "days {} at {}: {} samples -> {} points",
        state.day_range(),
        resolution,
        samples.len(),
        series.len()
    );
    Ok((series, frame))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::geom::ScreenPoint;
    use crate::sample::Sample;
    use crate::state::{ChangeKind, DayRange, RangeError};

    // Days 0-3; activity is day + 1 everywhere, day 2 is flagged.
    fn collection(resolution: Resolution) -> Vec<Sample> {
        let bins = resolution.bins_per_day() as i64;
        (0..4)
            .flat_map(|day| {
                (0..bins).map(move |bin| {
                    Sample::new(day, bin)
                        .with_hour((bin as f64 + 0.5) * resolution.minutes() as f64 / 60.0)
                        .with_estrus(day == 2)
                        .with_value("activity_mean", day as f64 + 1.0)
                        .with_value("temperature_mean", 36.0 + bin as f64 * 0.1)
                })
            })
            .collect()
    }

    fn store() -> RecordStore {
        RecordStore::from_collections([
            (Resolution::Min15, collection(Resolution::Min15)),
            (Resolution::Min60, collection(Resolution::Min60)),
        ])
    }

    fn dashboard() -> Dashboard {
        Dashboard::new(store(), &ViewerConfig::default(), 600.0).unwrap()
    }

    #[test]
    fn initial_view_covers_every_day() {
        let dashboard = dashboard();
        assert_eq!(dashboard.state().day_range(), DayRange::ordered(0, 3));
        assert_eq!(dashboard.series().len(), 24);
        assert!(dashboard.series().iter().all(|p| p.value == 2.5));
        assert_eq!(
            dashboard.frame().subtitle,
            "Showing days 0-3 (Estrus days: 1/4), bin = 60 min, metric = Activity"
        );
        assert_eq!(dashboard.panels().groups().len(), 4);
    }

    #[test]
    fn missing_default_resolution_fails_startup() {
        let config = ViewerConfig {
            default_resolution: Resolution::Min5,
            ..ViewerConfig::default()
        };
        let err = Dashboard::new(store(), &config, 600.0).unwrap_err();
        assert!(matches!(err, Error::MissingResolution(Resolution::Min5)));
    }

    #[test]
    fn brush_reaggregates_selected_days() {
        let mut dashboard = dashboard();
        // 560px brush area over 3 day-steps.
        let change = dashboard.brush(Some((380.0, 180.0))).unwrap();
        assert_eq!(change.map(|c| c.kind), Some(ChangeKind::DayRange));
        assert_eq!(dashboard.state().day_range(), DayRange::ordered(1, 2));
        assert!(dashboard.series().iter().all(|p| p.value == 2.5));

        dashboard.set_day_range(2, 2).unwrap();
        assert!(dashboard.series().iter().all(|p| p.value == 3.0));
        assert_eq!(
            dashboard.frame().subtitle,
            "Showing days 2-2 (Estrus days: 1/1), bin = 60 min, metric = Activity"
        );
    }

    #[test]
    fn resolution_switch_keeps_days_and_moves_lights_on() {
        let mut dashboard = dashboard();
        dashboard.set_day_range(1, 3).unwrap();
        assert_eq!(dashboard.frame().annotations[1].bin, 12);

        dashboard.set_resolution(Resolution::Min15).unwrap();
        assert_eq!(dashboard.state().day_range(), DayRange::ordered(1, 3));
        assert_eq!(dashboard.series().len(), 96);
        assert_eq!(dashboard.frame().annotations[1].bin, 48);
    }

    #[test]
    fn resolution_without_data_is_rejected() {
        let mut dashboard = dashboard();
        let before = dashboard.frame().clone();
        let err = dashboard.set_resolution(Resolution::Min5).unwrap_err();
        assert!(matches!(err, Error::MissingResolution(Resolution::Min5)));
        assert_eq!(dashboard.state().resolution(), Resolution::Min60);
        assert_eq!(dashboard.frame(), &before);
    }

    #[test]
    fn invalid_edits_leave_the_view_untouched() {
        let mut dashboard = dashboard();
        dashboard.set_day_range(1, 2).unwrap();
        let before = dashboard.frame().clone();

        let err = dashboard.edit_min("3").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidRange(RangeError::Inverted { low: 3, high: 2 })
        ));
        assert!(dashboard.edit_max("7").is_err());
        assert!(dashboard.edit_max("two").is_err());
        assert_eq!(dashboard.state().day_range(), DayRange::ordered(1, 2));
        assert_eq!(dashboard.frame(), &before);

        dashboard.edit_max("3").unwrap();
        assert_eq!(dashboard.state().day_range(), DayRange::ordered(1, 3));
    }

    #[test]
    fn subscribers_see_each_accepted_change_once() {
        let mut dashboard = dashboard();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        dashboard.subscribe(move |change| sink.borrow_mut().push(change.kind));

        dashboard.set_metric(Metric::Temperature).unwrap();
        dashboard.set_metric(Metric::Temperature).unwrap();
        let _ = dashboard.set_day_range(3, 1);
        dashboard.set_resolution(Resolution::Min15).unwrap();

        assert_eq!(*seen.borrow(), vec![ChangeKind::Metric, ChangeKind::Resolution]);
    }

    #[test]
    fn pointer_move_reports_the_bin_under_the_cursor() {
        let dashboard = dashboard();
        let x = dashboard.frame().x_scale().map(12.0) as f32;
        let tooltip = dashboard.pointer_move(x).unwrap();
        assert_eq!(tooltip.bin, 12);
        assert_eq!(tooltip.text, "Bin: 12\nActivity: 2.50");
        assert!(dashboard.pointer_move(-500.0).is_none());
    }

    #[test]
    fn resize_keeps_selection_and_rescales() {
        let mut dashboard = dashboard();
        dashboard.set_day_range(1, 2).unwrap();
        let (before, _) = dashboard.selector().handle_positions(dashboard.state().day_range());

        dashboard.resize(1200.0).unwrap();
        assert_eq!(dashboard.state().day_range(), DayRange::ordered(1, 2));
        let (after, _) = dashboard.selector().handle_positions(dashboard.state().day_range());
        assert!(after > before);
        assert_eq!(dashboard.frame().x_scale().range(), (0.0, 1130.0));
    }

    #[test]
    fn panel_clicks_do_not_touch_view_state() {
        let mut dashboard = dashboard();
        let before = dashboard.state();
        let selected = dashboard.panels_mut().click(ScreenPoint::new(10.0, 10.0));
        assert_eq!(selected, Some(0));
        assert_eq!(dashboard.state(), before);
    }
}
