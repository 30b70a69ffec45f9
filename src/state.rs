//! View state: the single source of truth for the primary chart.
//!
//! [`ViewState`] is a plain value. Every mutation goes through a validating
//! `with_*` constructor that returns either a complete new state or an error,
//! so a rejected edit never leaves a half-written state behind.
//! [`ViewController`] owns the live state and notifies subscribers after each
//! accepted change.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::sample::{Metric, Resolution};

/// Rejected day-range edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// Low bound above high bound.
    #[error("day range is inverted: {low} > {high}")]
    Inverted {
        /// Requested low bound.
        low: u32,
        /// Requested high bound.
        high: u32,
    },
    /// Day index outside `[0, max_day]`.
    #[error("day {day} is outside 0..={max_day}")]
    OutOfBounds {
        /// Offending day.
        day: i64,
        /// Largest selectable day.
        max_day: u32,
    },
    /// Text entry that is not an integer.
    #[error("`{0}` is not a day number")]
    NotANumber(String),
}

/// Inclusive day interval with `low <= high`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DayRange {
    low: u32,
    high: u32,
}

impl DayRange {
    /// Create a range, rejecting inverted bounds.
    pub fn new(low: u32, high: u32) -> Result<Self, RangeError> {
        if low > high {
            return Err(RangeError::Inverted { low, high });
        }
        Ok(Self { low, high })
    }

    /// Create a range from two bounds in either order.
    pub fn ordered(a: u32, b: u32) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    /// Range covering a single day.
    pub fn single(day: u32) -> Self {
        Self {
            low: day,
            high: day,
        }
    }

    /// Lower bound.
    pub fn low(&self) -> u32 {
        self.low
    }

    /// Upper bound.
    pub fn high(&self) -> u32 {
        self.high
    }

    /// Number of days covered.
    pub fn len(&self) -> u32 {
        self.high - self.low + 1
    }

    /// Always false: a range covers at least one day.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check whether a day is inside the range.
    pub fn contains(&self, day: u32) -> bool {
        day >= self.low && day <= self.high
    }

    /// Iterate the covered days.
    pub fn days(&self) -> std::ops::RangeInclusive<u32> {
        self.low..=self.high
    }
}

impl fmt::Display for DayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// Parameters of the primary chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewState {
    resolution: Resolution,
    metric: Metric,
    day_range: DayRange,
    max_day: u32,
}

impl ViewState {
    /// Create a state showing every day.
    pub fn new(resolution: Resolution, metric: Metric, max_day: u32) -> Self {
        Self {
            resolution,
            metric,
            day_range: DayRange::ordered(0, max_day),
            max_day,
        }
    }

    /// Active resolution.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Active metric.
    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Selected days.
    pub fn day_range(&self) -> DayRange {
        self.day_range
    }

    /// Largest selectable day.
    pub fn max_day(&self) -> u32 {
        self.max_day
    }

    /// State with a different resolution.
    pub fn with_resolution(self, resolution: Resolution) -> Self {
        Self { resolution, ..self }
    }

    /// State with a different metric.
    pub fn with_metric(self, metric: Metric) -> Self {
        Self { metric, ..self }
    }

    /// State with a different day range.
    ///
    /// Both bounds are checked before anything is written.
    pub fn with_day_range(self, low: i64, high: i64) -> Result<Self, RangeError> {
        let low = self.check_day(low)?;
        let high = self.check_day(high)?;
        let day_range = DayRange::new(low, high)?;
        Ok(Self { day_range, ..self })
    }

    /// State with bounds clamped into `[0, max_day]` and ordered.
    pub fn with_clamped_day_range(self, a: i64, b: i64) -> Self {
        let day_range = DayRange::ordered(self.clamp_day(a), self.clamp_day(b));
        Self { day_range, ..self }
    }

    /// Clamp a day index into `[0, max_day]`.
    pub fn clamp_day(&self, day: i64) -> u32 {
        day.clamp(0, self.max_day as i64) as u32
    }

    fn check_day(&self, day: i64) -> Result<u32, RangeError> {
        if day < 0 || day > self.max_day as i64 {
            return Err(RangeError::OutOfBounds {
                day,
                max_day: self.max_day,
            });
        }
        Ok(day as u32)
    }
}

/// What an accepted mutation changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Resolution toggle.
    Resolution,
    /// Metric toggle.
    Metric,
    /// Day-range selection.
    DayRange,
}

/// Notification delivered to subscribers after an accepted change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    /// Monotonic change sequence number.
    pub seq: u64,
    /// Field that changed.
    pub kind: ChangeKind,
    /// State after the change.
    pub state: ViewState,
}

/// Subscription handle returned by [`ViewController::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Subscriber = Box<dyn FnMut(&StateChange)>;

/// Owner of the live [`ViewState`].
///
/// Setters apply a change only if it validates and differs from the current
/// state, then notify every subscriber once. Subscribers receive a copy of the
/// new state and have no access to the controller, so they cannot start a
/// nested mutation while a notification pass is running.
pub struct ViewController {
    state: ViewState,
    seq: u64,
    next_subscriber: u64,
    subscribers: Vec<(SubscriberId, Subscriber)>,
}

impl ViewController {
    /// Create a controller around an initial state.
    pub fn new(state: ViewState) -> Self {
        Self {
            state,
            seq: 0,
            next_subscriber: 0,
            subscribers: Vec::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Sequence number of the last accepted change.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Register a change listener.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&StateChange) + 'static) -> SubscriberId {
        self.next_subscriber = self.next_subscriber.wrapping_add(1);
        let id = SubscriberId(self.next_subscriber);
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove a change listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    /// Switch resolution.
    pub fn set_resolution(&mut self, resolution: Resolution) -> Option<StateChange> {
        let next = self.state.with_resolution(resolution);
        self.commit(next, ChangeKind::Resolution)
    }

    /// Switch metric.
    pub fn set_metric(&mut self, metric: Metric) -> Option<StateChange> {
        let next = self.state.with_metric(metric);
        self.commit(next, ChangeKind::Metric)
    }

    /// Set the day range; invalid ranges are rejected and leave state intact.
    pub fn set_day_range(
        &mut self,
        low: i64,
        high: i64,
    ) -> Result<Option<StateChange>, RangeError> {
        match self.state.with_day_range(low, high) {
            Ok(next) => Ok(self.commit(next, ChangeKind::DayRange)),
            Err(err) => {
                log::warn!("rejected day range {low}..={high}: {err}");
                Err(err)
            }
        }
    }

    /// Set the day range from unordered, unclamped bounds.
    pub fn set_clamped_day_range(&mut self, a: i64, b: i64) -> Option<StateChange> {
        let next = self.state.with_clamped_day_range(a, b);
        self.commit(next, ChangeKind::DayRange)
    }

    fn commit(&mut self, next: ViewState, kind: ChangeKind) -> Option<StateChange> {
        if next == self.state {
            return None;
        }
        self.state = next;
        self.seq = self.seq.wrapping_add(1);
        let change = StateChange {
            seq: self.seq,
            kind,
            state: next,
        };
        log::debug!("view state #{} {:?}: {:?}", change.seq, kind, next);
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&change);
        }
        Some(change)
    }
}

impl fmt::Debug for ViewController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewController")
            .field("state", &self.state)
            .field("seq", &self.seq)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
