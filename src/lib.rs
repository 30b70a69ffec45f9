//! circadian_plot aggregates circadian activity and temperature telemetry
//! into render-ready chart frames.
//! One view state (resolution, metric, day range) drives a range selector and
//! a primary chart; per-day small-multiples panels sit beside them.

#![forbid(unsafe_code)]

pub mod aggregate;
pub mod axis;
pub mod brush;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod estrus;
pub mod geom;
pub mod loader;
pub mod locate;
pub mod panels;
pub mod render;
pub mod sample;
pub mod state;
pub mod store;
pub mod transform;
pub mod view;

pub use aggregate::{AggregatedPoint, aggregate};
pub use axis::{AxisConfig, AxisFormatter, LinearScale, Tick};
pub use brush::{RangeSelector, TimelineLayout};
pub use chart::{Annotation, ChartFrame, ChartLayout, ChartRenderer};
pub use config::ViewerConfig;
pub use dashboard::Dashboard;
pub use error::{Error, Result};
pub use estrus::EstrusCalendar;
pub use geom::{Margin, Point, ScreenPoint, ScreenRect};
pub use loader::{load_file, load_store, parse_samples};
pub use locate::{Tooltip, locate};
pub use panels::{DayGroup, PanelFrame, PanelLayout, SmallMultiples, partition_by_day};
pub use render::{Color, LineStyle, RectStyle, RenderCommand, RenderList, TextStyle};
pub use sample::{Metric, Resolution, Sample};
pub use state::{
    ChangeKind, DayRange, RangeError, StateChange, SubscriberId, ViewController, ViewState,
};
pub use store::RecordStore;
pub use transform::Transform;
pub use view::{Domain, Range};
