//! Result engine module.
//!
//! Synchronous, side-effect free logic over job results: classification,
//! grouping, notifications and the calendar grid.

pub mod aggregate;
pub mod calendar;
pub mod classify;
pub mod favorites;
pub mod notify;

pub use aggregate::{
    group_deals, is_saved, map_points, summarize, DealGroup, MapPoint, ResultSummary,
};
pub use calendar::{build_grid, CalendarGrid, DayCell, GridCell};
pub use classify::{classify_absolute, classify_relative, CellShade, PriceTier};
pub use favorites::FavoriteSet;
pub use notify::{DealNotification, NotificationEngine, ToastQueue};
