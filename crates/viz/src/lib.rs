//! # returnboard-viz
//!
//! Views and charts for the returns dashboard.
//!
//! From one cleaned table this crate derives:
//! - category proportions (doughnut chart)
//! - the top models by quantity (bar chart)
//! - a model × disposition cross-tab (heat map)
//! - the sorted raw records
//!
//! Charts are emitted as Chart.js specifications inside HTML fragments. All
//! views are `Serialize` for the JSON API.

pub mod chart;
pub mod error;
pub mod html;
pub mod report;
pub mod views;

pub use chart::{escape_html, ChartData, ChartKind, ChartOptions, ChartSpec, Dataset};
pub use error::{VizError, VizResult};
pub use html::{
    empty_notice, fatal_notice, notice, page, render_heat_map, render_raw_table, render_report,
    render_sheet, NoticeLevel, PAGE_TITLE,
};
pub use report::DashboardReport;
pub use views::{
    CategoryProportions, CategoryShare, CrossTab, CrossTabRow, EntityTotal, RawRow, RawTableView,
    SheetViews, TopEntities, CROSS_TAB_ENTITIES, TOP_ENTITIES,
};
