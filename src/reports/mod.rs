//! Reports for the expense tracker
//!
//! Totals, category breakdowns and the monthly summary view.

pub mod aggregate;
pub mod summary;

pub use aggregate::{
    all_time_total, category_breakdown, category_detail, filter_by_period, monthly_total,
    sort_by_date_desc, total, CategoryDetail, CategoryShare,
};
pub use summary::MonthlySummary;
