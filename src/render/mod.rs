//! Self-contained HTML report: per-job iteration impulse plot.

pub mod html;

pub use html::{JobView, ReportData, render_html_report, report_data};
