//! Report rendering: charts, narrative markup and the PDF document.

pub mod charts;
pub mod fonts;
pub mod markup;
pub mod pdf;

pub use charts::render_charts;
pub use pdf::render_report;
