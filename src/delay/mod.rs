mod geometry;
mod report;
mod search;

pub use geometry::DelayGeometry;
pub use report::{
    Accuracy, AccuracyBand, AccuracyPolicy, DelayEstimate, report, report_search,
    report_with_policy,
};
pub use search::{CurvePoint, SearchResult, estimate_shift, estimate_shift_with};
