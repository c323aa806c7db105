use super::{Formatter, iso8601_timestamp};
use crate::processing::DelayMeasurement;

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, measurement: &DelayMeasurement) -> String {
        let estimate = &measurement.estimate;
        let confidence = estimate
            .confidence
            .map_or(String::new(), |c| format!("{:.3}", c));
        let angle = measurement
            .angle_degrees
            .map_or(String::new(), |a| format!("{:.2}", a));
        let (truth, error, accuracy) = estimate.accuracy.map_or(
            (String::new(), String::new(), String::new()),
            |a| {
                (
                    format!("{:.3}", a.truth_us()),
                    format!("{:.3}", a.abs_error_us()),
                    format!("{:.1}", a.accuracy_percent),
                )
            },
        );
        format!(
            "{},{},{:.3},{:.4e},{},{},{},{},{}",
            iso8601_timestamp(),
            estimate.best_shift,
            estimate.delay_us(),
            estimate.min_error,
            confidence,
            angle,
            truth,
            error,
            accuracy
        )
    }

    fn header(&self) -> Option<&'static str> {
        Some("ts,best_shift,delay_us,min_error,confidence,angle_deg,truth_us,error_us,accuracy_pct")
    }
}
