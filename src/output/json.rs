use serde::Serialize;

use super::{Formatter, iso8601_timestamp};
use crate::delay::{CurvePoint, DelayEstimate};
use crate::processing::DelayMeasurement;

pub struct JsonFormatter {
    verbose: bool,
}

impl JsonFormatter {
    /// With `verbose` set, each record also carries the full error curve
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    ts: String,
    delay_us: f64,
    #[serde(flatten)]
    estimate: &'a DelayEstimate,
    #[serde(skip_serializing_if = "Option::is_none")]
    angle_degrees: Option<f64>,
    shifts_scored: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    curve: Option<&'a [CurvePoint]>,
}

impl Formatter for JsonFormatter {
    fn format(&self, measurement: &DelayMeasurement) -> String {
        let record = JsonRecord {
            ts: iso8601_timestamp(),
            delay_us: measurement.estimate.delay_us(),
            estimate: &measurement.estimate,
            angle_degrees: measurement.angle_degrees,
            shifts_scored: measurement.search.curve.len(),
            curve: self.verbose.then_some(measurement.search.curve.as_slice()),
        };
        serde_json::to_string(&record).unwrap_or_else(|e| format!(r#"{{"error":"{}"}}"#, e))
    }
}
