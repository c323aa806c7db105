use super::Formatter;
use crate::processing::DelayMeasurement;

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, measurement: &DelayMeasurement) -> String {
        let estimate = &measurement.estimate;
        let mut line = format!(
            "Delay: {:>8.3} us (shift {:>4}) error: {:.3e}",
            estimate.delay_us(),
            estimate.best_shift,
            estimate.min_error
        );

        if let Some(angle) = measurement.angle_degrees {
            line.push_str(&format!(" angle: {:>6.2}°", angle));
        }

        if let Some(accuracy) = estimate.accuracy {
            let pct = accuracy
                .percent_error
                .map_or("-".to_string(), |p| format!("{:.2}%", p));
            line.push_str(&format!(
                " [truth: {:.3} us, error: {:.3} us ({}), accuracy: {:.1}%]",
                accuracy.truth_us(),
                accuracy.abs_error_us(),
                pct,
                accuracy.accuracy_percent
            ));
        }

        if self.verbose {
            let confidence = estimate
                .confidence
                .map_or("-".to_string(), |c| format!("{:.3}", c));
            let secondary = measurement
                .search
                .secondary_minimum()
                .map_or("-".to_string(), |p| format!("{} ({:.3e})", p.shift, p.error));
            line.push_str(&format!(
                " {{conf: {}, shifts: {}, runner-up: {}, boundary: {}}}",
                confidence,
                measurement.search.curve.len(),
                secondary,
                measurement.search.on_boundary()
            ));
        }

        line
    }
}
