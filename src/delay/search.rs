use crate::config::ErrorMetric;
use crate::constants::ERROR_EPSILON;
use crate::error::{DelayError, Result};
use crate::signal_processing::math::{absolute_difference, mean_squared_error};
use serde::Serialize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Score of one candidate shift
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub shift: usize,
    pub error: f64,
}

/// Outcome of a shift search
///
/// `curve` holds every scored shift in ascending order; `best_shift` is the
/// first shift reaching the minimum error.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub best_shift: usize,
    pub min_error: f64,
    pub curve: Vec<CurvePoint>,
}

/// Find the shift of `candidate` that best matches `reference` by mean squared error
///
/// See [`estimate_shift_with`].
pub fn estimate_shift(
    reference: &[f64],
    candidate: &[f64],
    max_shift: usize,
) -> Result<SearchResult> {
    estimate_shift_with(reference, candidate, max_shift, ErrorMetric::Mse)
}

/// Find the shift of `candidate` that best matches `reference`
///
/// For every shift `s` in `0..=max_shift` whose window
/// `candidate[s..s + reference.len()]` fits inside `candidate`, the window is
/// scored against `reference` with `metric`. Shifts whose window would run past
/// the end are not scored. Ties go to the smallest shift.
///
/// # Errors
/// Returns `DelayError::SearchRangeExhausted` if `reference` is empty or
/// `candidate` is shorter than `reference`, and `DelayError::InvalidInput` if
/// every score is NaN.
pub fn estimate_shift_with(
    reference: &[f64],
    candidate: &[f64],
    max_shift: usize,
    metric: ErrorMetric,
) -> Result<SearchResult> {
    let exhausted = || DelayError::SearchRangeExhausted {
        reference_len: reference.len(),
        candidate_len: candidate.len(),
        max_shift,
    };

    if reference.is_empty() || candidate.len() < reference.len() {
        return Err(exhausted());
    }

    let last_shift = max_shift.min(candidate.len() - reference.len());

    let score = |shift: usize| {
        let window = &candidate[shift..shift + reference.len()];
        let error = match metric {
            ErrorMetric::Mse => mean_squared_error(reference, window),
            ErrorMetric::Absolute => absolute_difference(reference, window),
        };
        CurvePoint { shift, error }
    };

    #[cfg(not(feature = "parallel"))]
    let curve: Vec<CurvePoint> = (0..=last_shift).map(score).collect();

    #[cfg(feature = "parallel")]
    let curve: Vec<CurvePoint> = (0..=last_shift).into_par_iter().map(score).collect();

    // Sequential scan keeps the earliest shift on ties
    let mut best: Option<CurvePoint> = None;
    for point in &curve {
        let better = match best {
            None => !point.error.is_nan(),
            Some(b) => point.error < b.error,
        };
        if better {
            best = Some(*point);
        }
    }

    let best = best.ok_or_else(|| {
        DelayError::InvalidInput("every shift scored NaN; signals contain non-finite samples".into())
    })?;

    log::debug!(
        "Scored {} shifts (0..={}), best shift {} with error {:.3e}",
        curve.len(),
        last_shift,
        best.shift,
        best.error
    );

    let result = SearchResult {
        best_shift: best.shift,
        min_error: best.error,
        curve,
    };

    if result.on_boundary() {
        log::warn!(
            "Error minimum at search boundary (shift {}); true delay may lie outside the range",
            result.best_shift
        );
    }

    Ok(result)
}

impl SearchResult {
    /// Strongest competitor to the best shift
    ///
    /// Any other shift scoring as low as the best one is returned first, so a
    /// flat or tied curve always has a competitor. Otherwise this is the lowest
    /// local minimum away from the best shift, with a run of equal errors
    /// counted once (at its first shift).
    ///
    /// A tone burst produces a minimum once per carrier period; a competitor
    /// close to the global minimum means the match may have slipped a cycle.
    pub fn secondary_minimum(&self) -> Option<CurvePoint> {
        if let Some(tie) = self
            .curve
            .iter()
            .find(|p| p.shift != self.best_shift && p.error <= self.min_error)
        {
            return Some(*tie);
        }

        let n = self.curve.len();
        let mut best: Option<CurvePoint> = None;
        let mut start = 0;
        while start < n {
            let value = self.curve[start].error;
            let mut end = start;
            while end + 1 < n && self.curve[end + 1].error == value {
                end += 1;
            }

            let holds_best = (start..=end).any(|i| self.curve[i].shift == self.best_shift);
            let left_ok = start == 0 || self.curve[start - 1].error > value;
            let right_ok = end + 1 == n || self.curve[end + 1].error > value;
            if !holds_best && left_ok && right_ok && best.is_none_or(|b| value < b.error) {
                best = Some(self.curve[start]);
            }
            start = end + 1;
        }
        best
    }

    /// Match confidence in [0, 1] from the gap to the secondary minimum
    ///
    /// 1.0 when no competing minimum exists, 0.0 when a competitor is as good
    /// as the best match (including a flat curve).
    pub fn confidence(&self) -> f64 {
        match self.secondary_minimum() {
            None => 1.0,
            Some(p) if p.error <= ERROR_EPSILON => 0.0,
            Some(p) => (1.0 - self.min_error / p.error).clamp(0.0, 1.0),
        }
    }

    /// True if the best shift is the first or last scored shift
    pub fn on_boundary(&self) -> bool {
        match (self.curve.first(), self.curve.last()) {
            (Some(first), Some(last)) if self.curve.len() > 1 => {
                self.best_shift == first.shift || self.best_shift == last.shift
            }
            _ => false,
        }
    }

    /// Last shift that was scored
    pub fn last_shift(&self) -> Option<usize> {
        self.curve.last().map(|p| p.shift)
    }
}
