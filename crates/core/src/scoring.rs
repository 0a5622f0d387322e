//! Judge score vectors and aggregate score computation.
//!
//! Each judge submits one [`ScoreVector`] across five fixed criteria, each
//! an integer from 0 to 10. The submission's aggregate is the mean of the
//! five per-criterion means — an average of averages, not a weighted
//! composite.

use crate::error::CoreError;

/// Number of fixed judging criteria.
pub const CRITERIA_COUNT: usize = 5;

/// Maximum score a judge may assign to a single criterion.
pub const MAX_CRITERION_SCORE: i16 = 10;

/// One judge's scores across the five fixed criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreVector {
    pub innovation: i16,
    pub technical_execution: i16,
    pub design: i16,
    pub impact: i16,
    pub presentation: i16,
}

impl ScoreVector {
    /// Check that every criterion is within the 0..=10 range.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (name, value) in self.named() {
            if !(0..=MAX_CRITERION_SCORE).contains(&value) {
                return Err(CoreError::Validation(format!(
                    "Score for '{name}' must be between 0 and {MAX_CRITERION_SCORE}, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Criterion values in their fixed order.
    pub fn as_array(&self) -> [i16; CRITERIA_COUNT] {
        [
            self.innovation,
            self.technical_execution,
            self.design,
            self.impact,
            self.presentation,
        ]
    }

    fn named(&self) -> [(&'static str, i16); CRITERIA_COUNT] {
        [
            ("innovation", self.innovation),
            ("technical_execution", self.technical_execution),
            ("design", self.design),
            ("impact", self.impact),
            ("presentation", self.presentation),
        ]
    }
}

/// Aggregate score over all judges' vectors.
///
/// For each criterion, average across all judges; the result is the mean of
/// those five per-criterion means. Returns `None` when no evaluations exist.
pub fn aggregate_score(vectors: &[ScoreVector]) -> Option<f64> {
    if vectors.is_empty() {
        return None;
    }

    let judge_count = vectors.len() as f64;
    let criterion_means = (0..CRITERIA_COUNT).map(|i| {
        let sum: i64 = vectors.iter().map(|v| v.as_array()[i] as i64).sum();
        sum as f64 / judge_count
    });

    Some(criterion_means.sum::<f64>() / CRITERIA_COUNT as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn vector(scores: [i16; 5]) -> ScoreVector {
        ScoreVector {
            innovation: scores[0],
            technical_execution: scores[1],
            design: scores[2],
            impact: scores[3],
            presentation: scores[4],
        }
    }

    #[test]
    fn aggregate_is_mean_of_per_criterion_means() {
        // J1(8,7,9,6,8), J2(6,9,7,8,7): per-criterion means are
        // (7, 8, 8, 7, 7.5), so the aggregate is 7.5.
        let vectors = [vector([8, 7, 9, 6, 8]), vector([6, 9, 7, 8, 7])];
        assert_eq!(aggregate_score(&vectors), Some(7.5));
    }

    #[test]
    fn single_judge_aggregate_is_their_own_mean() {
        let vectors = [vector([10, 8, 6, 4, 2])];
        assert_eq!(aggregate_score(&vectors), Some(6.0));
    }

    #[test]
    fn no_evaluations_yields_no_aggregate() {
        assert_eq!(aggregate_score(&[]), None);
    }

    #[test]
    fn aggregate_handles_uneven_criterion_spread() {
        // All judges agree per criterion: aggregate equals the plain mean.
        let vectors = [
            vector([0, 0, 0, 0, 0]),
            vector([10, 10, 10, 10, 10]),
        ];
        assert_eq!(aggregate_score(&vectors), Some(5.0));
    }

    #[test]
    fn validate_rejects_out_of_range_scores() {
        let result = vector([8, 7, 11, 6, 8]).validate();
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg.contains("design"));

        let result = vector([8, 7, 9, -1, 8]).validate();
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn validate_accepts_boundary_scores() {
        vector([0, 10, 0, 10, 5]).validate().expect("bounds are inclusive");
    }
}
