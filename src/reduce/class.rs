//! Score → class label reduction

use ndarray::{ArrayView1, ArrayView2};

use crate::data::Predictions;

/// Reduces per-sample scores to discrete class labels.
///
/// Multi-class scores reduce to the per-row argmax (ties go to the lowest
/// class index). Binary scores, either one value per sample or a single
/// score column, reduce to `1` iff the score is strictly above the decision
/// threshold. With the default threshold of 0.5 this reproduces rounding
/// half to even, the rule the optimizer itself uses to decide classes.
///
/// NaN scores are treated as missing: a NaN binary score is class 0 and a
/// NaN entry never wins the argmax.
///
/// # Example
///
/// ```
/// use ajuste::ClassReducer;
/// use ndarray::array;
///
/// let reducer = ClassReducer::default();
/// let scores = array![[0.7, 0.2, 0.1], [0.1, 0.1, 0.8]];
/// assert_eq!(reducer.reduce_scores(scores.view()), vec![0, 2]);
/// assert_eq!(reducer.reduce_binary(&[0.2, 0.5, 0.51]), vec![0, 0, 1]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassReducer {
    threshold: f64,
}

impl ClassReducer {
    /// Create a reducer with the given binary decision threshold
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Binary decision threshold
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Reduce any prediction payload to class labels
    pub fn reduce(&self, predictions: &Predictions) -> Vec<usize> {
        match predictions {
            Predictions::Values(values) => self.reduce_binary(values),
            Predictions::Scores(scores) => self.reduce_scores(scores.view()),
        }
    }

    /// Threshold one score per sample
    pub fn reduce_binary(&self, scores: &[f64]) -> Vec<usize> {
        scores
            .iter()
            .map(|&s| usize::from(s > self.threshold))
            .collect()
    }

    /// Reduce a `(samples, classes)` matrix; a single column is treated as binary
    pub fn reduce_scores(&self, scores: ArrayView2<'_, f64>) -> Vec<usize> {
        if scores.ncols() == 1 {
            return scores
                .column(0)
                .iter()
                .map(|&s| usize::from(s > self.threshold))
                .collect();
        }
        scores.rows().into_iter().map(argmax).collect()
    }
}

impl Default for ClassReducer {
    fn default() -> Self {
        Self::new(0.5)
    }
}

/// Index of the maximal value, lowest index on ties.
///
/// NaN entries never win. Empty rows and rows of only NaN map to 0.
pub(crate) fn argmax(row: ArrayView1<'_, f64>) -> usize {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in row.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if v <= top => {}
            _ => best = Some((i, v)),
        }
    }
    best.map_or(0, |(i, _)| i)
}
