//! Inequality statistics over agent holdings
//!
//! The epoch summary and the situational context both report a Gini
//! coefficient over current energy holdings, so researchers can track
//! inequality pressure over the course of a run.

/// Gini coefficient (0 = perfect equality, approaching 1 = perfect inequality)
///
/// Uses the closed form over sorted values:
///
/// ```text
/// G = sum_i (2i - n - 1) * v_i / (n * total)        (i is 1-based, v sorted)
/// ```
///
/// An empty slice or an all-zero slice yields 0.0. A single nonzero holder
/// among `n` agents yields exactly `(n - 1) / n`.
///
/// # Example
/// ```
/// use agora_simulator_core_rs::gini;
///
/// assert_eq!(gini(&[100, 100, 100, 100]), 0.0);
/// assert_eq!(gini(&[0, 0, 0, 200]), 0.75);
/// ```
pub fn gini(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len();
    let total: i64 = values.iter().sum();
    if total == 0 {
        return 0.0;
    }

    let mut sorted: Vec<i64> = values.to_vec();
    sorted.sort_unstable();

    let gini_sum: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, &v)| (2.0 * (i as f64 + 1.0) - n as f64 - 1.0) * v as f64)
        .sum();

    gini_sum / (n as f64 * total as f64)
}
