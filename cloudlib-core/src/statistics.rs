//! Simple statistics over sequences of reals

/// Arithmetic mean, 0 for an empty slice
///
/// Accumulates in `f64` so long sequences do not lose precision.
pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: f64 = values.iter().map(|&v| v as f64).sum();
    (sum / values.len() as f64) as f32
}

/// Median of `values`, 0 for an empty slice
///
/// Works on a sorted copy; the caller's ordering is never touched. An even
/// count yields the average of the two central elements.
pub fn median(values: &[f32]) -> f32 {
    let mut sorted = values.to_vec();
    median_in_place(&mut sorted)
}

/// Median that reorders `values` instead of copying them
///
/// Useful for scratch buffers that are rebuilt on every call anyway.
pub fn median_in_place(values: &mut [f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_unstable_by(f32::total_cmp);

    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[5.0]), 5.0);
        assert_eq!(mean(&[1.0, 3.0]), 2.0);
        assert_relative_eq!(mean(&[0.1, 0.2, 0.3]), 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), 0.0);
        assert_eq!(median(&[5.0]), 5.0);
        assert_eq!(median(&[1.0, 3.0]), 2.0);
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_eq!(median(&[9.0, -1.0, 4.0]), 4.0);
    }

    #[test]
    fn test_median_does_not_reorder_input() {
        let values = vec![3.0, 1.0, 2.0];
        assert_eq!(median(&values), 2.0);
        assert_eq!(values, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_median_in_place_sorts() {
        let mut values = vec![3.0, 1.0, 2.0, 10.0];
        assert_eq!(median_in_place(&mut values), 2.5);
        assert_eq!(values, vec![1.0, 2.0, 3.0, 10.0]);
    }

    proptest! {
        #[test]
        fn median_is_bounded_and_pure(
            values in prop::collection::vec(-1000.0f32..1000.0f32, 1..200),
        ) {
            let before = values.clone();
            let m = median(&values);
            let min = values.iter().cloned().fold(f32::INFINITY, f32::min);
            let max = values.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
            prop_assert!(m >= min && m <= max, "median {} outside [{}, {}]", m, min, max);
            prop_assert_eq!(values, before);
        }
    }
}
