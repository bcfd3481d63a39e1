//! Descriptive statistics shared by the spread engine and the evaluator.
//!
//! Dispersion uses the sample convention (n - 1 divisor) throughout, so the
//! rolling z-score and the Sharpe ratio agree on what "one standard
//! deviation" means.

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation. `None` with fewer than two values.
///
/// A slice whose values are all identical reports exactly `0.0`, rather than
/// the rounding residue the two-pass formula can leave behind.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    if values.iter().all(|&v| v == values[0]) {
        return Some(0.0);
    }
    let m = mean(values)?;
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - m;
            diff * diff
        })
        .sum::<f64>()
        / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_basic() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 4.0]).unwrap(), 2.5);
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn sample_std_known_values() {
        // Population std of this set is 2.0; sample std is sqrt(32/7).
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(sample_std(&values).unwrap(), (32.0_f64 / 7.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn sample_std_needs_two_values() {
        assert_eq!(sample_std(&[1.0]), None);
        assert_eq!(sample_std(&[]), None);
    }

    #[test]
    fn sample_std_constant_is_exactly_zero() {
        assert_eq!(sample_std(&[0.1, 0.1, 0.1]), Some(0.0));
    }
}
