//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Clamp a value into the range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float
{
    let mut ret = value;

    if ret > max {
        ret = max
    }
    if ret < min {
        ret = min
    }

    ret
}

/// Wrap an angle into the range [-pi, pi].
pub fn wrap_to_pi<T>(value: T) -> T
where
    T: Float
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap();
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    if value >= -pi_t && value <= pi_t {
        return value;
    }

    rem_euclid(value + pi_t, tau_t) - pi_t
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()` if `lhs` is much smaller than `rhs.abs()` in
/// magnitude and `lhs < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Return the mean and population standard deviation of the values, or
/// `None` if there are no values.
pub fn mean_and_std<T>(values: &[T]) -> Option<(T, T)>
where
    T: Float + std::ops::AddAssign
{
    if values.is_empty() {
        return None;
    }

    let n = T::from(values.len())?;

    let mut sum = T::zero();
    for v in values {
        sum += *v;
    }
    let mean = sum / n;

    let mut sq_sum = T::zero();
    for v in values {
        sq_sum += (*v - mean).powi(2);
    }

    Some((mean, (sq_sum / n).sqrt()))
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    const PI: f64 = std::f64::consts::PI;
    const TAU: f64 = std::f64::consts::TAU;

    #[test]
    fn test_wrap_to_pi() {
        assert_eq!(wrap_to_pi(1f64), 1f64);
        assert_eq!(wrap_to_pi(-PI), -PI);
        assert_eq!(wrap_to_pi(PI), PI);
        assert_abs_diff_eq!(wrap_to_pi(TAU + 1.0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_to_pi(-TAU - 1.0), -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(wrap_to_pi(3.0 * PI / 2.0), -PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(1.5f64, -1.0, 1.0), 1.0);
        assert_eq!(clamp(-1.5f64, -1.0, 1.0), -1.0);
        assert_eq!(clamp(0.25f64, -1.0, 1.0), 0.25);
    }

    #[test]
    fn test_mean_and_std() {
        assert_eq!(mean_and_std::<f64>(&[]), None);

        let (mean, std) = mean_and_std(&[2.0f64, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_abs_diff_eq!(mean, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(std, 2.0, epsilon = 1e-12);

        let (mean, std) = mean_and_std(&[3.0f64]).unwrap();
        assert_eq!(mean, 3.0);
        assert_eq!(std, 0.0);
    }
}
