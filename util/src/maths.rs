//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

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

/// Clamp the magnitude of a value to `limit`, preserving its sign.
pub fn abs_cap<T>(value: T, limit: T) -> T
where
    T: Float
{
    clamp(value, -limit.abs(), limit.abs())
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Wrap an angle in degrees into the half-open range (-180, 180].
///
/// An angle of exactly -180 degrees is reported as +180.
pub fn wrap_180<T>(angle_deg: T) -> T
where
    T: Float
{
    let half: T = deg(180.0);
    let full: T = deg(360.0);

    let wrapped = rem_euclid(angle_deg + half, full) - half;

    if wrapped <= -half { wrapped + full } else { wrapped }
}

/// Wrap an angle in degrees into the range [0, 360).
pub fn wrap_360<T>(angle_deg: T) -> T
where
    T: Float
{
    let full: T = deg(360.0);
    let wrapped = rem_euclid(angle_deg, full);

    if wrapped >= full { wrapped - full } else { wrapped }
}

/// Convert a constant into the float type, saturating to zero if it can't be represented.
fn deg<T: Float>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::zero)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wrap_180() {
        assert_eq!(wrap_180(0f64), 0f64);
        assert_eq!(wrap_180(180f64), 180f64);
        assert_eq!(wrap_180(-180f64), 180f64);
        assert_eq!(wrap_180(190f64), -170f64);
        assert_eq!(wrap_180(-190f64), 170f64);
        assert_eq!(wrap_180(540f64), 180f64);
        assert_eq!(wrap_180(-45f64), -45f64);
    }

    #[test]
    fn test_wrap_360() {
        assert_eq!(wrap_360(-90f64), 270f64);
        assert_eq!(wrap_360(360f64), 0f64);
        assert_eq!(wrap_360(725f64), 5f64);
    }

    #[test]
    fn test_caps() {
        assert_eq!(clamp(5f64, 0f64, 3f64), 3f64);
        assert_eq!(abs_cap(-140f64, 127f64), -127f64);
        assert_eq!(abs_cap(20f64, -127f64), 20f64);
        assert_eq!(lin_map((0f64, 3f64), (70f64, 110f64), 1.5f64), 90f64);
    }
}
