//! Spherical parameterisation of unit directions

use util::maths::{clamp, wrap_to_pi};

use crate::algebra::Vector;

/// Unit vector for polar angle `theta` (from +Z) and azimuth `phi` (from +X
/// towards +Y).
pub fn spherical_to_cartesian(theta_rad: f64, phi_rad: f64) -> Vector {
    Vector::new(
        phi_rad.cos() * theta_rad.sin(),
        phi_rad.sin() * theta_rad.sin(),
        theta_rad.cos(),
    )
}

/// Polar angle in `[0, pi]` and azimuth in `[-pi, pi]` of a vector.
///
/// A zero vector has no direction and maps to `(0, 0)`.
pub fn cartesian_to_spherical(v: &Vector) -> (f64, f64) {
    let r = v.norm();
    if r == 0.0 {
        return (0.0, 0.0);
    }

    let theta_rad = clamp(v.z / r, -1.0, 1.0).acos();
    let phi_rad = wrap_to_pi(v.y.atan2(v.x));

    (theta_rad, phi_rad)
}
