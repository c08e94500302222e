//! Basic numerical concepts used throughout the program

#![allow(missing_docs)]

/// Floating-point precision is configured here. The output tables are double
/// precision, so this is not a build-time option.
pub type Float = f64;
pub use std::f64 as reals;

/// Mathematical functions
pub mod functions {
    use super::{reals::consts::PI, Float};

    /// Bring an azimuthal angle difference back into (-π, π]
    pub fn wrap_delta_phi(delta: Float) -> Float {
        // The remainder keeps the sign of the dividend, so we land in (-2π, 2π)
        let delta = delta % (2. * PI);
        if delta > PI {
            delta - 2. * PI
        } else if delta <= -PI {
            delta + 2. * PI
        } else {
            delta
        }
    }

    /// Azimuthal distance from phi2 to phi1, with proper wraparound
    pub fn delta_phi(phi1: Float, phi2: Float) -> Float {
        wrap_delta_phi(phi1 - phi2)
    }
}

#[cfg(test)]
mod tests {
    use super::{functions::*, reals::consts::PI};

    #[test]
    fn delta_phi_is_unchanged_away_from_the_boundary() {
        for &(a, b) in &[(0.3, 0.1), (-1.2, 0.4), (3.0, 0.5), (-0.1, 3.0)] {
            let naive: f64 = a - b;
            assert!(naive.abs() < PI);
            assert!((delta_phi(a, b) - naive).abs() < 1e-12);
        }
    }

    #[test]
    fn delta_phi_wraps_across_the_boundary() {
        // Two directions 0.2 rad apart on each side of the ±π seam
        let d = delta_phi(PI - 0.1, -PI + 0.1);
        assert!((d + 0.2).abs() < 1e-12, "got {d}");
        let d = delta_phi(0.05, 2. * PI - 0.05);
        assert!((d - 0.1).abs() < 1e-12, "got {d}");
    }

    #[test]
    fn wrapped_range_is_half_open() {
        assert_eq!(wrap_delta_phi(PI), PI);
        assert!((wrap_delta_phi(-PI) - PI).abs() < 1e-12);
        assert!((wrap_delta_phi(4. * PI + 1.) - 1.).abs() < 1e-9);
    }
}
