//! This module implements some domain-specific 4-momentum handling logic.

use crate::numeric::{reals::consts::PI, Float};
use nalgebra::{SVector, Vector3};
use prefix_num_ops::real::*;

/// 4-momentum dimension
pub const MOMENTUM_DIM: usize = 4;

/// Relativistic 4-momentum
pub type Momentum = SVector<Float, MOMENTUM_DIM>;

/// Convenience const for accessing the X coordinate of a 4-vector
pub const X: usize = 0;

/// Convenience const for accessing the Y coordinate of a 4-vector
pub const Y: usize = 1;

/// Convenience const for accessing the Z coordinate of a 4-vector
pub const Z: usize = 2;

/// Convenience const for accessing the E coordinate of a 4-vector
pub const E: usize = 3;

/// Rapidity assigned to momenta that lie exactly along the beam
pub const MAX_RAPIDITY: Float = 1e5;

/// Build a 4-momentum from its components
pub fn momentum(px: Float, py: Float, pz: Float, e: Float) -> Momentum {
    Momentum::new(px, py, pz, e)
}

/// Build the 4-momentum of a particle of a given mass from its 3-momentum
pub fn on_shell(p: Vector3<Float>, mass: Float) -> Momentum {
    let e = sqrt(p.norm_squared() + mass * mass);
    momentum(p[0], p[1], p[2], e)
}

/// Spatial part of a 4-momentum
pub fn xyz(p: &Momentum) -> Vector3<Float> {
    Vector3::new(p[X], p[Y], p[Z])
}

/// Squared transverse momentum
pub fn pt2(p: &Momentum) -> Float {
    p[X] * p[X] + p[Y] * p[Y]
}

/// Transverse momentum
pub fn pt(p: &Momentum) -> Float {
    sqrt(pt2(p))
}

/// Azimuthal angle, in [0, 2π)
pub fn phi(p: &Momentum) -> Float {
    if p[X] == 0. && p[Y] == 0. {
        return 0.;
    }
    let phi = p[Y].atan2(p[X]);
    if phi < 0. {
        phi + 2. * PI
    } else {
        phi
    }
}

/// Pseudorapidity, saturating at ±MAX_RAPIDITY along the beam axis
pub fn eta(p: &Momentum) -> Float {
    let pt = pt(p);
    if pt == 0. {
        return MAX_RAPIDITY.copysign(p[Z]);
    }
    (p[Z] / pt).asinh()
}

/// Rapidity, saturating at ±MAX_RAPIDITY for light-like momenta along the beam
pub fn rapidity(p: &Momentum) -> Float {
    let e_plus = p[E] + p[Z];
    let e_minus = p[E] - p[Z];
    if e_minus <= 0. || e_plus <= 0. {
        return MAX_RAPIDITY.copysign(p[Z]);
    }
    (0.5 * ln(e_plus / e_minus)).clamp(-MAX_RAPIDITY, MAX_RAPIDITY)
}
