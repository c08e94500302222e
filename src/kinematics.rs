//! Jet-relative kinematics of jet constituents
//!
//! For a jet 3-momentum J and a constituent 3-momentum C, we compute
//!
//! * the longitudinal momentum fraction z = (J·C) / |J|²,
//! * the momentum transverse to the jet axis jT = |J × C| / |J|,
//! * the (η, φ) distance to the jet axis R = √(Δφ² + Δη²), with Δφ wrapped
//!   into (-π, π].

use crate::{
    error::DegenerateJet,
    jet::Jet,
    momentum::xyz,
    numeric::{functions::delta_phi, Float},
    particle::EligibleParticle,
    record::{ConstituentRecord, JetRecord},
};

use nalgebra::Vector3;
use prefix_num_ops::real::*;

/// Smallest jet momentum magnitude (GeV) for which z and jT are computed
pub const DEFAULT_TOLERANCE: Float = 1e-9;

/// Longitudinal momentum fraction of c along j
pub fn longitudinal_fraction(j: &Vector3<Float>, c: &Vector3<Float>) -> Float {
    j.dot(c) / j.norm_squared()
}

/// Magnitude of the component of c perpendicular to j
pub fn relative_transverse_momentum(j: &Vector3<Float>, c: &Vector3<Float>) -> Float {
    j.cross(c).norm() / j.norm()
}

/// Distance in the (η, φ) plane
pub fn angular_distance(eta1: Float, phi1: Float, eta2: Float, phi2: Float) -> Float {
    let d_phi = delta_phi(phi1, phi2);
    let d_eta = eta1 - eta2;
    sqrt(d_phi * d_phi + d_eta * d_eta)
}

/// Records derived from one selected jet
#[derive(Debug, Clone, PartialEq)]
pub struct JetObservables {
    /// Jet table row
    pub jet: JetRecord,
    /// Constituent table rows, in constituent order
    pub constituents: Vec<ConstituentRecord>,
}

/// Computes jet and constituent observables of selected jets
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct KinematicDeriver {
    /// Jets with a smaller 3-momentum magnitude are reported as degenerate
    pub tolerance: Float,
}
//
impl Default for KinematicDeriver {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}
//
impl KinematicDeriver {
    /// Derive the jet record and one constituent record per constituent
    pub fn derive(&self, event_num: usize, jet: &Jet) -> Result<JetObservables, DegenerateJet> {
        // z and jT divide by the jet momentum, which must not vanish
        let j = xyz(&jet.p);
        let magnitude = j.norm();
        if !(magnitude >= self.tolerance) {
            return Err(DegenerateJet {
                magnitude,
                tolerance: self.tolerance,
            });
        }

        let (jet_eta, jet_phi) = (jet.eta(), jet.phi());
        let constituents = jet
            .constituents
            .iter()
            .map(|c| Self::constituent(event_num, &j, jet_eta, jet_phi, c))
            .collect();

        let record = JetRecord {
            n_constituents: jet.constituents.len(),
            pt: jet.pt(),
            px: j[0],
            py: j[1],
            pz: j[2],
            e: jet.p[3],
            event_num,
        };
        Ok(JetObservables {
            jet: record,
            constituents,
        })
    }

    /// Observables of one constituent with respect to the jet axis
    fn constituent(
        event_num: usize,
        j: &Vector3<Float>,
        jet_eta: Float,
        jet_phi: Float,
        c: &EligibleParticle,
    ) -> ConstituentRecord {
        let c_xyz = xyz(&c.p);
        ConstituentRecord {
            pt: c.pt(),
            jt: relative_transverse_momentum(j, &c_xyz),
            r: angular_distance(jet_eta, jet_phi, c.eta(), c.phi()),
            z: longitudinal_fraction(j, &c_xyz),
            pid: c.id.id(),
            event_num,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        momentum::{momentum, on_shell},
        numeric::reals::consts::PI,
    };
    use particle_id::ParticleID;

    const TOLERANCE: Float = 1e-12;

    fn constituent(index: usize, pdg: i32, p: Vector3<Float>) -> EligibleParticle {
        EligibleParticle {
            index,
            p: on_shell(p, 0.13957),
            id: ParticleID::new(pdg),
        }
    }

    #[test]
    fn single_constituent_jet() {
        let c = constituent(0, 211, Vector3::new(3., -4., 12.));
        let jet = Jet::from_constituents(vec![c]);
        let obs = KinematicDeriver::default().derive(7, &jet).unwrap();
        assert_eq!(obs.constituents.len(), 1);
        let rec = obs.constituents[0];
        assert!((rec.z - 1.).abs() < TOLERANCE);
        assert!(rec.jt.abs() < TOLERANCE);
        assert!(rec.r.abs() < TOLERANCE);
        assert!((rec.pt - 5.).abs() < TOLERANCE);
        assert_eq!(rec.pid, 211);
        assert_eq!(rec.event_num, 7);
    }

    #[test]
    fn perpendicular_constituent() {
        let j = Vector3::new(0., 0., 10.);
        let c = Vector3::new(2., 0., 0.);
        assert_eq!(longitudinal_fraction(&j, &c), 0.);
        assert!((relative_transverse_momentum(&j, &c) - 2.).abs() < TOLERANCE);
    }

    #[test]
    fn fractions_of_a_two_body_jet_add_up() {
        let a = constituent(0, 211, Vector3::new(10., 1., 2.));
        let b = constituent(1, -321, Vector3::new(5., -1., 0.5));
        let jet = Jet::from_constituents(vec![a, b]);
        let obs = KinematicDeriver::default().derive(0, &jet).unwrap();
        let z_sum: Float = obs.constituents.iter().map(|c| c.z).sum();
        assert!((z_sum - 1.).abs() < TOLERANCE);
        // The jT of both constituents balance each other
        assert!((obs.constituents[0].jt - obs.constituents[1].jt).abs() < 1e-9);
        assert_eq!(obs.jet.n_constituents, 2);
        assert_eq!(obs.jet.px, 15.);
        assert_eq!(obs.constituents[1].pid, -321);
    }

    #[test]
    fn distance_is_non_negative_and_matches_naive_away_from_the_seam() {
        for &(phi1, phi2) in &[(0.1, 0.4), (2.0, 0.5), (3.0, 0.2), (6.0, 3.5)] {
            let r = angular_distance(1.0, phi1, 0.3, phi2);
            let naive = ((phi1 - phi2) * (phi1 - phi2) + 0.49 as Float).sqrt();
            assert!(r >= 0.);
            assert!((phi1 - phi2 as Float).abs() < PI);
            assert!((r - naive).abs() < TOLERANCE);
        }
    }

    #[test]
    fn distance_wraps_around_the_seam() {
        let r = angular_distance(0., 0.1, 0., 2. * PI - 0.1);
        assert!((r - 0.2).abs() < 1e-12, "got {r}");
    }

    #[test]
    fn degenerate_jets_are_reported() {
        let a = EligibleParticle {
            index: 0,
            p: momentum(1., 0., 0., 1.),
            id: ParticleID::new(22),
        };
        let b = EligibleParticle {
            index: 1,
            p: momentum(-1., 0., 0., 1.),
            id: ParticleID::new(22),
        };
        let jet = Jet::from_constituents(vec![a, b]);
        let err = KinematicDeriver::default().derive(0, &jet).unwrap_err();
        assert_eq!(err.magnitude, 0.);
        assert_eq!(err.tolerance, DEFAULT_TOLERANCE);
    }
}
