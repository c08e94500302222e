//! Mechanism to select the particles that enter jet clustering

use crate::{
    numeric::Float,
    particle::{EligibleParticle, Event, RawParticle},
};

use particle_id::ParticleID;

/// Default minimal transverse momentum of clustered particles (GeV/c)
pub const DEFAULT_MIN_PT: Float = 0.2;

/// Neutrino flavours, which leave no trace in the aggregate momentum
pub const NEUTRINOS: [ParticleID; 3] = [
    ParticleID::new(12),
    ParticleID::new(14),
    ParticleID::new(16),
];

/// Reason why a particle was kept out of jet clustering
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// Intermediate or decayed particle (status ≤ 0)
    NotFinalState,

    /// Soft particle below the pt threshold
    BelowPtThreshold,

    /// Electron, muon or tau (anti)neutrino
    Neutrino,
}

/// Cuts on the particles of generated events
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ParticleFilter {
    /// Cut on minimum particle transverse momentum (GeV/c)
    pub min_pt: Float,
}
//
impl Default for ParticleFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PT)
    }
}
//
impl ParticleFilter {
    /// Setup the cuts on generated particles
    pub fn new(min_pt: Float) -> Self {
        Self { min_pt }
    }

    /// Check a particle against each cut in turn, reporting the first failure
    pub fn check(&self, particle: &RawParticle) -> Result<(), Rejection> {
        // Only final-state particles are clustered
        if !particle.is_final_state() {
            return Err(Rejection::NotFinalState);
        }

        // Only cluster particles above 200 MeV
        if particle.pt < self.min_pt {
            return Err(Rejection::BelowPtThreshold);
        }

        // Neutrinos escape, whatever their momentum
        if NEUTRINOS.contains(&particle.id.abs()) {
            return Err(Rejection::Neutrino);
        }
        Ok(())
    }

    /// Decide whether a particle passes the cuts or should be rejected
    pub fn keep(&self, particle: &RawParticle) -> bool {
        self.check(particle).is_ok()
    }

    /// Extract the particles of an event that may enter jet clustering,
    /// reporting each rejection to the provided callback
    pub fn eligible(
        &self,
        event: &Event,
        mut on_reject: impl FnMut(Rejection),
    ) -> Vec<EligibleParticle> {
        let mut eligible = Vec::with_capacity(event.particles.len());
        for particle in &event.particles {
            match self.check(particle) {
                Ok(()) => eligible.push(EligibleParticle::new(eligible.len(), particle)),
                Err(rejection) => on_reject(rejection),
            }
        }
        eligible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{momentum::momentum, particle::FINAL_STATE};

    fn particle(pdg: i32, status: i32, pt: Float) -> RawParticle {
        RawParticle::new(ParticleID::new(pdg), status, momentum(pt, 0., 1., pt.hypot(1.)))
    }

    #[test]
    fn non_final_particles_are_rejected() {
        let filter = ParticleFilter::default();
        for status in [0, -1, -23, -62] {
            let p = particle(211, status, 50.);
            assert_eq!(filter.check(&p), Err(Rejection::NotFinalState));
            assert!(!filter.keep(&p));
        }
    }

    #[test]
    fn neutrinos_are_rejected_at_any_momentum() {
        let filter = ParticleFilter::default();
        for pdg in [12, -12, 14, -14, 16, -16] {
            for pt in [0.5, 20., 3000.] {
                let p = particle(pdg, FINAL_STATE, pt);
                assert_eq!(filter.check(&p), Err(Rejection::Neutrino));
            }
        }
    }

    #[test]
    fn rules_apply_in_order() {
        let filter = ParticleFilter::default();
        // A soft intermediate neutrino fails the status rule first
        assert_eq!(filter.check(&particle(12, -2, 0.01)), Err(Rejection::NotFinalState));
        // A soft final neutrino fails the pt rule before the species rule
        assert_eq!(filter.check(&particle(14, FINAL_STATE, 0.01)), Err(Rejection::BelowPtThreshold));
    }

    #[test]
    fn pt_threshold_is_inclusive() {
        let filter = ParticleFilter::new(0.25);
        assert!(filter.keep(&particle(22, FINAL_STATE, 0.25)));
        assert!(!filter.keep(&particle(22, FINAL_STATE, 0.2499)));
    }

    #[test]
    fn charged_leptons_and_hadrons_are_kept() {
        let filter = ParticleFilter::default();
        for pdg in [11, -13, 15, 22, 211, -321, 2212, 2112, 130] {
            assert!(filter.keep(&particle(pdg, FINAL_STATE, 1.)), "pdg {pdg}");
        }
    }

    #[test]
    fn eligible_particles_are_indexed_densely() {
        let event = Event {
            particles: vec![
                particle(2212, -12, 100.),
                particle(211, FINAL_STATE, 3.),
                particle(12, FINAL_STATE, 3.),
                particle(-211, FINAL_STATE, 0.1),
                particle(22, FINAL_STATE, 1.),
            ],
            pt_hat: None,
        };
        let mut rejections = Vec::new();
        let eligible = ParticleFilter::default().eligible(&event, |r| rejections.push(r));
        assert_eq!(eligible.len(), 2);
        assert_eq!(eligible[0].index, 0);
        assert_eq!(eligible[0].id, ParticleID::new(211));
        assert_eq!(eligible[1].index, 1);
        assert_eq!(eligible[1].id, ParticleID::new(22));
        assert_eq!(
            rejections,
            [Rejection::NotFinalState, Rejection::Neutrino, Rejection::BelowPtThreshold]
        );
    }
}
