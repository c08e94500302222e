//! This module provides event generation facilities
//!
//! The analysis consumes events through the `EventSource` trait. A full
//! generator (e.g. an interface to Pythia, or an event file reader) plugs in
//! there; `ToyGenerator` is a small self-contained stand-in which produces
//! dijet-like events with the same overall shape: beam particles, a hard
//! back-to-back parton pair, collimated sprays of final-state particles
//! around the partons, and a soft underlying event.

use crate::{
    error::SourceError,
    momentum::{momentum, on_shell},
    numeric::Float,
    particle::{Event, RawParticle, FINAL_STATE},
    random::RandomGenerator,
};

use nalgebra::Vector3;
use particle_id::ParticleID;
use prefix_num_ops::real::*;

/// Something which produces the particles of simulated collision events
///
/// Sources must be deterministic: the same source (or a clone of it) asked
/// for the same event number must produce the same event. This is what makes
/// runs reproducible, including when events are processed in parallel.
///
pub trait EventSource: Clone + Send {
    /// Produce the particle list of event number `event_num`
    fn generate(&mut self, event_num: usize) -> Result<Event, SourceError>;
}

/// Status code of incoming beam particles
const STATUS_BEAM: i32 = -12;

/// Status code of the outgoing partons of the hard process
const STATUS_HARD_OUTGOING: i32 = -23;

/// Default proton-proton center-of-mass energy (GeV)
pub const DEFAULT_E_CM: Float = 13000.;

/// Acceptance of the hard partons in rapidity
const MAX_PARTON_RAPIDITY: Float = 2.5;

/// Acceptance of underlying event particles in pseudorapidity
const MAX_UE_ETA: Float = 5.;

/// Spectral index of the falling pt_hat distribution
const PT_HAT_POWER: Float = 4.;

/// Mean transverse kick of fragments with respect to their parton (GeV)
const MEAN_FRAGMENT_KT: Float = 0.35;

/// Mean transverse momentum of underlying event particles (GeV)
const MEAN_UE_PT: Float = 0.45;

/// Fragmentation stops once less momentum than this is left (GeV)
const MIN_FRAGMENT_P: Float = 0.4;

/// Upper bound on the number of fragments of one parton
const MAX_FRAGMENTS: usize = 80;

/// Final-state species produced by the toy fragmentation:
/// (PDG code, mass in GeV, relative abundance, has a distinct antiparticle)
const SPECIES: [(i32, Float, Float, bool); 11] = [
    (211, 0.139_570, 0.40, true),
    (22, 0., 0.30, false),
    (321, 0.493_677, 0.08, true),
    (130, 0.497_611, 0.04, false),
    (2212, 0.938_272, 0.05, true),
    (2112, 0.939_565, 0.05, true),
    (11, 0.000_511, 0.02, true),
    (13, 0.105_658, 0.01, true),
    (12, 0., 0.02, true),
    (14, 0., 0.02, true),
    (16, 0., 0.01, true),
];

/// Generator of toy dijet events
#[derive(Clone, Debug, PartialEq)]
pub struct ToyGenerator {
    /// Seed of the run
    seed: u64,

    /// Lower bound of the hard-process transverse momentum (GeV)
    pt_hat_min: Float,

    /// Center-of-mass energy of the collision (GeV)
    e_cm: Float,

    /// Number of events available, if the supply is finite
    max_events: Option<usize>,
}
//
impl ToyGenerator {
    // ### CONSTRUCTION ###

    /// Initialize event generation for a given seed and hard-process cutoff
    pub fn new(seed: u64, pt_hat_min: Float) -> Self {
        Self {
            seed,
            pt_hat_min,
            e_cm: DEFAULT_E_CM,
            max_events: None,
        }
    }

    /// Limit the number of events that the generator can produce
    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = Some(max_events);
        self
    }

    // ### EVENT GENERATION ###

    /// Generate the particles of one event
    fn generate_event(&self, rng: &mut RandomGenerator) -> Event {
        let mut particles = Vec::with_capacity(256);

        // Incoming protons along the beam axis
        let proton = ParticleID::new(2212);
        let e_beam = self.e_cm / 2.;
        let p_beam = sqrt(e_beam * e_beam - 0.938_272 * 0.938_272);
        for sign in [1., -1.] {
            particles.push(RawParticle::new(
                proton,
                STATUS_BEAM,
                momentum(0., 0., sign * p_beam, e_beam),
            ));
        }

        // Hard scattering scale, from a falling power law above the cutoff
        let pt_max = e_beam;
        let pt_hat = (self.pt_hat_min.max(MIN_FRAGMENT_P)
            * rng.random_open().powf(-1. / (PT_HAT_POWER - 1.)))
        .min(pt_max);

        // Two back-to-back partons in the transverse plane
        let phi = rng.azimuth();
        for (parton_phi, rap) in [
            (phi, rng.uniform(-MAX_PARTON_RAPIDITY, MAX_PARTON_RAPIDITY)),
            (phi + std::f64::consts::PI, rng.uniform(-MAX_PARTON_RAPIDITY, MAX_PARTON_RAPIDITY)),
        ] {
            let axis = Vector3::new(
                pt_hat * cos(parton_phi),
                pt_hat * sin(parton_phi),
                pt_hat * rap.sinh(),
            );
            let parton_id = if rng.random() < 0.6 {
                ParticleID::new(21)
            } else {
                let flavour = rng.integer(1, 4) as i32;
                ParticleID::new(if rng.coin() { flavour } else { -flavour })
            };
            particles.push(RawParticle::new(parton_id, STATUS_HARD_OUTGOING, on_shell(axis, 0.)));
            Self::fragment(axis, rng, &mut particles);
        }

        // Soft underlying event
        let num_soft = rng.integer(20, 60);
        for _ in 0..num_soft {
            let pt = rng.exponential(MEAN_UE_PT);
            let eta = rng.uniform(-MAX_UE_ETA, MAX_UE_ETA);
            let phi = rng.azimuth();
            let p = Vector3::new(pt * cos(phi), pt * sin(phi), pt * eta.sinh());
            let (id, mass) = Self::draw_species(rng);
            particles.push(RawParticle::new(id, FINAL_STATE, on_shell(p, mass)));
        }

        Event {
            particles,
            pt_hat: Some(pt_hat),
        }
    }

    /// Split a parton into a spray of final-state particles around its axis
    ///
    /// Each step carries away a random fraction of the remaining momentum,
    /// with a small kick transverse to the parton direction. Whatever is
    /// left at the end goes into a last collinear particle.
    ///
    fn fragment(axis: Vector3<Float>, rng: &mut RandomGenerator, out: &mut Vec<RawParticle>) {
        let mut p_left = axis.norm();
        if p_left <= 0. {
            return;
        }
        let n = axis / p_left;

        // Orthonormal basis of the plane transverse to the parton
        let helper = if abs(n[2]) < 0.9 {
            Vector3::z()
        } else {
            Vector3::x()
        };
        let e1 = n.cross(&helper).normalize();
        let e2 = n.cross(&e1);

        for _ in 0..MAX_FRAGMENTS {
            let z = 0.05 + 0.45 * rng.random();
            let p_long = z * p_left;
            if p_left - p_long < MIN_FRAGMENT_P {
                break;
            }
            p_left -= p_long;
            let kt = rng.exponential(MEAN_FRAGMENT_KT).min(p_long);
            let alpha = rng.azimuth();
            let p = p_long * n + kt * (cos(alpha) * e1 + sin(alpha) * e2);
            let (id, mass) = Self::draw_species(rng);
            out.push(RawParticle::new(id, FINAL_STATE, on_shell(p, mass)));
        }

        let (id, mass) = Self::draw_species(rng);
        out.push(RawParticle::new(id, FINAL_STATE, on_shell(p_left * n, mass)));
    }

    /// Pick a final-state species according to the toy abundances
    fn draw_species(rng: &mut RandomGenerator) -> (ParticleID, Float) {
        let total: Float = SPECIES.iter().map(|s| s.2).sum();
        let mut target = rng.random() * total;
        let charge_conjugate = rng.coin();
        let mut chosen = SPECIES[0];
        for species in SPECIES {
            chosen = species;
            if target < species.2 {
                break;
            }
            target -= species.2;
        }
        let (pdg, mass, _, has_anti) = chosen;
        let pdg = if has_anti && charge_conjugate { -pdg } else { pdg };
        (ParticleID::new(pdg), mass)
    }
}

impl EventSource for ToyGenerator {
    fn generate(&mut self, event_num: usize) -> Result<Event, SourceError> {
        if let Some(max_events) = self.max_events {
            if event_num >= max_events {
                return Err(SourceError::Exhausted {
                    produced: max_events,
                });
            }
        }
        let mut rng = RandomGenerator::for_event(self.seed, event_num);
        Ok(self.generate_event(&mut rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::momentum::pt;

    #[test]
    fn events_are_reproducible() {
        let mut a = ToyGenerator::new(42, 17.);
        let mut b = a.clone();
        assert_eq!(a.generate(3).unwrap(), b.generate(3).unwrap());
        // Order of requests does not matter
        let e5 = a.generate(5).unwrap();
        let _ = b.generate(4).unwrap();
        assert_eq!(b.generate(5).unwrap(), e5);
    }

    #[test]
    fn seeds_change_events() {
        let mut a = ToyGenerator::new(1, 17.);
        let mut b = ToyGenerator::new(2, 17.);
        assert_ne!(a.generate(0).unwrap(), b.generate(0).unwrap());
    }

    #[test]
    fn hard_scale_respects_the_cutoff() {
        let mut generator = ToyGenerator::new(7, 17.);
        for event_num in 0..50 {
            let event = generator.generate(event_num).unwrap();
            let pt_hat = event.pt_hat.unwrap();
            assert!(pt_hat >= 17. && pt_hat <= DEFAULT_E_CM / 2.);
            let partons: Vec<_> = event
                .particles
                .iter()
                .filter(|p| p.status == STATUS_HARD_OUTGOING)
                .collect();
            assert_eq!(partons.len(), 2);
            for parton in partons {
                assert!((pt(&parton.p) - pt_hat).abs() < 1e-9 * pt_hat);
            }
        }
    }

    #[test]
    fn events_contain_final_and_intermediate_particles() {
        let event = ToyGenerator::new(11, 20.).generate(0).unwrap();
        assert!(event.particles.iter().any(|p| p.status == STATUS_BEAM));
        let finals = event.particles.iter().filter(|p| p.is_final_state()).count();
        assert!(finals > 20);
        for particle in &event.particles {
            assert!(particle.p[3].is_finite());
            assert!(particle.pt >= 0.);
        }
    }

    #[test]
    fn finite_supply_is_exhausted() {
        let mut generator = ToyGenerator::new(3, 17.).with_max_events(2);
        assert!(generator.generate(1).is_ok());
        assert_eq!(
            generator.generate(2),
            Err(SourceError::Exhausted { produced: 2 })
        );
    }
}
