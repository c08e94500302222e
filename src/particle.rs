//! This module defines the particles of generated events and their storage

use crate::{
    momentum::{self, Momentum},
    numeric::Float,
};

use particle_id::ParticleID;

/// Status code of final-state particles (any positive code means final)
pub const FINAL_STATE: i32 = 1;

/// A particle as emitted by an event source
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct RawParticle {
    /// Species identifier (PDG Monte Carlo code)
    pub id: ParticleID,

    /// Generator status code, positive for final-state particles
    pub status: i32,

    /// 4-momentum (GeV)
    pub p: Momentum,

    /// Pseudorapidity
    pub eta: Float,

    /// Transverse momentum (GeV/c)
    pub pt: Float,

    /// Azimuthal angle, in [0, 2π)
    pub phi: Float,
}
//
impl RawParticle {
    /// Build a particle, caching its angular coordinates and pt
    pub fn new(id: ParticleID, status: i32, p: Momentum) -> Self {
        Self {
            id,
            status,
            p,
            eta: momentum::eta(&p),
            pt: momentum::pt(&p),
            phi: momentum::phi(&p),
        }
    }

    /// Truth that this particle has not decayed or branched further
    pub fn is_final_state(&self) -> bool {
        self.status > 0
    }
}

/// One generated collision event
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Event {
    /// Particles of the event record, in generator order
    pub particles: Vec<RawParticle>,

    /// Transverse momentum of the hard scattering, when the source knows it
    pub pt_hat: Option<Float>,
}

/// A particle which passed the particle filter and may enter jet clustering
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct EligibleParticle {
    /// Position in the event's list of eligible particles
    pub index: usize,

    /// 4-momentum (GeV)
    pub p: Momentum,

    /// Species identifier, carried unchanged into jet constituents
    pub id: ParticleID,
}
//
impl EligibleParticle {
    /// Tag a raw particle with its position in the eligible list
    pub fn new(index: usize, particle: &RawParticle) -> Self {
        Self {
            index,
            p: particle.p,
            id: particle.id,
        }
    }

    /// Transverse momentum
    pub fn pt(&self) -> Float {
        momentum::pt(&self.p)
    }

    /// Azimuthal angle, in [0, 2π)
    pub fn phi(&self) -> Float {
        momentum::phi(&self.p)
    }

    /// Pseudorapidity
    pub fn eta(&self) -> Float {
        momentum::eta(&self.p)
    }
}
