//! Reconstructed jets and the selection applied to them

use crate::{
    momentum::{self, Momentum},
    numeric::Float,
    particle::EligibleParticle,
};

/// Margin below the hard-process pt cutoff down to which jets are accepted
pub const SOFT_MARGIN: Float = 5.0;

/// A clustered jet
///
/// The jet owns its constituents for the duration of one event. Its pt, phi
/// and eta are always derived from the aggregate 4-momentum.
///
#[derive(Clone, PartialEq, Debug)]
pub struct Jet {
    /// Aggregate 4-momentum (GeV)
    pub p: Momentum,

    /// Clustered particles, ordered by their position in the eligible list
    pub constituents: Vec<EligibleParticle>,
}
//
impl Jet {
    /// Build a jet from its constituents, summing their 4-momenta
    pub fn from_constituents(mut constituents: Vec<EligibleParticle>) -> Self {
        constituents.sort_by_key(|c| c.index);
        let p = constituents.iter().map(|c| c.p).sum();
        Self { p, constituents }
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

/// Sort jets by decreasing transverse momentum
pub fn sort_by_pt(jets: &mut [Jet]) {
    jets.sort_by(|a, b| b.pt().total_cmp(&a.pt()));
}

/// Acceptance cut on reconstructed jets
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct JetSelector {
    /// Minimal jet transverse momentum (GeV/c), inclusive
    pub min_pt: Float,
}
//
impl JetSelector {
    /// Accept jets down to SOFT_MARGIN below the generator's hard-process
    /// cutoff, so that the sample has no artificially sharp edge there
    pub fn from_pt_hat_min(pt_hat_min: Float) -> Self {
        Self {
            min_pt: pt_hat_min - SOFT_MARGIN,
        }
    }

    /// Decide whether a jet is kept for further processing
    pub fn keep(&self, jet: &Jet) -> bool {
        jet.pt() >= self.min_pt
    }

    /// Drop the jets which fail the cut, preserving the order of the others
    pub fn select(&self, mut jets: Vec<Jet>) -> Vec<Jet> {
        jets.retain(|jet| self.keep(jet));
        jets
    }
}
