//! Jet clustering: the clusterer contract and a generalised-kt implementation

use crate::{
    error::ClusterError,
    jet::Jet,
    momentum::{self, Momentum},
    numeric::{functions::delta_phi, Float},
    particle::EligibleParticle,
};

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use thiserror::Error;

/// Default jet radius parameter
pub const DEFAULT_RADIUS: Float = 0.5;

/// Jet clustering algorithms of the generalised-kt family
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash, Debug)]
pub enum JetAlgorithm {
    /// The [anti-kt](https://arxiv.org/abs/0802.1189) algorithm
    #[default]
    AntiKt,
    /// The [Cambridge](https://arxiv.org/abs/hep-ph/9707323)/[Aachen](https://arxiv.org/abs/hep-ph/9907280) algorithm
    CambridgeAachen,
    /// The [kt](https://arxiv.org/abs/hep-ph/9305266) algorithm
    Kt,
}
//
impl JetAlgorithm {
    /// Exponent p of the transverse momentum weight kt^(2p)
    fn kt_exponent(self) -> i32 {
        match self {
            Self::AntiKt => -1,
            Self::CambridgeAachen => 0,
            Self::Kt => 1,
        }
    }
}

impl Display for JetAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AntiKt => "anti-kt",
            Self::CambridgeAachen => "Cambridge/Aachen",
            Self::Kt => "kt",
        };
        f.write_str(name)
    }
}

/// Failure to recognize a jet algorithm name
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown jet algorithm: {0}")]
pub struct UnknownJetAlgorithm(String);

impl FromStr for JetAlgorithm {
    type Err = UnknownJetAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anti_kt" | "antikt" | "anti-kt" => Ok(Self::AntiKt),
            "kt" => Ok(Self::Kt),
            "Cambridge/Aachen" | "Cambridge-Aachen" | "Cambridge_Aachen"
            | "cambridge/aachen" | "cambridge-aachen" | "cambridge_aachen" => {
                Ok(Self::CambridgeAachen)
            }
            _ => Err(UnknownJetAlgorithm(s.to_string())),
        }
    }
}

/// Jet definition handed to the clusterer
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct JetDefinition {
    /// Jet algorithm
    pub algorithm: JetAlgorithm,
    /// Jet radius parameter
    pub radius: Float,
}
//
impl Default for JetDefinition {
    fn default() -> Self {
        Self {
            algorithm: JetAlgorithm::AntiKt,
            radius: DEFAULT_RADIUS,
        }
    }
}

/// Something which groups the eligible particles of an event into jets
///
/// Implementations return inclusive jets. Every jet must own a subset of the
/// input particles, and no particle may be part of two jets.
///
pub trait JetClusterer: Sync {
    /// Cluster one event's eligible particles
    fn cluster(&self, particles: Vec<EligibleParticle>, jet_def: &JetDefinition) -> Vec<Jet>;
}

/// Check that the clusterer output assigns each of `num_particles` inputs to
/// at most one jet
pub fn check_exclusive(jets: &[Jet], num_particles: usize) -> Result<(), ClusterError> {
    let mut taken = vec![false; num_particles];
    for constituent in jets.iter().flat_map(|jet| &jet.constituents) {
        let index = constituent.index;
        let slot = taken.get_mut(index).ok_or(ClusterError::UnknownConstituent {
            index,
            count: num_particles,
        })?;
        if *slot {
            return Err(ClusterError::SharedConstituent { index });
        }
        *slot = true;
    }
    Ok(())
}

/// Inclusive sequential recombination with the generalised-kt distance
///
/// `d_ij = min(kt_i^2p, kt_j^2p) ΔR_ij² / R²` and `d_iB = kt_i^2p`, using
/// rapidity and azimuth for ΔR and the E-scheme for recombination. Nearest
/// neighbours are cached, so that an event of N particles costs O(N²) in the
/// typical case.
///
#[derive(Copy, Clone, Debug, Default)]
pub struct GeneralisedKt;

impl JetClusterer for GeneralisedKt {
    fn cluster(&self, particles: Vec<EligibleParticle>, jet_def: &JetDefinition) -> Vec<Jet> {
        ClusterSequence::new(particles, jet_def).run()
    }
}

/// A (pseudo)jet under construction
struct Cluster {
    p: Momentum,
    rap: Float,
    phi: Float,
    /// kt^(2p) weight of this cluster
    weight: Float,
    members: Vec<EligibleParticle>,
    /// Geometric nearest neighbour, with its squared distance
    nn: Option<(usize, Float)>,
}
//
impl Cluster {
    fn new(p: Momentum, members: Vec<EligibleParticle>, exponent: i32) -> Self {
        let pt2 = momentum::pt2(&p);
        let weight = match exponent {
            0 => 1.,
            // Guard against zero-pt pseudojets, which are never merged
            _ if pt2 == 0. => if exponent < 0 { Float::INFINITY } else { 0. },
            _ => pt2.powi(exponent),
        };
        Self {
            rap: momentum::rapidity(&p),
            phi: momentum::phi(&p),
            p,
            weight,
            members,
            nn: None,
        }
    }

    fn delta_r2(&self, other: &Self) -> Float {
        let dphi = delta_phi(self.phi, other.phi);
        let drap = self.rap - other.rap;
        dphi * dphi + drap * drap
    }
}

/// Bookkeeping of one clustering run
struct ClusterSequence {
    /// Active clusters, `None` once merged away or promoted to a jet
    clusters: Vec<Option<Cluster>>,
    inv_r2: Float,
    exponent: i32,
}
//
impl ClusterSequence {
    fn new(particles: Vec<EligibleParticle>, jet_def: &JetDefinition) -> Self {
        let exponent = jet_def.algorithm.kt_exponent();
        let clusters = particles
            .into_iter()
            .map(|particle| Some(Cluster::new(particle.p, vec![particle], exponent)))
            .collect();
        let mut sequence = Self {
            clusters,
            inv_r2: 1. / (jet_def.radius * jet_def.radius),
            exponent,
        };
        for i in 0..sequence.clusters.len() {
            sequence.update_nn(i);
        }
        sequence
    }

    /// Recompute the nearest neighbour of cluster i from scratch
    fn update_nn(&mut self, i: usize) {
        let Some(cluster) = self.clusters[i].as_ref() else {
            return;
        };
        let mut nn: Option<(usize, Float)> = None;
        for (j, other) in self.clusters.iter().enumerate() {
            let Some(other) = other else { continue };
            if j == i {
                continue;
            }
            let dist = cluster.delta_r2(other);
            if nn.map_or(true, |(_, best)| dist < best) {
                nn = Some((j, dist));
            }
        }
        if let Some(cluster) = self.clusters[i].as_mut() {
            cluster.nn = nn;
        }
    }

    /// Smallest of d_iB and d_iNN for cluster i, with the merge partner if
    /// the pair distance wins
    fn distance(&self, i: usize) -> Option<(Float, Option<usize>)> {
        let cluster = self.clusters[i].as_ref()?;
        let beam = cluster.weight;
        let Some((j, dist)) = cluster.nn else {
            return Some((beam, None));
        };
        let Some(partner) = self.clusters[j].as_ref() else {
            return Some((beam, None));
        };
        let pair = cluster.weight.min(partner.weight) * dist * self.inv_r2;
        if pair < beam {
            Some((pair, Some(j)))
        } else {
            Some((beam, None))
        }
    }

    /// Run the recombination until every cluster has become a jet
    fn run(mut self) -> Vec<Jet> {
        let mut jets = Vec::new();
        loop {
            // Find the globally smallest distance
            let best = (0..self.clusters.len())
                .filter_map(|i| self.distance(i).map(|(d, partner)| (d, i, partner)))
                .min_by(|a, b| a.0.total_cmp(&b.0));
            let Some((_, i, partner)) = best else {
                break;
            };

            match partner {
                // Merge i and j into slot i (E-scheme)
                Some(j) => {
                    let (Some(a), Some(b)) = (self.clusters[i].take(), self.clusters[j].take())
                    else {
                        unreachable!("nearest neighbours always point to active clusters")
                    };
                    let mut members = a.members;
                    members.extend(b.members);
                    self.clusters[i] = Some(Cluster::new(a.p + b.p, members, self.exponent));
                    self.refresh_after_merge(i, j);
                }

                // Promote i to a final jet
                None => {
                    if let Some(cluster) = self.clusters[i].take() {
                        jets.push(Jet::from_constituents(cluster.members));
                    }
                    self.refresh_after_removal(i);
                }
            }
        }
        jets
    }

    /// Fix nearest neighbours once j was merged into the new cluster i
    fn refresh_after_merge(&mut self, i: usize, j: usize) {
        for k in 0..self.clusters.len() {
            if k == i {
                continue;
            }
            let (stale, closer) = match self.clusters[k].as_ref() {
                None => continue,
                Some(cluster) => {
                    let stale = matches!(cluster.nn, Some((n, _)) if n == i || n == j);
                    let closer = self.clusters[i].as_ref().and_then(|merged| {
                        let dist = cluster.delta_r2(merged);
                        match cluster.nn {
                            Some((_, best)) if dist >= best => None,
                            _ => Some(dist),
                        }
                    });
                    (stale, closer)
                }
            };
            if stale {
                self.update_nn(k);
            } else if let (Some(dist), Some(cluster)) = (closer, self.clusters[k].as_mut()) {
                cluster.nn = Some((i, dist));
            }
        }
        self.update_nn(i);
    }

    /// Fix nearest neighbours once cluster i became a jet
    fn refresh_after_removal(&mut self, i: usize) {
        for k in 0..self.clusters.len() {
            let stale = matches!(
                self.clusters[k].as_ref().and_then(|cluster| cluster.nn),
                Some((n, _)) if n == i
            );
            if stale {
                self.update_nn(k);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::momentum::{momentum, on_shell};
    use nalgebra::Vector3;
    use particle_id::ParticleID;

    fn particle(index: usize, pt: Float, rap: Float, phi: Float) -> EligibleParticle {
        let p = Vector3::new(pt * phi.cos(), pt * phi.sin(), pt * rap.sinh());
        EligibleParticle {
            index,
            p: on_shell(p, 0.),
            id: ParticleID::new(211 + index as i32),
        }
    }

    fn cluster(particles: Vec<EligibleParticle>, algorithm: JetAlgorithm) -> Vec<Jet> {
        let jet_def = JetDefinition { algorithm, radius: 0.5 };
        let mut jets = GeneralisedKt.cluster(particles, &jet_def);
        crate::jet::sort_by_pt(&mut jets);
        jets
    }

    #[test]
    fn algorithm_names_parse() {
        assert_eq!("anti-kt".parse(), Ok(JetAlgorithm::AntiKt));
        assert_eq!("antikt".parse(), Ok(JetAlgorithm::AntiKt));
        assert_eq!("kt".parse(), Ok(JetAlgorithm::Kt));
        assert_eq!("cambridge_aachen".parse(), Ok(JetAlgorithm::CambridgeAachen));
        assert!("siscone".parse::<JetAlgorithm>().is_err());
        assert_eq!(JetAlgorithm::default(), JetAlgorithm::AntiKt);
    }

    #[test]
    fn empty_input_gives_no_jets() {
        assert!(cluster(Vec::new(), JetAlgorithm::AntiKt).is_empty());
    }

    #[test]
    fn distant_particles_stay_apart() {
        for algorithm in [JetAlgorithm::AntiKt, JetAlgorithm::Kt, JetAlgorithm::CambridgeAachen] {
            let jets = cluster(
                vec![particle(0, 20., 0., 0.), particle(1, 10., 1.5, 2.)],
                algorithm,
            );
            assert_eq!(jets.len(), 2, "{algorithm}");
            assert_eq!(jets[0].constituents.len(), 1);
            assert_eq!(jets[0].constituents[0].index, 0);
        }
    }

    #[test]
    fn nearby_particles_merge() {
        for algorithm in [JetAlgorithm::AntiKt, JetAlgorithm::Kt, JetAlgorithm::CambridgeAachen] {
            let a = particle(0, 20., 0.1, 1.0);
            let b = particle(1, 5., 0.2, 1.2);
            let jets = cluster(vec![a, b], algorithm);
            assert_eq!(jets.len(), 1, "{algorithm}");
            assert_eq!(jets[0].p, a.p + b.p);
            let ids: Vec<_> = jets[0].constituents.iter().map(|c| c.id).collect();
            assert_eq!(ids, [a.id, b.id]);
        }
    }

    #[test]
    fn merging_across_the_phi_seam() {
        let a = particle(0, 20., 0., 0.05);
        let b = particle(1, 8., 0., 2. * std::f64::consts::PI - 0.05);
        let jets = cluster(vec![a, b], JetAlgorithm::AntiKt);
        assert_eq!(jets.len(), 1);
    }

    #[test]
    fn anti_kt_grows_around_the_hard_particle() {
        // Two soft particles within R of a hard one, but further than R from
        // each other: anti-kt absorbs both into the hard jet
        let hard = particle(0, 50., 0., 1.);
        let left = particle(1, 1., 0., 1. - 0.4);
        let right = particle(2, 1., 0., 1. + 0.4);
        let far = particle(3, 2., 2., 4.);
        let jets = cluster(vec![left, hard, far, right], JetAlgorithm::AntiKt);
        assert_eq!(jets.len(), 2);
        let indices: Vec<_> = jets[0].constituents.iter().map(|c| c.index).collect();
        assert_eq!(indices, [0, 1, 2]);
        assert_eq!(jets[1].constituents[0].index, 3);
    }

    #[test]
    fn every_particle_ends_up_in_exactly_one_jet() {
        let particles: Vec<_> = (0..40)
            .map(|i| {
                let x = i as Float;
                particle(i, 0.5 + (x * 0.37) % 7., (x * 0.61) % 3. - 1.5, (x * 1.3) % 6.2)
            })
            .collect();
        for algorithm in [JetAlgorithm::AntiKt, JetAlgorithm::Kt, JetAlgorithm::CambridgeAachen] {
            let jets = cluster(particles.clone(), algorithm);
            check_exclusive(&jets, particles.len()).unwrap();
            let total: usize = jets.iter().map(|jet| jet.constituents.len()).sum();
            assert_eq!(total, particles.len());
        }
    }

    #[test]
    fn shared_constituents_are_flagged() {
        let a = particle(0, 10., 0., 0.);
        let b = particle(1, 10., 1., 1.);
        let jets = vec![
            Jet::from_constituents(vec![a, b]),
            Jet::from_constituents(vec![b]),
        ];
        assert_eq!(
            check_exclusive(&jets, 2),
            Err(ClusterError::SharedConstituent { index: 1 })
        );
        assert_eq!(
            check_exclusive(&jets[..1], 1),
            Err(ClusterError::UnknownConstituent { index: 1, count: 1 })
        );
    }

    #[test]
    fn zero_pt_particles_do_not_break_anti_kt() {
        let beam = EligibleParticle {
            index: 0,
            p: momentum(0., 0., 5., 5.),
            id: ParticleID::new(22),
        };
        let jets = cluster(vec![beam, particle(1, 10., 0., 0.)], JetAlgorithm::AntiKt);
        assert_eq!(jets.len(), 2);
    }
}
