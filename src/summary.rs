//! This module allows accumulating run statistics across processed events

use crate::{filter::Rejection, numeric::Float};

use std::fmt::{self, Display};

use serde::Serialize;

/// Binning of the hard-process pt histogram: 100 bins over [0, 100) GeV
const PT_HAT_BINS: usize = 100;
const PT_HAT_RANGE: (Float, Float) = (0., 100.);

/// Fixed-width one-dimensional histogram with under- and overflow counters
#[derive(Clone, Debug, PartialEq)]
pub struct Histogram {
    low: Float,
    high: Float,
    counts: Vec<u64>,
    underflow: u64,
    overflow: u64,
}
//
impl Histogram {
    /// Set up an empty histogram of `num_bins` bins over [low, high)
    pub fn new(num_bins: usize, low: Float, high: Float) -> Self {
        assert!(num_bins > 0, "Histograms need at least one bin");
        assert!(low < high, "Histogram range must not be empty");
        Self {
            low,
            high,
            counts: vec![0; num_bins],
            underflow: 0,
            overflow: 0,
        }
    }

    /// Record one entry
    pub fn fill(&mut self, x: Float) {
        if x < self.low {
            self.underflow += 1;
        } else if x >= self.high {
            self.overflow += 1;
        } else if !x.is_nan() {
            let width = (self.high - self.low) / self.counts.len() as Float;
            let bin = (((x - self.low) / width) as usize).min(self.counts.len() - 1);
            self.counts[bin] += 1;
        }
    }

    /// Add the entries of a histogram with the same binning
    pub fn merge(&mut self, other: &Self) {
        assert_eq!(
            (self.low, self.high, self.counts.len()),
            (other.low, other.high, other.counts.len()),
            "Only histograms with identical binning can be merged"
        );
        for (dst, src) in self.counts.iter_mut().zip(&other.counts) {
            *dst += src;
        }
        self.underflow += other.underflow;
        self.overflow += other.overflow;
    }

    /// Iterate over (bin low edge, bin high edge, count)
    pub fn bins(&self) -> impl Iterator<Item = HistogramBin> + '_ {
        let width = (self.high - self.low) / self.counts.len() as Float;
        self.counts.iter().enumerate().map(move |(i, &count)| HistogramBin {
            low: self.low + i as Float * width,
            high: self.low + (i + 1) as Float * width,
            count,
        })
    }

    /// Number of entries, including under- and overflows
    pub fn entries(&self) -> u64 {
        self.counts.iter().sum::<u64>() + self.underflow + self.overflow
    }

    /// Entries below the histogram range
    pub fn underflow(&self) -> u64 {
        self.underflow
    }

    /// Entries above the histogram range
    pub fn overflow(&self) -> u64 {
        self.overflow
    }
}

/// One bin of a histogram, as written to disk
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HistogramBin {
    /// Lower edge, inclusive
    pub low: Float,
    /// Upper edge, exclusive
    pub high: Float,
    /// Number of entries
    pub count: u64,
}

/// Statistics of an analysis run, accumulated per batch of events and then
/// merged in batch order
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Events fully processed
    pub events: usize,

    /// Events whose clustering output was rejected
    pub rejected_events: usize,

    /// Particles seen in the event records
    pub particles: usize,

    /// Particles which entered jet clustering
    pub eligible_particles: usize,

    /// Particles rejected because they are not in the final state
    pub rejected_not_final: usize,

    /// Particles rejected by the pt threshold
    pub rejected_soft: usize,

    /// Neutrinos kept out of clustering
    pub rejected_neutrinos: usize,

    /// Jets returned by the clusterer
    pub clustered_jets: usize,

    /// Jets which passed the jet selection
    pub selected_jets: usize,

    /// Selected jets skipped because of a vanishing momentum
    pub degenerate_jets: usize,

    /// Constituent records produced
    pub constituents: usize,

    /// Truth that the run was cancelled before completion
    pub cancelled: bool,

    /// Distribution of the hard-process pt
    pub pt_hat: Histogram,
}
//
impl Default for RunSummary {
    fn default() -> Self {
        Self {
            events: 0,
            rejected_events: 0,
            particles: 0,
            eligible_particles: 0,
            rejected_not_final: 0,
            rejected_soft: 0,
            rejected_neutrinos: 0,
            clustered_jets: 0,
            selected_jets: 0,
            degenerate_jets: 0,
            constituents: 0,
            cancelled: false,
            pt_hat: Histogram::new(PT_HAT_BINS, PT_HAT_RANGE.0, PT_HAT_RANGE.1),
        }
    }
}
//
impl RunSummary {
    /// Account for a particle rejected by the particle filter
    pub fn record_rejection(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::NotFinalState => self.rejected_not_final += 1,
            Rejection::BelowPtThreshold => self.rejected_soft += 1,
            Rejection::Neutrino => self.rejected_neutrinos += 1,
        }
    }

    /// Integrate the statistics of a later batch of events
    pub fn merge(&mut self, other: &Self) {
        self.events += other.events;
        self.rejected_events += other.rejected_events;
        self.particles += other.particles;
        self.eligible_particles += other.eligible_particles;
        self.rejected_not_final += other.rejected_not_final;
        self.rejected_soft += other.rejected_soft;
        self.rejected_neutrinos += other.rejected_neutrinos;
        self.clustered_jets += other.clustered_jets;
        self.selected_jets += other.selected_jets;
        self.degenerate_jets += other.degenerate_jets;
        self.constituents += other.constituents;
        self.cancelled |= other.cancelled;
        self.pt_hat.merge(&other.pt_hat);
    }

    /// Jet records written, i.e. selected jets which were not degenerate
    pub fn written_jets(&self) -> usize {
        self.selected_jets - self.degenerate_jets
    }
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Events processed               : {}", self.events)?;
        writeln!(f, "... with rejected clustering   : {}", self.rejected_events)?;
        writeln!(f, "Particles                      : {}", self.particles)?;
        writeln!(f, "... clustered                  : {}", self.eligible_particles)?;
        writeln!(f, "... not in final state         : {}", self.rejected_not_final)?;
        writeln!(f, "... below pt threshold         : {}", self.rejected_soft)?;
        writeln!(f, "... neutrinos                  : {}", self.rejected_neutrinos)?;
        writeln!(f, "Jets clustered                 : {}", self.clustered_jets)?;
        writeln!(f, "... selected                   : {}", self.selected_jets)?;
        writeln!(f, "... degenerate                 : {}", self.degenerate_jets)?;
        writeln!(f, "Jet records                    : {}", self.written_jets())?;
        writeln!(f, "Constituent records            : {}", self.constituents)?;
        if self.cancelled {
            writeln!(f, "Run was cancelled")?;
        }
        Ok(())
    }
}
