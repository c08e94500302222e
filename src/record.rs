//! Plain data row types written by record sinks.

use crate::numeric::Float;

use serde::Serialize;

/// Column names of the jet table, in storage order
pub const JET_COLUMNS: [&str; 7] = ["nConstituents", "jPt", "jPx", "jPy", "jPz", "jE", "eventNum"];

/// Column names of the constituent table, in storage order
pub const CONSTITUENT_COLUMNS: [&str; 5] = ["cPt", "cJt", "cR", "cz", "cPid"];

/// One row of the jet table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JetRecord {
    /// Number of constituents, i.e. of rows in the constituent table
    #[serde(rename = "nConstituents")]
    pub n_constituents: usize,
    /// Jet transverse momentum
    #[serde(rename = "jPt")]
    pub pt: Float,
    /// Jet momentum along x
    #[serde(rename = "jPx")]
    pub px: Float,
    /// Jet momentum along y
    #[serde(rename = "jPy")]
    pub py: Float,
    /// Jet momentum along the beam axis
    #[serde(rename = "jPz")]
    pub pz: Float,
    /// Jet energy
    #[serde(rename = "jE")]
    pub e: Float,
    /// Number of the event the jet comes from
    #[serde(rename = "eventNum")]
    pub event_num: usize,
}

/// One row of the constituent table
///
/// The owning event is kept for in-memory consumers but is not a column:
/// rows follow their jet's row order, `nConstituents` rows per jet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConstituentRecord {
    /// Constituent transverse momentum
    #[serde(rename = "cPt")]
    pub pt: Float,
    /// Momentum transverse to the jet axis
    #[serde(rename = "cJt")]
    pub jt: Float,
    /// (η, φ) distance from the jet axis
    #[serde(rename = "cR")]
    pub r: Float,
    /// Momentum fraction along the jet axis
    #[serde(rename = "cz")]
    pub z: Float,
    /// PDG code of the constituent
    #[serde(rename = "cPid")]
    pub pid: i32,
    /// Number of the event the jet comes from
    #[serde(skip)]
    pub event_num: usize,
}

/// Records of a contiguous range of events, in event order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordBatch {
    /// Jet table rows
    pub jets: Vec<JetRecord>,
    /// Constituent table rows
    pub constituents: Vec<ConstituentRecord>,
}
//
impl RecordBatch {
    /// Append the records of a later range of events
    pub fn append(&mut self, other: Self) {
        self.jets.extend(other.jets);
        self.constituents.extend(other.constituents);
    }

    /// Truth that the batch holds no row at all
    pub fn is_empty(&self) -> bool {
        self.jets.is_empty() && self.constituents.is_empty()
    }
}
