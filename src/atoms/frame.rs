//! Per-rank frame payloads and the merged simulation frame.
//!
//! A parallel simulator sends one chunk per rank per cycle. The engine
//! concatenates the chunks and scatters atoms into id order before any
//! motor runs, so that slot `i` holds atom `i + 1`. The id multiset must be
//! exactly `{1..N}`; anything else aborts the run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{AtomId, SimIt};
use crate::error::FrameError;
use crate::units::UnitSystem;

/// The simulator phase a frame was captured in. Motors only act during the
/// production phase; thermalization frames update engine state only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    #[serde(rename = "NVT")]
    Thermalization,
    #[serde(rename = "NVE")]
    Production,
}

/// A scalar thermodynamic value attached to a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThermoValue {
    Int(i32),
    Float(f64),
}

/// The per-rank atom payload of one cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimData {
    #[serde(rename = "simIt")]
    pub sim_it: SimIt,
    #[serde(rename = "atomIDs")]
    pub atom_ids: Vec<AtomId>,
    #[serde(rename = "atomPositions")]
    pub atom_positions: Vec<f64>,
    #[serde(rename = "atomForces", default, skip_serializing_if = "Option::is_none")]
    pub atom_forces: Option<Vec<f64>>,
    #[serde(
        rename = "atomVelocities",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub atom_velocities: Option<Vec<f64>>,
    pub units: UnitSystem,
    pub phase: SimPhase,
}

/// One inbound message chunk: atom payload plus the thermodynamic scalars.
///
/// Every rank sends the same thermodynamics, so the merged frame keeps only
/// the first chunk's map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameChunk {
    pub simdata: SimData,
    #[serde(default)]
    pub thermos: BTreeMap<String, ThermoValue>,
}

/// The merged, id-sorted frame of one cycle.
#[derive(Debug, Clone)]
pub struct SimFrame {
    pub sim_it: SimIt,
    pub ids: Vec<AtomId>,
    pub positions: Vec<f64>,
    pub units: UnitSystem,
    pub phase: SimPhase,
    pub thermo: BTreeMap<String, ThermoValue>,
}

impl SimFrame {
    /// Merges per-rank chunks into a single id-sorted frame.
    ///
    /// All chunks must agree on the iteration counter. After the scatter,
    /// `ids[i] == i + 1` holds for every slot and the position triple at
    /// offset `3 * i` belongs to atom `i + 1`; ids that are out of range or
    /// duplicated fail the merge.
    pub fn merge(chunks: &[FrameChunk]) -> Result<SimFrame, FrameError> {
        let first = chunks.first().ok_or(FrameError::Empty)?;
        let sim_it = first.simdata.sim_it;

        let mut total_atoms = 0usize;
        for chunk in chunks {
            if chunk.simdata.sim_it != sim_it {
                return Err(FrameError::IterationMismatch {
                    first: sim_it,
                    other: chunk.simdata.sim_it,
                });
            }
            let ids = chunk.simdata.atom_ids.len();
            let positions = chunk.simdata.atom_positions.len();
            if positions != 3 * ids {
                return Err(FrameError::LayoutMismatch { ids, positions });
            }
            total_atoms += ids;
        }
        if total_atoms == 0 {
            return Err(FrameError::Empty);
        }

        let mut ids = vec![0u32; total_atoms];
        let mut positions = vec![0.0f64; 3 * total_atoms];

        for chunk in chunks {
            for (i, &id) in chunk.simdata.atom_ids.iter().enumerate() {
                let slot = (id as usize).wrapping_sub(1);
                if slot >= total_atoms {
                    return Err(FrameError::NotAPermutation {
                        expected: total_atoms,
                        id,
                    });
                }
                if ids[slot] != 0 {
                    // Slot already taken: the id occurs twice.
                    return Err(FrameError::NotAPermutation {
                        expected: total_atoms,
                        id,
                    });
                }
                ids[slot] = id;
                positions[3 * slot..3 * slot + 3]
                    .copy_from_slice(&chunk.simdata.atom_positions[3 * i..3 * i + 3]);
            }
        }

        // Every slot filled and no duplicates means the ids were exactly
        // the permutation of 1..=N the positional lookups assume.

        Ok(SimFrame {
            sim_it,
            ids,
            positions,
            units: first.simdata.units,
            phase: first.simdata.phase,
            thermo: first.thermos.clone(),
        })
    }

    /// Number of atoms in the merged frame.
    pub fn atom_count(&self) -> usize {
        self.ids.len()
    }
}
