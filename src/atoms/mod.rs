//! # Atoms Module - Selections and Simulation Frames
//!
//! This module owns the data the simulator ships every cycle and the fixed
//! atom selections the motors act on:
//!
//! - [`AtomSet`]: a fixed set of global atom identifiers with per-cycle
//!   working buffers and a geometric-centre computation
//! - [`frame`]: the per-rank [`frame::FrameChunk`] payload and the merged,
//!   id-sorted [`frame::SimFrame`] the motors consume
//!
//! Identifiers are 1-based and dense over the global system; the merged
//! frame guarantees that slot `i` holds atom `i + 1`, which lets selections
//! use positional lookup instead of hashing.

// Per-rank payloads, merging and sorting
pub mod frame;

use std::collections::BTreeSet;

use log::warn;

use crate::vector::Vec3;

/// A global atom identifier (1-based, dense).
pub type AtomId = u32;

/// The simulator iteration counter.
pub type SimIt = u64;

/// A fixed selection of global atom identifiers.
///
/// The selection is immutable after construction; `refresh` repopulates the
/// working buffers (`selected_ids`, `selected_positions`) from the current
/// frame each cycle, iterating the selection in ascending id order so the
/// buffer layout is stable across cycles. The rotation trackers rely on
/// that stability to follow the same atom by buffer index.
#[derive(Debug, Clone, Default)]
pub struct AtomSet {
    selection: BTreeSet<AtomId>,
    selected_ids: Vec<AtomId>,
    selected_positions: Vec<f64>,
}

impl AtomSet {
    /// Creates a selection from a set of global atom ids.
    pub fn new(selection: BTreeSet<AtomId>) -> Self {
        AtomSet {
            selection,
            selected_ids: Vec::new(),
            selected_positions: Vec::new(),
        }
    }

    /// Creates a selection from a plain id list (duplicates collapse).
    pub fn from_ids(ids: &[AtomId]) -> Self {
        Self::new(ids.iter().copied().collect())
    }

    /// Number of atoms in the fixed selection.
    pub fn selection_len(&self) -> usize {
        self.selection.len()
    }

    /// Number of atoms found by the last `refresh`.
    pub fn selected_count(&self) -> usize {
        self.selected_ids.len()
    }

    /// The selection as an ordered id list, as transmitted in commands.
    pub fn selection_vec(&self) -> Vec<AtomId> {
        self.selection.iter().copied().collect()
    }

    /// Positions captured by the last `refresh`, interleaved `(x, y, z)` in
    /// ascending id order.
    pub fn selected_positions(&self) -> &[f64] {
        &self.selected_positions
    }

    /// Copies the selection's positions out of a sorted frame.
    ///
    /// The frame must be id-sorted (slot `i` holds atom `i + 1`), which the
    /// engine guarantees after merging; membership is verified per atom and
    /// a missing atom is skipped. Returns `true` iff every element of the
    /// selection was found. A partial result leaves the owning motor's
    /// cycle a no-op; transient ordering effects on the transport can
    /// legitimately deliver short frames.
    pub fn refresh(&mut self, ids: &[AtomId], positions: &[f64]) -> bool {
        self.selected_ids.clear();
        self.selected_positions.clear();

        for &id in &self.selection {
            let slot = (id as usize).wrapping_sub(1);
            if slot >= ids.len() || ids[slot] != id {
                continue;
            }
            self.selected_ids.push(id);
            self.selected_positions
                .extend_from_slice(&positions[3 * slot..3 * slot + 3]);
        }

        let complete = self.selected_ids.len() == self.selection.len();
        if !complete {
            warn!(
                "selection refresh found {} of {} atoms",
                self.selected_ids.len(),
                self.selection.len()
            );
        }
        complete
    }

    /// Arithmetic mean of the selected positions, or the origin when the
    /// working buffers are empty.
    pub fn centroid(&self) -> Vec3 {
        if self.selected_ids.is_empty() {
            return Vec3::zero();
        }

        let mut sum = Vec3::zero();
        for i in 0..self.selected_ids.len() {
            sum = sum + Vec3::from_slice(&self.selected_positions, 3 * i);
        }
        sum / self.selected_ids.len() as f64
    }
}
