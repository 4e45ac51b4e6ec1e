//! Rotation-angle tracking shared by the torque and rotate motors.
//!
//! Progress of a rotation is measured through a single tracked atom: its
//! radial offset from the rotation axis is compared against the offset
//! captured on the first running cycle, giving a signed angle in
//! `[0°, 360°)`. A wrap counter turns the periodic angle into a monotonic
//! total: a jump from above 250° down below 90° counts one full positive
//! revolution, the reverse jump counts one negative revolution.

use log::info;

use crate::vector::Vec3;

/// Atoms closer than this to the axis cannot resolve an angle. In units of
/// the selection's positions.
const MIN_AXIS_DISTANCE: f64 = 0.01;

/// Wrap detection thresholds in degrees.
const WRAP_HIGH_DEG: f64 = 250.0;
const WRAP_LOW_DEG: f64 = 90.0;

/// One angle measurement.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AngleSample {
    /// Angle from the initial offset, mapped into `[0, 360)` degrees.
    pub current_deg: f64,
    /// Signed total including completed revolutions.
    pub total_deg: f64,
    /// Position of the tracked atom this cycle.
    pub track_point: Vec3,
}

/// Tracks the rotation of a selection about an axis through one off-axis
/// atom. The tracked atom is addressed by its index into the selection's
/// position buffer, which is stable because selections iterate in
/// ascending id order.
#[derive(Debug, Clone)]
pub(crate) struct RotationTracker {
    axis: Vec3,
    tracked_index: usize,
    reference_offset: Vec3,
    previous_deg: f64,
    revolutions: i64,
}

impl RotationTracker {
    /// Captures the initial reference: scans the selected positions for the
    /// first atom whose distance to the axis line exceeds the minimum and
    /// records its normalized radial offset. Returns `None` when the axis
    /// direction is degenerate or every atom sits on the axis.
    pub fn capture(
        name: &str,
        axis: Vec3,
        pivot: Vec3,
        positions: &[f64],
    ) -> Option<Self> {
        let axis = axis.normalize();
        if axis == Vec3::zero() {
            return None;
        }

        let atom_count = positions.len() / 3;
        for index in 0..atom_count {
            let point = Vec3::from_slice(positions, 3 * index);
            let radial = point.reject_from_axis(&pivot, &axis);
            if radial.norm() < MIN_AXIS_DISTANCE {
                info!(
                    "Motor {}: atom index {} is too close to the axis. Changing atom.",
                    name, index
                );
                continue;
            }
            info!(
                "Motor {}: atom index {} is far enough from the rotation axis. Keeping it.",
                name, index
            );
            return Some(RotationTracker {
                axis,
                tracked_index: index,
                reference_offset: radial.normalize(),
                previous_deg: 0.0,
                revolutions: 0,
            });
        }
        None
    }

    /// Position of the tracked atom in the given selection buffer.
    pub fn tracked_point(&self, positions: &[f64]) -> Vec3 {
        Vec3::from_slice(positions, 3 * self.tracked_index)
    }

    /// Measures the angle of the current cycle and advances the wrap
    /// counter. `pivot` may move between cycles (the torque motor anchors
    /// the axis on the drifting geometric centre).
    pub fn advance(&mut self, pivot: &Vec3, positions: &[f64]) -> AngleSample {
        let track_point = self.tracked_point(positions);
        let radial = track_point.reject_from_axis(pivot, &self.axis).normalize();

        // Signed angle in (-pi, pi], mapped into [0, 2pi)
        let mut angle = self.reference_offset.oriented_angle(&radial, &self.axis);
        if angle < 0.0 {
            angle += 2.0 * std::f64::consts::PI;
        }
        let current_deg = angle.to_degrees();

        if current_deg < WRAP_LOW_DEG && self.previous_deg > WRAP_HIGH_DEG {
            self.revolutions += 1;
        }
        if current_deg > WRAP_HIGH_DEG && self.previous_deg < WRAP_LOW_DEG {
            self.revolutions -= 1;
        }
        self.previous_deg = current_deg;

        AngleSample {
            current_deg,
            total_deg: self.revolutions as f64 * 360.0 + current_deg,
            track_point,
        }
    }
}
