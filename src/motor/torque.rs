//! Constant-torque motor.
//!
//! Installs an add-torque directive and tracks the accumulated rotation of
//! the selection about the normalised torque vector. The pivot is the
//! selection's geometric centre, recomputed every cycle because the body
//! drifts; the angle reference was captured at the initial centre, so the
//! measurement is only exact for rigid bodies.

use log::{error, info};

use crate::atoms::{AtomId, AtomSet};
use crate::command::MotorCommand;
use crate::telemetry::KvsNode;
use crate::units::{TorqueQuantity, UnitSystem};
use crate::vector::Vec3;

use super::tracker::{AngleSample, RotationTracker};
use super::MotorUpdate;

#[derive(Debug, Clone)]
pub struct TorqueMotor {
    state: AtomSet,
    tx: TorqueQuantity,
    ty: TorqueQuantity,
    tz: TorqueQuantity,
    requested_angle_deg: f64,
    tracker: Option<RotationTracker>,
}

impl TorqueMotor {
    pub(crate) const FIELDS: &'static [&'static str] = &[
        "progress",
        "current_total_angle_deg",
        "current_angle_deg",
        "track_x",
        "track_y",
        "track_z",
        "centroid_x",
        "centroid_y",
        "centroid_z",
    ];

    /// `requested_angle_deg > 0`, enforced at load time; a negative
    /// rotation is requested by flipping the torque vector.
    pub fn new(
        state: AtomSet,
        torque: [TorqueQuantity; 3],
        requested_angle_deg: f64,
    ) -> Self {
        TorqueMotor {
            state,
            tx: torque[0],
            ty: torque[1],
            tz: torque[2],
            requested_angle_deg,
            tracker: None,
        }
    }

    pub(crate) fn update(
        &mut self,
        name: &str,
        ids: &[AtomId],
        positions: &[f64],
    ) -> MotorUpdate {
        if !self.state.refresh(ids, positions) {
            return MotorUpdate::skipped();
        }

        // The torque anchors its axis on the geometric centre, which moves
        // with the body and must be recomputed every cycle.
        let pivot = self.state.centroid();

        let Some(tracker) = &mut self.tracker else {
            info!("Registering the initial state for the motor {}.", name);
            let axis = Vec3::new(self.tx.value, self.ty.value, self.tz.value);
            match RotationTracker::capture(
                name,
                axis,
                pivot,
                self.state.selected_positions(),
            ) {
                Some(tracker) => {
                    let node = rotation_node(
                        &AngleSample {
                            current_deg: 0.0,
                            total_deg: 0.0,
                            track_point: tracker
                                .tracked_point(self.state.selected_positions()),
                        },
                        pivot,
                        self.requested_angle_deg,
                    );
                    self.tracker = Some(tracker);
                    return MotorUpdate::running(node);
                }
                None => {
                    error!(
                        "Motor {}: no selected atom lies off the rotation axis. Aborting.",
                        name
                    );
                    return MotorUpdate::failed();
                }
            }
        };

        let sample = tracker.advance(&pivot, self.state.selected_positions());
        let node = rotation_node(&sample, pivot, self.requested_angle_deg);

        if sample.total_deg >= self.requested_angle_deg {
            MotorUpdate::completed(node)
        } else {
            MotorUpdate::running(node)
        }
    }

    pub(crate) fn command(&self, origin: &str) -> MotorCommand {
        MotorCommand::AddTorque {
            origin: origin.to_string(),
            tx: self.tx.value,
            ty: self.ty.value,
            tz: self.tz.value,
            tunits: self.tx.unit,
            selection: self.state.selection_vec(),
        }
    }

    pub(crate) fn convert_settings_to(&mut self, dest: UnitSystem) {
        let _ = self.tx.convert_to(dest);
        let _ = self.ty.convert_to(dest);
        let _ = self.tz.convert_to(dest);
    }
}

/// Telemetry of one rotation-tracking cycle.
pub(super) fn rotation_node(
    sample: &AngleSample,
    pivot: Vec3,
    requested_angle_deg: f64,
) -> KvsNode {
    use crate::telemetry::KvValue;

    let mut node = KvsNode::new();
    node.insert(
        "progress".to_string(),
        KvValue::Float((sample.total_deg / requested_angle_deg) * 100.0),
    );
    node.insert(
        "current_total_angle_deg".to_string(),
        KvValue::Float(sample.total_deg),
    );
    node.insert(
        "current_angle_deg".to_string(),
        KvValue::Float(sample.current_deg),
    );
    node.insert("track_x".to_string(), KvValue::Float(sample.track_point.x));
    node.insert("track_y".to_string(), KvValue::Float(sample.track_point.y));
    node.insert("track_z".to_string(), KvValue::Float(sample.track_point.z));
    node.insert("centroid_x".to_string(), KvValue::Float(pivot.x));
    node.insert("centroid_y".to_string(), KvValue::Float(pivot.y));
    node.insert("centroid_z".to_string(), KvValue::Float(pivot.z));
    node
}
