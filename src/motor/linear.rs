//! Fixed-velocity pulling motor.
//!
//! Installs a linear-motion directive on its selection and tracks the
//! displacement of the selection's centroid from where it started. The
//! motor completes once every checked axis has moved past its target
//! displacement in the target's direction.

use log::info;

use crate::atoms::{AtomId, AtomSet};
use crate::command::MotorCommand;
use crate::telemetry::{KvValue, KvsNode};
use crate::units::{DistanceQuantity, UnitSystem, VelocityQuantity};
use crate::vector::Vec3;

use super::{axis_progress, MotorUpdate};

#[derive(Debug, Clone)]
pub struct MoveMotor {
    state: AtomSet,
    vx: VelocityQuantity,
    vy: VelocityQuantity,
    vz: VelocityQuantity,
    check_x: bool,
    check_y: bool,
    check_z: bool,
    dx: DistanceQuantity,
    dy: DistanceQuantity,
    dz: DistanceQuantity,
    // Centroid captured on the first running cycle
    initial_center: Option<[DistanceQuantity; 3]>,
}

impl MoveMotor {
    pub(crate) const FIELDS: &'static [&'static str] = &[
        "progress",
        "progress_min",
        "progress_x",
        "progress_y",
        "progress_z",
        "distance_x",
        "distance_y",
        "distance_z",
        "center_x",
        "center_y",
        "center_z",
    ];

    pub fn new(
        state: AtomSet,
        velocity: [VelocityQuantity; 3],
        checks: [bool; 3],
        targets: [DistanceQuantity; 3],
    ) -> Self {
        MoveMotor {
            state,
            vx: velocity[0],
            vy: velocity[1],
            vz: velocity[2],
            check_x: checks[0],
            check_y: checks[1],
            check_z: checks[2],
            dx: targets[0],
            dy: targets[1],
            dz: targets[2],
            initial_center: None,
        }
    }

    pub(crate) fn update(
        &mut self,
        name: &str,
        ids: &[AtomId],
        positions: &[f64],
    ) -> MotorUpdate {
        if !self.state.refresh(ids, positions) {
            // Transient partial delivery, try again next cycle.
            return MotorUpdate::skipped();
        }

        let center = self.state.centroid();
        let Some(initial) = self.initial_center else {
            info!("Registering the initial state for the motor {}.", name);
            let unit = self.dx.unit;
            self.initial_center = Some([
                DistanceQuantity::new(center.x, unit),
                DistanceQuantity::new(center.y, unit),
                DistanceQuantity::new(center.z, unit),
            ]);
            return MotorUpdate::running(initial_move_node(center));
        };

        let delta = center - Vec3::new(initial[0].value, initial[1].value, initial[2].value);
        let progress = axis_progress(
            delta,
            [self.check_x, self.check_y, self.check_z],
            [self.dx.value, self.dy.value, self.dz.value],
        );

        let node = move_node(&progress, &initial);
        if progress.satisfied {
            MotorUpdate::completed(node)
        } else {
            MotorUpdate::running(node)
        }
    }

    pub(crate) fn command(&self, origin: &str) -> MotorCommand {
        MotorCommand::Move {
            origin: origin.to_string(),
            vx: self.vx.value,
            vy: self.vy.value,
            vz: self.vz.value,
            vunits: self.vx.unit,
            selection: self.state.selection_vec(),
        }
    }

    pub(crate) fn convert_settings_to(&mut self, dest: UnitSystem) {
        let _ = self.vx.convert_to(dest);
        let _ = self.vy.convert_to(dest);
        let _ = self.vz.convert_to(dest);
        let _ = self.dx.convert_to(dest);
        let _ = self.dy.convert_to(dest);
        let _ = self.dz.convert_to(dest);
        if let Some(center) = &mut self.initial_center {
            for component in center.iter_mut() {
                let _ = component.convert_to(dest);
            }
        }
    }
}

/// Telemetry of the capture cycle: zero progress around the new reference.
pub(super) fn initial_move_node(center: Vec3) -> KvsNode {
    let mut node = KvsNode::new();
    for field in [
        "progress",
        "progress_min",
        "progress_x",
        "progress_y",
        "progress_z",
        "distance_x",
        "distance_y",
        "distance_z",
    ] {
        node.insert(field.to_string(), KvValue::Float(0.0));
    }
    node.insert("center_x".to_string(), KvValue::Float(center.x));
    node.insert("center_y".to_string(), KvValue::Float(center.y));
    node.insert("center_z".to_string(), KvValue::Float(center.z));
    node
}

/// Telemetry of a regular displacement cycle.
pub(super) fn move_node(
    progress: &super::AxisProgress,
    initial: &[DistanceQuantity; 3],
) -> KvsNode {
    let mut node = KvsNode::new();
    node.insert("progress".to_string(), KvValue::Float(progress.progress));
    node.insert(
        "progress_min".to_string(),
        KvValue::Float(progress.progress_min),
    );
    node.insert("progress_x".to_string(), KvValue::Float(progress.per_axis[0]));
    node.insert("progress_y".to_string(), KvValue::Float(progress.per_axis[1]));
    node.insert("progress_z".to_string(), KvValue::Float(progress.per_axis[2]));
    node.insert("distance_x".to_string(), KvValue::Float(progress.delta.x));
    node.insert("distance_y".to_string(), KvValue::Float(progress.delta.y));
    node.insert("distance_z".to_string(), KvValue::Float(progress.delta.z));
    node.insert("center_x".to_string(), KvValue::Float(initial[0].value));
    node.insert("center_y".to_string(), KvValue::Float(initial[1].value));
    node.insert("center_z".to_string(), KvValue::Float(initial[2].value));
    node
}
