//! Constant-force motor.
//!
//! Installs an add-force directive on its selection; completion follows the
//! same centroid-displacement rule as the move motor. Unlike the move
//! motor the selection keeps being time-integrated, so the realized
//! displacement depends on the system's response to the force.

use log::info;

use crate::atoms::{AtomId, AtomSet};
use crate::command::MotorCommand;
use crate::units::{DistanceQuantity, ForceQuantity, UnitSystem};
use crate::vector::Vec3;

use super::linear::{initial_move_node, move_node};
use super::{axis_progress, MotorUpdate};

#[derive(Debug, Clone)]
pub struct ForceMotor {
    state: AtomSet,
    fx: ForceQuantity,
    fy: ForceQuantity,
    fz: ForceQuantity,
    check_x: bool,
    check_y: bool,
    check_z: bool,
    dx: DistanceQuantity,
    dy: DistanceQuantity,
    dz: DistanceQuantity,
    initial_center: Option<[DistanceQuantity; 3]>,
}

impl ForceMotor {
    pub(crate) const FIELDS: &'static [&'static str] = super::linear::MoveMotor::FIELDS;

    pub fn new(
        state: AtomSet,
        force: [ForceQuantity; 3],
        checks: [bool; 3],
        targets: [DistanceQuantity; 3],
    ) -> Self {
        ForceMotor {
            state,
            fx: force[0],
            fy: force[1],
            fz: force[2],
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
        MotorCommand::AddForce {
            origin: origin.to_string(),
            fx: self.fx.value,
            fy: self.fy.value,
            fz: self.fz.value,
            funits: self.fx.unit,
            selection: self.state.selection_vec(),
        }
    }

    pub(crate) fn convert_settings_to(&mut self, dest: UnitSystem) {
        let _ = self.fx.convert_to(dest);
        let _ = self.fy.convert_to(dest);
        let _ = self.fz.convert_to(dest);
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
