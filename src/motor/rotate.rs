//! Prescribed-rotation motor.
//!
//! Differs from the torque motor in two ways: the pivot is a fixed external
//! point rather than the selection's drifting centre, and the kinematic
//! command prescribes a rotation about the fixed axis with a given period
//! instead of applying a torque. Tracker selection, angle integration and
//! completion are shared with the torque motor.

use log::{error, info};

use crate::atoms::{AtomId, AtomSet};
use crate::command::MotorCommand;
use crate::units::{DistanceQuantity, TimeQuantity, UnitSystem};
use crate::vector::Vec3;

use super::torque::rotation_node;
use super::tracker::{AngleSample, RotationTracker};
use super::MotorUpdate;

#[derive(Debug, Clone)]
pub struct RotateMotor {
    state: AtomSet,
    px: DistanceQuantity,
    py: DistanceQuantity,
    pz: DistanceQuantity,
    ax: f64,
    ay: f64,
    az: f64,
    period: TimeQuantity,
    requested_angle_deg: f64,
    tracker: Option<RotationTracker>,
}

impl RotateMotor {
    pub(crate) const FIELDS: &'static [&'static str] = super::torque::TorqueMotor::FIELDS;

    /// The axis need not be normalised; `period` and `requested_angle_deg`
    /// must be positive, enforced at load time.
    pub fn new(
        state: AtomSet,
        pivot: [DistanceQuantity; 3],
        axis: [f64; 3],
        period: TimeQuantity,
        requested_angle_deg: f64,
    ) -> Self {
        RotateMotor {
            state,
            px: pivot[0],
            py: pivot[1],
            pz: pivot[2],
            ax: axis[0],
            ay: axis[1],
            az: axis[2],
            period,
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

        let pivot = Vec3::new(self.px.value, self.py.value, self.pz.value);

        let Some(tracker) = &mut self.tracker else {
            info!("Registering the initial state for the motor {}.", name);
            let axis = Vec3::new(self.ax, self.ay, self.az);
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
        MotorCommand::Rotate {
            origin: origin.to_string(),
            px: self.px.value,
            py: self.py.value,
            pz: self.pz.value,
            punits: self.px.unit,
            ax: self.ax,
            ay: self.ay,
            az: self.az,
            period: self.period.value,
            periodunits: self.period.unit,
            selection: self.state.selection_vec(),
        }
    }

    pub(crate) fn convert_settings_to(&mut self, dest: UnitSystem) {
        let _ = self.px.convert_to(dest);
        let _ = self.py.convert_to(dest);
        let _ = self.pz.convert_to(dest);
        let _ = self.period.convert_to(dest);
    }
}
