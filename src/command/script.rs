//! Do/undo directive scripts.
//!
//! The simulator side installs the biasing fixes of one interval from a
//! command batch and removes them afterwards. The builder derives, per
//! command, a group-creation directive and the biasing fix, then two
//! synthetic groups: `nonintegrateGRP` (the union of groups whose
//! kinematics are prescribed) and `integrateGRP` (everything else minus an
//! optional permanent anchor), on which the simulator installs its single
//! time-integration fix. Undo directives run in reverse order and delete
//! the synthetic groups first, so a cycle is neutral with respect to the
//! group/fix namespace.

use super::{CommandBatch, MotorCommand};

const INTEGRATE_GROUP: &str = "integrateGRP";
const NON_INTEGRATE_GROUP: &str = "nonintegrateGRP";

/// Builds the do/undo scripts of one interval from a command batch.
#[derive(Debug, Clone, Default)]
pub struct ScriptBuilder {
    commands: Vec<MotorCommand>,
    permanent_anchor: Option<String>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        ScriptBuilder::default()
    }

    /// Declares the group of permanently anchored atoms; it is excluded
    /// from time integration in every interval.
    pub fn declare_permanent_anchor(&mut self, group: &str) {
        self.permanent_anchor = Some(group.to_string());
    }

    /// Loads the commands of one cycle, keeping the batch order.
    pub fn load_commands(&mut self, batch: &CommandBatch) {
        self.commands = batch.commands.clone();
    }

    /// The group the simulator must install its time-integration fix on.
    pub fn integration_group(&self) -> &str {
        INTEGRATE_GROUP
    }

    /// Groups whose kinematics are prescribed this interval.
    fn non_integration_groups(&self) -> Vec<String> {
        self.commands
            .iter()
            .filter(|cmd| !cmd.needs_integration())
            .filter_map(|cmd| cmd.group_name())
            .collect()
    }

    /// Appends the do-script: per-command group creation and biasing fix in
    /// batch order, then the two synthetic groups.
    pub fn write_do_commands(&self, cmds: &mut Vec<String>) {
        for command in &self.commands {
            self.write_single_do(command, cmds);
        }

        let kinematic = self.non_integration_groups();
        if kinematic.is_empty() {
            match &self.permanent_anchor {
                Some(anchor) => {
                    cmds.push(format!("group {} subtract all {}", INTEGRATE_GROUP, anchor))
                }
                None => cmds.push(format!("group {} union all", INTEGRATE_GROUP)),
            }
        } else {
            cmds.push(format!(
                "group {} union {}",
                NON_INTEGRATE_GROUP,
                kinematic.join(" ")
            ));
            match &self.permanent_anchor {
                Some(anchor) => cmds.push(format!(
                    "group {} subtract all {} {}",
                    INTEGRATE_GROUP, NON_INTEGRATE_GROUP, anchor
                )),
                None => cmds.push(format!(
                    "group {} subtract all {}",
                    INTEGRATE_GROUP, NON_INTEGRATE_GROUP
                )),
            }
        }
    }

    /// Appends the undo-script: synthetic groups first, then per-command
    /// teardown in reverse batch order.
    pub fn write_undo_commands(&self, cmds: &mut Vec<String>) {
        cmds.push(format!("group {} delete", INTEGRATE_GROUP));
        if !self.non_integration_groups().is_empty() {
            cmds.push(format!("group {} delete", NON_INTEGRATE_GROUP));
        }

        for command in self.commands.iter().rev() {
            let (Some(fix), Some(group)) = (command.fix_name(), command.group_name()) else {
                continue;
            };
            cmds.push(format!("unfix {}", fix));
            cmds.push(format!("group {} delete", group));
        }
    }

    fn write_single_do(&self, command: &MotorCommand, cmds: &mut Vec<String>) {
        let (Some(group), Some(fix)) = (command.group_name(), command.fix_name()) else {
            // Wait carries no group and no fix.
            return;
        };

        let ids: Vec<String> = command
            .selection()
            .iter()
            .map(|id| id.to_string())
            .collect();
        cmds.push(format!("group {} id {}", group, ids.join(" ")));

        match command {
            MotorCommand::Move { vx, vy, vz, .. } => {
                cmds.push(format!(
                    "fix {} {} move linear {} {} {}",
                    fix, group, vx, vy, vz
                ));
            }
            MotorCommand::Rotate {
                px,
                py,
                pz,
                ax,
                ay,
                az,
                period,
                ..
            } => {
                cmds.push(format!(
                    "fix {} {} move rotate {} {} {} {} {} {} {}",
                    fix, group, px, py, pz, ax, ay, az, period
                ));
            }
            MotorCommand::AddForce { fx, fy, fz, .. } => {
                cmds.push(format!(
                    "fix {} {} addforce {} {} {}",
                    fix, group, fx, fy, fz
                ));
            }
            MotorCommand::AddTorque { tx, ty, tz, .. } => {
                cmds.push(format!(
                    "fix {} {} addtorque {} {} {}",
                    fix, group, tx, ty, tz
                ));
            }
            MotorCommand::Wait { .. } => unreachable!("wait has no group"),
        }
    }
}
