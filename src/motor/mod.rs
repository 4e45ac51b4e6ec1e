//! # Motor Module - Biasing Actions with Completion Predicates
//!
//! A motor is a small state machine imposing one biasing action on a
//! selection of atoms and reporting when its geometric success criterion is
//! satisfied:
//!
//! ```text
//! WAIT --can_start()--> RUNNING --update_state()--> {RUNNING, SUCCESS, FAILED}
//! ```
//!
//! On its first running cycle a motor captures an initial geometric
//! reference (a centroid, a tracked atom) and emits an initial telemetry
//! frame without checking completion; on every later cycle it recomputes
//! its geometric quantity, records telemetry, and evaluates its completion
//! predicate. The five variants form a closed tagged union:
//!
//! - [`blank::BlankMotor`]: waits a fixed number of simulator steps
//! - [`linear::MoveMotor`]: pulls the selection at a fixed velocity
//! - [`force::ForceMotor`]: applies a constant force
//! - [`torque::TorqueMotor`]: applies a constant torque
//! - [`rotate::RotateMotor`]: prescribes a rotation about a fixed axis
//!
//! Motors never own their dependencies; they record dependency *names* and
//! the engine, which owns every motor, resolves statuses during promotion.

// Step-count placeholder motor
pub mod blank;
// Constant-force motor
pub mod force;
// Fixed-velocity motor
pub mod linear;
// Prescribed-rotation motor
pub mod rotate;
// Constant-torque motor
pub mod torque;
// Rotation-angle tracking shared by torque and rotate
pub mod tracker;
// Unit tests
pub mod tests;

use std::fmt;
use std::path::Path;

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::atoms::{AtomId, SimIt};
use crate::command::MotorCommand;
use crate::telemetry::csv::CsvWriter;
use crate::telemetry::KvsNode;
use crate::units::UnitSystem;
use crate::vector::Vec3;

use blank::BlankMotor;
use force::ForceMotor;
use linear::MoveMotor;
use rotate::RotateMotor;
use torque::TorqueMotor;

/// Lifecycle state of a motor. Transitions are monotonic; a terminal state
/// (SUCCESS or FAILED) is never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotorStatus {
    Wait,
    Running,
    Success,
    Failed,
}

impl MotorStatus {
    /// Whether the motor has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, MotorStatus::Success | MotorStatus::Failed)
    }
}

impl fmt::Display for MotorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MotorStatus::Wait => "WAIT",
            MotorStatus::Running => "RUNNING",
            MotorStatus::Success => "SUCCESS",
            MotorStatus::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Outcome of one kind-specific update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Progress {
    Running,
    Completed,
    Failed,
}

/// Telemetry and outcome of one kind-specific update. An empty node with a
/// `Running` outcome marks a no-op cycle (transient partial selection).
#[derive(Debug)]
pub(crate) struct MotorUpdate {
    pub node: KvsNode,
    pub progress: Progress,
}

impl MotorUpdate {
    pub(crate) fn running(node: KvsNode) -> Self {
        MotorUpdate {
            node,
            progress: Progress::Running,
        }
    }

    pub(crate) fn skipped() -> Self {
        MotorUpdate {
            node: KvsNode::new(),
            progress: Progress::Running,
        }
    }

    pub(crate) fn completed(node: KvsNode) -> Self {
        MotorUpdate {
            node,
            progress: Progress::Completed,
        }
    }

    pub(crate) fn failed() -> Self {
        MotorUpdate {
            node: KvsNode::new(),
            progress: Progress::Failed,
        }
    }
}

/// The kind-specific half of a motor.
#[derive(Debug, Clone)]
pub enum MotorKind {
    Blank(BlankMotor),
    Move(MoveMotor),
    Force(ForceMotor),
    Torque(TorqueMotor),
    Rotate(RotateMotor),
}

impl MotorKind {
    fn telemetry_fields(&self) -> &'static [&'static str] {
        match self {
            MotorKind::Blank(_) => BlankMotor::FIELDS,
            MotorKind::Move(_) => MoveMotor::FIELDS,
            MotorKind::Force(_) => ForceMotor::FIELDS,
            MotorKind::Torque(_) => TorqueMotor::FIELDS,
            MotorKind::Rotate(_) => RotateMotor::FIELDS,
        }
    }
}

/// A named motor: shared lifecycle plus the kind-specific behaviour.
#[derive(Debug, Clone)]
pub struct Motor {
    name: String,
    status: MotorStatus,
    dependencies: Vec<String>,
    writer: CsvWriter,
    kind: MotorKind,
}

impl Motor {
    /// Creates a motor in the WAIT state. The telemetry writer is bound to
    /// the motor name and the field list its kind declares.
    pub fn new(name: &str, dependencies: Vec<String>, kind: MotorKind) -> Self {
        let mut writer = CsvWriter::new(name, ';');
        writer.declare_field_names(kind.telemetry_fields());
        Motor {
            name: name.to_string(),
            status: MotorStatus::Wait,
            dependencies,
            writer,
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> MotorStatus {
        self.status
    }

    /// Dependency names, as declared in the configuration.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn kind(&self) -> &MotorKind {
        &self.kind
    }

    /// True iff the motor is waiting and every dependency has succeeded.
    /// A dependency that cannot be resolved counts as unsatisfied.
    pub fn can_start(
        &self,
        status_of: impl Fn(&str) -> Option<MotorStatus>,
    ) -> bool {
        if self.status != MotorStatus::Wait {
            return false;
        }
        self.dependencies
            .iter()
            .all(|dep| status_of(dep) == Some(MotorStatus::Success))
    }

    /// Transitions WAIT to RUNNING. Calling on any other state is a no-op
    /// that returns `false`.
    pub fn start(&mut self) -> bool {
        if self.status == MotorStatus::Wait {
            self.status = MotorStatus::Running;
            true
        } else {
            false
        }
    }

    /// Advances the motor by one cycle against the sorted frame.
    ///
    /// Returns the motor's telemetry node when it produced one; a motor
    /// that is not running, or whose selection was only partially present
    /// this cycle, returns `None` without mutating its state machine.
    /// Status changes (SUCCESS, FAILED) are applied before returning.
    pub fn update_state(
        &mut self,
        sim_it: SimIt,
        ids: &[AtomId],
        positions: &[f64],
    ) -> Option<KvsNode> {
        if self.status != MotorStatus::Running {
            return None;
        }

        let update = match &mut self.kind {
            MotorKind::Blank(motor) => motor.update(sim_it),
            MotorKind::Move(motor) => motor.update(&self.name, ids, positions),
            MotorKind::Force(motor) => motor.update(&self.name, ids, positions),
            MotorKind::Torque(motor) => motor.update(&self.name, ids, positions),
            MotorKind::Rotate(motor) => motor.update(&self.name, ids, positions),
        };

        match update.progress {
            Progress::Running => {}
            Progress::Completed => {
                info!(
                    "Motor {} completed successfully at iteration {}.",
                    self.name, sim_it
                );
                self.status = MotorStatus::Success;
            }
            Progress::Failed => {
                self.status = MotorStatus::Failed;
            }
        }

        if update.node.is_empty() {
            return None;
        }

        if let Err(err) = self.writer.append_frame(sim_it, &update.node) {
            error!("motor {}: dropping telemetry frame: {}", self.name, err);
        }
        Some(update.node)
    }

    /// The command this motor contributes to the cycle's batch. Emitted for
    /// every active motor, including on its success cycle; the simulator
    /// tears existing fixes down in the next undo phase.
    pub fn emit_command(&self) -> MotorCommand {
        match &self.kind {
            MotorKind::Blank(motor) => motor.command(&self.name),
            MotorKind::Move(motor) => motor.command(&self.name),
            MotorKind::Force(motor) => motor.command(&self.name),
            MotorKind::Torque(motor) => motor.command(&self.name),
            MotorKind::Rotate(motor) => motor.command(&self.name),
        }
    }

    /// Re-homes every quantity the motor owns to `dest`, including captured
    /// initial references.
    pub fn convert_settings_to(&mut self, dest: UnitSystem) {
        match &mut self.kind {
            MotorKind::Blank(_) => {}
            MotorKind::Move(motor) => motor.convert_settings_to(dest),
            MotorKind::Force(motor) => motor.convert_settings_to(dest),
            MotorKind::Torque(motor) => motor.convert_settings_to(dest),
            MotorKind::Rotate(motor) => motor.convert_settings_to(dest),
        }
    }

    /// Flushes the motor's telemetry table to `<folder>/<name>.csv`.
    pub fn write_csv_file(&self, folder: &Path) -> std::io::Result<()> {
        self.writer.write_file(folder)
    }
}

/// Per-axis displacement progress shared by the move and force motors.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AxisProgress {
    pub delta: Vec3,
    pub per_axis: [f64; 3],
    pub progress: f64,
    pub progress_min: f64,
    pub satisfied: bool,
}

/// Evaluates displacement `delta` against the per-axis targets.
///
/// Per-axis progress is the signed percentage toward the target, clamped to
/// ±100 so overshoot cannot inflate the aggregate; the aggregate is the
/// mean over the checked axes (100 when no axis is checked). The completion
/// predicate holds per axis when the axis is unchecked, or the displacement
/// has reached the target in the target's direction.
pub(crate) fn axis_progress(
    delta: Vec3,
    checks: [bool; 3],
    targets: [f64; 3],
) -> AxisProgress {
    let components = [delta.x, delta.y, delta.z];
    let mut per_axis = [0.0f64; 3];
    let mut aggregate = 0.0;
    let mut minimum = f64::INFINITY;
    let mut checked = 0usize;
    let mut satisfied = true;

    for axis in 0..3 {
        let moved = components[axis];
        let target = targets[axis];
        if checks[axis] {
            let pct = if target == 0.0 {
                100.0
            } else {
                ((moved / target) * 100.0).clamp(-100.0, 100.0)
            };
            per_axis[axis] = pct;
            aggregate += pct;
            minimum = minimum.min(pct);
            checked += 1;

            let reached = if target < 0.0 {
                moved <= target
            } else {
                moved >= target
            };
            satisfied = satisfied && reached;
        }
    }

    let (progress, progress_min) = if checked == 0 {
        (100.0, 100.0)
    } else {
        (aggregate / checked as f64, minimum)
    };

    AxisProgress {
        delta,
        per_axis,
        progress,
        progress_min,
        satisfied,
    }
}
