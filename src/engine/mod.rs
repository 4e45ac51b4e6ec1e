//! # Engine Module - Motor Scheduler
//!
//! The [`MotorEngine`] owns every motor of the run and drives them in
//! lock-step with the simulator. Each cycle it receives the merged,
//! id-sorted frame, advances the active motors, assembles the outgoing
//! command batch, records the cycle's telemetry tree, and finally promotes
//! motors whose dependencies have all succeeded.
//!
//! Motors live in an arena in configuration order; the pending and active
//! lists hold indices into it, so command order and promotion order are the
//! deterministic insertion order of the document. Dependency references
//! stay name-based and are resolved against the arena during promotion; a
//! motor never owns its dependencies.
//!
//! [`runner`] wraps the scheduler into the blocking transport loop used by
//! the binary.

// Transport-driven cycle loop
pub mod runner;

use std::collections::HashMap;
use std::path::Path;

use log::{error, info};

use crate::atoms::frame::{SimFrame, ThermoValue};
use crate::atoms::SimIt;
use crate::command::CommandBatch;
use crate::config::EngineConfig;
use crate::error::{GraphError, MotorFailure};
use crate::motor::{Motor, MotorStatus};
use crate::telemetry::csv::CsvWriter;
use crate::telemetry::{KvValue, KvsNode, TelemetryFrame};
use crate::units::UnitSystem;

/// Columns of the global thermodynamics table. Must match the thermo
/// fields the simulator driver extracts per cycle.
const GLOBAL_FIELDS: [&str; 6] = ["temp", "tot", "pot", "kin", "dt", "sim_t"];

/// The motor graph scheduler.
pub struct MotorEngine {
    motors: Vec<Motor>,
    index: HashMap<String, usize>,
    pending: Vec<usize>,
    active: Vec<usize>,

    current_it: SimIt,
    current_positions: Vec<f64>,
    current_kvs: KvsNode,

    global_csv: CsvWriter,
    current_units: UnitSystem,
}

impl MotorEngine {
    /// Creates the engine over a set of motors in configuration order and
    /// immediately starts every motor without unsatisfied dependencies.
    pub fn new(motors: Vec<Motor>) -> Self {
        let mut global_csv = CsvWriter::new("global", ';').with_index_label("simIt");
        global_csv.declare_field_names(&GLOBAL_FIELDS);

        let index = motors
            .iter()
            .enumerate()
            .map(|(i, motor)| (motor.name().to_string(), i))
            .collect();
        let pending = (0..motors.len()).collect();

        let mut engine = MotorEngine {
            motors,
            index,
            pending,
            active: Vec::new(),
            current_it: 0,
            current_positions: Vec::new(),
            current_kvs: KvsNode::new(),
            global_csv,
            current_units: UnitSystem::default(),
        };
        engine.promote_ready();
        engine
    }

    /// Creates the engine from a validated configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        let mut engine = MotorEngine::new(config.motors);
        engine.current_units = config.units;
        engine
    }

    pub fn motor(&self, name: &str) -> Option<&Motor> {
        self.index.get(name).map(|&i| &self.motors[i])
    }

    pub fn motors(&self) -> &[Motor] {
        &self.motors
    }

    /// Names of the currently active motors, in enumeration order.
    pub fn active_motor_names(&self) -> Vec<&str> {
        self.active
            .iter()
            .map(|&i| self.motors[i].name())
            .collect()
    }

    pub fn current_it(&self) -> SimIt {
        self.current_it
    }

    /// The sorted positions of the current cycle, for external consumers.
    pub fn current_positions(&self) -> &[f64] {
        &self.current_positions
    }

    /// The unit system the motors are currently expressed in.
    pub fn current_units(&self) -> UnitSystem {
        self.current_units
    }

    /// True iff every motor has reached SUCCESS.
    pub fn is_completed(&self) -> bool {
        self.motors
            .iter()
            .all(|motor| motor.status() == MotorStatus::Success)
    }

    /// The failure record of the first FAILED motor, if any.
    pub fn failed_motor(&self) -> Option<MotorFailure> {
        self.motors
            .iter()
            .find(|motor| motor.status() == MotorStatus::Failed)
            .map(|motor| MotorFailure {
                motor: motor.name().to_string(),
                sim_it: self.current_it,
            })
    }

    /// Re-homes every motor's settings to the simulator's unit system.
    /// Called once, when the first frame declares its units.
    pub fn convert_motors_to(&mut self, dest: UnitSystem) {
        info!("Converting motor settings to {}.", dest);
        for motor in &mut self.motors {
            motor.convert_settings_to(dest);
        }
        self.current_units = dest;
    }

    /// Absorbs a thermalization frame: the engine state advances but no
    /// motor runs.
    pub fn update_engine_state(&mut self, frame: &SimFrame) {
        self.current_it = frame.sim_it;
        self.current_positions.clear();
        self.current_positions.extend_from_slice(&frame.positions);
        self.current_kvs = KvsNode::new();
    }

    /// Advances every active motor against a production frame. Motor
    /// telemetry nodes are collected into the cycle's tree.
    pub fn update_motors_state(&mut self, frame: &SimFrame) {
        self.current_it = frame.sim_it;
        self.current_positions.clear();
        self.current_positions.extend_from_slice(&frame.positions);
        self.current_kvs = KvsNode::new();

        for i in 0..self.active.len() {
            let idx = self.active[i];
            let motor = &mut self.motors[idx];
            if let Some(node) =
                motor.update_state(frame.sim_it, &frame.ids, &frame.positions)
            {
                self.current_kvs
                    .insert(motor.name().to_string(), KvValue::Node(node));
            }
        }
    }

    /// Collects one command per active motor, in enumeration order. Called
    /// before the lists are updated so that a motor reaching SUCCESS this
    /// cycle still contributes its final command.
    pub fn gather_commands(&self) -> CommandBatch {
        let mut batch = CommandBatch::empty();
        for &idx in &self.active {
            batch.push(self.motors[idx].emit_command());
        }
        batch
    }

    /// Removes finished motors from the active list and starts every
    /// pending motor whose dependencies have all succeeded. An empty
    /// active list while unfinished motors remain means the dependency
    /// graph cannot make progress.
    pub fn update_motor_lists(&mut self) -> Result<(), GraphError> {
        let motors = &self.motors;
        self.active.retain(|&idx| {
            let motor = &motors[idx];
            if motor.status() == MotorStatus::Success {
                info!("Motor {} removed from the active list.", motor.name());
            }
            motor.status() == MotorStatus::Running
        });

        let statuses: HashMap<String, MotorStatus> = self
            .motors
            .iter()
            .map(|motor| (motor.name().to_string(), motor.status()))
            .collect();

        let mut still_pending = Vec::new();
        for &idx in &self.pending.clone() {
            let startable = self.motors[idx]
                .can_start(|name| statuses.get(name).copied());
            if startable {
                info!("Starting the motor {}.", self.motors[idx].name());
                self.motors[idx].start();
                self.active.push(idx);
            } else {
                still_pending.push(idx);
            }
        }
        self.pending = still_pending;

        let remaining = self
            .motors
            .iter()
            .filter(|motor| !motor.status().is_terminal())
            .count();
        if self.active.is_empty() && remaining > 0 {
            return Err(GraphError::Stalled { remaining });
        }
        Ok(())
    }

    /// Attaches the frame's thermodynamics as the `global` child of the
    /// cycle's telemetry tree.
    pub fn add_global_kvs(&mut self, thermo: &std::collections::BTreeMap<String, ThermoValue>) {
        let node: KvsNode = thermo
            .iter()
            .map(|(key, &value)| (key.clone(), KvValue::from(value)))
            .collect();
        self.current_kvs
            .insert("global".to_string(), KvValue::Node(node));
    }

    /// Commits the cycle's global telemetry into the global table. The
    /// motors committed their own frames during the update phase.
    pub fn commit_kvs_frame(&mut self) {
        let empty = KvsNode::new();
        let global = match self.current_kvs.get("global") {
            Some(KvValue::Node(node)) => node,
            _ => &empty,
        };
        if let Err(err) = self.global_csv.append_frame(self.current_it, global) {
            error!("dropping global telemetry frame: {}", err);
        }
    }

    /// The cycle's telemetry record, as pushed to downstream observers.
    pub fn telemetry_frame(&self) -> TelemetryFrame {
        TelemetryFrame {
            sim_it: self.current_it,
            root: self.current_kvs.clone(),
        }
    }

    /// Flushes the global table and every motor table to `folder`.
    /// Telemetry is best effort: failures are logged and the run goes on.
    pub fn save_csv(&self, folder: &Path) {
        if let Err(err) = self.global_csv.write_file(folder) {
            error!("failed to write the global CSV: {}", err);
        }
        for motor in &self.motors {
            if let Err(err) = motor.write_csv_file(folder) {
                error!("failed to write the CSV of motor {}: {}", motor.name(), err);
            }
        }
    }

    /// Starts every pending motor that is startable up front (those with
    /// no dependencies). Mirrors the promotion done after loading.
    fn promote_ready(&mut self) {
        let statuses: HashMap<String, MotorStatus> = self
            .motors
            .iter()
            .map(|motor| (motor.name().to_string(), motor.status()))
            .collect();

        let mut still_pending = Vec::new();
        for &idx in &self.pending.clone() {
            let startable = self.motors[idx]
                .can_start(|name| statuses.get(name).copied());
            if startable {
                self.motors[idx].start();
                self.active.push(idx);
            } else {
                still_pending.push(idx);
            }
        }
        self.pending = still_pending;
    }
}
