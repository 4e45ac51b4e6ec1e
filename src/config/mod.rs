//! # Config Module - Motor Graph Document
//!
//! Parses the declarative JSON document describing a steering run: the
//! header (schema version, unit system, forcefield type), the permanent
//! anchors, the thermostats and thermalization settings consumed by the
//! simulator side, and the motor graph itself. Validation is strict:
//! version mismatches, unknown motor kinds, missing required fields,
//! non-positive periods or angles, duplicate names and unknown
//! dependencies are all fatal before the first cycle.
//!
//! The loader yields constructed [`Motor`] instances bound to the header's
//! unit system, in document order; the engine re-homes them to the
//! simulator's units when the first frame arrives.

// Unit tests
pub mod tests;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::atoms::{AtomId, AtomSet};
use crate::error::ConfigError;
use crate::motor::blank::BlankMotor;
use crate::motor::force::ForceMotor;
use crate::motor::linear::MoveMotor;
use crate::motor::rotate::RotateMotor;
use crate::motor::torque::TorqueMotor;
use crate::motor::{Motor, MotorKind};
use crate::units::{
    DistanceQuantity, ForceQuantity, TimeQuantity, TorqueQuantity, UnitSystem,
    VelocityQuantity,
};

/// Schema version this build understands.
pub const SUPPORTED_VERSION: u32 = 1;

/// Simulator-side group name holding the permanently anchored atoms.
pub const PERMANENT_ANCHOR_GROUP: &str = "permanentAnchor";

const SUPPORTED_FORCEFIELDS: [&str; 4] = ["airebo", "rebo", "airebo-m", "reax"];

fn default_temp() -> f64 {
    300.0
}

fn default_damp() -> f64 {
    1000.0
}

fn default_seed() -> u64 {
    123456789
}

/// The raw document, as deserialized from JSON.
#[derive(Debug, Deserialize)]
pub struct MotorDocument {
    pub header: Header,
    #[serde(default)]
    pub anchors: Vec<AnchorConfig>,
    #[serde(default)]
    pub thermostats: Vec<ThermostatConfig>,
    #[serde(rename = "nvtConfig", default)]
    pub nvt_config: Option<NvtConfig>,
    #[serde(default)]
    pub motors: Vec<MotorEntry>,
}

#[derive(Debug, Deserialize)]
pub struct Header {
    pub version: u32,
    pub units: UnitSystem,
    #[serde(default)]
    pub fftype: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnchorConfig {
    pub selection: Vec<AtomId>,
}

/// A thermostat acting on a selection during the production phase.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ThermostatConfig {
    #[serde(rename = "langevin")]
    Langevin {
        selection: Vec<AtomId>,
        name: String,
        #[serde(rename = "startTemp", default = "default_temp")]
        start_temp: f64,
        #[serde(rename = "endTemp", default = "default_temp")]
        end_temp: f64,
        #[serde(default = "default_damp")]
        damp: f64,
        #[serde(default = "default_seed")]
        seed: u64,
    },
}

/// How the simulator thermalizes the system before production.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum NvtConfig {
    /// Draw initial velocities once and start production directly.
    #[serde(rename = "createVelocity")]
    CreateVelocity {
        #[serde(default = "default_temp")]
        temp: f64,
        #[serde(default = "default_seed")]
        seed: u64,
    },
    /// Run a dedicated thermalization phase.
    #[serde(rename = "nvtPhase")]
    NvtPhase {
        #[serde(default = "default_nvt_steps")]
        steps: u64,
        #[serde(rename = "startTemp", default)]
        start_temp: f64,
        #[serde(rename = "endTemp", default = "default_temp")]
        end_temp: f64,
        #[serde(default = "default_damp")]
        damp: f64,
        #[serde(default = "default_seed")]
        seed: u64,
    },
}

fn default_nvt_steps() -> u64 {
    1000
}

/// One motor entry of the document.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum MotorEntry {
    #[serde(rename = "blank")]
    Blank {
        name: String,
        #[serde(default)]
        dependencies: Vec<String>,
        #[serde(rename = "nbSteps")]
        nb_steps: u64,
    },
    #[serde(rename = "move")]
    Move {
        name: String,
        #[serde(default)]
        dependencies: Vec<String>,
        selection: Vec<AtomId>,
        #[serde(default)]
        vx: f64,
        #[serde(default)]
        vy: f64,
        #[serde(default)]
        vz: f64,
        #[serde(rename = "checkX", default)]
        check_x: bool,
        #[serde(rename = "checkY", default)]
        check_y: bool,
        #[serde(rename = "checkZ", default)]
        check_z: bool,
        #[serde(default)]
        dx: f64,
        #[serde(default)]
        dy: f64,
        #[serde(default)]
        dz: f64,
    },
    #[serde(rename = "force")]
    Force {
        name: String,
        #[serde(default)]
        dependencies: Vec<String>,
        selection: Vec<AtomId>,
        #[serde(default)]
        fx: f64,
        #[serde(default)]
        fy: f64,
        #[serde(default)]
        fz: f64,
        #[serde(rename = "checkX", default)]
        check_x: bool,
        #[serde(rename = "checkY", default)]
        check_y: bool,
        #[serde(rename = "checkZ", default)]
        check_z: bool,
        #[serde(default)]
        dx: f64,
        #[serde(default)]
        dy: f64,
        #[serde(default)]
        dz: f64,
    },
    #[serde(rename = "torque")]
    Torque {
        name: String,
        #[serde(default)]
        dependencies: Vec<String>,
        selection: Vec<AtomId>,
        #[serde(default)]
        tx: f64,
        #[serde(default)]
        ty: f64,
        #[serde(default)]
        tz: f64,
        #[serde(rename = "requestedAngle")]
        requested_angle: f64,
    },
    #[serde(rename = "rotate")]
    Rotate {
        name: String,
        #[serde(default)]
        dependencies: Vec<String>,
        selection: Vec<AtomId>,
        #[serde(default)]
        px: f64,
        #[serde(default)]
        py: f64,
        #[serde(default)]
        pz: f64,
        #[serde(default)]
        ax: f64,
        #[serde(default)]
        ay: f64,
        #[serde(default)]
        az: f64,
        period: f64,
        #[serde(rename = "requestedAngle")]
        requested_angle: f64,
    },
}

impl MotorEntry {
    pub fn name(&self) -> &str {
        match self {
            MotorEntry::Blank { name, .. }
            | MotorEntry::Move { name, .. }
            | MotorEntry::Force { name, .. }
            | MotorEntry::Torque { name, .. }
            | MotorEntry::Rotate { name, .. } => name,
        }
    }

    pub fn dependencies(&self) -> &[String] {
        match self {
            MotorEntry::Blank { dependencies, .. }
            | MotorEntry::Move { dependencies, .. }
            | MotorEntry::Force { dependencies, .. }
            | MotorEntry::Torque { dependencies, .. }
            | MotorEntry::Rotate { dependencies, .. } => dependencies,
        }
    }
}

/// A validated langevin thermostat, damp re-homed to a typed quantity.
#[derive(Debug, Clone)]
pub struct Thermostat {
    pub name: String,
    pub selection: Vec<AtomId>,
    pub start_temp: f64,
    pub end_temp: f64,
    pub damp: TimeQuantity,
    pub seed: u64,
}

/// The validated run configuration.
#[derive(Debug)]
pub struct EngineConfig {
    pub units: UnitSystem,
    pub fftype: Option<String>,
    /// Union of all anchor selections; non-empty means the simulator side
    /// declares the permanent anchor group.
    pub anchor_ids: Vec<AtomId>,
    pub thermostats: Vec<Thermostat>,
    pub nvt: Option<NvtConfig>,
    /// Constructed motors in document order.
    pub motors: Vec<Motor>,
}

impl EngineConfig {
    pub fn has_permanent_anchor(&self) -> bool {
        !self.anchor_ids.is_empty()
    }
}

/// Reads and validates a motor document from disk.
pub fn load_motor_document(path: &Path) -> Result<EngineConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let document: MotorDocument =
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    build(document)
}

/// Validates a parsed document and constructs the motors.
pub fn build(document: MotorDocument) -> Result<EngineConfig, ConfigError> {
    if document.header.version != SUPPORTED_VERSION {
        return Err(ConfigError::Version {
            found: document.header.version,
            expected: SUPPORTED_VERSION,
        });
    }

    if let Some(fftype) = &document.header.fftype {
        if !SUPPORTED_FORCEFIELDS.contains(&fftype.as_str()) {
            return Err(ConfigError::Forcefield(fftype.clone()));
        }
    }

    let units = document.header.units;

    let mut anchor_ids = Vec::new();
    for anchor in &document.anchors {
        if anchor.selection.is_empty() {
            return Err(ConfigError::Invalid(
                "anchor with an empty selection".to_string(),
            ));
        }
        anchor_ids.extend_from_slice(&anchor.selection);
    }

    let thermostats = document
        .thermostats
        .iter()
        .map(|thermostat| match thermostat {
            ThermostatConfig::Langevin {
                selection,
                name,
                start_temp,
                end_temp,
                damp,
                seed,
            } => Thermostat {
                name: name.clone(),
                selection: selection.clone(),
                start_temp: *start_temp,
                end_temp: *end_temp,
                damp: TimeQuantity::new(*damp, units),
                seed: *seed,
            },
        })
        .collect();

    if document.motors.is_empty() {
        return Err(ConfigError::Invalid(
            "the document declares no motors".to_string(),
        ));
    }

    // Names must be unique before dependencies can be resolved.
    let mut names = HashSet::new();
    for entry in &document.motors {
        if !names.insert(entry.name().to_string()) {
            return Err(ConfigError::DuplicateMotor(entry.name().to_string()));
        }
    }

    for entry in &document.motors {
        for dependency in entry.dependencies() {
            if !names.contains(dependency) {
                return Err(ConfigError::UnknownDependency {
                    motor: entry.name().to_string(),
                    dependency: dependency.clone(),
                });
            }
            if dependency == entry.name() {
                return Err(ConfigError::Motor {
                    motor: entry.name().to_string(),
                    reason: "a motor cannot depend on itself".to_string(),
                });
            }
        }
    }

    let motors = document
        .motors
        .iter()
        .map(|entry| build_motor(entry, units))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(EngineConfig {
        units,
        fftype: document.header.fftype,
        anchor_ids,
        thermostats,
        nvt: document.nvt_config,
        motors,
    })
}

/// The built-in test setup: one blank motor, mirroring the `--testmotors`
/// path of the launcher.
pub fn test_setup() -> EngineConfig {
    EngineConfig {
        units: UnitSystem::LammpsReal,
        fftype: None,
        anchor_ids: Vec::new(),
        thermostats: Vec::new(),
        nvt: None,
        motors: vec![Motor::new(
            "testWait",
            Vec::new(),
            MotorKind::Blank(BlankMotor::new(30000)),
        )],
    }
}

fn build_motor(entry: &MotorEntry, units: UnitSystem) -> Result<Motor, ConfigError> {
    let kind = match entry {
        MotorEntry::Blank { name, nb_steps, .. } => {
            if *nb_steps < 1 {
                return Err(ConfigError::Motor {
                    motor: name.clone(),
                    reason: "nbSteps must be at least 1".to_string(),
                });
            }
            MotorKind::Blank(BlankMotor::new(*nb_steps))
        }
        MotorEntry::Move {
            selection,
            vx,
            vy,
            vz,
            check_x,
            check_y,
            check_z,
            dx,
            dy,
            dz,
            ..
        } => MotorKind::Move(MoveMotor::new(
            AtomSet::from_ids(selection),
            [
                VelocityQuantity::new(*vx, units),
                VelocityQuantity::new(*vy, units),
                VelocityQuantity::new(*vz, units),
            ],
            [*check_x, *check_y, *check_z],
            [
                DistanceQuantity::new(*dx, units),
                DistanceQuantity::new(*dy, units),
                DistanceQuantity::new(*dz, units),
            ],
        )),
        MotorEntry::Force {
            selection,
            fx,
            fy,
            fz,
            check_x,
            check_y,
            check_z,
            dx,
            dy,
            dz,
            ..
        } => MotorKind::Force(ForceMotor::new(
            AtomSet::from_ids(selection),
            [
                ForceQuantity::new(*fx, units),
                ForceQuantity::new(*fy, units),
                ForceQuantity::new(*fz, units),
            ],
            [*check_x, *check_y, *check_z],
            [
                DistanceQuantity::new(*dx, units),
                DistanceQuantity::new(*dy, units),
                DistanceQuantity::new(*dz, units),
            ],
        )),
        MotorEntry::Torque {
            name,
            selection,
            tx,
            ty,
            tz,
            requested_angle,
            ..
        } => {
            if *requested_angle <= 0.0 {
                return Err(ConfigError::Motor {
                    motor: name.clone(),
                    reason: "requestedAngle must be positive; flip the torque \
                             vector for a negative rotation"
                        .to_string(),
                });
            }
            MotorKind::Torque(TorqueMotor::new(
                AtomSet::from_ids(selection),
                [
                    TorqueQuantity::new(*tx, units),
                    TorqueQuantity::new(*ty, units),
                    TorqueQuantity::new(*tz, units),
                ],
                *requested_angle,
            ))
        }
        MotorEntry::Rotate {
            name,
            selection,
            px,
            py,
            pz,
            ax,
            ay,
            az,
            period,
            requested_angle,
            ..
        } => {
            if *period <= 0.0 {
                return Err(ConfigError::Motor {
                    motor: name.clone(),
                    reason: "period must be positive".to_string(),
                });
            }
            if *requested_angle <= 0.0 {
                return Err(ConfigError::Motor {
                    motor: name.clone(),
                    reason: "requestedAngle must be positive; flip the rotation \
                             axis for a negative rotation"
                        .to_string(),
                });
            }
            MotorKind::Rotate(RotateMotor::new(
                AtomSet::from_ids(selection),
                [
                    DistanceQuantity::new(*px, units),
                    DistanceQuantity::new(*py, units),
                    DistanceQuantity::new(*pz, units),
                ],
                [*ax, *ay, *az],
                TimeQuantity::new(*period, units),
                *requested_angle,
            ))
        }
    };

    Ok(Motor::new(
        entry.name(),
        entry.dependencies().to_vec(),
        kind,
    ))
}
