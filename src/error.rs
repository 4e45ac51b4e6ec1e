//! Error kinds for the steering engine.
//!
//! Configuration and graph problems are detected before the first cycle;
//! frame and motor problems abort a running loop; conversion and telemetry
//! problems are reported to the caller but handled locally (zeroed value,
//! dropped frame). The binary maps these kinds onto the process exit codes.

use thiserror::Error;

use crate::units::{QuantityKind, UnitSystem};

/// A unit conversion was requested between two systems for which no table
/// entry exists. The quantity involved has been zeroed and must not be used
/// as a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no {kind} conversion between {from} and {to} is implemented")]
pub struct ConversionError {
    pub kind: QuantityKind,
    pub from: UnitSystem,
    pub to: UnitSystem,
}

/// Malformed or inconsistent configuration document. Fatal at load time.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to parse transport configuration {path}: {reason}")]
    Transport { path: String, reason: String },
    #[error("unsupported configuration version {found}, this build expects {expected}")]
    Version { found: u32, expected: u32 },
    #[error("unsupported forcefield type \"{0}\"")]
    Forcefield(String),
    #[error("motor \"{motor}\": {reason}")]
    Motor { motor: String, reason: String },
    #[error("duplicate motor name \"{0}\"")]
    DuplicateMotor(String),
    #[error("motor \"{motor}\" depends on unknown motor \"{dependency}\"")]
    UnknownDependency { motor: String, dependency: String },
    #[error("{0}")]
    Invalid(String),
}

/// The motor graph cannot make progress. Fatal at runtime.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error(
        "no motor can be started while {remaining} of them have not finished, \
         the dependency graph is cyclic or unsatisfiable"
    )]
    Stalled { remaining: usize },
}

/// The inbound frame violated the contract with the simulator. Fatal.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame chunks disagree on the simulation iteration ({first} vs {other})")]
    IterationMismatch { first: u64, other: u64 },
    #[error("atom ids are not a permutation of 1..={expected} (offending id {id})")]
    NotAPermutation { expected: usize, id: u32 },
    #[error("received a frame with no atoms")]
    Empty,
    #[error("chunk position buffer length {positions} does not match {ids} ids")]
    LayoutMismatch { ids: usize, positions: usize },
}

/// A motor transitioned to FAILED. Fatal to the run; telemetry is flushed
/// before the process exits.
#[derive(Debug, Error)]
#[error("motor \"{motor}\" failed at iteration {sim_it}")]
pub struct MotorFailure {
    pub motor: String,
    pub sim_it: u64,
}

/// A telemetry sink refused a commit. Non-fatal; the frame is dropped.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("out-of-order commit to writer \"{writer}\": frame {frame} after {last}")]
    OutOfOrder { writer: String, frame: u64, last: u64 },
}

/// Failures of the message-passing substrate.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport closed unexpectedly")]
    Closed,
    #[error("transport signalled an error")]
    Signalled,
    #[error("failed to decode an inbound payload: {0}")]
    Decode(String),
    #[error("transport io failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level runtime error of the engine loop.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Motor(#[from] MotorFailure),
    #[error(transparent)]
    Transport(#[from] TransportError),
}
