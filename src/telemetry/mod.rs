//! # Telemetry Module - Key-Value Stream and Tabular Sinks
//!
//! Every cycle the engine assembles a key-value tree with one child per
//! motor that updated plus a `global` child carrying the simulator
//! thermodynamics. The tree is pushed to downstream observers over the
//! transport and committed into CSV sinks owned by the engine and the
//! motors:
//!
//! - [`csv::CsvWriter`]: static schema, field list declared up front
//! - [`dynamic::DynamicCsvWriter`]: schema discovered across frames
//!
//! Committing is an in-memory append; flushing to disk is an explicit step
//! at the end of the run.

// Static-schema sink
pub mod csv;
// Schema-discovering sink
pub mod dynamic;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::atoms::frame::ThermoValue;
use crate::atoms::SimIt;

/// A value in the telemetry tree: a scalar leaf or a nested node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KvValue {
    UInt(u64),
    Int(i64),
    Float(f64),
    Text(String),
    Node(KvsNode),
}

/// One level of the telemetry tree.
pub type KvsNode = BTreeMap<String, KvValue>;

impl KvValue {
    /// Formats a scalar leaf into its CSV cell using the natural decimal
    /// representation of the runtime type. Returns `None` for a nested
    /// node, which has no tabular representation.
    pub fn as_cell(&self) -> Option<String> {
        match self {
            KvValue::UInt(v) => Some(v.to_string()),
            KvValue::Int(v) => Some(v.to_string()),
            KvValue::Float(v) => Some(v.to_string()),
            KvValue::Text(v) => Some(v.clone()),
            KvValue::Node(_) => None,
        }
    }
}

impl From<f64> for KvValue {
    fn from(v: f64) -> Self {
        KvValue::Float(v)
    }
}

impl From<u64> for KvValue {
    fn from(v: u64) -> Self {
        KvValue::UInt(v)
    }
}

impl From<i64> for KvValue {
    fn from(v: i64) -> Self {
        KvValue::Int(v)
    }
}

impl From<&str> for KvValue {
    fn from(v: &str) -> Self {
        KvValue::Text(v.to_string())
    }
}

impl From<ThermoValue> for KvValue {
    fn from(v: ThermoValue) -> Self {
        match v {
            ThermoValue::Int(i) => KvValue::Int(i as i64),
            ThermoValue::Float(f) => KvValue::Float(f),
        }
    }
}

/// The telemetry record of one cycle, as pushed to downstream observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryFrame {
    #[serde(rename = "simIt")]
    pub sim_it: SimIt,
    pub root: KvsNode,
}

impl TelemetryFrame {
    pub fn new(sim_it: SimIt) -> Self {
        TelemetryFrame {
            sim_it,
            root: KvsNode::new(),
        }
    }

    /// The `global` child, if the thermodynamics were attached.
    pub fn global(&self) -> Option<&KvsNode> {
        match self.root.get("global") {
            Some(KvValue::Node(node)) => Some(node),
            _ => None,
        }
    }

    /// The child node of one motor, if it updated this cycle.
    pub fn motor(&self, name: &str) -> Option<&KvsNode> {
        match self.root.get(name) {
            Some(KvValue::Node(node)) => Some(node),
            _ => None,
        }
    }
}
