//! # Command Module - Biasing Directives for the Simulator
//!
//! Motors express their intent as [`MotorCommand`] records: a tagged union
//! over the five biasing kinds, carrying the parameters in wire units (the
//! unit tag travels alongside each value so the simulator side can
//! re-convert) and the selection of global atom ids. The engine batches one
//! command per active motor per cycle; the simulator side turns a batch
//! into an ordered, undoable directive script via [`script`].

// Do/undo directive scripts
pub mod script;

use serde::{Deserialize, Serialize};

use crate::atoms::AtomId;
use crate::units::UnitSystem;

/// A biasing directive for one interval.
///
/// Variant order is part of the wire contract: the bincode variant index is
/// the `cmdType` code (`Wait = 0`, `Rotate = 1`, `Move = 2`,
/// `AddForce = 3`, `AddTorque = 4`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MotorCommand {
    /// Progress-only placeholder; the simulator installs no fix for it.
    Wait { origin: String },
    /// Prescribed rotation of the selection about a fixed axis.
    Rotate {
        origin: String,
        px: f64,
        py: f64,
        pz: f64,
        punits: UnitSystem,
        ax: f64,
        ay: f64,
        az: f64,
        period: f64,
        periodunits: UnitSystem,
        selection: Vec<AtomId>,
    },
    /// Linear motion of the selection at a fixed velocity.
    Move {
        origin: String,
        vx: f64,
        vy: f64,
        vz: f64,
        vunits: UnitSystem,
        selection: Vec<AtomId>,
    },
    /// Constant force added to the selection.
    AddForce {
        origin: String,
        fx: f64,
        fy: f64,
        fz: f64,
        funits: UnitSystem,
        selection: Vec<AtomId>,
    },
    /// Constant torque added to the selection.
    AddTorque {
        origin: String,
        tx: f64,
        ty: f64,
        tz: f64,
        tunits: UnitSystem,
        selection: Vec<AtomId>,
    },
}

impl MotorCommand {
    /// The wire code of this command kind.
    pub fn cmd_type(&self) -> u32 {
        match self {
            MotorCommand::Wait { .. } => 0,
            MotorCommand::Rotate { .. } => 1,
            MotorCommand::Move { .. } => 2,
            MotorCommand::AddForce { .. } => 3,
            MotorCommand::AddTorque { .. } => 4,
        }
    }

    /// The motor this command originates from; group and fix identifiers
    /// on the simulator side are derived from it.
    pub fn origin(&self) -> &str {
        match self {
            MotorCommand::Wait { origin }
            | MotorCommand::Rotate { origin, .. }
            | MotorCommand::Move { origin, .. }
            | MotorCommand::AddForce { origin, .. }
            | MotorCommand::AddTorque { origin, .. } => origin,
        }
    }

    /// The selection the directive acts on. Empty for `Wait`.
    pub fn selection(&self) -> &[AtomId] {
        match self {
            MotorCommand::Wait { .. } => &[],
            MotorCommand::Rotate { selection, .. }
            | MotorCommand::Move { selection, .. }
            | MotorCommand::AddForce { selection, .. }
            | MotorCommand::AddTorque { selection, .. } => selection,
        }
    }

    /// Whether the selection still needs time integration while the
    /// directive is installed. Move and Rotate prescribe the kinematics
    /// deterministically, so their groups are excluded from the
    /// integration fix; Wait has no group at all.
    pub fn needs_integration(&self) -> bool {
        !matches!(
            self,
            MotorCommand::Move { .. } | MotorCommand::Rotate { .. }
        )
    }

    /// The simulator-side group holding the selection, `None` for `Wait`.
    pub fn group_name(&self) -> Option<String> {
        match self {
            MotorCommand::Wait { .. } => None,
            _ => Some(format!("{}GRP", self.origin())),
        }
    }

    /// The simulator-side fix identifier, `None` for `Wait`.
    pub fn fix_name(&self) -> Option<String> {
        match self {
            MotorCommand::Wait { .. } => None,
            _ => Some(format!("{}FIX", self.origin())),
        }
    }

    /// Encodes the record into its compact wire form.
    pub fn encode(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Decodes a record from its compact wire form.
    pub fn decode(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

/// The outgoing command batch of one cycle, ordered by motor enumeration
/// order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandBatch {
    #[serde(rename = "lmpcmds")]
    pub commands: Vec<MotorCommand>,
}

impl CommandBatch {
    /// A batch carrying no commands (thermalization cycles).
    pub fn empty() -> Self {
        CommandBatch::default()
    }

    pub fn push(&mut self, command: MotorCommand) {
        self.commands.push(command);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }
}
