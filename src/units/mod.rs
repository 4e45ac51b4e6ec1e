//! # Units Module - Typed Physical Quantities
//!
//! The engine mediates between the unit system declared in the motor
//! configuration and the unit system the simulator actually runs in. Every
//! physical scalar therefore travels as a `(value, unit)` pair, one struct
//! per physical kind: distance, velocity, force, torque, and time.
//!
//! Conversion factors form a closed square table per kind, defined in
//! [`convert`]. The distance table is fully populated between all three
//! systems; the remaining kinds are only populated between the two
//! LAMMPS-style systems. Converting through an unpopulated cell zeroes the
//! value, logs at error level, and reports [`ConversionError`] to the
//! caller. Such cells are reachable only on misuse and a zero must never
//! be propagated as a measurement.
//!
//! ## Example
//! ```
//! use steering_lib::units::{DistanceQuantity, UnitSystem};
//!
//! let mut d = DistanceQuantity::new(25.0, UnitSystem::LammpsReal);
//! d.convert_to(UnitSystem::Gromacs).unwrap();
//! assert_eq!(d.value, 2.5);
//! assert_eq!(d.unit, UnitSystem::Gromacs);
//! ```

// Conversion table and factors
pub mod convert;
// Unit tests
pub mod tests;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConversionError;
use convert::conversion_factor;

/// The closed set of unit conventions understood by the engine.
///
/// Two LAMMPS-style systems and a Gromacs-style system. The simulator
/// declares its own system with every frame; motor settings are re-homed to
/// it when the first frame arrives.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitSystem {
    /// LAMMPS `real` convention (Å, kcal/mol, ps)
    #[default]
    LammpsReal,
    /// LAMMPS `metal` convention (Å, eV, fs)
    LammpsMetal,
    /// Gromacs convention (nm, kcal/mol, ps)
    Gromacs,
}

impl UnitSystem {
    /// Parses the configuration-file spelling of a unit system.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LAMMPS_REAL" => Some(UnitSystem::LammpsReal),
            "LAMMPS_METAL" => Some(UnitSystem::LammpsMetal),
            "GROMACS" => Some(UnitSystem::Gromacs),
            _ => None,
        }
    }

    /// Parses the `units` keyword spelling used by LAMMPS input scripts.
    pub fn parse_lammps(s: &str) -> Option<Self> {
        match s {
            "real" => Some(UnitSystem::LammpsReal),
            "metal" => Some(UnitSystem::LammpsMetal),
            _ => None,
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitSystem::LammpsReal => "LAMMPS_REAL",
            UnitSystem::LammpsMetal => "LAMMPS_METAL",
            UnitSystem::Gromacs => "GROMACS",
        };
        f.write_str(name)
    }
}

/// The physical kind a quantity belongs to; selects the conversion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantityKind {
    Distance,
    Velocity,
    Force,
    Torque,
    Time,
}

impl fmt::Display for QuantityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuantityKind::Distance => "distance",
            QuantityKind::Velocity => "velocity",
            QuantityKind::Force => "force",
            QuantityKind::Torque => "torque",
            QuantityKind::Time => "time",
        };
        f.write_str(name)
    }
}

macro_rules! quantity {
    ($(#[$doc:meta])* $name:ident, $kind:expr) => {
        $(#[$doc])*
        #[derive(
            Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize,
        )]
        pub struct $name {
            pub value: f64,
            pub unit: UnitSystem,
        }

        impl $name {
            pub fn new(value: f64, unit: UnitSystem) -> Self {
                Self { value, unit }
            }

            /// The physical kind of this quantity.
            pub fn kind(&self) -> QuantityKind {
                $kind
            }

            /// Converts the quantity in place to `dest`.
            ///
            /// On success the value is scaled and the unit tag updated; all
            /// further use of the quantity must assume the target system.
            /// When no table entry exists the value is zeroed, the unit tag
            /// is still updated, an error line is logged, and the caller is
            /// handed a [`ConversionError`]; the zero is not a measurement.
            pub fn convert_to(
                &mut self,
                dest: UnitSystem,
            ) -> Result<(), ConversionError> {
                match conversion_factor($kind, self.unit, dest) {
                    Some(factor) => {
                        self.value *= factor;
                        self.unit = dest;
                        Ok(())
                    }
                    None => {
                        let err = ConversionError {
                            kind: $kind,
                            from: self.unit,
                            to: dest,
                        };
                        log::error!("{}", err);
                        self.value = 0.0;
                        self.unit = dest;
                        Err(err)
                    }
                }
            }
        }
    };
}

quantity!(
    /// A length tagged with its unit system (fully convertible).
    DistanceQuantity,
    QuantityKind::Distance
);
quantity!(
    /// A velocity tagged with its unit system.
    VelocityQuantity,
    QuantityKind::Velocity
);
quantity!(
    /// A force tagged with its unit system.
    ForceQuantity,
    QuantityKind::Force
);
quantity!(
    /// A torque tagged with its unit system.
    TorqueQuantity,
    QuantityKind::Torque
);
quantity!(
    /// A duration tagged with its unit system.
    TimeQuantity,
    QuantityKind::Time
);
