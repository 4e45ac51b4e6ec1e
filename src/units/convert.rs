//! Conversion factor tables.
//!
//! One square table per quantity kind over the ordered pair `(from, to)`.
//! Diagonal cells are always the identity and populated off-diagonal pairs
//! are exact reciprocals of each other. Unpopulated cells return `None`.
//!
//! Reference magnitudes per system:
//! - distance: LAMMPS real/metal Å, Gromacs nm
//! - velocity: real Å/ps, metal Å/fs, Gromacs nm/ps (unimplemented)
//! - force: real (kcal/mol)/Å, metal eV/Å, Gromacs (unimplemented)
//! - torque: real kcal/mol, metal eV, Gromacs (unimplemented)
//! - time: real ps, metal fs, Gromacs ps (unimplemented)

use super::{QuantityKind, UnitSystem};

/// kcal/mol expressed in eV.
const KCAL_PER_MOL_IN_EV: f64 = 0.0433641;

/// Returns the multiplicative factor converting a value of `kind` from
/// `from` to `to`, or `None` when the cell is not populated.
pub const fn conversion_factor(
    kind: QuantityKind,
    from: UnitSystem,
    to: UnitSystem,
) -> Option<f64> {
    use QuantityKind::*;
    use UnitSystem::*;

    if from as u8 == to as u8 {
        return Some(1.0);
    }

    match (kind, from, to) {
        // Both LAMMPS conventions measure distance in angstroms.
        (Distance, LammpsReal, LammpsMetal) => Some(1.0),
        (Distance, LammpsMetal, LammpsReal) => Some(1.0),
        (Distance, LammpsReal, Gromacs) => Some(0.1),
        (Distance, LammpsMetal, Gromacs) => Some(0.1),
        (Distance, Gromacs, LammpsReal) => Some(10.0),
        (Distance, Gromacs, LammpsMetal) => Some(10.0),

        (Velocity, LammpsReal, LammpsMetal) => Some(1000.0),
        (Velocity, LammpsMetal, LammpsReal) => Some(1.0 / 1000.0),

        (Force, LammpsReal, LammpsMetal) => Some(KCAL_PER_MOL_IN_EV),
        (Force, LammpsMetal, LammpsReal) => Some(1.0 / KCAL_PER_MOL_IN_EV),

        (Torque, LammpsReal, LammpsMetal) => Some(KCAL_PER_MOL_IN_EV),
        (Torque, LammpsMetal, LammpsReal) => Some(1.0 / KCAL_PER_MOL_IN_EV),

        (Time, LammpsReal, LammpsMetal) => Some(1000.0),
        (Time, LammpsMetal, LammpsReal) => Some(1.0 / 1000.0),

        _ => None,
    }
}

/// Whether the `(from, to)` cell of `kind` is populated.
pub const fn is_convertible(
    kind: QuantityKind,
    from: UnitSystem,
    to: UnitSystem,
) -> bool {
    conversion_factor(kind, from, to).is_some()
}
