#[cfg(test)]
mod units {
    use super::super::convert::{conversion_factor, is_convertible};
    use super::super::{
        DistanceQuantity, ForceQuantity, QuantityKind, TimeQuantity,
        TorqueQuantity, UnitSystem, VelocityQuantity,
    };

    const ALL_SYSTEMS: [UnitSystem; 3] = [
        UnitSystem::LammpsReal,
        UnitSystem::LammpsMetal,
        UnitSystem::Gromacs,
    ];

    const ALL_KINDS: [QuantityKind; 5] = [
        QuantityKind::Distance,
        QuantityKind::Velocity,
        QuantityKind::Force,
        QuantityKind::Torque,
        QuantityKind::Time,
    ];

    #[test]
    fn diagonal_is_identity_for_every_kind() {
        for kind in ALL_KINDS {
            for system in ALL_SYSTEMS {
                assert_eq!(conversion_factor(kind, system, system), Some(1.0));
            }
        }
    }

    #[test]
    fn populated_pairs_are_exact_reciprocals() {
        // Round-trip law: converting a -> b -> a restores the value.
        for kind in ALL_KINDS {
            for from in ALL_SYSTEMS {
                for to in ALL_SYSTEMS {
                    let (Some(forward), Some(back)) = (
                        conversion_factor(kind, from, to),
                        conversion_factor(kind, to, from),
                    ) else {
                        continue;
                    };
                    let value = 3.25;
                    let round_trip = value * forward * back;
                    assert!(
                        ((round_trip - value) / value).abs() < 1e-12,
                        "{kind} {from}->{to} round trip drifted: {round_trip}"
                    );
                }
            }
        }
    }

    #[test]
    fn population_is_symmetric() {
        // If a -> b exists then b -> a must exist as well.
        for kind in ALL_KINDS {
            for from in ALL_SYSTEMS {
                for to in ALL_SYSTEMS {
                    assert_eq!(
                        is_convertible(kind, from, to),
                        is_convertible(kind, to, from),
                        "asymmetric population for {kind} {from}/{to}"
                    );
                }
            }
        }
    }

    #[test]
    fn distance_table_is_fully_populated() {
        for from in ALL_SYSTEMS {
            for to in ALL_SYSTEMS {
                assert!(is_convertible(QuantityKind::Distance, from, to));
            }
        }
    }

    #[test]
    fn distance_real_to_gromacs() {
        let mut d = DistanceQuantity::new(25.0, UnitSystem::LammpsReal);
        d.convert_to(UnitSystem::Gromacs).unwrap();
        assert_eq!(d.value, 2.5);
        assert_eq!(d.unit, UnitSystem::Gromacs);

        d.convert_to(UnitSystem::LammpsMetal).unwrap();
        assert_eq!(d.value, 25.0);
        assert_eq!(d.unit, UnitSystem::LammpsMetal);
    }

    #[test]
    fn velocity_real_metal_round_trip() {
        let mut v = VelocityQuantity::new(0.004, UnitSystem::LammpsReal);
        v.convert_to(UnitSystem::LammpsMetal).unwrap();
        assert!((v.value - 4.0).abs() < 1e-12);
        v.convert_to(UnitSystem::LammpsReal).unwrap();
        assert!((v.value - 0.004).abs() < 1e-15);
    }

    #[test]
    fn force_and_torque_share_the_energy_factor() {
        let mut f = ForceQuantity::new(1.0, UnitSystem::LammpsReal);
        let mut t = TorqueQuantity::new(1.0, UnitSystem::LammpsReal);
        f.convert_to(UnitSystem::LammpsMetal).unwrap();
        t.convert_to(UnitSystem::LammpsMetal).unwrap();
        assert_eq!(f.value, t.value);
        assert!((f.value - 0.0433641).abs() < 1e-12);
    }

    #[test]
    fn time_real_to_metal_is_physical() {
        // 1 ps is 1000 fs.
        let mut t = TimeQuantity::new(1.0, UnitSystem::LammpsReal);
        t.convert_to(UnitSystem::LammpsMetal).unwrap();
        assert_eq!(t.value, 1000.0);
    }

    #[test]
    fn unsupported_conversion_zeroes_and_reports() {
        let mut v = VelocityQuantity::new(7.5, UnitSystem::LammpsReal);
        let err = v.convert_to(UnitSystem::Gromacs).unwrap_err();

        // The quantity is no longer a measurement.
        assert_eq!(v.value, 0.0);
        // The tag still moves so later conversions stay consistent.
        assert_eq!(v.unit, UnitSystem::Gromacs);
        assert_eq!(err.kind, QuantityKind::Velocity);
        assert_eq!(err.from, UnitSystem::LammpsReal);
        assert_eq!(err.to, UnitSystem::Gromacs);
    }

    #[test]
    fn identity_conversion_is_lossless() {
        let mut q = DistanceQuantity::new(1.23456789, UnitSystem::Gromacs);
        q.convert_to(UnitSystem::Gromacs).unwrap();
        assert_eq!(q.value, 1.23456789);
    }

    #[test]
    fn unit_system_spellings() {
        assert_eq!(UnitSystem::parse("LAMMPS_REAL"), Some(UnitSystem::LammpsReal));
        assert_eq!(UnitSystem::parse("LAMMPS_METAL"), Some(UnitSystem::LammpsMetal));
        assert_eq!(UnitSystem::parse("GROMACS"), Some(UnitSystem::Gromacs));
        assert_eq!(UnitSystem::parse("SI"), None);

        assert_eq!(UnitSystem::parse_lammps("real"), Some(UnitSystem::LammpsReal));
        assert_eq!(UnitSystem::parse_lammps("metal"), Some(UnitSystem::LammpsMetal));
        assert_eq!(UnitSystem::parse_lammps("lj"), None);

        assert_eq!(UnitSystem::LammpsMetal.to_string(), "LAMMPS_METAL");
    }

    #[test]
    fn unit_system_serde_uses_config_spelling() {
        let json = serde_json::to_string(&UnitSystem::LammpsReal).unwrap();
        assert_eq!(json, "\"LAMMPS_REAL\"");
        let back: UnitSystem = serde_json::from_str("\"GROMACS\"").unwrap();
        assert_eq!(back, UnitSystem::Gromacs);
    }
}
