#[cfg(test)]
mod units {
    use std::io::Write;

    use super::super::{
        build, load_motor_document, test_setup, MotorDocument, NvtConfig,
        SUPPORTED_VERSION,
    };
    use crate::error::ConfigError;
    use crate::motor::{MotorKind, MotorStatus};
    use crate::units::UnitSystem;

    fn parse(json: &str) -> MotorDocument {
        serde_json::from_str(json).expect("document must deserialize")
    }

    fn minimal(motors_json: &str) -> String {
        format!(
            r#"{{
                "header": {{ "version": 1, "units": "LAMMPS_REAL" }},
                "motors": {}
            }}"#,
            motors_json
        )
    }

    #[test]
    fn loads_a_dependency_chain() {
        let json = minimal(
            r#"[
                { "type": "blank", "name": "a", "nbSteps": 100 },
                { "type": "blank", "name": "b", "nbSteps": 100, "dependencies": ["a"] },
                { "type": "move", "name": "c", "dependencies": ["b"],
                  "selection": [1, 2, 3, 4],
                  "vx": 0.001, "checkX": true, "dx": 1.0 }
            ]"#,
        );

        let config = build(parse(&json)).unwrap();
        assert_eq!(config.units, UnitSystem::LammpsReal);
        assert_eq!(config.motors.len(), 3);
        // Document order is preserved
        assert_eq!(config.motors[0].name(), "a");
        assert_eq!(config.motors[2].name(), "c");
        assert_eq!(config.motors[2].dependencies(), ["b".to_string()]);
        assert!(config.motors.iter().all(|m| m.status() == MotorStatus::Wait));
        assert!(matches!(config.motors[2].kind(), MotorKind::Move(_)));
    }

    #[test]
    fn rejects_wrong_version() {
        let json = r#"{
            "header": { "version": 99, "units": "LAMMPS_REAL" },
            "motors": [ { "type": "blank", "name": "a", "nbSteps": 10 } ]
        }"#;
        match build(parse(json)) {
            Err(ConfigError::Version { found: 99, expected }) => {
                assert_eq!(expected, SUPPORTED_VERSION);
            }
            other => panic!("expected version error, got {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_motor_type() {
        let json = minimal(r#"[ { "type": "warp", "name": "a" } ]"#);
        assert!(serde_json::from_str::<MotorDocument>(&json).is_err());
    }

    #[test]
    fn rejects_missing_period() {
        // Rotate without its period must not deserialize
        let json = minimal(
            r#"[ { "type": "rotate", "name": "r", "selection": [1],
                   "ax": 1.0, "requestedAngle": 90.0 } ]"#,
        );
        assert!(serde_json::from_str::<MotorDocument>(&json).is_err());
    }

    #[test]
    fn rejects_non_positive_period_and_angle() {
        let json = minimal(
            r#"[ { "type": "rotate", "name": "r", "selection": [1],
                   "ax": 1.0, "period": 0.0, "requestedAngle": 90.0 } ]"#,
        );
        assert!(matches!(
            build(parse(&json)),
            Err(ConfigError::Motor { .. })
        ));

        let json = minimal(
            r#"[ { "type": "torque", "name": "t", "selection": [1],
                   "tz": 0.1, "requestedAngle": -45.0 } ]"#,
        );
        assert!(matches!(
            build(parse(&json)),
            Err(ConfigError::Motor { .. })
        ));
    }

    #[test]
    fn rejects_zero_steps() {
        let json = minimal(r#"[ { "type": "blank", "name": "a", "nbSteps": 0 } ]"#);
        assert!(matches!(
            build(parse(&json)),
            Err(ConfigError::Motor { .. })
        ));
    }

    #[test]
    fn rejects_unknown_dependency() {
        let json = minimal(
            r#"[ { "type": "blank", "name": "a", "nbSteps": 10,
                   "dependencies": ["ghost"] } ]"#,
        );
        match build(parse(&json)) {
            Err(ConfigError::UnknownDependency { motor, dependency }) => {
                assert_eq!(motor, "a");
                assert_eq!(dependency, "ghost");
            }
            other => panic!("expected dependency error, got {:?}", other),
        }
    }

    #[test]
    fn rejects_self_dependency() {
        let json = minimal(
            r#"[ { "type": "blank", "name": "a", "nbSteps": 10,
                   "dependencies": ["a"] } ]"#,
        );
        assert!(matches!(build(parse(&json)), Err(ConfigError::Motor { .. })));
    }

    #[test]
    fn rejects_duplicate_names() {
        let json = minimal(
            r#"[ { "type": "blank", "name": "a", "nbSteps": 10 },
                 { "type": "blank", "name": "a", "nbSteps": 20 } ]"#,
        );
        assert!(matches!(
            build(parse(&json)),
            Err(ConfigError::DuplicateMotor(name)) if name == "a"
        ));
    }

    #[test]
    fn rejects_empty_motor_list() {
        let json = minimal("[]");
        assert!(matches!(build(parse(&json)), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_unsupported_forcefield() {
        let json = r#"{
            "header": { "version": 1, "units": "LAMMPS_REAL", "fftype": "eam" },
            "motors": [ { "type": "blank", "name": "a", "nbSteps": 10 } ]
        }"#;
        assert!(matches!(
            build(parse(json)),
            Err(ConfigError::Forcefield(ff)) if ff == "eam"
        ));
    }

    #[test]
    fn collects_anchors_and_thermostats() {
        let json = r#"{
            "header": { "version": 1, "units": "LAMMPS_METAL", "fftype": "rebo" },
            "anchors": [
                { "selection": [1, 2] },
                { "selection": [7] }
            ],
            "thermostats": [
                { "type": "langevin", "name": "bath", "selection": [3, 4],
                  "startTemp": 250.0, "endTemp": 350.0, "damp": 500.0, "seed": 42 }
            ],
            "nvtConfig": { "type": "nvtPhase", "steps": 2000, "endTemp": 300.0 },
            "motors": [ { "type": "blank", "name": "a", "nbSteps": 10 } ]
        }"#;

        let config = build(parse(json)).unwrap();
        assert!(config.has_permanent_anchor());
        assert_eq!(config.anchor_ids, vec![1, 2, 7]);
        assert_eq!(config.fftype.as_deref(), Some("rebo"));

        assert_eq!(config.thermostats.len(), 1);
        let bath = &config.thermostats[0];
        assert_eq!(bath.name, "bath");
        assert_eq!(bath.start_temp, 250.0);
        // damp is a time quantity in header units
        assert_eq!(bath.damp.value, 500.0);
        assert_eq!(bath.damp.unit, UnitSystem::LammpsMetal);

        match config.nvt {
            Some(NvtConfig::NvtPhase { steps, end_temp, .. }) => {
                assert_eq!(steps, 2000);
                assert_eq!(end_temp, 300.0);
            }
            other => panic!("expected nvtPhase, got {:?}", other),
        }
    }

    #[test]
    fn rejects_empty_anchor_selection() {
        let json = r#"{
            "header": { "version": 1, "units": "LAMMPS_REAL" },
            "anchors": [ { "selection": [] } ],
            "motors": [ { "type": "blank", "name": "a", "nbSteps": 10 } ]
        }"#;
        assert!(matches!(build(parse(json)), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn load_reads_a_file_from_disk() {
        let json = minimal(r#"[ { "type": "blank", "name": "a", "nbSteps": 10 } ]"#);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = load_motor_document(file.path()).unwrap();
        assert_eq!(config.motors.len(), 1);
    }

    #[test]
    fn load_reports_missing_file() {
        let missing = std::path::Path::new("/nonexistent/motors.json");
        assert!(matches!(
            load_motor_document(missing),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_setup_declares_one_blank_motor() {
        let config = test_setup();
        assert_eq!(config.motors.len(), 1);
        assert_eq!(config.motors[0].name(), "testWait");
        assert!(matches!(config.motors[0].kind(), MotorKind::Blank(_)));
    }
}
