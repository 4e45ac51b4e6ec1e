#[cfg(test)]
mod units {
    use crate::atoms::AtomSet;
    use crate::command::MotorCommand;
    use crate::motor::blank::BlankMotor;
    use crate::motor::force::ForceMotor;
    use crate::motor::linear::MoveMotor;
    use crate::motor::rotate::RotateMotor;
    use crate::motor::torque::TorqueMotor;
    use crate::motor::{Motor, MotorKind, MotorStatus};
    use crate::telemetry::KvValue;
    use crate::units::{
        DistanceQuantity, ForceQuantity, TimeQuantity, TorqueQuantity,
        UnitSystem, VelocityQuantity,
    };

    const REAL: UnitSystem = UnitSystem::LammpsReal;

    /// Sorted frame of `n` atoms; positions provided per atom.
    fn frame(positions: &[[f64; 3]]) -> (Vec<u32>, Vec<f64>) {
        let ids = (1..=positions.len() as u32).collect();
        let flat = positions.iter().flatten().copied().collect();
        (ids, flat)
    }

    fn float_field(node: &crate::telemetry::KvsNode, field: &str) -> f64 {
        match node.get(field) {
            Some(KvValue::Float(v)) => *v,
            other => panic!("field {} missing or non-float: {:?}", field, other),
        }
    }

    fn blank_motor(name: &str, n_steps: u64, deps: &[&str]) -> Motor {
        Motor::new(
            name,
            deps.iter().map(|d| d.to_string()).collect(),
            MotorKind::Blank(BlankMotor::new(n_steps)),
        )
    }

    fn move_motor(selection: &[u32], dx: f64) -> Motor {
        Motor::new(
            "pull",
            Vec::new(),
            MotorKind::Move(MoveMotor::new(
                AtomSet::from_ids(selection),
                [
                    VelocityQuantity::new(0.001, REAL),
                    VelocityQuantity::new(0.0, REAL),
                    VelocityQuantity::new(0.0, REAL),
                ],
                [true, false, false],
                [
                    DistanceQuantity::new(dx, REAL),
                    DistanceQuantity::new(0.0, REAL),
                    DistanceQuantity::new(0.0, REAL),
                ],
            )),
        )
    }

    #[test]
    fn lifecycle_is_monotonic() {
        let mut motor = blank_motor("w", 100, &[]);
        assert_eq!(motor.status(), MotorStatus::Wait);

        // A waiting motor never updates
        assert!(motor.update_state(0, &[], &[]).is_none());

        assert!(motor.start());
        assert_eq!(motor.status(), MotorStatus::Running);
        // Starting twice is a no-op
        assert!(!motor.start());
        assert_eq!(motor.status(), MotorStatus::Running);

        motor.update_state(0, &[], &[]).unwrap();
        motor.update_state(100, &[], &[]).unwrap();
        assert_eq!(motor.status(), MotorStatus::Success);

        // Terminal states never transition back
        assert!(!motor.start());
        assert!(motor.update_state(200, &[], &[]).is_none());
        assert_eq!(motor.status(), MotorStatus::Success);
    }

    #[test]
    fn can_start_waits_for_all_dependencies() {
        let motor = blank_motor("c", 10, &["a", "b"]);

        let all_success = |_: &str| Some(MotorStatus::Success);
        assert!(motor.can_start(all_success));

        let one_running = |name: &str| {
            Some(if name == "a" {
                MotorStatus::Running
            } else {
                MotorStatus::Success
            })
        };
        assert!(!motor.can_start(one_running));

        // Unresolvable dependencies count as unsatisfied
        let unknown = |_: &str| None;
        assert!(!motor.can_start(unknown));
    }

    #[test]
    fn blank_completes_after_exactly_n_steps() {
        // Motor with n_steps = 1000 starting at sim_it = 500
        let mut motor = blank_motor("w", 1000, &[]);
        motor.start();

        let node = motor.update_state(500, &[], &[]).unwrap();
        assert_eq!(node.get("steps_done"), Some(&KvValue::UInt(0)));
        assert_eq!(node.get("steps_left"), Some(&KvValue::UInt(1000)));

        for it in [600, 900, 1400] {
            motor.update_state(it, &[], &[]).unwrap();
            assert_eq!(motor.status(), MotorStatus::Running);
        }

        let node = motor.update_state(1500, &[], &[]).unwrap();
        assert_eq!(node.get("steps_done"), Some(&KvValue::UInt(1000)));
        assert_eq!(node.get("steps_left"), Some(&KvValue::UInt(0)));
        assert_eq!(float_field(&node, "progress"), 100.0);
        assert_eq!(motor.status(), MotorStatus::Success);
    }

    #[test]
    fn blank_emits_wait_command() {
        let motor = blank_motor("w", 10, &[]);
        assert_eq!(
            motor.emit_command(),
            MotorCommand::Wait { origin: "w".to_string() }
        );
    }

    #[test]
    fn move_completes_when_centroid_reaches_target() {
        // Selection {1..4} starting with centroid x = 0, target dx = 1.0
        let mut motor = move_motor(&[1, 2, 3, 4], 1.0);
        motor.start();

        let start = [
            [0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 1.0, 1.0],
        ];
        let (ids, positions) = frame(&start);
        let node = motor.update_state(100, &ids, &positions).unwrap();
        assert_eq!(float_field(&node, "center_x"), 0.0);
        assert_eq!(float_field(&node, "progress"), 0.0);

        // Advance the whole selection by 0.25 on x per cycle
        for (cycle, expected_progress) in [(1u64, 25.0), (2, 50.0), (3, 75.0)] {
            let shifted: Vec<[f64; 3]> = start
                .iter()
                .map(|p| [p[0] + 0.25 * cycle as f64, p[1], p[2]])
                .collect();
            let (ids, positions) = frame(&shifted);
            let node = motor.update_state(100 + cycle, &ids, &positions).unwrap();
            assert_eq!(motor.status(), MotorStatus::Running);
            assert!((float_field(&node, "progress") - expected_progress).abs() < 1e-9);
            assert!(
                (float_field(&node, "distance_x") - 0.25 * cycle as f64).abs() < 1e-9
            );
        }

        let done: Vec<[f64; 3]> = start.iter().map(|p| [p[0] + 1.0, p[1], p[2]]).collect();
        let (ids, positions) = frame(&done);
        let node = motor.update_state(104, &ids, &positions).unwrap();
        assert_eq!(motor.status(), MotorStatus::Success);
        assert_eq!(float_field(&node, "progress"), 100.0);
        assert_eq!(float_field(&node, "progress_min"), 100.0);
    }

    #[test]
    fn move_progress_is_clamped_on_overshoot() {
        let mut motor = move_motor(&[1], 1.0);
        motor.start();

        let (ids, positions) = frame(&[[0.0, 0.0, 0.0]]);
        motor.update_state(0, &ids, &positions).unwrap();

        // 3x the requested displacement must still read as 100%
        let (ids, positions) = frame(&[[3.0, 0.0, 0.0]]);
        let node = motor.update_state(1, &ids, &positions).unwrap();
        assert_eq!(float_field(&node, "progress"), 100.0);
        assert_eq!(float_field(&node, "progress_x"), 100.0);
        assert_eq!(float_field(&node, "distance_x"), 3.0);
    }

    #[test]
    fn move_partial_frame_is_a_no_op_cycle() {
        let mut motor = move_motor(&[1, 2, 3, 4], 1.0);
        motor.start();

        // Frame holds only 2 of the 4 selected atoms
        let (ids, positions) = frame(&[[0.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        assert!(motor.update_state(0, &ids, &positions).is_none());
        assert_eq!(motor.status(), MotorStatus::Running);

        // The initial reference is captured on the first complete frame
        let start = [
            [0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 1.0, 1.0],
        ];
        let (ids, positions) = frame(&start);
        let node = motor.update_state(1, &ids, &positions).unwrap();
        assert_eq!(float_field(&node, "progress"), 0.0);
    }

    #[test]
    fn force_accepts_negative_target_direction() {
        // fx = 1.0, dx = -0.5, checkX: completion needs delta <= -0.5
        let mut motor = Motor::new(
            "push",
            Vec::new(),
            MotorKind::Force(ForceMotor::new(
                AtomSet::from_ids(&[1]),
                [
                    ForceQuantity::new(1.0, REAL),
                    ForceQuantity::new(0.0, REAL),
                    ForceQuantity::new(0.0, REAL),
                ],
                [true, false, false],
                [
                    DistanceQuantity::new(-0.5, REAL),
                    DistanceQuantity::new(0.0, REAL),
                    DistanceQuantity::new(0.0, REAL),
                ],
            )),
        );
        motor.start();

        let (ids, positions) = frame(&[[0.0, 0.0, 0.0]]);
        motor.update_state(0, &ids, &positions).unwrap();

        // delta x = -0.4 does not satisfy the target
        let (ids, positions) = frame(&[[-0.4, 0.0, 0.0]]);
        motor.update_state(1, &ids, &positions).unwrap();
        assert_eq!(motor.status(), MotorStatus::Running);

        // delta x = -0.6 does
        let (ids, positions) = frame(&[[-0.6, 0.0, 0.0]]);
        motor.update_state(2, &ids, &positions).unwrap();
        assert_eq!(motor.status(), MotorStatus::Success);
    }

    #[test]
    fn torque_fails_with_degenerate_selection() {
        // A single atom necessarily sits at the selection centroid, hence
        // on the rotation axis.
        let mut motor = Motor::new(
            "twist",
            Vec::new(),
            MotorKind::Torque(TorqueMotor::new(
                AtomSet::from_ids(&[1]),
                [
                    TorqueQuantity::new(0.0, REAL),
                    TorqueQuantity::new(0.0, REAL),
                    TorqueQuantity::new(0.1, REAL),
                ],
                90.0,
            )),
        );
        motor.start();

        let (ids, positions) = frame(&[[5.0, 5.0, 5.0]]);
        assert!(motor.update_state(0, &ids, &positions).is_none());
        assert_eq!(motor.status(), MotorStatus::Failed);
    }

    #[test]
    fn torque_tracks_rotation_about_its_own_centroid() {
        // Two atoms spinning about their common centre, torque along z
        let mut motor = Motor::new(
            "twist",
            Vec::new(),
            MotorKind::Torque(TorqueMotor::new(
                AtomSet::from_ids(&[1, 2]),
                [
                    TorqueQuantity::new(0.0, REAL),
                    TorqueQuantity::new(0.0, REAL),
                    TorqueQuantity::new(0.1, REAL),
                ],
                90.0,
            )),
        );
        motor.start();

        let positions_at = |deg: f64| {
            let rad = deg.to_radians();
            [
                [rad.cos(), rad.sin(), 0.0],
                [-rad.cos(), -rad.sin(), 0.0],
            ]
        };

        let (ids, positions) = frame(&positions_at(0.0));
        motor.update_state(0, &ids, &positions).unwrap();

        let (ids, positions) = frame(&positions_at(45.0));
        let node = motor.update_state(1, &ids, &positions).unwrap();
        assert!((float_field(&node, "current_total_angle_deg") - 45.0).abs() < 1e-9);
        assert!((float_field(&node, "progress") - 50.0).abs() < 1e-9);
        assert_eq!(motor.status(), MotorStatus::Running);

        let (ids, positions) = frame(&positions_at(90.0));
        let node = motor.update_state(2, &ids, &positions).unwrap();
        assert!((float_field(&node, "current_total_angle_deg") - 90.0).abs() < 1e-9);
        assert_eq!(motor.status(), MotorStatus::Success);
    }

    #[test]
    fn rotate_total_angle_is_monotonic_across_wraps() {
        // Fixed pivot at the origin, axis +z, a full revolution and beyond
        let mut motor = Motor::new(
            "spin",
            Vec::new(),
            MotorKind::Rotate(RotateMotor::new(
                AtomSet::from_ids(&[1, 2]),
                [
                    DistanceQuantity::new(0.0, REAL),
                    DistanceQuantity::new(0.0, REAL),
                    DistanceQuantity::new(0.0, REAL),
                ],
                [0.0, 0.0, 2.0],
                TimeQuantity::new(10000.0, REAL),
                700.0,
            )),
        );
        motor.start();

        let positions_at = |deg: f64| {
            let rad = deg.to_radians();
            [
                [rad.cos(), rad.sin(), 0.0],
                [2.0 * rad.cos(), 2.0 * rad.sin(), 1.0],
            ]
        };

        let (ids, positions) = frame(&positions_at(0.0));
        motor.update_state(0, &ids, &positions).unwrap();

        let mut previous_total = 0.0;
        let mut it = 1;
        for step in 1..18 {
            let deg = 40.0 * step as f64; // 40, 80, ... 680
            let (ids, positions) = frame(&positions_at(deg));
            let node = motor.update_state(it, &ids, &positions).unwrap();
            let total = float_field(&node, "current_total_angle_deg");
            assert!(
                total > previous_total,
                "total angle regressed at {}deg: {} after {}",
                deg,
                total,
                previous_total
            );
            assert!((total - deg).abs() < 1e-9);
            previous_total = total;
            assert_eq!(motor.status(), MotorStatus::Running, "at {}deg", deg);
            it += 1;
        }

        // 720 >= 700 completes the rotation
        let (ids, positions) = frame(&positions_at(720.0));
        let node = motor.update_state(it, &ids, &positions).unwrap();
        assert!((float_field(&node, "current_total_angle_deg") - 720.0).abs() < 1e-9);
        assert_eq!(motor.status(), MotorStatus::Success);
    }

    #[test]
    fn rotate_counts_negative_rotation_down() {
        let mut motor = Motor::new(
            "spin",
            Vec::new(),
            MotorKind::Rotate(RotateMotor::new(
                AtomSet::from_ids(&[1]),
                [
                    DistanceQuantity::new(0.0, REAL),
                    DistanceQuantity::new(0.0, REAL),
                    DistanceQuantity::new(0.0, REAL),
                ],
                [0.0, 0.0, 1.0],
                TimeQuantity::new(500.0, REAL),
                360.0,
            )),
        );
        motor.start();

        let positions_at = |deg: f64| {
            let rad = deg.to_radians();
            [[rad.cos(), rad.sin(), 0.0]]
        };

        let (ids, positions) = frame(&positions_at(0.0));
        motor.update_state(0, &ids, &positions).unwrap();

        let mut expected = 0.0;
        for step in 1..=10 {
            let deg = -40.0 * step as f64;
            expected = deg;
            let (ids, positions) = frame(&positions_at(deg));
            let node = motor.update_state(step as u64, &ids, &positions).unwrap();
            let total = float_field(&node, "current_total_angle_deg");
            assert!(
                (total - expected).abs() < 1e-9,
                "expected {} got {}",
                expected,
                total
            );
        }
        assert!(expected < -350.0);
        assert_eq!(motor.status(), MotorStatus::Running);
    }

    #[test]
    fn convert_settings_rehomes_command_units() {
        let mut motor = move_motor(&[1], 1.0);
        motor.convert_settings_to(UnitSystem::LammpsMetal);

        match motor.emit_command() {
            MotorCommand::Move { vx, vunits, .. } => {
                // real -> metal velocity scales by 1000
                assert!((vx - 1.0).abs() < 1e-12);
                assert_eq!(vunits, UnitSystem::LammpsMetal);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn convert_settings_rehomes_the_captured_center() {
        let mut motor = move_motor(&[1], 1.0);
        motor.start();

        // Capture the reference at x = 10 in LAMMPS real units
        let (ids, positions) = frame(&[[10.0, 0.0, 0.0]]);
        motor.update_state(0, &ids, &positions).unwrap();

        // Re-home to Gromacs: distances scale by 0.1
        motor.convert_settings_to(UnitSystem::Gromacs);

        // A frame already in Gromacs units: atom at 1.05 nm, so the delta
        // is 0.05 nm against the re-homed 0.1 nm target
        let (ids, positions) = frame(&[[1.05, 0.0, 0.0]]);
        let node = motor.update_state(1, &ids, &positions).unwrap();
        assert!((float_field(&node, "center_x") - 1.0).abs() < 1e-12);
        assert!((float_field(&node, "distance_x") - 0.05).abs() < 1e-12);
        assert!((float_field(&node, "progress") - 50.0).abs() < 1e-9);
    }

    #[test]
    fn rotate_command_carries_pivot_axis_and_period() {
        let motor = Motor::new(
            "spin",
            Vec::new(),
            MotorKind::Rotate(RotateMotor::new(
                AtomSet::from_ids(&[3, 4]),
                [
                    DistanceQuantity::new(52.0, REAL),
                    DistanceQuantity::new(52.0, REAL),
                    DistanceQuantity::new(50.0, REAL),
                ],
                [1.0, 0.0, 0.0],
                TimeQuantity::new(10000.0, REAL),
                180.0,
            )),
        );

        match motor.emit_command() {
            MotorCommand::Rotate {
                origin,
                px,
                period,
                selection,
                ..
            } => {
                assert_eq!(origin, "spin");
                assert_eq!(px, 52.0);
                assert_eq!(period, 10000.0);
                assert_eq!(selection, vec![3, 4]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
