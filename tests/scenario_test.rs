//! End-to-end scenarios driven from a configuration document: the
//! dependency chain, and the simulator-side script assembly fed from a
//! config with permanent anchors.

use std::collections::BTreeMap;
use std::io::Write;

use steering_lib::atoms::frame::{FrameChunk, SimData, SimPhase, ThermoValue};
use steering_lib::command::script::ScriptBuilder;
use steering_lib::config::{load_motor_document, PERMANENT_ANCHOR_GROUP};
use steering_lib::engine::runner::{run_engine, RunnerOptions};
use steering_lib::engine::MotorEngine;
use steering_lib::motor::MotorStatus;
use steering_lib::transport::{ChannelTransport, Inbound};

/// Frame with four atoms; the whole system sits at the given x offset.
fn frame(sim_it: u64, x: f64) -> Inbound {
    let chunk = FrameChunk {
        simdata: SimData {
            sim_it,
            atom_ids: vec![1, 2, 3, 4],
            atom_positions: vec![
                x, 0.0, 0.0, //
                x, 1.0, 0.0, //
                x, 0.0, 1.0, //
                x, 1.0, 1.0,
            ],
            atom_forces: None,
            atom_velocities: None,
            units: steering_lib::units::UnitSystem::LammpsReal,
            phase: SimPhase::Production,
        },
        thermos: BTreeMap::from([
            ("temp".to_string(), ThermoValue::Float(10.0)),
            ("dt".to_string(), ThermoValue::Float(0.25)),
        ]),
    };
    Inbound::Frames { chunks: vec![chunk] }
}

const CHAIN_DOCUMENT: &str = r#"{
    "header": { "version": 1, "units": "LAMMPS_REAL" },
    "motors": [
        { "type": "blank", "name": "a", "nbSteps": 100 },
        { "type": "blank", "name": "b", "nbSteps": 100, "dependencies": ["a"] },
        { "type": "move", "name": "c", "dependencies": ["b"],
          "selection": [1, 2, 3, 4],
          "vx": 0.001, "checkX": true, "dx": 1.0 }
    ]
}"#;

#[test]
fn dependency_chain_completes_in_order() {
    let mut config_file = tempfile::NamedTempFile::new().unwrap();
    config_file.write_all(CHAIN_DOCUMENT.as_bytes()).unwrap();
    let config = load_motor_document(config_file.path()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let (mut transport, endpoint) = ChannelTransport::pair();

    // One frame every 50 steps; the system starts moving once c is the
    // only motor left (from step 300 on).
    for sim_it in (0..=500).step_by(50) {
        let x = if sim_it <= 300 {
            0.0
        } else {
            (sim_it - 300) as f64 / 100.0
        };
        endpoint.frames.send(frame(sim_it, x)).unwrap();
    }
    endpoint.frames.send(Inbound::Terminate).unwrap();

    let mut engine = MotorEngine::from_config(config);
    let options = RunnerOptions {
        force_max_steps: false,
        output_folder: dir.path().to_path_buf(),
    };
    run_engine(&mut engine, &mut transport, &options).unwrap();

    for name in ["a", "b", "c"] {
        assert_eq!(
            engine.motor(name).unwrap().status(),
            MotorStatus::Success,
            "motor {} did not finish",
            name
        );
    }

    // The batches show the chain handing over: wait commands from a, then
    // from b, then move commands from c.
    let mut origins_seen = Vec::new();
    for batch in endpoint.commands.try_iter() {
        assert_eq!(batch.len(), 1);
        let origin = batch.commands[0].origin().to_string();
        if origins_seen.last() != Some(&origin) {
            origins_seen.push(origin);
        }
    }
    assert_eq!(origins_seen, vec!["a", "b", "c"]);

    // Every CSV table is monotonic in its iteration column
    for file in ["global.csv", "a.csv", "b.csv", "c.csv"] {
        let text = std::fs::read_to_string(dir.path().join(file)).unwrap();
        let mut last = -1i64;
        for line in text.lines().skip(1) {
            let it: i64 = line.split(';').next().unwrap().parse().unwrap();
            assert!(it >= last, "{} not monotonic at {}", file, line);
            last = it;
        }
        assert!(last >= 0, "{} recorded no frames", file);
    }
}

#[test]
fn anchored_config_feeds_the_script_builder() {
    let document = r#"{
        "header": { "version": 1, "units": "LAMMPS_REAL" },
        "anchors": [ { "selection": [10, 11] } ],
        "motors": [
            { "type": "move", "name": "pull", "selection": [1, 2],
              "vx": 0.001, "checkX": true, "dx": 1.0 }
        ]
    }"#;
    let mut config_file = tempfile::NamedTempFile::new().unwrap();
    config_file.write_all(document.as_bytes()).unwrap();
    let config = load_motor_document(config_file.path()).unwrap();
    assert!(config.has_permanent_anchor());

    // Simulator side: declare the anchor group, then install one cycle
    let mut engine = MotorEngine::from_config(config);
    engine.update_motors_state(
        &steering_lib::atoms::frame::SimFrame::merge(&[FrameChunk {
            simdata: SimData {
                sim_it: 0,
                atom_ids: vec![1, 2],
                atom_positions: vec![0.0; 6],
                atom_forces: None,
                atom_velocities: None,
                units: steering_lib::units::UnitSystem::LammpsReal,
                phase: SimPhase::Production,
            },
            thermos: BTreeMap::new(),
        }])
        .unwrap(),
    );

    let mut builder = ScriptBuilder::new();
    builder.declare_permanent_anchor(PERMANENT_ANCHOR_GROUP);
    builder.load_commands(&engine.gather_commands());

    let mut do_cmds = Vec::new();
    builder.write_do_commands(&mut do_cmds);
    assert_eq!(
        do_cmds,
        vec![
            "group pullGRP id 1 2".to_string(),
            "fix pullFIX pullGRP move linear 0.001 0 0".to_string(),
            "group nonintegrateGRP union pullGRP".to_string(),
            "group integrateGRP subtract all nonintegrateGRP permanentAnchor"
                .to_string(),
        ]
    );

    let mut undo_cmds = Vec::new();
    builder.write_undo_commands(&mut undo_cmds);
    assert_eq!(undo_cmds.first().unwrap(), "group integrateGRP delete");
    assert_eq!(undo_cmds.last().unwrap(), "group pullGRP delete");
}
