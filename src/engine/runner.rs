//! The transport-driven cycle loop.
//!
//! One iteration per simulator interval: receive the frame chunks, merge
//! and sort them, advance the engine according to the phase, push the
//! command batch, the telemetry record and the sorted positions, then
//! promote newly eligible motors. The loop ends when the simulator
//! terminates, when every motor has succeeded (unless a fixed horizon was
//! requested), or on a fatal error. In-memory telemetry is drained to
//! disk in every case.

use std::path::PathBuf;

use log::{error, info, warn};

use crate::atoms::frame::{SimFrame, SimPhase};
use crate::command::{CommandBatch, MotorCommand};
use crate::error::EngineError;
use crate::transport::{Inbound, PositionFrame, Transport};

use super::MotorEngine;

/// Origin tag of the keep-alive wait command emitted after completion
/// under a fixed horizon.
const ENGINE_ORIGIN: &str = "engine";

/// Runner behaviour switches.
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Keep the loop alive with wait commands after all motors succeeded,
    /// until the simulator itself terminates.
    pub force_max_steps: bool,
    /// Folder the CSV sinks are flushed into.
    pub output_folder: PathBuf,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        RunnerOptions {
            force_max_steps: false,
            output_folder: PathBuf::from("."),
        }
    }
}

/// Drives the engine until the run ends. Fatal errors flush telemetry
/// before propagating; the caller still owns the transport and closes it.
pub fn run_engine<T: Transport>(
    engine: &mut MotorEngine,
    transport: &mut T,
    options: &RunnerOptions,
) -> Result<(), EngineError> {
    let mut units_reconciled = false;

    loop {
        let message = match transport.receive() {
            Ok(message) => message,
            Err(err) => {
                engine.save_csv(&options.output_folder);
                return Err(err.into());
            }
        };

        let chunks = match message {
            Inbound::Terminate => {
                info!("Received a terminate message. Exiting the main loop.");
                break;
            }
            Inbound::Error => {
                error!("The transport signalled an error. Aborting.");
                engine.save_csv(&options.output_folder);
                return Err(crate::error::TransportError::Signalled.into());
            }
            Inbound::Frames { chunks } => chunks,
        };

        let frame = match SimFrame::merge(&chunks) {
            Ok(frame) => frame,
            Err(err) => {
                engine.save_csv(&options.output_folder);
                return Err(err.into());
            }
        };

        // The first frame is authoritative for the simulator's units;
        // every motor setting is re-homed once.
        if !units_reconciled {
            engine.convert_motors_to(frame.units);
            units_reconciled = true;
        }

        match frame.phase {
            SimPhase::Thermalization => {
                // Motors do not act yet; keep the loop going with an
                // empty batch.
                engine.update_engine_state(&frame);
                if let Err(err) = transport.push_commands(&CommandBatch::empty()) {
                    engine.save_csv(&options.output_folder);
                    return Err(err.into());
                }
                push_cycle_outputs(engine, transport, &frame);
            }
            SimPhase::Production => {
                engine.update_motors_state(&frame);

                if let Some(failure) = engine.failed_motor() {
                    error!(
                        "Motor {} failed. Aborting the rest of the simulation.",
                        failure.motor
                    );
                    engine.save_csv(&options.output_folder);
                    return Err(failure.into());
                }

                if engine.is_completed() && !options.force_max_steps {
                    info!("Motor engine has completed. Exiting the main loop.");
                    break;
                }

                let batch = if engine.is_completed() {
                    // Fixed horizon: the simulator decides when to stop.
                    let mut batch = CommandBatch::empty();
                    batch.push(MotorCommand::Wait {
                        origin: ENGINE_ORIGIN.to_string(),
                    });
                    batch
                } else {
                    engine.gather_commands()
                };
                if let Err(err) = transport.push_commands(&batch) {
                    engine.save_csv(&options.output_folder);
                    return Err(err.into());
                }

                push_cycle_outputs(engine, transport, &frame);

                if let Err(err) = engine.update_motor_lists() {
                    engine.save_csv(&options.output_folder);
                    return Err(err.into());
                }
            }
        }
    }

    engine.save_csv(&options.output_folder);
    Ok(())
}

/// Commits and pushes the telemetry record and the sorted positions of the
/// cycle. Outbound telemetry is best effort.
fn push_cycle_outputs<T: Transport>(
    engine: &mut MotorEngine,
    transport: &mut T,
    frame: &SimFrame,
) {
    engine.add_global_kvs(&frame.thermo);
    engine.commit_kvs_frame();

    if let Err(err) = transport.push_telemetry(&engine.telemetry_frame()) {
        warn!("failed to push the telemetry record: {}", err);
    }

    let positions = PositionFrame {
        sim_it: engine.current_it(),
        positions: engine.current_positions().to_vec(),
    };
    if let Err(err) = transport.push_positions(&positions) {
        warn!("failed to push the position record: {}", err);
    }
}
