use clap::Parser;
use log::{error, info};

use steering_lib::cli::Cli;
use steering_lib::engine::runner::{run_engine, RunnerOptions};
use steering_lib::engine::MotorEngine;
use steering_lib::error::EngineError;
use steering_lib::transport::{
    load_transport_config, StdioTransport, Transport, TransportConfig,
    TransportMode,
};
use steering_lib::config as motor_config;

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(message) = cli.validate() {
        error!("{}", message);
        std::process::exit(1);
    }

    let transport_config = match &cli.config {
        Some(path) => match load_transport_config(path) {
            Ok(config) => config,
            Err(err) => {
                error!("{}", err);
                std::process::exit(1);
            }
        },
        None => TransportConfig::default(),
    };

    // Pick the motor graph source: a document, the built-in test setup, or
    // an empty graph when only a fixed horizon was requested.
    let motors = if cli.testmotors {
        info!("Loading the test motor setup.");
        motor_config::test_setup().motors
    } else if let Some(path) = &cli.motors {
        info!("Loading the motor setup {}.", path.display());
        match motor_config::load_motor_document(path) {
            Ok(config) => config.motors,
            Err(err) => {
                error!("{}", err);
                std::process::exit(1);
            }
        }
    } else {
        Vec::new()
    };

    info!("Starting the task {}.", cli.name);

    let mut engine = MotorEngine::new(motors);
    let options = RunnerOptions {
        force_max_steps: cli.forcemaxsteps,
        output_folder: transport_config.folder.clone(),
    };

    let result = match transport_config.mode {
        TransportMode::Stdio => {
            let mut transport = StdioTransport::from_stdio();
            let result = run_engine(&mut engine, &mut transport, &options);
            transport.close();
            result
        }
        TransportMode::Channel => {
            error!("the channel transport is only available when embedding the engine");
            std::process::exit(1);
        }
    };

    match result {
        Ok(()) => {
            info!("Engine exited loop. Closing.");
        }
        Err(EngineError::Config(err)) => {
            error!("{}", err);
            std::process::exit(1);
        }
        Err(err) => {
            error!("{}", err);
            std::process::exit(-1);
        }
    }
}
