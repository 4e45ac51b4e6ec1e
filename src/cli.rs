//! # CLI Module - Launcher Surface of the Steering Engine
//!
//! The binary is one task of a larger simulation workflow: it connects to
//! the message substrate declared in `--config`, loads its motor graph
//! from `--motors` (or the built-in `--testmotors` setup) and runs the
//! cycle loop until the motors or the simulator finish.
//!
//! **Usage**:
//! ```bash
//! mdsteer-rs --name engine --config transport.toml --motors motors.json
//! ```
//!
//! Exit codes: `0` on success, `1` on CLI or configuration errors, `-1` on
//! runtime errors.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Name of the task corresponding to the workflow definition
    #[arg(long, default_value = "engine")]
    pub name: String,

    /// Path to the transport configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the definition of the motors to use (JSON)
    #[arg(long)]
    pub motors: Option<PathBuf>,

    /// Use the built-in test motor setup instead of a motor file
    #[arg(long)]
    pub testmotors: bool,

    /// Continue until the simulator reaches its maximum number of steps,
    /// even if all the motors have completed
    #[arg(long)]
    pub forcemaxsteps: bool,
}

impl Cli {
    /// Checks the mutually exclusive motor-source flags.
    pub fn validate(&self) -> Result<(), String> {
        if self.testmotors && self.motors.is_some() {
            return Err(
                "you cannot use the test motors and a motor config at the same time"
                    .to_string(),
            );
        }
        if !self.testmotors && self.motors.is_none() && !self.forcemaxsteps {
            return Err(
                "motor configuration not provided, not using the test motors and \
                 not forcing the maximum number of steps; nothing to do"
                    .to_string(),
            );
        }
        Ok(())
    }
}
