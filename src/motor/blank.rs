//! Step-count placeholder motor.
//!
//! Imposes no biasing action; it succeeds once the simulator has advanced a
//! requested number of steps past the motor's first running cycle. Used to
//! delay dependent motors.

use crate::atoms::SimIt;
use crate::command::MotorCommand;
use crate::telemetry::{KvValue, KvsNode};

use super::MotorUpdate;

#[derive(Debug, Clone)]
pub struct BlankMotor {
    n_steps: u64,
    start_step: Option<SimIt>,
    last_step: SimIt,
}

impl BlankMotor {
    pub(crate) const FIELDS: &'static [&'static str] =
        &["steps_done", "steps_left", "progress"];

    /// A motor waiting for `n_steps` simulator steps (`n_steps >= 1`,
    /// enforced at load time).
    pub fn new(n_steps: u64) -> Self {
        BlankMotor {
            n_steps,
            start_step: None,
            last_step: 0,
        }
    }

    pub fn n_steps(&self) -> u64 {
        self.n_steps
    }

    pub(crate) fn update(&mut self, it: SimIt) -> MotorUpdate {
        let mut node = KvsNode::new();

        let Some(start) = self.start_step else {
            // First running cycle: anchor the step window.
            self.start_step = Some(it);
            self.last_step = it + self.n_steps;
            node.insert("steps_done".to_string(), KvValue::UInt(0));
            node.insert("steps_left".to_string(), KvValue::UInt(self.n_steps));
            node.insert("progress".to_string(), KvValue::Float(0.0));
            return MotorUpdate::running(node);
        };

        let done = it - start;
        node.insert("steps_done".to_string(), KvValue::UInt(done));
        node.insert(
            "steps_left".to_string(),
            KvValue::UInt(self.last_step.saturating_sub(it)),
        );
        node.insert(
            "progress".to_string(),
            KvValue::Float((done as f64 / self.n_steps as f64) * 100.0),
        );

        if it >= self.last_step {
            MotorUpdate::completed(node)
        } else {
            MotorUpdate::running(node)
        }
    }

    pub(crate) fn command(&self, origin: &str) -> MotorCommand {
        MotorCommand::Wait {
            origin: origin.to_string(),
        }
    }
}
