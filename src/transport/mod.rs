//! # Transport Module - Message-Passing Contract
//!
//! The engine is driven by an external message substrate: it suspends on
//! the ingress waiting for frame chunks and pushes command batches,
//! telemetry and sorted positions back out. This module pins that contract
//! down as the [`Transport`] trait and provides two implementations:
//!
//! - [`ChannelTransport`]: std `mpsc` channels for in-process embedding and
//!   for driving the engine from a scripted simulator stub in tests
//! - [`StdioTransport`]: line-delimited JSON over stdin/stdout, for running
//!   the binary under an external driver
//!
//! The substrate itself (MPI workflows, sockets) stays out of scope; any
//! carrier able to deliver [`Inbound`] messages can implement the trait.


use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc;

use serde::{Deserialize, Serialize};

use crate::atoms::frame::FrameChunk;
use crate::atoms::SimIt;
use crate::command::CommandBatch;
use crate::error::{ConfigError, TransportError};
use crate::telemetry::TelemetryFrame;

/// One ingress event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "msg")]
pub enum Inbound {
    /// One frame chunk per simulator rank for the current cycle.
    #[serde(rename = "frames")]
    Frames { chunks: Vec<FrameChunk> },
    /// The simulator is done; drain telemetry and exit cleanly.
    #[serde(rename = "terminate")]
    Terminate,
    /// The substrate failed; exit with a runtime error.
    #[serde(rename = "error")]
    Error,
}

/// The sorted positions of one cycle, for external consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionFrame {
    #[serde(rename = "simIt")]
    pub sim_it: SimIt,
    pub positions: Vec<f64>,
}

/// The engine side of the message substrate.
pub trait Transport {
    /// Blocks until the next ingress event.
    fn receive(&mut self) -> Result<Inbound, TransportError>;
    /// Pushes the command batch of the current cycle.
    fn push_commands(&mut self, batch: &CommandBatch) -> Result<(), TransportError>;
    /// Pushes the telemetry record of the current cycle.
    fn push_telemetry(&mut self, frame: &TelemetryFrame)
    -> Result<(), TransportError>;
    /// Pushes the sorted positions of the current cycle.
    fn push_positions(&mut self, frame: &PositionFrame)
    -> Result<(), TransportError>;
    /// Releases the substrate's resources.
    fn close(&mut self);
}

/// The simulator-facing half of an in-process channel pair.
#[derive(Debug)]
pub struct SimulatorEndpoint {
    pub frames: mpsc::Sender<Inbound>,
    pub commands: mpsc::Receiver<CommandBatch>,
    pub telemetry: mpsc::Receiver<TelemetryFrame>,
    pub positions: mpsc::Receiver<PositionFrame>,
}

/// In-process transport over std mpsc channels.
#[derive(Debug)]
pub struct ChannelTransport {
    inbound: mpsc::Receiver<Inbound>,
    commands: mpsc::Sender<CommandBatch>,
    telemetry: mpsc::Sender<TelemetryFrame>,
    positions: mpsc::Sender<PositionFrame>,
}

impl ChannelTransport {
    /// Creates a connected engine/simulator endpoint pair.
    pub fn pair() -> (ChannelTransport, SimulatorEndpoint) {
        let (frames_tx, frames_rx) = mpsc::channel();
        let (commands_tx, commands_rx) = mpsc::channel();
        let (telemetry_tx, telemetry_rx) = mpsc::channel();
        let (positions_tx, positions_rx) = mpsc::channel();

        (
            ChannelTransport {
                inbound: frames_rx,
                commands: commands_tx,
                telemetry: telemetry_tx,
                positions: positions_tx,
            },
            SimulatorEndpoint {
                frames: frames_tx,
                commands: commands_rx,
                telemetry: telemetry_rx,
                positions: positions_rx,
            },
        )
    }
}

impl Transport for ChannelTransport {
    fn receive(&mut self) -> Result<Inbound, TransportError> {
        self.inbound.recv().map_err(|_| TransportError::Closed)
    }

    fn push_commands(&mut self, batch: &CommandBatch) -> Result<(), TransportError> {
        self.commands
            .send(batch.clone())
            .map_err(|_| TransportError::Closed)
    }

    fn push_telemetry(
        &mut self,
        frame: &TelemetryFrame,
    ) -> Result<(), TransportError> {
        self.telemetry
            .send(frame.clone())
            .map_err(|_| TransportError::Closed)
    }

    fn push_positions(
        &mut self,
        frame: &PositionFrame,
    ) -> Result<(), TransportError> {
        self.positions
            .send(frame.clone())
            .map_err(|_| TransportError::Closed)
    }

    fn close(&mut self) {}
}

/// One outbound line of the stdio transport, labelled with its channel.
#[derive(Debug, Serialize)]
#[serde(tag = "channel", content = "data")]
enum StdioOutbound<'a> {
    #[serde(rename = "motorscmd")]
    Commands(&'a CommandBatch),
    #[serde(rename = "kvs")]
    Telemetry(&'a TelemetryFrame),
    #[serde(rename = "atoms")]
    Positions(&'a PositionFrame),
}

/// Line-delimited JSON transport: one [`Inbound`] message per input line,
/// one channel-labelled record per output line. End of input counts as a
/// terminate.
pub struct StdioTransport<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl StdioTransport<std::io::BufReader<std::io::Stdin>, std::io::Stdout> {
    /// A transport over the process's stdin/stdout.
    pub fn from_stdio() -> Self {
        StdioTransport {
            input: std::io::BufReader::new(std::io::stdin()),
            output: std::io::stdout(),
        }
    }
}

impl<R: BufRead, W: Write> StdioTransport<R, W> {
    pub fn new(input: R, output: W) -> Self {
        StdioTransport { input, output }
    }

    fn push_line(&mut self, line: StdioOutbound<'_>) -> Result<(), TransportError> {
        let json = serde_json::to_string(&line)
            .map_err(|err| TransportError::Decode(err.to_string()))?;
        writeln!(self.output, "{}", json)?;
        self.output.flush()?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> Transport for StdioTransport<R, W> {
    fn receive(&mut self) -> Result<Inbound, TransportError> {
        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        if read == 0 {
            // Driver closed the stream
            return Ok(Inbound::Terminate);
        }
        serde_json::from_str(line.trim_end())
            .map_err(|err| TransportError::Decode(err.to_string()))
    }

    fn push_commands(&mut self, batch: &CommandBatch) -> Result<(), TransportError> {
        self.push_line(StdioOutbound::Commands(batch))
    }

    fn push_telemetry(
        &mut self,
        frame: &TelemetryFrame,
    ) -> Result<(), TransportError> {
        self.push_line(StdioOutbound::Telemetry(frame))
    }

    fn push_positions(
        &mut self,
        frame: &PositionFrame,
    ) -> Result<(), TransportError> {
        self.push_line(StdioOutbound::Positions(frame))
    }

    fn close(&mut self) {
        let _ = self.output.flush();
    }
}

/// How the binary connects to its simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Stdio,
    Channel,
}

/// The TOML transport configuration handed to `--config`.
#[derive(Debug, Deserialize)]
pub struct TransportConfig {
    pub mode: TransportMode,
    /// Folder the CSV sinks are flushed into.
    #[serde(default = "default_folder")]
    pub folder: PathBuf,
}

fn default_folder() -> PathBuf {
    PathBuf::from(".")
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            mode: TransportMode::Stdio,
            folder: default_folder(),
        }
    }
}

/// Reads a transport configuration from a TOML file.
pub fn load_transport_config(
    path: &std::path::Path,
) -> Result<TransportConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&text).map_err(|err| ConfigError::Transport {
        path: path.display().to_string(),
        reason: err.to_string(),
    })
}
