use std::collections::VecDeque;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::debug;
use rand::Rng;

use crate::config::BaudRate;
use crate::error::TransportError;

/// Serial reads poll with this timeout so a pending read observes
/// cancellation promptly.
const READ_TIMEOUT: Duration = Duration::from_millis(50);
const READ_BUF_BYTES: usize = 256;

/// One pull from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Decoded text of arbitrary length; chunk boundaries carry no meaning.
    Chunk(String),
    /// Nothing arrived within the poll window. Gives the reader loop a
    /// chance to observe cancellation.
    Idle,
    /// The stream ended on the far side.
    Eos,
}

/// Cloneable handle that unblocks a pending read.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Minimal contract the ingestion core requires from a byte-stream source:
/// chunked reads in arrival order, a cancel handle, and a close. Chunk
/// boundaries need not align with record boundaries.
pub trait Transport: Send {
    fn read_chunk(&mut self) -> Result<ReadOutcome, TransportError>;

    /// Handle for unblocking a pending `read_chunk` from another thread.
    fn cancel_token(&self) -> CancelToken;

    /// Tears down the underlying connection. Must only be called after the
    /// read loop has drained; safe to call more than once.
    fn close(&mut self) -> Result<(), TransportError>;
}

/// Real serial link via the `serialport` crate.
pub struct SerialTransport {
    port_name: String,
    port: Option<Box<dyn serialport::SerialPort>>,
    cancel: CancelToken,
}

impl SerialTransport {
    pub fn open(port_name: &str, baud: BaudRate) -> Result<Self, TransportError> {
        let port = serialport::new(port_name, baud.bits_per_second())
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|source| TransportError::Open {
                port: port_name.to_owned(),
                source,
            })?;
        debug!("opened {} at {} baud", port_name, baud.bits_per_second());
        Ok(Self {
            port_name: port_name.to_owned(),
            port: Some(port),
            cancel: CancelToken::new(),
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl Transport for SerialTransport {
    fn read_chunk(&mut self) -> Result<ReadOutcome, TransportError> {
        let port = self.port.as_mut().ok_or(TransportError::Closed)?;
        let mut buf = [0u8; READ_BUF_BYTES];
        match port.read(&mut buf) {
            Ok(0) => Ok(ReadOutcome::Eos),
            // Instruments emit ASCII; anything else is decoded lossily and
            // the parser drops the garbled record.
            Ok(n) => Ok(ReadOutcome::Chunk(
                String::from_utf8_lossy(&buf[..n]).into_owned(),
            )),
            Err(e)
                if e.kind() == std::io::ErrorKind::TimedOut
                    || e.kind() == std::io::ErrorKind::WouldBlock =>
            {
                Ok(ReadOutcome::Idle)
            }
            Err(e) => Err(TransportError::Read(e)),
        }
    }

    fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn close(&mut self) -> Result<(), TransportError> {
        if let Some(port) = self.port.take() {
            debug!("closing {}", self.port_name);
            drop(port);
        }
        Ok(())
    }
}

/// Sine-wave generator that emits numeric CSV lines in randomly sized
/// chunks, for demos and manual testing without hardware.
pub struct SimulatedTransport {
    channels: usize,
    phase: f64,
    backlog: VecDeque<String>,
    cancel: CancelToken,
}

impl SimulatedTransport {
    pub fn new(channels: usize) -> Self {
        Self {
            channels: channels.max(1),
            phase: 0.0,
            backlog: VecDeque::new(),
            cancel: CancelToken::new(),
        }
    }

    fn next_line(&mut self) -> String {
        let mut rng = rand::thread_rng();
        self.phase += 0.1;
        let fields: Vec<String> = (0..self.channels)
            .map(|i| {
                let value = (self.phase * (i as f64 * 0.3 + 1.0)).sin() * 2.0
                    + rng.gen_range(-0.05..0.05);
                format!("{value:.4}")
            })
            .collect();
        format!("{}\n", fields.join(","))
    }
}

impl Transport for SimulatedTransport {
    fn read_chunk(&mut self) -> Result<ReadOutcome, TransportError> {
        if self.backlog.is_empty() {
            thread::sleep(Duration::from_millis(10));
            let line = self.next_line();
            // Split the line at a random byte so consumers see the same
            // arbitrary chunking a real port produces.
            let cut = rand::thread_rng().gen_range(0..=line.len());
            let (head, tail) = line.split_at(cut);
            if !head.is_empty() {
                self.backlog.push_back(head.to_owned());
            }
            if !tail.is_empty() {
                self.backlog.push_back(tail.to_owned());
            }
        }
        match self.backlog.pop_front() {
            Some(chunk) => Ok(ReadOutcome::Chunk(chunk)),
            None => Ok(ReadOutcome::Idle),
        }
    }

    fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn close(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Deterministic transport for tests: replays scripted chunks, then either
/// idles (keeping the link open) or reports end-of-stream.
pub struct ScriptedTransport {
    chunks: VecDeque<ReadOutcome>,
    idle_when_drained: bool,
    cancel: CancelToken,
    closed: Arc<AtomicBool>,
}

impl ScriptedTransport {
    pub fn new(chunks: impl IntoIterator<Item = ReadOutcome>, idle_when_drained: bool) -> Self {
        Self {
            chunks: chunks.into_iter().collect(),
            idle_when_drained,
            cancel: CancelToken::new(),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn from_text(
        chunks: impl IntoIterator<Item = &'static str>,
        idle_when_drained: bool,
    ) -> Self {
        Self::new(
            chunks.into_iter().map(|c| ReadOutcome::Chunk(c.to_owned())),
            idle_when_drained,
        )
    }

    /// Observes `close` from the outside, for teardown-ordering assertions.
    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }
}

impl Transport for ScriptedTransport {
    fn read_chunk(&mut self) -> Result<ReadOutcome, TransportError> {
        match self.chunks.pop_front() {
            Some(outcome) => Ok(outcome),
            None if self.idle_when_drained => {
                thread::sleep(Duration::from_millis(2));
                Ok(ReadOutcome::Idle)
            }
            None => Ok(ReadOutcome::Eos),
        }
    }

    fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
