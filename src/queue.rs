//! Readiness-gated outbound message queue.
//!
//! The front-end may still be initializing when the first commands are
//! issued. Until it announces itself with `{"event": "ready"}` every message
//! is buffered; the first readiness event flushes the buffer in insertion
//! order and from then on messages go straight to the [`Transport`].

use std::collections::VecDeque;
use std::io::Write;
use std::sync::mpsc;

use crate::command::{parse_event, Command, FrontendEvent};
use crate::error::ViewerError;

/// Fire-and-forget channel to the rendering front-end.
pub trait Transport {
    /// Deliver one JSON message. Must not block waiting for a reply.
    fn send(&mut self, message: serde_json::Value) -> Result<(), ViewerError>;
}

/// Transport that keeps every delivered message in memory.
///
/// Useful for headless sessions and for asserting on the exact wire
/// traffic a view produced.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordingTransport {
    /// Messages in delivery order.
    pub messages: Vec<serde_json::Value>,
}

impl RecordingTransport {
    /// Empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opcodes of the recorded messages, in delivery order.
    #[must_use]
    pub fn ops(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter_map(|m| m.get("op").and_then(serde_json::Value::as_str))
            .collect()
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, message: serde_json::Value) -> Result<(), ViewerError> {
        self.messages.push(message);
        Ok(())
    }
}

impl Transport for mpsc::Sender<serde_json::Value> {
    fn send(&mut self, message: serde_json::Value) -> Result<(), ViewerError> {
        mpsc::Sender::send(self, message)
            .map_err(|_| ViewerError::Transport("receiver dropped".into()))
    }
}

/// Transport that writes one compact JSON document per line.
#[derive(Debug)]
pub struct JsonLinesTransport<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesTransport<W> {
    /// Wrap a writer (stdout, a file, a socket...).
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Transport for JsonLinesTransport<W> {
    fn send(&mut self, message: serde_json::Value) -> Result<(), ViewerError> {
        serde_json::to_writer(&mut self.writer, &message)
            .map_err(|e| ViewerError::Transport(e.to_string()))?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

// ── Queue ────────────────────────────────────────────────────────────────

/// Whether the front-end has announced it can accept commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Readiness {
    /// Still initializing; commands are buffered.
    #[default]
    NotReady,
    /// Accepting commands; the buffer has been flushed. Terminal.
    Ready,
}

/// Ordered command queue in front of a [`Transport`].
#[derive(Debug)]
pub struct MessageQueue<T: Transport> {
    transport: T,
    readiness: Readiness,
    pending: VecDeque<serde_json::Value>,
}

impl<T: Transport> MessageQueue<T> {
    /// Queue in the [`Readiness::NotReady`] state with an empty buffer.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            readiness: Readiness::NotReady,
            pending: VecDeque::new(),
        }
    }

    /// Encode and send a command, buffering it while the front-end is not
    /// ready. Only encoding failures are reported; delivery is best-effort.
    pub fn send(&mut self, command: &Command) -> Result<(), ViewerError> {
        let message = command.to_message()?;
        match self.readiness {
            Readiness::NotReady => {
                log::debug!(
                    "front-end not ready, buffering {} ({} pending)",
                    command.op(),
                    self.pending.len() + 1
                );
                self.pending.push_back(message);
            }
            Readiness::Ready => self.deliver(message),
        }
        Ok(())
    }

    /// Transition to [`Readiness::Ready`] and flush the buffer in FIFO
    /// order. Returns `false` (and does nothing) if already ready.
    pub fn on_ready(&mut self) -> bool {
        if self.readiness == Readiness::Ready {
            return false;
        }
        self.readiness = Readiness::Ready;
        log::info!(
            "front-end ready, flushing {} buffered message(s)",
            self.pending.len()
        );
        while let Some(message) = self.pending.pop_front() {
            self.deliver(message);
        }
        true
    }

    /// Route an inbound front-end message. Unrecognised messages are
    /// ignored.
    pub fn handle_message(
        &mut self,
        msg: &serde_json::Value,
    ) -> Option<FrontendEvent> {
        let Some(event) = parse_event(msg) else {
            log::debug!("ignoring front-end message: {msg}");
            return None;
        };
        match event {
            FrontendEvent::Ready => {
                let _ = self.on_ready();
            }
        }
        Some(event)
    }

    /// Current readiness state.
    #[must_use]
    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    /// Whether the front-end has announced readiness.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.readiness == Readiness::Ready
    }

    /// Number of buffered, not yet delivered messages.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Shared access to the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Exclusive access to the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the queue, returning the transport. Buffered messages are
    /// discarded.
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn deliver(&mut self, message: serde_json::Value) {
        if let Err(e) = self.transport.send(message) {
            log::warn!("front-end transport failed: {e}");
        }
    }
}
