//! The boundary to the external imaging engine.
//!
//! The engine is consumed through the [`EngineBackend`] trait, which mirrors
//! the native context API: boolean success codes, a has-error flag, and a
//! write-diagnostic-into-caller-buffer call. [`JobContext`] wraps one engine
//! context and owns the two safety protocols around it:
//!
//! - **Error gate**: every operation checks for a fault before touching the
//!   engine. Once a context faults, the diagnostic is read once, cached, and
//!   every later operation short-circuits to the cached text. Calling into a
//!   faulted native context is undefined behavior, so the gate is not
//!   optional.
//! - **Buffer lifetime**: bytes handed across the boundary are moved into a
//!   context-owned allocation list first and stay alive until the context is
//!   dropped, which also destroys the engine context on every exit path.

use crate::error::{FramewiseError, FramewiseResult};

/// Protocol identifier for graph submission.
pub const EXECUTE_COMMAND: &str = "v1/execute";

/// Initial size of the diagnostic buffer. Doubled until the engine's message
/// fits; never capped, so diagnostics are never truncated.
const ERROR_BUFFER_INITIAL: usize = 512;

/// One native engine context. Methods return `false`/`None` on failure, after
/// which the context holds a diagnostic retrievable via
/// [`error_write_to_buffer`](EngineBackend::error_write_to_buffer).
pub trait EngineBackend {
    /// Whether the context is in the errored state.
    fn has_error(&mut self) -> bool;

    /// Writes the diagnostic message plus a trailing NUL into `buf`. Returns
    /// the count of bytes written (terminator included), or `None` if `buf`
    /// is too small.
    fn error_write_to_buffer(&mut self, buf: &mut [u8]) -> Option<usize>;

    /// Registers `bytes` as the input for `io_id`. The slice must stay valid
    /// for the lifetime of the context.
    fn add_input_buffer(&mut self, io_id: u32, bytes: &[u8]) -> bool;

    /// Declares `io_id` as an output slot.
    fn add_output_buffer(&mut self, io_id: u32) -> bool;

    /// Submits a JSON payload under a protocol method name.
    fn send_json(&mut self, method: &str, payload: &[u8]) -> bool;

    /// Retrieves the bytes produced for an output slot.
    fn get_output_buffer(&mut self, io_id: u32) -> Option<Vec<u8>>;

    /// Tears down the context. Called exactly once, from [`JobContext`]'s
    /// drop.
    fn destroy(&mut self);
}

/// An exclusively-owned engine context for a single execution. Never shared
/// or reused across executions.
pub struct JobContext<E: EngineBackend> {
    engine: E,
    allocs: Vec<Vec<u8>>,
    diagnostic: Option<String>,
}

impl<E: EngineBackend> JobContext<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            allocs: Vec::new(),
            diagnostic: None,
        }
    }

    pub fn add_input(&mut self, io_id: u32, bytes: Vec<u8>) -> FramewiseResult<()> {
        self.gate()?;
        self.allocs.push(bytes);
        let held = self.allocs.last().map(Vec::as_slice).unwrap_or(&[]);
        if !self.engine.add_input_buffer(io_id, held) {
            return Err(self.fault());
        }
        Ok(())
    }

    pub fn add_output(&mut self, io_id: u32) -> FramewiseResult<()> {
        self.gate()?;
        if !self.engine.add_output_buffer(io_id) {
            return Err(self.fault());
        }
        Ok(())
    }

    /// Submits the serialized graph under [`EXECUTE_COMMAND`].
    pub fn message(&mut self, payload: Vec<u8>) -> FramewiseResult<()> {
        self.gate()?;
        self.allocs.push(payload);
        let held = self.allocs.last().map(Vec::as_slice).unwrap_or(&[]);
        if !self.engine.send_json(EXECUTE_COMMAND, held) {
            return Err(self.fault());
        }
        // The engine reports execution faults on the context rather than in
        // the call result.
        self.gate()
    }

    pub fn get_output(&mut self, io_id: u32) -> FramewiseResult<Vec<u8>> {
        self.gate()?;
        match self.engine.get_output_buffer(io_id) {
            Some(bytes) => Ok(bytes),
            None => Err(self.fault()),
        }
    }

    /// The check-before-every-call gate. Returns the cached diagnostic if the
    /// context already faulted, otherwise polls the engine's error flag.
    fn gate(&mut self) -> FramewiseResult<()> {
        if let Some(diagnostic) = &self.diagnostic {
            return Err(FramewiseError::engine(diagnostic.clone()));
        }
        if self.engine.has_error() {
            return Err(self.fault());
        }
        Ok(())
    }

    /// Reads and caches the diagnostic for a newly observed fault.
    fn fault(&mut self) -> FramewiseError {
        let diagnostic = self.read_error_text();
        tracing::debug!(diagnostic, "engine context faulted");
        self.diagnostic = Some(diagnostic.clone());
        FramewiseError::engine(diagnostic)
    }

    /// Growable-buffer retrieval of the diagnostic text. The message length
    /// is unknown in advance; the buffer doubles until the write succeeds,
    /// then the written prefix is decoded with the trailing terminator
    /// trimmed.
    fn read_error_text(&mut self) -> String {
        let mut buf = vec![0u8; ERROR_BUFFER_INITIAL];
        loop {
            match self.engine.error_write_to_buffer(&mut buf) {
                Some(written) => {
                    // A count beyond the buffer is a backend bug; clamp
                    // rather than panic.
                    let written = written.min(buf.len());
                    let text = &buf[..written.saturating_sub(1)];
                    return String::from_utf8_lossy(text).into_owned();
                }
                None => buf = vec![0u8; buf.len() * 2],
            }
        }
    }
}

impl<E: EngineBackend> Drop for JobContext<E> {
    fn drop(&mut self) {
        self.engine.destroy();
        self.allocs.clear();
    }
}
