//! Unix-socket client for the engine control channel.
//!
//! The engine exposes a line-less JSON request/response protocol over a
//! Unix-domain stream socket: the client sends `{"version": ...}` once as a
//! handshake, then one JSON object per command. Replies carry no length
//! prefix or terminator, so completeness is detected by incrementally
//! parsing the accumulated bytes — a reply is complete exactly when they
//! parse as one full JSON value. This handles nested objects and split
//! reads that a trailing-byte check would misjudge.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use thiserror::Error;
use tokio::io::{self, AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

use crate::models::CommandRequest;

/// Protocol version announced in the handshake.
const PROTOCOL_VERSION: &str = "0.1";

/// Read chunk size for socket replies.
const READ_CHUNK: usize = 4096;

/// Errors from the engine control channel.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The socket file does not exist; the engine is likely not running.
    #[error("control socket not found at {0}; is the engine running with unix-command enabled?")]
    SocketUnavailable(PathBuf),

    /// Connecting, reading, or writing failed.
    #[error("control socket I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The engine closed the connection without sending a reply.
    #[error("engine closed the control connection without replying")]
    EmptyReply,

    /// The reply was complete but not valid JSON.
    #[error("failed to decode engine reply: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A connected control-channel session with the engine.
///
/// The handshake happens during [`EngineClient::connect`]; afterwards any
/// number of commands can be sent on the same session.
#[derive(Debug)]
pub struct EngineClient {
    stream: UnixStream,
}

impl EngineClient {
    /// Connects to the engine's control socket and performs the handshake.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::SocketUnavailable`] when the socket file is
    /// absent, and I/O or decode errors from the handshake exchange.
    pub async fn connect(path: &Path) -> Result<Self, ControlError> {
        if !path.exists() {
            return Err(ControlError::SocketUnavailable(path.to_path_buf()));
        }

        let stream = UnixStream::connect(path).await?;
        let mut client = Self { stream };

        let greeting = json!({ "version": PROTOCOL_VERSION });
        client.send_value(&greeting).await?;
        let reply = client.read_reply().await?;
        tracing::debug!(%reply, "Engine control handshake complete");

        Ok(client)
    }

    /// Sends one command and returns the engine's JSON reply verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error when the socket write fails, the engine closes the
    /// connection without replying, or the reply cannot be decoded.
    pub async fn send_command(&mut self, request: &CommandRequest) -> Result<Value, ControlError> {
        let wire = request.to_wire();
        tracing::debug!(command = %request.command, "Sending engine command");
        self.send_value(&wire).await?;
        self.read_reply().await
    }

    async fn send_value(&mut self, value: &Value) -> Result<(), ControlError> {
        let bytes = serde_json::to_vec(value)?;
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Reads one JSON value from the socket.
    ///
    /// Accumulates chunks until the buffer parses as a complete value. An
    /// incomplete parse (unexpected end of input) means more bytes are
    /// pending; any other parse error is a protocol violation.
    async fn read_reply(&mut self) -> Result<Value, ControlError> {
        let mut buf: Vec<u8> = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            let n = self.stream.read(&mut chunk).await?;
            if n == 0 {
                if buf.is_empty() {
                    return Err(ControlError::EmptyReply);
                }
                // Connection closed: whatever arrived must stand on its own.
                return Ok(serde_json::from_slice(&buf)?);
            }
            buf.extend_from_slice(&chunk[..n]);

            match serde_json::from_slice::<Value>(&buf) {
                Ok(value) => return Ok(value),
                Err(error) if error.is_eof() => {}
                Err(error) => return Err(ControlError::Decode(error)),
            }
        }
    }
}
