// src/net/mod.rs

//! The exchange boundary between a session and its opponent.
//!
//! Everything crosses this boundary as one small request string answered by
//! one small reply string: move records, move polls, the setup handshake and
//! the termination byte. The [`Relay`] trait is that contract; [`TcpRelay`]
//! speaks it over a blocking TCP connection to a rendezvous server
//! ([`server::RelayServer`]). There is no automatic retry and no timeout in
//! here: a transport failure surfaces to the caller, who decides what to do.

pub mod server;

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

use tracing::debug;

use crate::core::GameError;

/// Largest request or reply the exchange handles in one piece.
pub(crate) const MESSAGE_LIMIT: usize = 2048;

/// Payload that asks the relay to close the session.
pub const TERMINATION: &str = "2";

/// Blocking request/response exchange with the opponent's relay slot.
pub trait Relay {
    /// Sends one request and waits for the single reply.
    fn exchange(&mut self, request: &str) -> Result<String, GameError>;

    /// Tells the relay the game is over.
    fn terminate(&mut self) -> Result<(), GameError> {
        self.exchange(TERMINATION)?;
        Ok(())
    }
}

/// A relay client over one long-lived TCP connection.
pub struct TcpRelay {
    stream: TcpStream,
    slot: String,
}

impl TcpRelay {
    /// Connects to a relay server and reads the greeting that names the
    /// connection slot the server assigned.
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, GameError> {
        let stream = TcpStream::connect(addr).map_err(|e| GameError::Transport {
            message: format!("could not reach relay: {}", e),
        })?;
        let mut relay = Self { stream, slot: String::new() };
        relay.slot = relay.receive()?;
        debug!(slot = %relay.slot, "connected to relay");
        Ok(relay)
    }

    /// The slot label the server greeted this connection with.
    pub fn slot(&self) -> &str {
        &self.slot
    }

    fn receive(&mut self) -> Result<String, GameError> {
        let mut buffer = [0u8; MESSAGE_LIMIT];
        let read = self.stream.read(&mut buffer).map_err(|e| GameError::Transport {
            message: format!("relay read failed: {}", e),
        })?;
        if read == 0 {
            return Err(GameError::Transport {
                message: "relay closed the connection".to_string(),
            });
        }
        String::from_utf8(buffer[..read].to_vec()).map_err(|_| GameError::Transport {
            message: "relay reply was not valid UTF-8".to_string(),
        })
    }
}

impl Relay for TcpRelay {
    fn exchange(&mut self, request: &str) -> Result<String, GameError> {
        self.stream
            .write_all(request.as_bytes())
            .map_err(|e| GameError::Transport {
                message: format!("relay write failed: {}", e),
            })?;
        let reply = self.receive()?;
        debug!(request, reply = %reply, "relay exchange");
        Ok(reply)
    }
}
