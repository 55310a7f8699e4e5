// src/net/server.rs

//! The rendezvous relay both players connect to.
//!
//! The server is deliberately dumb: it stores exactly one pending move
//! record per player slot plus the session-setup tuple, and never validates
//! turn order or move legality. All rule enforcement lives in the sessions.
//!
//! Protocol, one request per reply:
//! - a full move record (4+ colon-separated fields) overwrites the sender's
//!   slot and is echoed back,
//! - a bare player id returns the *other* slot's stored record,
//! - `"seed:<seed>:<depth>:<columns>:<start_player>"` stores the setup and
//!   answers `"1"`,
//! - `"seed:want"` answers the stored setup without the `seed:` prefix,
//! - `"2"` answers `"Goodbye"`.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::thread;

use tracing::{debug, info, warn};

use crate::core::{GameError, Player};
use crate::net::{MESSAGE_LIMIT, TERMINATION};
use crate::session::SessionSetup;

/// Moves slots start out holding a harmless placeholder with move number 0,
/// which every session ignores as "no move yet".
fn placeholder(player: usize) -> String {
    format!("{}:0:h:0", player)
}

/// Shared store behind all connections.
struct RelayStore {
    moves: [String; 2],
    setup: SessionSetup,
    next_slot: usize,
}

impl RelayStore {
    fn new() -> Self {
        Self {
            moves: [placeholder(0), placeholder(1)],
            // Stand-in until a host publishes the real tuple.
            setup: SessionSetup {
                seed: 42,
                depth: 1,
                columns: 7,
                start_player: Player::Zero,
            },
            next_slot: 0,
        }
    }
}

/// A running relay server; accepts connections until dropped along with the
/// process. One thread per connection, one mutex around the two-slot store.
pub struct RelayServer {
    listener: TcpListener,
    store: Arc<Mutex<RelayStore>>,
}

impl RelayServer {
    /// Binds the listening socket. Pass port 0 to let the OS choose.
    pub fn bind(addr: &str) -> Result<Self, GameError> {
        let listener = TcpListener::bind(addr).map_err(|e| GameError::Transport {
            message: format!("could not bind relay listener: {}", e),
        })?;
        Ok(Self {
            listener,
            store: Arc::new(Mutex::new(RelayStore::new())),
        })
    }

    /// The address clients should connect to.
    pub fn local_addr(&self) -> Result<SocketAddr, GameError> {
        self.listener.local_addr().map_err(|e| GameError::Transport {
            message: format!("listener has no local address: {}", e),
        })
    }

    /// Accepts connections forever, one handler thread each. Consumes the
    /// server; call from a dedicated thread.
    pub fn run(self) {
        for incoming in self.listener.incoming() {
            match incoming {
                Ok(stream) => {
                    let store = Arc::clone(&self.store);
                    if let Ok(peer) = stream.peer_addr() {
                        info!(%peer, "relay connection");
                    }
                    thread::spawn(move || handle_client(stream, store));
                }
                Err(e) => warn!("failed relay accept: {}", e),
            }
        }
    }

    /// Spawns `run` on a background thread and returns the bound address.
    /// The thread lives until the process exits.
    pub fn spawn(self) -> Result<SocketAddr, GameError> {
        let addr = self.local_addr()?;
        thread::spawn(move || self.run());
        Ok(addr)
    }
}

fn handle_client(mut stream: TcpStream, store: Arc<Mutex<RelayStore>>) {
    // Greet with the assigned slot, mirroring what sessions expect.
    let slot = {
        let mut store = store.lock().expect("relay store poisoned");
        let slot = store.next_slot.min(1);
        store.next_slot += 1;
        slot
    };
    if stream.write_all(slot.to_string().as_bytes()).is_err() {
        return;
    }

    let mut buffer = [0u8; MESSAGE_LIMIT];
    loop {
        let read = match stream.read(&mut buffer) {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        let request = String::from_utf8_lossy(&buffer[..read]).trim().to_string();
        let reply = {
            let mut store = store.lock().expect("relay store poisoned");
            answer(&request, &mut store)
        };
        debug!(request = %request, reply = %reply, "relay served");
        if stream.write_all(reply.as_bytes()).is_err() {
            break;
        }
    }
}

/// Computes the reply for one request against the shared store.
fn answer(request: &str, store: &mut RelayStore) -> String {
    if request == TERMINATION {
        return "Goodbye".to_string();
    }

    if let Some(rest) = request.strip_prefix("seed:") {
        if rest == "want" {
            return store.setup.to_string();
        }
        return match SessionSetup::from_str(rest) {
            Ok(setup) => {
                store.setup = setup;
                "1".to_string()
            }
            Err(_) => placeholder(0),
        };
    }

    let fields: Vec<&str> = request.split(':').collect();
    match fields.len() {
        // Bare player id: hand over the other slot's record.
        1 => match fields[0].parse::<usize>() {
            Ok(id @ (0 | 1)) => store.moves[1 - id].clone(),
            _ => placeholder(0),
        },
        // A full move record: store it under the sender's slot and echo it.
        4.. => match fields[0].parse::<usize>() {
            Ok(id @ (0 | 1)) => {
                store.moves[id] = request.to_string();
                request.to_string()
            }
            _ => placeholder(0),
        },
        _ => placeholder(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn termination_gets_a_goodbye() {
        let mut store = RelayStore::new();
        assert_eq!(answer("2", &mut store), "Goodbye");
    }

    #[test]
    fn setup_put_then_get() {
        let mut store = RelayStore::new();
        assert_eq!(answer("seed:7:2:5:1", &mut store), "1");
        assert_eq!(answer("seed:want", &mut store), "7:2:5:1");
    }

    #[test]
    fn moves_are_stored_per_slot_and_fetched_crosswise() {
        let mut store = RelayStore::new();
        assert_eq!(answer("0:1:h:3", &mut store), "0:1:h:3");
        // Player 1 asks and receives player 0's record.
        assert_eq!(answer("1", &mut store), "0:1:h:3");
        // Player 0 asks and still sees player 1's placeholder.
        assert_eq!(answer("0", &mut store), "1:0:h:0");
    }

    #[test]
    fn junk_requests_get_the_placeholder() {
        let mut store = RelayStore::new();
        assert_eq!(answer("bogus", &mut store), "0:0:h:0");
        assert_eq!(answer("9:9", &mut store), "0:0:h:0");
    }
}
