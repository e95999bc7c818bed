//! # Lobby Server Library
//!
//! This library provides the authoritative server implementation for the chat
//! lobby. It admits clients, relays their chat, answers their slash commands,
//! and keeps the per-user preference and statistics stores that those commands
//! read and write.
//!
//! ## Core Responsibilities
//!
//! ### Command Handling
//! Every slash command a client types is parsed and executed here. Commands
//! answer with response lines addressed to the sender only; a malformed or
//! refused invocation produces an explanatory message rather than silence.
//! The same handlers serve the server console, so an operator can inspect
//! any player's statistics without joining the lobby.
//!
//! ### Client Management
//! Handles the complete lifecycle of client connections including:
//! - Connection establishment and name validation
//! - Activity tracking and timeout cleanup
//! - Join and leave announcements to the rest of the lobby
//!
//! ### Lobby Simulation
//! A small movement simulation runs behind the chat. Players walk and jump
//! across a shared floor, and the distances and jumps the simulation observes
//! feed the statistics counters that `/stats` reports.
//!
//! ## Architecture Design
//!
//! ### Single-Threaded Event Loop
//! The server uses a single-threaded, event-driven architecture that processes
//! all network events, console lines and tick updates sequentially. This
//! eliminates race conditions over the preference and statistics stores and
//! keeps command execution deterministic.
//!
//! ### UDP-Based Communication
//! Uses UDP sockets for low-latency communication with clients. Chat and
//! command traffic is small and self-contained, so each packet stands alone
//! and a lost datagram never wedges a session.
//!
//! ### Command Pipeline
//! Incoming chat lines starting with `/` are tokenized, routed to a handler
//! by name, and executed against trait-shaped views of the stores. The
//! handlers never touch the network; they return lines and the transport
//! delivers them.
//!
//! ## Module Organization
//!
//! ### Client Manager Module (`client_manager`)
//! Manages individual client connections and their associated state:
//! - Connection tracking and client ID assignment
//! - Name validation and case-insensitive lookup
//! - Client timeout detection and cleanup
//!
//! ### Commands Module (`commands`)
//! Contains the slash command handlers and their shared plumbing:
//! - Dispatch by command name with case-insensitive matching
//! - `/color` for chat and name color preferences
//! - `/stats` for the statistics report in its several forms
//! - Tab completion over names, fields, colors and statistics
//!
//! ### Game Module (`game`)
//! Contains the lobby movement simulation:
//! - Player positions, velocities and held movement intent
//! - Walking distance and jump extraction per tick
//!
//! ### Network Module (`network`)
//! Handles all networking operations and protocol implementation:
//! - UDP socket management and packet processing
//! - Message serialization and deserialization
//! - Connection establishment and termination
//! - Console input and the main tick loop
//!
//! ### Player Data Module (`player_data`)
//! Keeps per-user appearance preferences keyed by lowercased name, so a
//! user's colors survive a rejoin under different capitalization.
//!
//! ### Statistics Module (`statistics`)
//! Counts what users do: play time accrues while online, movement arrives
//! from the simulation, and item-qualified counters keep their per-item
//! breakdown.
//!
//! ## Performance Characteristics
//!
//! ### Tick Rate
//! The server runs at a fixed tick rate (20Hz by default) to pace the
//! simulation and the play-time counters. Command handling is not tied to
//! the tick; commands answer as soon as their packet arrives.
//!
//! ### Scalability
//! Designed for a modest lobby (up to a few dozen clients) with room for
//! expansion. Memory usage scales with the number of users ever seen, since
//! preferences and statistics persist across sessions.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a new server bound to address with 20Hz tick rate and max 32 clients
//!     let mut server = Server::new(
//!         "127.0.0.1:8080",
//!         Duration::from_millis(50), // 20Hz = 50ms per tick
//!         32
//!     ).await?;
//!
//!     // Start the server - this runs the main loop which:
//!     // - Listens for client connections, chat and input packets
//!     // - Executes slash commands and returns their response lines
//!     // - Advances the lobby simulation at the specified tick rate
//!     // - Feeds movement and play time into the statistics store
//!     // - Handles client timeouts and disconnections
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! The server uses an event-driven architecture with internal async tasks that handle:
//! - **Network Receiver**: Continuously listens for incoming packets
//! - **Network Sender**: Processes outgoing packet queue and broadcasts
//! - **Timeout Checker**: Monitors client health and removes inactive connections
//! - **Console Reader**: Forwards operator input lines to the main loop
//! - **Main Loop**: Executes commands, relays chat, and runs the lobby tick

pub mod client_manager;
pub mod commands;
pub mod game;
pub mod network;
pub mod player_data;
pub mod statistics;
