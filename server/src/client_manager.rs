//! Client connection management for the lobby server
//!
//! This module handles the server-side roster of connected users, including:
//! - Connection lifecycle (join, disconnect, timeout)
//! - Username rules and duplicate-name refusal at join time
//! - Connection health monitoring and automatic cleanup
//! - Capacity enforcement and address tracking
//!
//! The roster doubles as the directory the chat commands consult to
//! resolve targets and to list candidates for tab completion.

use crate::commands::{self, Directory, OnlinePlayer};
use log::info;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Usernames are 1 to 16 characters from [A-Za-z0-9_].
pub const MAX_NAME_LEN: usize = 16;

/// How long a client may stay silent before being dropped.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a join attempt was refused. The `Display` text goes back to the
/// client verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("Server is full")]
    ServerFull,
    #[error("That name is already taken")]
    NameInUse,
    #[error("Names are 1-16 letters, digits or underscores")]
    InvalidName,
}

/// A connected user
///
/// Tracks connection metadata: the server-assigned id, the display name
/// chosen at join, the network address responses go to, and the last
/// time any packet arrived.
#[derive(Debug)]
pub struct Client {
    /// Unique client identifier assigned by the server
    pub id: u32,
    /// Display name, exactly as given at join
    pub name: String,
    /// Network address for sending responses
    pub addr: SocketAddr,
    /// Last time we received any packet from this client
    pub last_seen: Instant,
}

impl Client {
    pub fn new(id: u32, name: String, addr: SocketAddr) -> Self {
        Self {
            id,
            name,
            addr,
            last_seen: Instant::now(),
        }
    }

    /// Marks the client as active right now.
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    /// Returns true if no packets have arrived within `timeout`.
    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }

    /// The key this user's preferences and statistics live under.
    /// Stable across reconnects and name-case changes.
    pub fn user_key(&self) -> String {
        commands::user_key(&self.name)
    }
}

/// Manages all connected clients
///
/// The ClientManager provides centralized control over connections,
/// enforces capacity and username rules, and answers identity queries
/// for the rest of the server. Connection ids are never reused within
/// a server run.
pub struct ClientManager {
    /// Connected clients indexed by their unique ID
    clients: HashMap<u32, Client>,
    /// Next available client ID for new connections
    next_client_id: u32,
    /// Maximum number of concurrent clients allowed
    max_clients: usize,
}

impl ClientManager {
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            next_client_id: 1,
            max_clients,
        }
    }

    /// Validates a username against the join rules.
    pub fn valid_name(name: &str) -> bool {
        !name.is_empty()
            && name.len() <= MAX_NAME_LEN
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// Attempts to add a new client connection
    ///
    /// Checks capacity, username shape and name collisions (ignoring
    /// case) in that order. On success the client gets a fresh id and
    /// is associated with their network address for response routing.
    pub fn add_client(&mut self, addr: SocketAddr, name: &str) -> Result<u32, JoinError> {
        if self.clients.len() >= self.max_clients {
            return Err(JoinError::ServerFull);
        }
        if !Self::valid_name(name) {
            return Err(JoinError::InvalidName);
        }
        if self.name_in_use(name) {
            return Err(JoinError::NameInUse);
        }

        let client_id = self.next_client_id;
        self.next_client_id += 1;

        let client = Client::new(client_id, name.to_string(), addr);
        info!("Client {} ({}) connected from {}", client_id, name, addr);
        self.clients.insert(client_id, client);

        Ok(client_id)
    }

    /// Removes a client from the roster
    ///
    /// Returns the removed client so callers can still announce the
    /// departure by name. Handles both explicit disconnects and timeout
    /// cleanup.
    pub fn remove_client(&mut self, client_id: &u32) -> Option<Client> {
        let client = self.clients.remove(client_id);
        if let Some(client) = &client {
            info!("Client {} ({}) disconnected", client.id, client.name);
        }
        client
    }

    /// Finds a client ID by their network address
    ///
    /// Used to associate incoming packets with existing connections.
    pub fn find_client_by_addr(&self, addr: SocketAddr) -> Option<u32> {
        self.clients
            .iter()
            .find(|(_, client)| client.addr == addr)
            .map(|(id, _)| *id)
    }

    pub fn get(&self, client_id: u32) -> Option<&Client> {
        self.clients.get(&client_id)
    }

    /// Refreshes a client's activity timestamp.
    pub fn touch(&mut self, client_id: u32) {
        if let Some(client) = self.clients.get_mut(&client_id) {
            client.touch();
        }
    }

    /// Checks for and removes timed-out clients
    ///
    /// Returns the removed clients so other systems can clean up and
    /// announce the departures.
    pub fn check_timeouts(&mut self) -> Vec<Client> {
        let timed_out: Vec<u32> = self
            .clients
            .iter()
            .filter(|(_, client)| client.is_timed_out(CLIENT_TIMEOUT))
            .map(|(id, _)| *id)
            .collect();

        timed_out
            .iter()
            .filter_map(|client_id| self.remove_client(client_id))
            .collect()
    }

    /// Gets all client IDs and their network addresses
    ///
    /// Used for broadcasting chat lines and announcements to everyone
    /// connected.
    pub fn get_client_addrs(&self) -> Vec<(u32, SocketAddr)> {
        self.clients
            .iter()
            .map(|(id, client)| (*id, client.addr))
            .collect()
    }

    /// Connection ids paired with the store keys their records live
    /// under. Used when the tick loop feeds the statistics tracker.
    pub fn online_user_keys(&self) -> Vec<(u32, String)> {
        self.clients
            .iter()
            .map(|(id, client)| (*id, client.user_key()))
            .collect()
    }

    /// Returns the number of currently connected clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if no clients are currently connected
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    fn name_in_use(&self, name: &str) -> bool {
        self.clients
            .values()
            .any(|client| client.name.eq_ignore_ascii_case(name))
    }
}

impl Directory for ClientManager {
    fn resolve_online(&self, name: &str) -> Option<OnlinePlayer> {
        self.clients
            .values()
            .find(|client| client.name.eq_ignore_ascii_case(name))
            .map(|client| OnlinePlayer {
                id: client.id,
                name: client.name.clone(),
            })
    }

    fn online_names(&self) -> Vec<String> {
        self.clients
            .values()
            .map(|client| client.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_addr() -> SocketAddr {
        "127.0.0.1:8080".parse().unwrap()
    }

    fn test_addr2() -> SocketAddr {
        "127.0.0.1:8081".parse().unwrap()
    }

    #[test]
    fn test_client_creation() {
        let addr = test_addr();
        let client = Client::new(1, "Alice".to_string(), addr);

        assert_eq!(client.id, 1);
        assert_eq!(client.name, "Alice");
        assert_eq!(client.addr, addr);
        assert_eq!(client.user_key(), "alice");
    }

    #[test]
    fn test_client_timeout() {
        let addr = test_addr();
        let mut client = Client::new(1, "Alice".to_string(), addr);

        assert!(!client.is_timed_out(Duration::from_secs(1)));

        client.last_seen = Instant::now() - Duration::from_secs(2);
        assert!(client.is_timed_out(Duration::from_secs(1)));

        client.touch();
        assert!(!client.is_timed_out(Duration::from_secs(1)));
    }

    #[test]
    fn test_valid_names() {
        assert!(ClientManager::valid_name("Alice"));
        assert!(ClientManager::valid_name("bob_99"));
        assert!(ClientManager::valid_name("X"));
        assert!(ClientManager::valid_name("exactly_sixteen_"));

        assert!(!ClientManager::valid_name(""));
        assert!(!ClientManager::valid_name("seventeen_letters"));
        assert!(!ClientManager::valid_name("space name"));
        assert!(!ClientManager::valid_name("dash-name"));
        assert!(!ClientManager::valid_name("émile"));
    }

    #[test]
    fn test_add_client() {
        let mut manager = ClientManager::new(2);

        let client_id = manager.add_client(test_addr(), "Alice").unwrap();
        assert_eq!(client_id, 1);
        assert_eq!(manager.len(), 1);
        assert!(!manager.is_empty());
        assert_eq!(manager.get(client_id).map(|c| c.name.as_str()), Some("Alice"));
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut manager = ClientManager::new(2);

        let first = manager.add_client(test_addr(), "Alice").unwrap();
        manager.remove_client(&first);
        let second = manager.add_client(test_addr(), "Alice").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_add_client_max_capacity() {
        let mut manager = ClientManager::new(1);

        assert!(manager.add_client(test_addr(), "Alice").is_ok());
        assert_eq!(
            manager.add_client(test_addr2(), "Bob"),
            Err(JoinError::ServerFull)
        );
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_add_client_rejects_bad_names() {
        let mut manager = ClientManager::new(4);

        assert_eq!(
            manager.add_client(test_addr(), ""),
            Err(JoinError::InvalidName)
        );
        assert_eq!(
            manager.add_client(test_addr(), "has spaces"),
            Err(JoinError::InvalidName)
        );
        assert!(manager.is_empty());
    }

    #[test]
    fn test_duplicate_names_ignore_case() {
        let mut manager = ClientManager::new(4);

        manager.add_client(test_addr(), "Alice").unwrap();
        assert_eq!(
            manager.add_client(test_addr2(), "alice"),
            Err(JoinError::NameInUse)
        );
        assert_eq!(
            manager.add_client(test_addr2(), "ALICE"),
            Err(JoinError::NameInUse)
        );
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_remove_client_returns_identity() {
        let mut manager = ClientManager::new(2);

        let client_id = manager.add_client(test_addr(), "Alice").unwrap();
        let removed = manager.remove_client(&client_id).unwrap();

        assert_eq!(removed.name, "Alice");
        assert!(manager.is_empty());
        assert!(manager.remove_client(&client_id).is_none());
    }

    #[test]
    fn test_find_client_by_addr() {
        let mut manager = ClientManager::new(2);
        let addr1 = test_addr();
        let addr2 = test_addr2();

        let client_id1 = manager.add_client(addr1, "Alice").unwrap();
        let _client_id2 = manager.add_client(addr2, "Bob").unwrap();

        assert_eq!(manager.find_client_by_addr(addr1), Some(client_id1));

        let unknown_addr: SocketAddr = "192.168.1.1:9999".parse().unwrap();
        assert_eq!(manager.find_client_by_addr(unknown_addr), None);
    }

    #[test]
    fn test_check_timeouts() {
        let mut manager = ClientManager::new(4);

        let quiet = manager.add_client(test_addr(), "Quiet").unwrap();
        let active = manager.add_client(test_addr2(), "Active").unwrap();

        if let Some(client) = manager.clients.get_mut(&quiet) {
            client.last_seen = Instant::now() - Duration::from_secs(120);
        }

        let removed = manager.check_timeouts();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].name, "Quiet");
        assert!(manager.get(active).is_some());
        assert!(manager.get(quiet).is_none());
    }

    #[test]
    fn test_directory_resolution_ignores_case() {
        let mut manager = ClientManager::new(4);
        manager.add_client(test_addr(), "Alice").unwrap();

        let resolved = manager.resolve_online("alice").unwrap();
        assert_eq!(resolved.name, "Alice");
        assert_eq!(resolved.id, 1);
        assert!(manager.resolve_online("Ghost").is_none());
    }

    #[test]
    fn test_online_names_lists_everyone() {
        let mut manager = ClientManager::new(4);
        manager.add_client(test_addr(), "Alice").unwrap();
        manager.add_client(test_addr2(), "Bob").unwrap();

        let mut names = manager.online_names();
        names.sort();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_online_user_keys() {
        let mut manager = ClientManager::new(4);
        let id = manager.add_client(test_addr(), "Alice").unwrap();

        let keys = manager.online_user_keys();
        assert_eq!(keys, vec![(id, "alice".to_string())]);
    }
}
