//! Server network layer handling UDP transport and the lobby loop
//!
//! The main loop owns every store. Packets and console lines arrive as
//! messages from spawned tasks, each command runs synchronously to a
//! reply, and the tick feeds the lobby simulation into the statistics
//! tracker. A failed command is always an answer, never a crash.

use crate::client_manager::ClientManager;
use crate::commands::{
    self, CommandContext, CommandOutcome, CommandSender, OnlinePlayer, PreferenceStore,
    UserPreference,
};
use crate::game::GameState;
use crate::player_data::DataManager;
use crate::statistics::StatisticsTracker;
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::{Packet, Statistic, ANSI_RESET, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, RwLock};
use tokio::time::interval;

/// Messages sent from network and console tasks to the main server loop
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived {
        packet: Packet,
        addr: SocketAddr,
    },
    ClientTimeout {
        client_id: u32,
        name: String,
    },
    ConsoleLine {
        line: String,
    },
    Shutdown,
}

/// Messages sent from the main loop to the sender task
#[derive(Debug)]
pub enum OutboundMessage {
    SendPacket {
        packet: Packet,
        addr: SocketAddr,
    },
    BroadcastPacket {
        packet: Packet,
        exclude: Option<u32>,
    },
}

/// Main server coordinating networking, commands and the lobby tick
pub struct Server {
    socket: Arc<UdpSocket>,
    clients: Arc<RwLock<ClientManager>>,
    lobby: GameState,
    preferences: DataManager,
    statistics: StatisticsTracker,
    tick_duration: Duration,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    outbound_tx: mpsc::UnboundedSender<OutboundMessage>,
    outbound_rx: mpsc::UnboundedReceiver<OutboundMessage>,
}

impl Server {
    pub async fn new(
        addr: &str,
        tick_duration: Duration,
        max_clients: usize,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("Server listening on {}", socket.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        Ok(Server {
            socket,
            clients: Arc::new(RwLock::new(ClientManager::new(max_clients))),
            lobby: GameState::new(),
            preferences: DataManager::new(),
            statistics: StatisticsTracker::new(),
            tick_duration,
            server_tx,
            server_rx,
            outbound_tx,
            outbound_rx,
        })
    }

    /// The address the socket actually bound to. Useful when the port
    /// was given as zero.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Spawns task that continuously listens for incoming packets
    async fn spawn_network_receiver(&self) {
        let socket = Arc::clone(&self.socket);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 2048];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => {
                        if let Ok(packet) = deserialize::<Packet>(&buffer[0..len]) {
                            if let Err(e) =
                                server_tx.send(ServerMessage::PacketReceived { packet, addr })
                            {
                                error!("Failed to send packet to main loop: {}", e);
                                break;
                            }
                        } else {
                            warn!("Failed to deserialize packet from {}", addr);
                        }
                    }
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns task that processes outgoing packet queue
    async fn spawn_network_sender(&mut self) {
        let socket = Arc::clone(&self.socket);
        let clients = Arc::clone(&self.clients);
        let mut outbound_rx = std::mem::replace(&mut self.outbound_rx, mpsc::unbounded_channel().1);

        tokio::spawn(async move {
            while let Some(message) = outbound_rx.recv().await {
                match message {
                    OutboundMessage::SendPacket { packet, addr } => {
                        if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                            error!("Failed to send packet to {}: {}", addr, e);
                        }
                    }
                    OutboundMessage::BroadcastPacket { packet, exclude } => {
                        let client_addrs = {
                            let clients_guard = clients.read().await;
                            clients_guard.get_client_addrs()
                        };

                        for (client_id, addr) in client_addrs {
                            if Some(client_id) == exclude {
                                continue;
                            }

                            if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                                error!("Failed to send to client {}: {}", client_id, e);
                            }
                        }
                    }
                }
            }
        });
    }

    /// Spawns task that monitors client timeouts
    async fn spawn_timeout_checker(&self) {
        let clients = Arc::clone(&self.clients);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));

            loop {
                interval.tick().await;

                let timed_out = {
                    let mut clients_guard = clients.write().await;
                    clients_guard.check_timeouts()
                };

                for client in timed_out {
                    if let Err(e) = server_tx.send(ServerMessage::ClientTimeout {
                        client_id: client.id,
                        name: client.name,
                    }) {
                        error!("Failed to send timeout message: {}", e);
                        break;
                    }
                }
            }
        });
    }

    /// Spawns task that forwards console input lines to the main loop
    async fn spawn_console_reader(&self) {
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if server_tx.send(ServerMessage::ConsoleLine { line }).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        error!("Error reading console input: {}", e);
                        break;
                    }
                }
            }
        });
    }

    async fn send_packet_impl(
        socket: &UdpSocket,
        packet: &Packet,
        addr: SocketAddr,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let data = serialize(packet)?;
        socket.send_to(&data, addr).await?;
        Ok(())
    }

    async fn send_packet(&self, packet: &Packet, addr: SocketAddr) {
        if let Err(e) = self.outbound_tx.send(OutboundMessage::SendPacket {
            packet: packet.clone(),
            addr,
        }) {
            error!("Failed to queue packet for sending: {}", e);
        }
    }

    async fn broadcast_packet(&self, packet: &Packet, exclude: Option<u32>) {
        if let Err(e) = self.outbound_tx.send(OutboundMessage::BroadcastPacket {
            packet: packet.clone(),
            exclude,
        }) {
            error!("Failed to queue broadcast packet: {}", e);
        }
    }

    async fn send_lines(&self, lines: Vec<String>, addr: SocketAddr) {
        self.send_packet(&Packet::Response { lines }, addr).await;
    }

    async fn broadcast_line(&self, line: String, exclude: Option<u32>) {
        self.broadcast_packet(&Packet::Broadcast { line }, exclude)
            .await;
    }

    /// Looks up the player behind a packet and refreshes their activity
    /// timestamp.
    async fn player_by_addr(&self, addr: SocketAddr) -> Option<OnlinePlayer> {
        let mut clients = self.clients.write().await;
        let client_id = clients.find_client_by_addr(addr)?;
        clients.touch(client_id);
        clients.get(client_id).map(|client| OnlinePlayer {
            id: client.id,
            name: client.name.clone(),
        })
    }

    /// Processes one incoming packet against the stores
    async fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) {
        match packet {
            Packet::Connect {
                username,
                client_version,
            } => {
                info!(
                    "Client connecting from {} as {:?} (version: {})",
                    addr, username, client_version
                );

                if client_version != PROTOCOL_VERSION {
                    let response = Packet::Disconnected {
                        reason: "Protocol version mismatch".to_string(),
                    };
                    self.send_packet(&response, addr).await;
                    return;
                }

                // Drop a stale session from the same address before
                // admitting the new one.
                let existing_client_id = {
                    let clients = self.clients.read().await;
                    clients.find_client_by_addr(addr)
                };

                if let Some(existing_id) = existing_client_id {
                    info!("Removing existing client {} from {}", existing_id, addr);
                    let mut clients = self.clients.write().await;
                    clients.remove_client(&existing_id);
                    self.lobby.remove_player(&existing_id);
                }

                let joined = {
                    let mut clients = self.clients.write().await;
                    clients.add_client(addr, &username)
                };

                match joined {
                    Ok(client_id) => {
                        self.statistics.register(&commands::user_key(&username));
                        self.lobby.add_player(client_id);

                        self.send_packet(&Packet::Connected { client_id }, addr).await;
                        self.send_lines(
                            vec![
                                format!("Welcome to the lobby, {}!", username),
                                "Type /help for commands".to_string(),
                            ],
                            addr,
                        )
                        .await;
                        self.broadcast_line(
                            format!("{} joined the lobby", username),
                            Some(client_id),
                        )
                        .await;
                    }
                    Err(refusal) => {
                        info!("Refused join from {}: {}", addr, refusal);
                        let response = Packet::Disconnected {
                            reason: refusal.to_string(),
                        };
                        self.send_packet(&response, addr).await;
                    }
                }
            }

            Packet::Chat { message } => {
                let player = match self.player_by_addr(addr).await {
                    Some(player) => player,
                    None => {
                        warn!("Chat from unknown address {}", addr);
                        return;
                    }
                };

                match message.strip_prefix('/') {
                    Some(body) => {
                        let (name, args) = parse_command(body);
                        let lines = self
                            .run_command(CommandSender::Player(player), &name, &args)
                            .await;
                        self.send_lines(lines, addr).await;
                    }
                    None => {
                        let prefs = self.preferences.preferences(&player.user_key());
                        let line = render_chat_line(&player.name, prefs, &message);
                        self.broadcast_line(line, None).await;
                    }
                }
            }

            Packet::Input { left, right, jump } => {
                if let Some(player) = self.player_by_addr(addr).await {
                    self.lobby.apply_input(player.id, left, right, jump);
                }
            }

            Packet::TabComplete { partial } => {
                if let Some(player) = self.player_by_addr(addr).await {
                    let entries = self
                        .complete_line(CommandSender::Player(player), &partial)
                        .await;
                    self.send_packet(&Packet::Suggestions { entries }, addr).await;
                }
            }

            Packet::Disconnect => {
                let removed = {
                    let mut clients = self.clients.write().await;
                    clients
                        .find_client_by_addr(addr)
                        .and_then(|client_id| clients.remove_client(&client_id))
                };

                if let Some(client) = removed {
                    self.lobby.remove_player(&client.id);
                    self.broadcast_line(format!("{} left the lobby", client.name), None)
                        .await;
                }
            }

            _ => {
                warn!("Unexpected packet type from client at {}", addr);
            }
        }
    }

    /// Runs one parsed command to its reply lines. Rejections and
    /// unrecognized forms become messages here, so every invocation
    /// answers with something.
    async fn run_command(
        &mut self,
        sender: CommandSender,
        name: &str,
        args: &[String],
    ) -> Vec<String> {
        let clients = Arc::clone(&self.clients);
        let directory = clients.read().await;
        let mut ctx = CommandContext {
            sender,
            directory: &*directory,
            preferences: &mut self.preferences,
            statistics: &self.statistics,
        };

        match commands::dispatch(&mut ctx, name, args) {
            CommandOutcome::Handled(lines) => lines,
            CommandOutcome::Rejected(error) => vec![error.to_string()],
            CommandOutcome::NotApplicable => vec![commands::usage(name)],
        }
    }

    /// Completion candidates for a partially typed slash line.
    async fn complete_line(&mut self, sender: CommandSender, partial: &str) -> Vec<String> {
        let body = match partial.strip_prefix('/') {
            // Plain chat text has no completions.
            None => return Vec::new(),
            Some(body) => body,
        };

        let (name, args) = completion_tokens(body);
        if args.is_empty() {
            return commands::partial_matches(&name, commands::COMMAND_NAMES.iter().copied());
        }

        let clients = Arc::clone(&self.clients);
        let directory = clients.read().await;
        let ctx = CommandContext {
            sender,
            directory: &*directory,
            preferences: &mut self.preferences,
            statistics: &self.statistics,
        };
        commands::tab_complete(&ctx, &name, &args)
    }

    /// Runs one line typed at the server console. `stop` shuts the
    /// server down; anything else dispatches with the console as sender,
    /// with or without a leading slash.
    async fn handle_console_line(&mut self, line: String) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }
        if trimmed.eq_ignore_ascii_case("stop") {
            info!("Console requested shutdown");
            if let Err(e) = self.server_tx.send(ServerMessage::Shutdown) {
                error!("Failed to queue shutdown: {}", e);
            }
            return;
        }

        let body = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let (name, args) = parse_command(body);
        for response_line in self.run_command(CommandSender::Console, &name, &args).await {
            println!("{}", response_line);
        }
    }

    /// Advances the lobby and feeds what happened into the statistics
    /// tracker.
    async fn advance_tick(&mut self, dt: f32) {
        let online = {
            let clients = self.clients.read().await;
            clients.online_user_keys()
        };

        for (client_id, movement) in self.lobby.update(dt) {
            if let Some((_, user)) = online.iter().find(|(id, _)| *id == client_id) {
                if movement.walked_cm > 0 {
                    self.statistics.add(user, Statistic::WalkCm, movement.walked_cm);
                }
                if movement.jumps > 0 {
                    self.statistics.add(user, Statistic::Jumps, movement.jumps);
                }
            }
        }

        let keys: Vec<String> = online.into_iter().map(|(_, key)| key).collect();
        self.statistics.tick_online(&keys);

        self.lobby.tick += 1;

        // Periodic performance monitoring
        if self.lobby.tick % 60 == 0 && !keys.is_empty() {
            debug!(
                "Tick {}: {} clients, {:.1}Hz",
                self.lobby.tick,
                keys.len(),
                1.0 / dt
            );
        }
    }

    /// Main server loop coordinating all operations
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // Initialize concurrent tasks
        self.spawn_network_receiver().await;
        self.spawn_network_sender().await;
        self.spawn_timeout_checker().await;
        self.spawn_console_reader().await;

        let mut tick_interval = interval(self.tick_duration);
        let mut last_tick = Instant::now();

        info!("Server started successfully");

        loop {
            tokio::select! {
                // Handle network and console events
                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::PacketReceived { packet, addr }) => {
                            self.handle_packet(packet, addr).await;
                        },
                        Some(ServerMessage::ClientTimeout { client_id, name }) => {
                            info!("Client {} ({}) timed out", client_id, name);
                            self.lobby.remove_player(&client_id);
                            self.broadcast_line(format!("{} left the lobby", name), None).await;
                        },
                        Some(ServerMessage::ConsoleLine { line }) => {
                            self.handle_console_line(line).await;
                        },
                        Some(ServerMessage::Shutdown) | None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },

                // Handle server tick events
                _ = tick_interval.tick() => {
                    let now = Instant::now();
                    let dt = now.duration_since(last_tick).as_secs_f32();
                    last_tick = now;

                    self.advance_tick(dt).await;
                },
            }
        }

        Ok(())
    }
}

/// Splits an executed command line into name and argument tokens.
fn parse_command(line: &str) -> (String, Vec<String>) {
    let mut tokens = line.split_whitespace().map(str::to_string);
    let name = tokens.next().unwrap_or_default();
    (name, tokens.collect())
}

/// Splits a partially typed command line for completion. A trailing
/// space opens a fresh empty token so suggestions target the next
/// position rather than the word already typed.
fn completion_tokens(line: &str) -> (String, Vec<String>) {
    let mut tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
    if tokens.is_empty() || line.ends_with(|c: char| c.is_whitespace()) {
        tokens.push(String::new());
    }
    let name = tokens.remove(0);
    (name, tokens)
}

/// Applies a speaker's stored colors to a plain chat line. Fields with
/// no stored color render without any escape at all.
fn render_chat_line(name: &str, prefs: UserPreference, message: &str) -> String {
    let rendered_name = match prefs.name_color {
        Some(color) => format!("{}{}{}", color.ansi(), name, ANSI_RESET),
        None => name.to_string(),
    };
    let rendered_message = match prefs.chat_color {
        Some(color) => format!("{}{}{}", color.ansi(), message, ANSI_RESET),
        None => message.to_string(),
    };
    format!("{}: {}", rendered_name, rendered_message)
}
