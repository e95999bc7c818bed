//! Lobby movement simulation
//!
//! Players wander a small side-view lobby while they chat. Positions are
//! in centimeters, so each tick's horizontal travel feeds the walking
//! counter directly. Nothing here goes over the wire; the simulation
//! exists to give the statistics tracker something real to record.

use log::info;
use rand::Rng;
use std::collections::HashMap;

pub const GRAVITY: f32 = 980.0;
pub const PLAYER_SPEED: f32 = 300.0;
pub const JUMP_VELOCITY: f32 = -400.0;
pub const WORLD_WIDTH: f32 = 800.0;
pub const WORLD_HEIGHT: f32 = 600.0;
/// Floor line, 50 cm up from the bottom of the world.
pub const FLOOR_Y: f32 = WORLD_HEIGHT - 50.0;
pub const PLAYER_SIZE: f32 = 32.0;

/// One player's body in the lobby, plus the movement intent from their
/// latest input packet.
#[derive(Debug, Clone)]
pub struct LobbyPlayer {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub on_ground: bool,
    move_left: bool,
    move_right: bool,
    want_jump: bool,
    /// Fractional centimeters walked but not yet reported.
    walked_accum: f32,
}

impl LobbyPlayer {
    pub fn new(id: u32, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            vel_x: 0.0,
            vel_y: 0.0,
            on_ground: true,
            move_left: false,
            move_right: false,
            want_jump: false,
            walked_accum: 0.0,
        }
    }
}

/// What a player actually did during one tick, in whole units the
/// statistics tracker can add.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Movement {
    pub walked_cm: u64,
    pub jumps: u64,
}

#[derive(Debug, Clone, Default)]
pub struct GameState {
    pub tick: u32,
    pub players: HashMap<u32, LobbyPlayer>,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            tick: 0,
            players: HashMap::new(),
        }
    }

    /// Drops a new player onto the lobby floor at a random x.
    pub fn add_player(&mut self, client_id: u32) {
        let spawn_x = rand::thread_rng().gen_range(0.0..=WORLD_WIDTH - PLAYER_SIZE);
        let spawn_y = FLOOR_Y - PLAYER_SIZE;

        let player = LobbyPlayer::new(client_id, spawn_x, spawn_y);

        info!("Added player {} at ({:.0}, {:.0})", client_id, player.x, player.y);
        self.players.insert(client_id, player);
    }

    pub fn remove_player(&mut self, client_id: &u32) {
        if self.players.remove(client_id).is_some() {
            info!("Removed player {}", client_id);
        }
    }

    /// Records the movement intent the next ticks integrate. Intent
    /// persists until the next input packet replaces it.
    pub fn apply_input(&mut self, client_id: u32, left: bool, right: bool, jump: bool) {
        if let Some(player) = self.players.get_mut(&client_id) {
            player.move_left = left;
            player.move_right = right;
            player.want_jump = jump;
        }
    }

    /// Advances the simulation by `dt` seconds and reports who walked or
    /// jumped. Only players with something to report appear in the result.
    pub fn update(&mut self, dt: f32) -> Vec<(u32, Movement)> {
        let mut moved = Vec::new();

        for player in self.players.values_mut() {
            let mut movement = Movement::default();

            player.vel_x = 0.0;
            if player.move_left {
                player.vel_x -= PLAYER_SPEED;
            }
            if player.move_right {
                player.vel_x += PLAYER_SPEED;
            }

            if player.want_jump && player.on_ground {
                player.vel_y = JUMP_VELOCITY;
                player.on_ground = false;
                movement.jumps += 1;
            }

            // Horizontal travel counts as walking only while grounded.
            let grounded = player.on_ground;

            if !player.on_ground {
                player.vel_y += GRAVITY * dt;
            }

            let old_x = player.x;
            player.x += player.vel_x * dt;
            player.y += player.vel_y * dt;

            player.x = player.x.clamp(0.0, WORLD_WIDTH - PLAYER_SIZE);

            if player.y + PLAYER_SIZE >= FLOOR_Y {
                player.y = FLOOR_Y - PLAYER_SIZE;
                player.vel_y = 0.0;
                player.on_ground = true;
            }
            if player.y <= 0.0 {
                player.y = 0.0;
                player.vel_y = 0.0;
            }

            if grounded {
                player.walked_accum += (player.x - old_x).abs();
            }
            let whole = player.walked_accum.floor();
            if whole >= 1.0 {
                player.walked_accum -= whole;
                movement.walked_cm = whole as u64;
            }

            if movement != Movement::default() {
                moved.push((player.id, movement));
            }
        }

        moved
    }
}
