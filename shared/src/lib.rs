use serde::{Deserialize, Serialize};

pub mod color;
pub mod format;
pub mod statistic;

pub use color::{ColorSpec, ANSI_RESET, NAMED_COLORS};
pub use format::{pretty_duration, si_prefix};
pub use statistic::{Item, Statistic, Unit};

pub const PROTOCOL_VERSION: u32 = 1;
pub const TICKS_PER_SECOND: u64 = 20;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Packet {
    Connect {
        username: String,
        client_version: u32,
    },
    Chat {
        message: String,
    },
    Input {
        left: bool,
        right: bool,
        jump: bool,
    },
    TabComplete {
        partial: String,
    },
    Disconnect,

    Connected {
        client_id: u32,
    },
    Response {
        lines: Vec<String>,
    },
    Suggestions {
        entries: Vec<String>,
    },
    Broadcast {
        line: String,
    },
    Disconnected {
        reason: String,
    },
}
