//! The statistic catalog
//!
//! Every counter the server tracks has a fixed identity here. A few are
//! only meaningful together with an item qualifier and cannot be queried
//! as plain catalog entries.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Statistic {
    Deaths,
    MobKills,
    PlayerKills,
    DamageTaken,
    DamageDealt,
    Jumps,
    RaidsWon,
    FishCaught,
    AnimalsBred,
    ItemsEnchanted,
    WalkCm,
    SprintCm,
    SwimCm,
    FallCm,
    ElytraCm,
    MinecartCm,
    HorseCm,
    BoatCm,
    PlayTime,
    TimeSinceDeath,
    MineBlock,
    UseItem,
    BreakItem,
    CraftItem,
    PickUp,
    Drop,
    KillEntity,
    KilledByEntity,
}

/// How a raw counter value is meant to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Count,
    Centimeters,
    Ticks,
}

/// Items a qualified statistic can be scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Item {
    Diamond,
    Emerald,
    IronIngot,
    GoldIngot,
}

impl Statistic {
    pub const ALL: &'static [Statistic] = &[
        Statistic::Deaths,
        Statistic::MobKills,
        Statistic::PlayerKills,
        Statistic::DamageTaken,
        Statistic::DamageDealt,
        Statistic::Jumps,
        Statistic::RaidsWon,
        Statistic::FishCaught,
        Statistic::AnimalsBred,
        Statistic::ItemsEnchanted,
        Statistic::WalkCm,
        Statistic::SprintCm,
        Statistic::SwimCm,
        Statistic::FallCm,
        Statistic::ElytraCm,
        Statistic::MinecartCm,
        Statistic::HorseCm,
        Statistic::BoatCm,
        Statistic::PlayTime,
        Statistic::TimeSinceDeath,
        Statistic::MineBlock,
        Statistic::UseItem,
        Statistic::BreakItem,
        Statistic::CraftItem,
        Statistic::PickUp,
        Statistic::Drop,
        Statistic::KillEntity,
        Statistic::KilledByEntity,
    ];

    /// The name users type and completion offers.
    pub fn name(&self) -> &'static str {
        match self {
            Statistic::Deaths => "deaths",
            Statistic::MobKills => "mob_kills",
            Statistic::PlayerKills => "player_kills",
            Statistic::DamageTaken => "damage_taken",
            Statistic::DamageDealt => "damage_dealt",
            Statistic::Jumps => "jumps",
            Statistic::RaidsWon => "raids_won",
            Statistic::FishCaught => "fish_caught",
            Statistic::AnimalsBred => "animals_bred",
            Statistic::ItemsEnchanted => "items_enchanted",
            Statistic::WalkCm => "walk_cm",
            Statistic::SprintCm => "sprint_cm",
            Statistic::SwimCm => "swim_cm",
            Statistic::FallCm => "fall_cm",
            Statistic::ElytraCm => "elytra_cm",
            Statistic::MinecartCm => "minecart_cm",
            Statistic::HorseCm => "horse_cm",
            Statistic::BoatCm => "boat_cm",
            Statistic::PlayTime => "play_time",
            Statistic::TimeSinceDeath => "time_since_death",
            Statistic::MineBlock => "mine_block",
            Statistic::UseItem => "use_item",
            Statistic::BreakItem => "break_item",
            Statistic::CraftItem => "craft_item",
            Statistic::PickUp => "pickup",
            Statistic::Drop => "drop",
            Statistic::KillEntity => "kill_entity",
            Statistic::KilledByEntity => "killed_by_entity",
        }
    }

    /// Case-insensitive catalog lookup by user-facing name.
    pub fn from_name(token: &str) -> Option<Statistic> {
        Statistic::ALL
            .iter()
            .find(|stat| stat.name().eq_ignore_ascii_case(token))
            .copied()
    }

    pub fn unit(&self) -> Unit {
        match self {
            Statistic::WalkCm
            | Statistic::SprintCm
            | Statistic::SwimCm
            | Statistic::FallCm
            | Statistic::ElytraCm
            | Statistic::MinecartCm
            | Statistic::HorseCm
            | Statistic::BoatCm => Unit::Centimeters,
            Statistic::PlayTime | Statistic::TimeSinceDeath => Unit::Ticks,
            _ => Unit::Count,
        }
    }

    /// Whether the counter only makes sense scoped to an item.
    pub fn requires_qualifier(&self) -> bool {
        matches!(
            self,
            Statistic::MineBlock
                | Statistic::UseItem
                | Statistic::BreakItem
                | Statistic::CraftItem
                | Statistic::PickUp
                | Statistic::Drop
                | Statistic::KillEntity
                | Statistic::KilledByEntity
        )
    }
}
