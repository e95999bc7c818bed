//! Raw statistic counters for every user the server has seen
//!
//! Counters live under the same lowercased-username keys the preference
//! store uses and are never dropped on disconnect. The tracker records
//! what the lobby actually produces (movement, jumps, clock ticks);
//! every other catalog entry stays at zero until something feeds it.

use crate::commands::StatisticsSource;
use chrono::{DateTime, Utc};
use shared::{Item, Statistic};
use std::collections::HashMap;

#[derive(Default)]
pub struct StatisticsTracker {
    counters: HashMap<String, HashMap<Statistic, u64>>,
    item_counters: HashMap<String, HashMap<(Statistic, Item), u64>>,
    registered: HashMap<String, DateTime<Utc>>,
}

impl StatisticsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps the first time a user is seen. Later calls keep the
    /// original timestamp.
    pub fn register(&mut self, user: &str) {
        self.registered
            .entry(user.to_string())
            .or_insert_with(Utc::now);
    }

    pub fn add(&mut self, user: &str, stat: Statistic, amount: u64) {
        *self
            .counters
            .entry(user.to_string())
            .or_default()
            .entry(stat)
            .or_insert(0) += amount;
    }

    pub fn add_item(&mut self, user: &str, stat: Statistic, item: Item, amount: u64) {
        *self
            .item_counters
            .entry(user.to_string())
            .or_default()
            .entry((stat, item))
            .or_insert(0) += amount;
    }

    /// Advances the per-tick clocks for everyone currently online.
    pub fn tick_online(&mut self, users: &[String]) {
        for user in users {
            self.add(user, Statistic::PlayTime, 1);
            self.add(user, Statistic::TimeSinceDeath, 1);
        }
    }
}

impl StatisticsSource for StatisticsTracker {
    fn counter(&self, user: &str, stat: Statistic, qualifier: Option<Item>) -> u64 {
        match qualifier {
            Some(item) => self
                .item_counters
                .get(user)
                .and_then(|counters| counters.get(&(stat, item)))
                .copied()
                .unwrap_or(0),
            None => self
                .counters
                .get(user)
                .and_then(|counters| counters.get(&stat))
                .copied()
                .unwrap_or(0),
        }
    }

    fn registered_at(&self, user: &str) -> Option<DateTime<Utc>> {
        self.registered.get(user).copied()
    }
}
