//! Per-user preference records
//!
//! Records are keyed by lowercased username rather than connection id,
//! so a user who reconnects under a new id keeps their colors. A reset
//! clears the field but keeps the record.

use crate::commands::{ColorField, PreferenceStore, UserPreference};
use log::debug;
use shared::ColorSpec;
use std::collections::HashMap;

#[derive(Default)]
pub struct DataManager {
    records: HashMap<String, UserPreference>,
}

impl DataManager {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    /// Number of users with a stored record, counting reset ones.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl PreferenceStore for DataManager {
    fn preferences(&self, user: &str) -> UserPreference {
        self.records.get(user).copied().unwrap_or_default()
    }

    fn set_color(&mut self, user: &str, field: ColorField, color: Option<ColorSpec>) {
        let record = self.records.entry(user.to_string()).or_default();
        match field {
            ColorField::Chat => record.chat_color = color,
            ColorField::Name => record.name_color = color,
        }
        debug!("Updated {} color for {}", field.label(), user);
    }
}
