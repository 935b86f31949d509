//! Location Entity
//!
//! A campus or venue with its ordered list of rooms.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub rooms: Vec<String>,
    #[serde(default)]
    pub team_code: String,
}

impl Location {
    pub fn new(name: String) -> Self {
        Self {
            id: String::new(),
            name,
            rooms: Vec::new(),
            team_code: String::new(),
        }
    }

    /// Adds a room unless one with the same name (ignoring case) exists.
    /// Returns whether the list changed.
    pub fn add_room(&mut self, room: &str) -> bool {
        let room = room.trim();
        if room.is_empty() || self.rooms.iter().any(|r| r.eq_ignore_ascii_case(room)) {
            return false;
        }
        self.rooms.push(room.to_string());
        true
    }

    pub fn remove_room(&mut self, room: &str) -> bool {
        let before = self.rooms.len();
        self.rooms.retain(|r| !r.eq_ignore_ascii_case(room.trim()));
        self.rooms.len() != before
    }
}

impl Entity for Location {
    const COLLECTION: &'static str = "locations";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn team_code(&self) -> Option<&str> {
        Some(&self.team_code)
    }

    fn set_team_code(&mut self, code: String) {
        self.team_code = code;
    }
}
