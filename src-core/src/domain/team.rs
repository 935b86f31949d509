//! Team Entity
//!
//! The tenant record created when a paying user starts a new team.
//! Its document id is the team code itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::entity::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub team_code: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

impl Team {
    pub fn new(code: String, owner_id: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: code.clone(),
            team_code: code,
            owner_id,
            created_at,
        }
    }
}

impl Entity for Team {
    const COLLECTION: &'static str = "teams";

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
