//! Idea Card Entity

use serde::{Deserialize, Serialize};
use super::entity::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaCard {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub implemented: bool,
    #[serde(default)]
    pub team_code: String,
}

impl IdeaCard {
    pub fn new(title: String, detail: String) -> Self {
        Self {
            id: String::new(),
            title,
            detail,
            implemented: false,
            team_code: String::new(),
        }
    }
}

impl Entity for IdeaCard {
    const COLLECTION: &'static str = "ideas";

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
