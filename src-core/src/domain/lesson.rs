//! Training Lesson Entity

use serde::{Deserialize, Serialize};
use super::entity::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingLesson {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub team_code: String,
}

impl TrainingLesson {
    pub fn new(title: String, category: String) -> Self {
        Self {
            id: String::new(),
            title,
            category,
            video_url: None,
            team_code: String::new(),
        }
    }

    pub fn has_video(&self) -> bool {
        self.video_url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}

impl Entity for TrainingLesson {
    const COLLECTION: &'static str = "lessons";

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
